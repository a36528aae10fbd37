//! Product catalog.
//!
//! The catalog is supplied from outside (static list or JSON) and is
//! only ever read by the storefront.

mod product;

pub use product::Product;

use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::{Currency, Money};
use product::CatalogEntry;
use serde::{Deserialize, Serialize};

/// Which storefront shelf a product is shown on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    #[default]
    Featured,
    Popular,
}

/// An immutable list of products with lookup helpers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: Vec<(Section, Product)>,
}

impl Catalog {
    /// Build a catalog where every product sits on the featured shelf.
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: products
                .into_iter()
                .map(|p| (Section::Featured, p))
                .collect(),
        }
    }

    /// Build a catalog from explicit shelf assignments.
    pub fn with_sections(products: Vec<(Section, Product)>) -> Self {
        Self { products }
    }

    /// Parse an externally supplied JSON array of
    /// `{id, name, price, originalPrice?, image, category}` entries.
    pub fn from_json(json: &str, currency: Currency) -> Result<Self, CommerceError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Ok(Self::new(
            entries
                .into_iter()
                .map(|e| e.into_product(currency))
                .collect(),
        ))
    }

    /// The shop's built-in product list.
    pub fn demo() -> Self {
        const IMG: &str = "https://images.unsplash.com";
        let p = |id: u32, name: &str, cents: i64, image: &str, category: &str| {
            Product::new(id, name, Money::usd(cents), format!("{IMG}/{image}"), category)
        };

        Self::with_sections(vec![
            (
                Section::Featured,
                p(1, "DIY Birthday Party Kit", 2999, "photo-1618160702438-9b02ab6515c9?w=400&h=300&fit=crop", "Birthday Kit")
                    .with_original_price(Money::usd(3999)),
            ),
            (
                Section::Featured,
                p(2, "Charm Bracelet Making Set", 2499, "photo-1582562124811-c09040d0a901?w=400&h=300&fit=crop", "Jewelry"),
            ),
            (
                Section::Featured,
                p(3, "Kids Learning Bundle", 3499, "photo-1488590528505-98d2b5aba04b?w=400&h=300&fit=crop", "Learning")
                    .with_original_price(Money::usd(4499)),
            ),
            (
                Section::Featured,
                p(4, "Watercolor Painting Kit", 1999, "photo-1721322800607-8c38375eef04?w=400&h=300&fit=crop", "Art Kit"),
            ),
            (
                Section::Popular,
                p(5, "Memory Scrapbook Kit", 2799, "photo-1649972904349-6e44c42644a7?w=400&h=300&fit=crop", "Memory Kit"),
            ),
            (
                Section::Popular,
                p(6, "Friendship Bracelet Set", 1699, "photo-1581091226825-a6a2a5aee158?w=400&h=300&fit=crop", "Jewelry")
                    .with_original_price(Money::usd(2299)),
            ),
            (
                Section::Popular,
                p(7, "Creative Sticker Pack", 1299, "photo-1531297484001-80022131f5a1?w=400&h=300&fit=crop", "Stickers"),
            ),
            (
                Section::Popular,
                p(8, "Mini Garden Growing Kit", 2299, "photo-1486312338219-ce68d2c6f44d?w=400&h=300&fit=crop", "Garden Kit"),
            ),
        ])
    }

    /// All products in listing order.
    pub fn products(&self) -> impl Iterator<Item = &Product> + Clone {
        self.products.iter().map(|(_, p)| p)
    }

    /// Products on one shelf.
    pub fn section(&self, section: Section) -> impl Iterator<Item = &Product> + Clone {
        self.products
            .iter()
            .filter(move |(s, _)| *s == section)
            .map(|(_, p)| p)
    }

    /// Look up a product by id.
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products().find(|p| p.id == id)
    }

    /// Look up a product, failing with [`CommerceError::ProductNotFound`].
    pub fn require(&self, id: ProductId) -> Result<&Product, CommerceError> {
        self.get(id).ok_or(CommerceError::ProductNotFound(id))
    }

    /// Products in a category (case-insensitive).
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Product> + 'a {
        self.products()
            .filter(move |p| p.category.eq_ignore_ascii_case(category))
    }

    /// Distinct categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for product in self.products() {
            if !seen.contains(&product.category.as_str()) {
                seen.push(&product.category);
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog() {
        let catalog = Catalog::demo();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.section(Section::Featured).count(), 4);
        assert_eq!(catalog.section(Section::Popular).count(), 4);

        let kit = catalog.get(ProductId::new(1)).unwrap();
        assert_eq!(kit.price, Money::usd(2999));
        assert_eq!(kit.original_price, Some(Money::usd(3999)));
    }

    #[test]
    fn test_require_missing() {
        let catalog = Catalog::demo();
        assert_eq!(
            catalog.require(ProductId::new(99)),
            Err(CommerceError::ProductNotFound(ProductId::new(99)))
        );
    }

    #[test]
    fn test_by_category() {
        let catalog = Catalog::demo();
        let jewelry: Vec<u32> = catalog.by_category("jewelry").map(|p| p.id.get()).collect();
        assert_eq!(jewelry, vec![2, 6]);
        assert_eq!(catalog.categories().len(), 7);
    }

    #[test]
    fn test_from_json() {
        let catalog = Catalog::from_json(
            r#"[
                {"id": 1, "name": "Kit", "price": 29.99, "image": "a.jpg", "category": "Art"},
                {"id": 2, "name": "Set", "price": 24.99, "originalPrice": 30.0, "image": "b.jpg", "category": "Art"}
            ]"#,
            Currency::USD,
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(ProductId::new(2)).unwrap().original_price, Some(Money::usd(3000)));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            Catalog::from_json("{}", Currency::USD),
            Err(CommerceError::SerializationError(_))
        ));
    }
}
