//! Product type.

use crate::ids::ProductId;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A product offered by the shop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalog identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Current selling price.
    pub price: Money,
    /// Price before markdown, shown struck through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Money>,
    /// Image URL.
    pub image: String,
    /// Category label, e.g. "Jewelry".
    pub category: String,
}

impl Product {
    /// Create a product without a markdown.
    pub fn new(
        id: impl Into<ProductId>,
        name: impl Into<String>,
        price: Money,
        image: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            original_price: None,
            image: image.into(),
            category: category.into(),
        }
    }

    /// Set the pre-markdown price.
    pub fn with_original_price(mut self, original_price: Money) -> Self {
        self.original_price = Some(original_price);
        self
    }

    /// Whether the product is marked down.
    pub fn is_on_sale(&self) -> bool {
        self.original_price
            .map(|orig| {
                orig.currency == self.price.currency && orig.amount_cents > self.price.amount_cents
            })
            .unwrap_or(false)
    }

    /// Rounded percentage off the original price, if marked down.
    pub fn discount_percent(&self) -> Option<u8> {
        if !self.is_on_sale() {
            return None;
        }
        let orig = self.original_price?.amount_cents;
        let off = orig - self.price.amount_cents;
        Some(((off * 100 + orig / 2) / orig) as u8)
    }
}

/// Wire shape of an externally supplied catalog entry.
///
/// Prices arrive as decimal numbers (`29.99`), the way the storefront
/// front-end lists them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CatalogEntry {
    pub id: u32,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub original_price: Option<f64>,
    pub image: String,
    pub category: String,
}

impl CatalogEntry {
    pub(crate) fn into_product(self, currency: Currency) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name,
            price: Money::from_decimal(self.price, currency),
            original_price: self.original_price.map(|p| Money::from_decimal(p, currency)),
            image: self.image,
            category: self.category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_percent() {
        let kit = Product::new(1, "DIY Birthday Party Kit", Money::usd(2999), "", "Birthday Kit")
            .with_original_price(Money::usd(3999));
        assert!(kit.is_on_sale());
        assert_eq!(kit.discount_percent(), Some(25));

        let plain = Product::new(2, "Charm Bracelet Making Set", Money::usd(2499), "", "Jewelry");
        assert!(!plain.is_on_sale());
        assert_eq!(plain.discount_percent(), None);
    }

    #[test]
    fn test_catalog_entry_conversion() {
        let entry: CatalogEntry = serde_json::from_str(
            r#"{"id":6,"name":"Friendship Bracelet Set","price":16.99,"originalPrice":22.99,"image":"x.jpg","category":"Jewelry"}"#,
        )
        .unwrap();
        let product = entry.into_product(Currency::USD);
        assert_eq!(product.id, ProductId::new(6));
        assert_eq!(product.price, Money::usd(1699));
        assert_eq!(product.original_price, Some(Money::usd(2299)));
    }
}
