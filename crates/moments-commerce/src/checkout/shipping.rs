//! Shipping details.

use serde::{Deserialize, Serialize};

/// Where and to whom an order ships.
///
/// Taken from the signed-in user's profile; there is no separate
/// shipping form once the profile exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ShippingDetails {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Whether name and address are both present.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.name.trim().is_empty() {
            missing.push("name");
        }
        if self.address.trim().is_empty() {
            missing.push("address");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completeness() {
        assert!(ShippingDetails::new("Ada", "1 Analytical Way").is_complete());
        assert_eq!(ShippingDetails::new(" ", "").missing_fields(), vec!["name", "address"]);
    }
}
