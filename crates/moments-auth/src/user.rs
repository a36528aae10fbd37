//! User types.

use moments_commerce::checkout::ShippingDetails;
use moments_commerce::ids::UserId;
use serde::{Deserialize, Serialize};

/// The signed-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Generated on sign-in.
    pub id: UserId,
    /// The phone number the sign-in code was sent to.
    pub phone_number: String,
    /// Display name; may be empty until the profile is completed.
    #[serde(default)]
    pub name: String,
    /// Shipping address; may be empty until the profile is completed.
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Set only by a successful email code check.
    #[serde(default)]
    pub email_verified: bool,
}

impl User {
    /// Create a freshly signed-in user from a profile draft.
    pub fn sign_in(phone_number: impl Into<String>, draft: ProfileDraft) -> Self {
        Self {
            id: UserId::generate(),
            phone_number: phone_number.into(),
            name: draft.name.trim().to_string(),
            address: draft.address.trim().to_string(),
            email: draft
                .email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            email_verified: false,
        }
    }

    /// Whether name and address are both filled in.
    pub fn profile_status(&self) -> ProfileStatus {
        if self.name.trim().is_empty() || self.address.trim().is_empty() {
            ProfileStatus::Incomplete
        } else {
            ProfileStatus::Complete
        }
    }

    /// Shipping details derived from the profile, `None` while incomplete.
    pub fn shipping_details(&self) -> Option<ShippingDetails> {
        if self.profile_status() == ProfileStatus::Incomplete {
            return None;
        }
        let details = ShippingDetails::new(&self.name, &self.address);
        Some(match &self.email {
            Some(email) => details.with_email(email),
            None => details,
        })
    }

    /// Change the email, dropping verification unless it is unchanged.
    pub(crate) fn set_email(&mut self, email: String) {
        if self.email.as_deref() != Some(email.as_str()) {
            self.email = Some(email);
            self.email_verified = false;
        }
    }
}

/// Whether a signed-in user still needs to fill in their profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileStatus {
    Incomplete,
    Complete,
}

/// Profile fields collected alongside the sign-in code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub name: String,
    pub address: String,
    pub email: Option<String>,
}

impl ProfileDraft {
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
}

/// Partial profile update. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_without_profile() {
        let user = User::sign_in("+15551234567", ProfileDraft::default());
        assert_eq!(user.profile_status(), ProfileStatus::Incomplete);
        assert!(user.shipping_details().is_none());
        assert!(!user.email_verified);
        assert!(user.email.is_none());
    }

    #[test]
    fn test_sign_in_with_profile() {
        let user = User::sign_in(
            "+15551234567",
            ProfileDraft::new(" Ada ", "1 Analytical Way").with_email("ada@example.com"),
        );
        assert_eq!(user.name, "Ada");
        assert_eq!(user.profile_status(), ProfileStatus::Complete);
        let shipping = user.shipping_details().unwrap();
        assert_eq!(shipping.email.as_deref(), Some("ada@example.com"));
        assert!(!user.email_verified);
    }

    #[test]
    fn test_blank_email_is_absent() {
        let user = User::sign_in("+1", ProfileDraft::new("A", "B").with_email("  "));
        assert!(user.email.is_none());
    }

    #[test]
    fn test_set_email_resets_verification() {
        let mut user = User::sign_in("+1", ProfileDraft::new("A", "B"));
        user.email = Some("a@example.com".into());
        user.email_verified = true;

        user.set_email("a@example.com".into());
        assert!(user.email_verified);

        user.set_email("b@example.com".into());
        assert!(!user.email_verified);
    }

    #[test]
    fn test_persisted_shape() {
        let user = User::sign_in("+1", ProfileDraft::new("A", "B"));
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["phoneNumber"], "+1");
        assert_eq!(json["emailVerified"], false);
        assert!(json.get("email").is_none());
    }
}
