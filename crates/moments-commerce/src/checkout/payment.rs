//! Payment capture boundary.
//!
//! The storefront never talks to a card network. It hands card details
//! and an amount to a [`PaymentProcessor`] and branches on the result.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::CommerceError;
use crate::ids::AuthorizationId;
use crate::money::Money;

/// Card fields collected on the payment step.
///
/// Only checked for shape; never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct CardDetails {
    pub number: String,
    pub name_on_card: String,
    /// `MM/YY`.
    pub expiry: String,
    pub cvv: String,
}

impl CardDetails {
    pub fn new(
        number: impl Into<String>,
        name_on_card: impl Into<String>,
        expiry: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            number: number.into(),
            name_on_card: name_on_card.into(),
            expiry: expiry.into(),
            cvv: cvv.into(),
        }
    }

    /// Card number with spaces and dashes removed.
    pub fn digits(&self) -> String {
        self.number
            .chars()
            .filter(|c| !matches!(c, ' ' | '-'))
            .collect()
    }

    /// Last four digits, for receipts and logs.
    pub fn last4(&self) -> String {
        let digits: Vec<char> = self.digits().chars().collect();
        let start = digits.len().saturating_sub(4);
        digits[start..].iter().collect()
    }

    /// Superficial format check: required fields and expected lengths.
    ///
    /// No checksum or expiry-date-in-the-past check.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if self.name_on_card.trim().is_empty() {
            return Err(CommerceError::InvalidCard("name on card is required".into()));
        }

        let digits = self.digits();
        if !digits.chars().all(|c| c.is_ascii_digit()) || !(12..=19).contains(&digits.len()) {
            return Err(CommerceError::InvalidCard(
                "card number must be 12-19 digits".into(),
            ));
        }

        let expiry = self.expiry.trim();
        let valid_expiry = match expiry.split_once('/') {
            Some((mm, yy)) if mm.len() == 2 && yy.len() == 2 => {
                let month_ok = mm.parse::<u8>().is_ok_and(|m| (1..=12).contains(&m));
                month_ok && yy.chars().all(|c| c.is_ascii_digit())
            }
            _ => false,
        };
        if !valid_expiry {
            return Err(CommerceError::InvalidCard("expiry must be MM/YY".into()));
        }

        let cvv = self.cvv.trim();
        if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
            return Err(CommerceError::InvalidCard("CVV must be 3 or 4 digits".into()));
        }

        Ok(())
    }
}

impl fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &format_args!("**** {}", self.last4()))
            .field("name_on_card", &self.name_on_card)
            .field("expiry", &self.expiry)
            .field("cvv", &"***")
            .finish()
    }
}

/// Proof of a successful charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAuthorization {
    pub id: AuthorizationId,
    pub amount: Money,
    pub card_last4: String,
    pub authorized_at: DateTime<Utc>,
}

/// Why a charge did not go through.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// The processor refused the card.
    #[error("Payment declined: {reason}")]
    Declined { reason: String },

    /// No answer within the allowed time.
    #[error("Payment timed out")]
    Timeout,

    /// The processor could not be reached.
    #[error("Payment processor unavailable: {0}")]
    Unavailable(String),
}

/// External payment collaborator.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Charge `amount` to `card`.
    async fn charge(
        &self,
        card: &CardDetails,
        amount: Money,
    ) -> Result<PaymentAuthorization, PaymentError>;
}

/// Stand-in processor: waits, then approves.
///
/// Cards whose number ends with the configured decline suffix are
/// refused, so the decline path can be exercised by hand.
#[derive(Debug, Clone)]
pub struct SimulatedPaymentProcessor {
    latency: Duration,
    decline_suffix: Option<String>,
}

impl SimulatedPaymentProcessor {
    /// Latency used by the storefront demo.
    pub const DEFAULT_LATENCY: Duration = Duration::from_secs(2);
    /// Card-number suffix that triggers a decline.
    pub const DEFAULT_DECLINE_SUFFIX: &'static str = "0002";

    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            decline_suffix: Some(Self::DEFAULT_DECLINE_SUFFIX.to_string()),
        }
    }

    /// Replace or disable (`None`) the decline trigger.
    ///
    /// A blank suffix would match every card, so it disables the trigger
    /// too.
    pub fn with_decline_suffix(mut self, suffix: Option<String>) -> Self {
        self.decline_suffix = suffix
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }
}

impl Default for SimulatedPaymentProcessor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LATENCY)
    }
}

#[async_trait]
impl PaymentProcessor for SimulatedPaymentProcessor {
    async fn charge(
        &self,
        card: &CardDetails,
        amount: Money,
    ) -> Result<PaymentAuthorization, PaymentError> {
        tracing::debug!(last4 = %card.last4(), amount = %amount, "simulating card charge");
        tokio::time::sleep(self.latency).await;

        if !amount.is_positive() {
            return Err(PaymentError::Declined {
                reason: "amount must be positive".into(),
            });
        }
        if let Some(suffix) = &self.decline_suffix {
            if card.digits().ends_with(suffix.as_str()) {
                return Err(PaymentError::Declined {
                    reason: "card declined by issuer".into(),
                });
            }
        }

        Ok(PaymentAuthorization {
            id: AuthorizationId::generate(),
            amount,
            card_last4: card.last4(),
            authorized_at: Utc::now(),
        })
    }
}
