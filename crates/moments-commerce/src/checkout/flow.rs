//! Checkout flow state machine.

use crate::checkout::{CardDetails, ShippingDetails};
use crate::CommerceError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Steps in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutStep {
    /// Waiting for the shopper to sign in.
    SignIn,
    /// Review shipping details from the profile.
    Shipping,
    /// Card details.
    Payment,
    /// Charge in flight.
    Processing,
    /// Order placed.
    Complete,
}

impl CheckoutStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutStep::SignIn => "sign_in",
            CheckoutStep::Shipping => "shipping",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Processing => "processing",
            CheckoutStep::Complete => "complete",
        }
    }
}

/// Checkout flow state.
///
/// Pure state: it knows nothing about carts, users or processors, only
/// which facts have been supplied and which step is current.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutFlow {
    step: CheckoutStep,
    completed_steps: Vec<CheckoutStep>,
    shipping: Option<ShippingDetails>,
    payment: Option<CardDetails>,
    started_at: DateTime<Utc>,
}

impl CheckoutFlow {
    /// Start a flow. Signed-out shoppers begin at [`CheckoutStep::SignIn`].
    pub fn new(signed_in: bool) -> Self {
        let now = Utc::now();
        Self {
            step: if signed_in {
                CheckoutStep::Shipping
            } else {
                CheckoutStep::SignIn
            },
            completed_steps: Vec::new(),
            shipping: None,
            payment: None,
            started_at: now,
        }
    }

    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    pub fn completed_steps(&self) -> &[CheckoutStep] {
        &self.completed_steps
    }

    pub fn shipping(&self) -> Option<&ShippingDetails> {
        self.shipping.as_ref()
    }

    pub fn payment(&self) -> Option<&CardDetails> {
        self.payment.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Leave the sign-in step once the session is authenticated.
    pub fn signed_in(&mut self) -> Result<CheckoutStep, CommerceError> {
        self.expect_step(CheckoutStep::SignIn, CheckoutStep::Shipping)?;
        self.move_to(CheckoutStep::Shipping);
        Ok(self.step)
    }

    /// Record shipping details. Allowed on the shipping and payment steps.
    pub fn set_shipping(&mut self, details: ShippingDetails) -> Result<(), CommerceError> {
        if !matches!(self.step, CheckoutStep::Shipping | CheckoutStep::Payment) {
            return Err(self.invalid(CheckoutStep::Shipping));
        }
        let missing = details.missing_fields();
        if !missing.is_empty() {
            return Err(CommerceError::CheckoutIncomplete(missing.join(", ")));
        }
        self.shipping = Some(details);
        Ok(())
    }

    /// Record card details after a format check. Payment step only.
    pub fn set_payment(&mut self, card: CardDetails) -> Result<(), CommerceError> {
        if self.step != CheckoutStep::Payment {
            return Err(self.invalid(CheckoutStep::Payment));
        }
        card.validate()?;
        self.payment = Some(card);
        Ok(())
    }

    /// Check if checkout can advance to a step.
    pub fn can_advance_to(&self, step: CheckoutStep) -> bool {
        self.missing_for_step(step).is_empty()
    }

    /// Move from shipping to payment.
    pub fn advance(&mut self) -> Result<CheckoutStep, CommerceError> {
        let next = match self.step {
            CheckoutStep::Shipping => CheckoutStep::Payment,
            CheckoutStep::SignIn => return Err(self.invalid(CheckoutStep::Shipping)),
            CheckoutStep::Payment => return Err(self.invalid(CheckoutStep::Processing)),
            CheckoutStep::Processing | CheckoutStep::Complete => {
                return Err(self.invalid(CheckoutStep::Complete))
            }
        };
        self.require(next)?;
        self.move_to(next);
        Ok(next)
    }

    /// Enter the processing step ahead of a charge.
    ///
    /// Fails with [`CommerceError::SubmissionInFlight`] while a previous
    /// submission has not finished.
    pub fn begin_processing(&mut self) -> Result<&CardDetails, CommerceError> {
        match self.step {
            CheckoutStep::Processing => return Err(CommerceError::SubmissionInFlight),
            CheckoutStep::Payment => {}
            _ => return Err(self.invalid(CheckoutStep::Processing)),
        }
        self.require(CheckoutStep::Processing)?;
        self.move_to(CheckoutStep::Processing);
        self.payment
            .as_ref()
            .ok_or_else(|| CommerceError::CheckoutIncomplete("payment details".into()))
    }

    /// The charge failed or was abandoned; return to the payment step.
    ///
    /// Card details are kept so the shopper can correct and retry.
    pub fn abort_processing(&mut self) {
        if self.step == CheckoutStep::Processing {
            self.step = CheckoutStep::Payment;
            self.completed_steps.retain(|s| *s != CheckoutStep::Payment);
        }
    }

    /// The order was placed.
    pub fn complete(&mut self) -> Result<(), CommerceError> {
        self.expect_step(CheckoutStep::Processing, CheckoutStep::Complete)?;
        self.move_to(CheckoutStep::Complete);
        // Card details are not needed past this point.
        self.payment = None;
        Ok(())
    }

    /// Go back from payment to shipping.
    pub fn go_back(&mut self) -> Result<CheckoutStep, CommerceError> {
        let prev = match self.step {
            CheckoutStep::Payment => CheckoutStep::Shipping,
            other => {
                return Err(CommerceError::InvalidCheckoutTransition {
                    from: other.as_str().to_string(),
                    to: "previous".to_string(),
                })
            }
        };
        self.step = prev;
        Ok(prev)
    }

    /// Check if checkout is complete.
    pub fn is_complete(&self) -> bool {
        self.step == CheckoutStep::Complete
    }

    /// What's missing to advance to a step.
    fn missing_for_step(&self, step: CheckoutStep) -> Vec<&'static str> {
        let mut missing = Vec::new();
        match step {
            CheckoutStep::SignIn | CheckoutStep::Shipping => {}
            CheckoutStep::Payment => {
                if self.shipping.is_none() {
                    missing.push("shipping details");
                }
            }
            CheckoutStep::Processing | CheckoutStep::Complete => {
                missing.extend(self.missing_for_step(CheckoutStep::Payment));
                if self.payment.is_none() {
                    missing.push("payment details");
                }
            }
        }
        missing
    }

    fn require(&self, step: CheckoutStep) -> Result<(), CommerceError> {
        let missing = self.missing_for_step(step);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::CheckoutIncomplete(missing.join(", ")))
        }
    }

    fn expect_step(&self, expected: CheckoutStep, to: CheckoutStep) -> Result<(), CommerceError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(self.invalid(to))
        }
    }

    fn invalid(&self, to: CheckoutStep) -> CommerceError {
        CommerceError::InvalidCheckoutTransition {
            from: self.step.as_str().to_string(),
            to: to.as_str().to_string(),
        }
    }

    fn move_to(&mut self, next: CheckoutStep) {
        if !self.completed_steps.contains(&self.step) {
            self.completed_steps.push(self.step);
        }
        self.step = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> CardDetails {
        CardDetails::new("4242 4242 4242 4242", "Ada Lovelace", "12/28", "123")
    }

    fn at_payment() -> CheckoutFlow {
        let mut flow = CheckoutFlow::new(true);
        flow.set_shipping(ShippingDetails::new("Ada", "1 Analytical Way"))
            .unwrap();
        flow.advance().unwrap();
        flow
    }

    #[test]
    fn test_checkout_creation() {
        assert_eq!(CheckoutFlow::new(false).step(), CheckoutStep::SignIn);
        assert_eq!(CheckoutFlow::new(true).step(), CheckoutStep::Shipping);
    }

    #[test]
    fn test_sign_in_gate() {
        let mut flow = CheckoutFlow::new(false);
        assert!(flow.advance().is_err());
        assert_eq!(flow.signed_in().unwrap(), CheckoutStep::Shipping);
        assert_eq!(flow.completed_steps(), &[CheckoutStep::SignIn]);
        // Only once.
        assert!(flow.signed_in().is_err());
    }

    #[test]
    fn test_shipping_required_before_payment() {
        let mut flow = CheckoutFlow::new(true);
        assert!(matches!(
            flow.advance(),
            Err(CommerceError::CheckoutIncomplete(_))
        ));
        assert!(matches!(
            flow.set_shipping(ShippingDetails::new("Ada", "")),
            Err(CommerceError::CheckoutIncomplete(m)) if m == "address"
        ));
        flow.set_shipping(ShippingDetails::new("Ada", "1 Analytical Way"))
            .unwrap();
        assert_eq!(flow.advance().unwrap(), CheckoutStep::Payment);
    }

    #[test]
    fn test_payment_only_on_payment_step() {
        let mut flow = CheckoutFlow::new(true);
        assert!(flow.set_payment(card()).is_err());

        let mut flow = at_payment();
        assert!(matches!(
            flow.set_payment(CardDetails { cvv: "1".into(), ..card() }),
            Err(CommerceError::InvalidCard(_))
        ));
        assert!(flow.payment().is_none());
        flow.set_payment(card()).unwrap();
        assert!(flow.can_advance_to(CheckoutStep::Processing));
    }

    #[test]
    fn test_processing_requires_card() {
        let mut flow = at_payment();
        assert!(matches!(
            flow.begin_processing(),
            Err(CommerceError::CheckoutIncomplete(_))
        ));
        assert_eq!(flow.step(), CheckoutStep::Payment);
    }

    #[test]
    fn test_single_submission_in_flight() {
        let mut flow = at_payment();
        flow.set_payment(card()).unwrap();
        flow.begin_processing().unwrap();
        assert_eq!(flow.step(), CheckoutStep::Processing);
        assert_eq!(
            flow.begin_processing().unwrap_err(),
            CommerceError::SubmissionInFlight
        );
    }

    #[test]
    fn test_abort_returns_to_payment() {
        let mut flow = at_payment();
        flow.set_payment(card()).unwrap();
        flow.begin_processing().unwrap();
        flow.abort_processing();
        assert_eq!(flow.step(), CheckoutStep::Payment);
        assert!(flow.payment().is_some());
        // Retry is allowed.
        assert!(flow.begin_processing().is_ok());
    }

    #[test]
    fn test_complete() {
        let mut flow = at_payment();
        flow.set_payment(card()).unwrap();
        assert!(flow.complete().is_err());
        flow.begin_processing().unwrap();
        flow.complete().unwrap();
        assert!(flow.is_complete());
        assert!(flow.payment().is_none());
        assert!(flow.go_back().is_err());
    }

    #[test]
    fn test_go_back() {
        let mut flow = at_payment();
        assert_eq!(flow.go_back().unwrap(), CheckoutStep::Shipping);
        assert!(flow.go_back().is_err());
        // Shipping details survive the round trip.
        assert_eq!(flow.advance().unwrap(), CheckoutStep::Payment);
    }

    #[test]
    fn test_equal_after_same_transitions() {
        let mut a = at_payment();
        let mut b = a.clone();
        a.set_payment(card()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        b.set_payment(card()).unwrap();
        assert_eq!(a, b);

        a.begin_processing().unwrap();
        a.abort_processing();
        b.begin_processing().unwrap();
        b.abort_processing();
        assert_eq!(a, b);
    }
}
