//! Checkout wizard.
//!
//! Drives a [`CheckoutFlow`] against a [`Storefront`]: sign-in gate,
//! shipping from the profile, card entry, then a single payment
//! submission that turns the cart into an order.

use moments_commerce::checkout::{CardDetails, CheckoutFlow, CheckoutStep, ShippingDetails};
use moments_commerce::order::Order;
use moments_commerce::CommerceError;

use crate::context::Storefront;
use crate::CheckoutError;

/// One checkout attempt.
#[derive(Debug)]
pub struct CheckoutWizard {
    flow: CheckoutFlow,
    order: Option<Order>,
}

impl CheckoutWizard {
    /// Start checkout for the current cart.
    ///
    /// Signed-out shoppers start on the sign-in step.
    pub fn start(storefront: &Storefront) -> Result<Self, CheckoutError> {
        if storefront.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let signed_in = storefront.auth().is_authenticated();
        tracing::debug!(signed_in, items = storefront.cart().total_items(), "checkout started");
        Ok(Self {
            flow: CheckoutFlow::new(signed_in),
            order: None,
        })
    }

    pub fn step(&self) -> CheckoutStep {
        self.flow.step()
    }

    pub fn flow(&self) -> &CheckoutFlow {
        &self.flow
    }

    pub fn shipping(&self) -> Option<&ShippingDetails> {
        self.flow.shipping()
    }

    /// The order placed by this checkout, once complete.
    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    /// Leave the sign-in step after the shopper has signed in.
    pub fn continue_after_sign_in(
        &mut self,
        storefront: &Storefront,
    ) -> Result<CheckoutStep, CheckoutError> {
        if !storefront.auth().is_authenticated() {
            return Err(CheckoutError::NotAuthenticated);
        }
        Ok(self.flow.signed_in()?)
    }

    /// Take shipping details from the profile and move on to payment.
    pub fn confirm_shipping(
        &mut self,
        storefront: &Storefront,
    ) -> Result<CheckoutStep, CheckoutError> {
        let user = storefront.user().ok_or(CheckoutError::NotAuthenticated)?;
        let details = user.shipping_details().ok_or_else(|| {
            let missing = ShippingDetails::new(&user.name, &user.address).missing_fields();
            CheckoutError::ProfileIncomplete(missing.join(", "))
        })?;
        self.flow.set_shipping(details)?;
        Ok(self.flow.advance()?)
    }

    /// Record card details after a format check.
    pub fn enter_payment(&mut self, card: CardDetails) -> Result<(), CheckoutError> {
        Ok(self.flow.set_payment(card)?)
    }

    /// Return from payment to shipping.
    pub fn back(&mut self) -> Result<CheckoutStep, CheckoutError> {
        Ok(self.flow.go_back()?)
    }

    /// Abandon checkout, including any unfinished sign-in.
    pub fn cancel(self, storefront: &mut Storefront) {
        tracing::debug!(step = self.flow.step().as_str(), "checkout cancelled");
        storefront.cancel_sign_in();
    }

    /// Charge the card and place the order.
    ///
    /// A declined or timed-out charge leaves the cart untouched and the
    /// wizard back on the payment step. Dropping the returned future
    /// before it completes does the same.
    pub async fn submit_payment(
        &mut self,
        storefront: &mut Storefront,
    ) -> Result<Order, CheckoutError> {
        if storefront.cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        if !storefront.auth().is_authenticated() {
            return Err(CheckoutError::NotAuthenticated);
        }
        let revision = storefront.cart().revision();
        if storefront.last_ordered_revision() == Some(revision) {
            return Err(CommerceError::DuplicateSubmission(revision).into());
        }

        let card = self.flow.begin_processing()?.clone();
        let amount = storefront.cart().total_price();
        let processor = storefront.payment_processor();
        let timeout = storefront.config().payment_timeout();
        let guard = ProcessingGuard::new(&mut self.flow);

        tracing::info!(revision, amount = %amount, last4 = %card.last4(), "submitting payment");
        let authorization = match tokio::time::timeout(timeout, processor.charge(&card, amount)).await
        {
            Ok(Ok(authorization)) => authorization,
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "payment failed");
                return Err(err.into());
            }
            Err(_) => {
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "payment timed out");
                return Err(CheckoutError::PaymentTimeout);
            }
        };

        let order = storefront.place_order(revision, Some(authorization.id))?;
        guard.disarm();
        self.flow.complete()?;
        self.order = Some(order.clone());
        Ok(order)
    }
}

/// Puts the flow back on the payment step unless disarmed.
struct ProcessingGuard<'a> {
    flow: &'a mut CheckoutFlow,
    armed: bool,
}

impl<'a> ProcessingGuard<'a> {
    fn new(flow: &'a mut CheckoutFlow) -> Self {
        Self { flow, armed: true }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.flow.abort_processing();
            tracing::debug!("payment not completed; back on the payment step");
        }
    }
}
