//! Checkout module.
//!
//! Contains the checkout flow state machine, shipping details, and the
//! payment capture boundary.

mod flow;
mod payment;
mod shipping;

pub use flow::{CheckoutFlow, CheckoutStep};
pub use payment::{
    CardDetails, PaymentAuthorization, PaymentError, PaymentProcessor, SimulatedPaymentProcessor,
};
pub use shipping::ShippingDetails;
