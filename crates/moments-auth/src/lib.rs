//! Sign-in for the Moments storefront.
//!
//! Shoppers sign in with a one-time code sent to their phone, then fill
//! in a name and shipping address. An email address can be added and
//! verified the same way. Code delivery sits behind [`OtpProvider`] so
//! the demo provider can be swapped for a real gateway.

mod error;
mod otp;
mod session;
mod user;

pub use error::AuthError;
pub use otp::{is_well_formed_code, DemoOtpProvider, OtpDestination, OtpProvider};
pub use session::{AuthSession, AuthState};
pub use user::{ProfileDraft, ProfileStatus, User, UserPatch};
