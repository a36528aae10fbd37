//! Sign-in session.

use std::fmt;
use std::sync::Arc;

use crate::otp::{is_well_formed_code, OtpDestination, OtpProvider};
use crate::user::{ProfileDraft, ProfileStatus, User, UserPatch};
use crate::AuthError;

/// Where the shopper is in the sign-in flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No user and no code outstanding.
    Anonymous,
    /// A code was sent to `phone` and not yet verified.
    OtpRequested { phone: String },
    /// Signed in.
    Authenticated(ProfileStatus),
}

/// The current user plus any outstanding one-time code request.
///
/// Every operation either completes fully or leaves the session as it
/// was, including when an in-progress future is dropped.
pub struct AuthSession {
    provider: Arc<dyn OtpProvider>,
    user: Option<User>,
    pending_phone: Option<String>,
    pending_email: Option<String>,
}

impl AuthSession {
    /// Anonymous session.
    pub fn new(provider: Arc<dyn OtpProvider>) -> Self {
        Self::restore(provider, None)
    }

    /// Session rehydrated from a persisted user record.
    pub fn restore(provider: Arc<dyn OtpProvider>, user: Option<User>) -> Self {
        Self {
            provider,
            user,
            pending_phone: None,
            pending_email: None,
        }
    }

    pub fn state(&self) -> AuthState {
        match (&self.user, &self.pending_phone) {
            (Some(user), _) => AuthState::Authenticated(user.profile_status()),
            (None, Some(phone)) => AuthState::OtpRequested {
                phone: phone.clone(),
            },
            (None, None) => AuthState::Anonymous,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Email address with an outstanding verification code.
    pub fn pending_email(&self) -> Option<&str> {
        self.pending_email.as_deref()
    }

    /// Send a sign-in code to `phone`.
    ///
    /// Requesting again replaces the outstanding request.
    pub async fn request_otp(&mut self, phone: &str) -> Result<(), AuthError> {
        if self.user.is_some() {
            return Err(AuthError::AlreadyAuthenticated);
        }
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(AuthError::Validation("phone number is required".into()));
        }

        let destination = OtpDestination::Phone(phone.to_string());
        self.provider.send(&destination).await?;
        tracing::info!(phone = %destination, "sign-in code requested");
        self.pending_phone = Some(phone.to_string());
        Ok(())
    }

    /// Check the sign-in code and create the user from `draft`.
    ///
    /// A wrong code leaves the request outstanding so the shopper can
    /// retry.
    pub async fn verify_otp(
        &mut self,
        phone: &str,
        code: &str,
        draft: ProfileDraft,
    ) -> Result<&User, AuthError> {
        if self.user.is_some() {
            return Err(AuthError::AlreadyAuthenticated);
        }
        let phone = phone.trim();
        if self.pending_phone.as_deref() != Some(phone) {
            return Err(AuthError::NoPendingOtp(
                OtpDestination::Phone(phone.to_string()).masked(),
            ));
        }
        let code = code.trim();
        if !is_well_formed_code(code) {
            return Err(AuthError::Validation("code must be 6 digits".into()));
        }

        let destination = OtpDestination::Phone(phone.to_string());
        if !self.provider.verify(&destination, code).await? {
            tracing::warn!(phone = %destination, "sign-in code rejected");
            return Err(AuthError::InvalidOtp);
        }

        let user = User::sign_in(phone, draft);
        tracing::info!(user_id = %user.id, "signed in");
        self.pending_phone = None;
        Ok(&*self.user.insert(user))
    }

    /// Fill in name and address, and optionally change the email.
    pub fn complete_profile(
        &mut self,
        name: &str,
        address: &str,
        email: Option<&str>,
    ) -> Result<&User, AuthError> {
        let user = self.user.as_mut().ok_or(AuthError::NotAuthenticated)?;
        let (name, address) = (name.trim(), address.trim());

        let mut missing = Vec::new();
        if name.is_empty() {
            missing.push("name");
        }
        if address.is_empty() {
            missing.push("address");
        }
        if !missing.is_empty() {
            return Err(AuthError::Validation(format!(
                "required: {}",
                missing.join(", ")
            )));
        }
        let email = match email.map(str::trim).filter(|e| !e.is_empty()) {
            Some(e) => Some(validate_email(e)?),
            None => None,
        };

        user.name = name.to_string();
        user.address = address.to_string();
        if let Some(email) = email {
            user.set_email(email);
        }
        tracing::debug!(user_id = %user.id, "profile completed");
        Ok(&*user)
    }

    /// Apply a partial update to the signed-in user.
    pub fn update_user(&mut self, patch: UserPatch) -> Result<&User, AuthError> {
        let user = self.user.as_mut().ok_or(AuthError::NotAuthenticated)?;

        let name = patch.name.map(|n| n.trim().to_string());
        let address = patch.address.map(|a| a.trim().to_string());
        if name.as_deref() == Some("") || address.as_deref() == Some("") {
            return Err(AuthError::Validation(
                "name and address cannot be cleared".into(),
            ));
        }

        if let Some(name) = name {
            user.name = name;
        }
        if let Some(address) = address {
            user.address = address;
        }
        Ok(&*user)
    }

    /// Send a verification code to `email` for the signed-in user.
    pub async fn request_email_otp(&mut self, email: &str) -> Result<(), AuthError> {
        if self.user.is_none() {
            return Err(AuthError::NotAuthenticated);
        }
        let email = validate_email(email.trim())?;

        let destination = OtpDestination::Email(email.clone());
        self.provider.send(&destination).await?;
        tracing::info!(email = %destination, "email code requested");
        self.pending_email = Some(email);
        Ok(())
    }

    /// Check the email code and mark the address verified.
    pub async fn verify_email_otp(&mut self, email: &str, code: &str) -> Result<&User, AuthError> {
        if self.user.is_none() {
            return Err(AuthError::NotAuthenticated);
        }
        let email = email.trim();
        if self.pending_email.as_deref() != Some(email) {
            return Err(AuthError::NoPendingOtp(
                OtpDestination::Email(email.to_string()).masked(),
            ));
        }
        let code = code.trim();
        if !is_well_formed_code(code) {
            return Err(AuthError::Validation("code must be 6 digits".into()));
        }

        let destination = OtpDestination::Email(email.to_string());
        if !self.provider.verify(&destination, code).await? {
            tracing::warn!(email = %destination, "email code rejected");
            return Err(AuthError::InvalidOtp);
        }

        self.pending_email = None;
        let user = self.user.as_mut().ok_or(AuthError::NotAuthenticated)?;
        user.email = Some(email.to_string());
        user.email_verified = true;
        tracing::info!(user_id = %user.id, "email verified");
        Ok(&*user)
    }

    /// Drop any outstanding code request.
    pub fn cancel(&mut self) {
        self.pending_phone = None;
        self.pending_email = None;
    }

    /// Sign out, returning the user that was signed in.
    pub fn logout(&mut self) -> Option<User> {
        self.cancel();
        let user = self.user.take();
        if let Some(user) = &user {
            tracing::info!(user_id = %user.id, "signed out");
        }
        user
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("state", &self.state())
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

fn validate_email(email: &str) -> Result<String, AuthError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_string())
        }
        _ => Err(AuthError::Validation(format!(
            "'{}' is not an email address",
            email
        ))),
    }
}
