//! One-time code delivery.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::AuthError;

/// Where a one-time code is sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OtpDestination {
    Phone(String),
    Email(String),
}

impl OtpDestination {
    /// The raw phone number or email address.
    pub fn address(&self) -> &str {
        match self {
            OtpDestination::Phone(v) | OtpDestination::Email(v) => v,
        }
    }

    /// Destination with everything but the tail hidden, for logs.
    pub fn masked(&self) -> String {
        match self {
            OtpDestination::Phone(phone) => {
                let chars: Vec<char> = phone.chars().collect();
                let start = chars.len().saturating_sub(4);
                let tail: String = chars[start..].iter().collect();
                format!("***{}", tail)
            }
            OtpDestination::Email(email) => match email.split_once('@') {
                Some((_, domain)) => format!("***@{}", domain),
                None => "***".to_string(),
            },
        }
    }
}

impl fmt::Display for OtpDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

/// Sends and checks one-time codes.
#[async_trait]
pub trait OtpProvider: Send + Sync {
    /// Send a fresh code to `destination`.
    async fn send(&self, destination: &OtpDestination) -> Result<(), AuthError>;

    /// Check `code` against the last code sent to `destination`.
    async fn verify(&self, destination: &OtpDestination, code: &str) -> Result<bool, AuthError>;
}

/// Demo provider: pretends to send after a delay and accepts one fixed code.
#[derive(Debug, Clone)]
pub struct DemoOtpProvider {
    code: String,
    delay: Duration,
}

impl DemoOtpProvider {
    /// The code every demo destination accepts.
    pub const DEMO_CODE: &'static str = "123456";
    /// How long a simulated send takes.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);

    pub fn new(code: impl Into<String>, delay: Duration) -> Self {
        Self {
            code: code.into(),
            delay,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl Default for DemoOtpProvider {
    fn default() -> Self {
        Self::new(Self::DEMO_CODE, Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl OtpProvider for DemoOtpProvider {
    async fn send(&self, destination: &OtpDestination) -> Result<(), AuthError> {
        tokio::time::sleep(self.delay).await;
        tracing::info!(destination = %destination, "demo one-time code sent");
        Ok(())
    }

    async fn verify(&self, _destination: &OtpDestination, code: &str) -> Result<bool, AuthError> {
        Ok(code == self.code)
    }
}

/// Whether `code` has the six-digit shape of a one-time code.
pub fn is_well_formed_code(code: &str) -> bool {
    code.len() == 6 && code.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masking() {
        assert_eq!(OtpDestination::Phone("+15551234567".into()).masked(), "***4567");
        assert_eq!(OtpDestination::Phone("12".into()).masked(), "***12");
        assert_eq!(
            OtpDestination::Email("ada@example.com".into()).masked(),
            "***@example.com"
        );
    }

    #[test]
    fn test_code_shape() {
        assert!(is_well_formed_code("123456"));
        assert!(!is_well_formed_code("12345"));
        assert!(!is_well_formed_code("12345a"));
        assert!(!is_well_formed_code("1234567"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_provider() {
        let provider = DemoOtpProvider::default();
        let phone = OtpDestination::Phone("+15551234567".into());

        let started = tokio::time::Instant::now();
        provider.send(&phone).await.unwrap();
        assert!(started.elapsed() >= DemoOtpProvider::DEFAULT_DELAY);

        assert!(provider.verify(&phone, "123456").await.unwrap());
        assert!(!provider.verify(&phone, "000000").await.unwrap());
    }
}
