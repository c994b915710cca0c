//! Core data types shared across the authentication flow.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A username/password pair for a single authentication attempt.
///
/// Transient by contract: created from user input (or read back from the
/// secure store on the biometric path), consumed once, and wiped on drop.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Both fields non-empty. Validation gate for manual submission.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

// The password must never end up in logs, so Debug is hand-written.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque session token issued by the remote authority.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken(<redacted>)")
    }
}

/// Which path produced an authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Password,
    Biometric,
}

/// Current stage of the authentication flow. Exactly one value is active
/// at a time; `DeterminingMethod` doubles as the idle state between
/// attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationStatus {
    DeterminingMethod,
    ValidatingInput,
    AwaitingBiometric,
    Authenticating,
    Authorized(AuthMethod),
    SavingCredentials,
    PersistingToken,
}

/// How an alert should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Informational, dismissed with a single acknowledgement.
    Simple,
    /// Carries a user decision (e.g. save credentials yes/no).
    WithActions,
}

/// A pending user-facing notice or decision, owned by the flow controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertInfo {
    pub title: String,
    pub message: String,
    pub kind: AlertKind,
}

impl AlertInfo {
    pub fn simple(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: AlertKind::Simple,
        }
    }

    pub fn with_actions(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind: AlertKind::WithActions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_completeness() {
        assert!(Credentials::new("tesonet", "partyanimal").is_complete());
        assert!(!Credentials::new("", "partyanimal").is_complete());
        assert!(!Credentials::new("tesonet", "").is_complete());
        assert!(!Credentials::default().is_complete());
    }

    #[test]
    fn test_password_never_in_debug_output() {
        let creds = Credentials::new("tesonet", "partyanimal");
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("tesonet"));
        assert!(!rendered.contains("partyanimal"));

        let token = SessionToken::new("abc");
        assert!(!format!("{:?}", token).contains("abc"));
    }

    #[test]
    fn test_alert_constructors() {
        let simple = AlertInfo::simple("Error", "something broke");
        assert_eq!(simple.kind, AlertKind::Simple);

        let prompt = AlertInfo::with_actions("Save Credentials", "keep these?");
        assert_eq!(prompt.kind, AlertKind::WithActions);
    }
}
