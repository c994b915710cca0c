//! Biometric capability gate.
//!
//! The flow controller never talks to platform biometric hardware
//! directly; it goes through [`BiometricGate`]. Hosts plug in a platform
//! implementation at composition time, [`NoBiometrics`] is the default for
//! targets without the hardware.

use thiserror::Error;

/// Biometric hardware capability reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiometricKind {
    Fingerprint,
    Face,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BiometricError {
    /// No capability on this device, or the capability is currently
    /// disabled (no enrolled biometrics, locked out by the OS).
    #[error("biometric authentication is unavailable")]
    Unavailable,

    /// The prompt ran and the user did not pass it (mismatch, cancel,
    /// OS timeout).
    #[error("biometric authentication failed")]
    ChallengeFailed,

    /// The platform layer itself failed.
    #[error("biometric hardware error: {0}")]
    Hardware(String),
}

#[allow(async_fn_in_trait)]
pub trait BiometricGate {
    /// Pure capability probe; never prompts the user. Capability can change
    /// between calls (enrollment, OS lockout), so callers re-check before
    /// prompting.
    fn check_availability(&self) -> Result<BiometricKind, BiometricError>;

    /// Triggers exactly one OS-level prompt and suspends until the user
    /// responds or the OS gives up. Only meaningful after
    /// [`check_availability`](Self::check_availability) reported a
    /// capability; without one the challenge resolves to
    /// [`BiometricError::Unavailable`].
    async fn challenge(&self) -> Result<(), BiometricError>;
}

/// Gate for hosts without biometric hardware: reports no capability and
/// refuses every challenge.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoBiometrics;

impl BiometricGate for NoBiometrics {
    fn check_availability(&self) -> Result<BiometricKind, BiometricError> {
        Err(BiometricError::Unavailable)
    }

    async fn challenge(&self) -> Result<(), BiometricError> {
        Err(BiometricError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_no_biometrics_reports_unavailable() {
        let gate = NoBiometrics;
        assert_eq!(gate.check_availability(), Err(BiometricError::Unavailable));
        assert_eq!(gate.challenge().await, Err(BiometricError::Unavailable));
    }
}
