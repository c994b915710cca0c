//! Client-side authentication core.
//!
//! Decides, for a user entering a protected area, whether to
//! re-authenticate through the device's biometrics or ask for fresh
//! credentials, drives the chosen path to completion, and keeps the
//! resulting session token and credentials in device-local secure
//! storage. Hosts observe flow status, pending alerts, and the
//! authenticated/unauthenticated session state; they send events
//! (manual submission, save-prompt decisions, logout) back in.
//!
//! The collaborators are capability traits ([`store::SecureStore`],
//! [`biometric::BiometricGate`], [`api::AuthClient`]), so platforms plug
//! in their own implementations at composition time:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use authgate_core::api::HttpAuthClient;
//! use authgate_core::biometric::NoBiometrics;
//! use authgate_core::config::Config;
//! use authgate_core::flow::AuthFlowController;
//! use authgate_core::session::SessionRegistry;
//! use authgate_core::store::{KeychainStore, SecureStore};
//!
//! # async fn wire() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let store: Arc<dyn SecureStore> =
//!     Arc::new(KeychainStore::new(config.keychain_service.clone()));
//! let session = Arc::new(SessionRegistry::new(Arc::clone(&store)));
//! session.restore();
//!
//! let client = HttpAuthClient::new(config.api_base_url.clone())?;
//! let mut flow = AuthFlowController::new(store, NoBiometrics, client, Arc::clone(&session));
//! flow.start().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod biometric;
pub mod config;
pub mod flow;
pub mod models;
pub mod observers;
pub mod session;
pub mod store;

pub use api::{AuthClient, AuthError, HttpAuthClient};
pub use biometric::{BiometricError, BiometricGate, BiometricKind, NoBiometrics};
pub use config::Config;
pub use flow::{AuthFlowController, SaveDecision};
pub use models::{
    AlertInfo, AlertKind, AuthMethod, AuthenticationStatus, Credentials, SessionToken,
};
pub use observers::{ObserverId, ObserverRegistry};
pub use session::SessionRegistry;
pub use store::{KeychainStore, MemoryStore, SecureStore, StoreError, StoreKey};
