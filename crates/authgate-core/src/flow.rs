//! The authentication flow state machine.
//!
//! `AuthFlowController` sequences a login attempt end to end: decide
//! whether the stored-credential biometric path applies, or validate and
//! exchange manually entered credentials; on success, decide whether to
//! offer saving the pair for future biometric logins; finally hand the
//! token to the [`SessionRegistry`].
//!
//! The controller owns the flow status, the pending alert, and the
//! transient credentials of the attempt in progress. It processes one
//! attempt at a time; event methods take `&mut self`, so overlapping
//! attempts cannot be issued against the same controller.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::api::AuthClient;
use crate::biometric::BiometricGate;
use crate::models::{AlertInfo, AuthMethod, AuthenticationStatus, Credentials, SessionToken};
use crate::observers::{ObserverId, ObserverRegistry};
use crate::session::SessionRegistry;
use crate::store::{SecureStore, StoreError, StoreKey};

// ============================================================================
// User-facing alert text
// ============================================================================

const VERIFICATION_FAILED_TITLE: &str = "Verification Failed";
const INCORRECT_CREDENTIALS_MESSAGE: &str = "Your username or password is incorrect.";
const ERROR_TITLE: &str = "Error";
const BIOMETRIC_UNAVAILABLE_MESSAGE: &str = "Biometric authentication is unavailable.";
const BIOMETRIC_FAILED_MESSAGE: &str = "Biometric authentication failed.";
const SAVE_CREDENTIALS_TITLE: &str = "Save Credentials";
const SAVE_CREDENTIALS_MESSAGE: &str = "Enable biometric login for your next sign-in?";
const SAVE_FAILED_MESSAGE: &str = "Failed to save credentials.";

/// Resolution of the save-credentials prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    /// Store the pair so the next login can go through the biometric path.
    Enable,
    /// Persist only the token; the credentials are dropped.
    Decline,
}

// ============================================================================
// Controller
// ============================================================================

/// Drives a single authentication attempt through its stages and publishes
/// every externally visible change (status, alert) to subscribers.
pub struct AuthFlowController<B, A> {
    store: Arc<dyn SecureStore>,
    biometric: B,
    client: A,
    session: Arc<SessionRegistry>,

    status: AuthenticationStatus,
    alert: Option<AlertInfo>,

    // Attempt-scoped state, wiped whenever the attempt settles.
    pending_token: Option<SessionToken>,
    pending_credentials: Option<Credentials>,

    status_observers: ObserverRegistry<AuthenticationStatus>,
    alert_observers: ObserverRegistry<Option<AlertInfo>>,
}

impl<B, A> AuthFlowController<B, A>
where
    B: BiometricGate,
    A: AuthClient,
{
    pub fn new(
        store: Arc<dyn SecureStore>,
        biometric: B,
        client: A,
        session: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            store,
            biometric,
            client,
            session,
            status: AuthenticationStatus::DeterminingMethod,
            alert: None,
            pending_token: None,
            pending_credentials: None,
            status_observers: ObserverRegistry::new(),
            alert_observers: ObserverRegistry::new(),
        }
    }

    // =========================================================================
    // Observation
    // =========================================================================

    pub fn status(&self) -> AuthenticationStatus {
        self.status
    }

    pub fn alert(&self) -> Option<&AlertInfo> {
        self.alert.as_ref()
    }

    pub fn on_status(
        &self,
        callback: impl Fn(&AuthenticationStatus) + Send + 'static,
    ) -> ObserverId {
        self.status_observers.subscribe(callback)
    }

    pub fn on_alert(
        &self,
        callback: impl Fn(&Option<AlertInfo>) + Send + 'static,
    ) -> ObserverId {
        self.alert_observers.subscribe(callback)
    }

    pub fn unsubscribe_status(&self, id: ObserverId) {
        self.status_observers.unsubscribe(id);
    }

    pub fn unsubscribe_alert(&self, id: ObserverId) {
        self.alert_observers.unsubscribe(id);
    }

    // =========================================================================
    // Flow events
    // =========================================================================

    /// Entry point for a fresh flow. When a stored credential pair,
    /// biometric capability, and the absence of a current session line up,
    /// the biometric path runs to completion without further events.
    /// Otherwise the controller stays idle awaiting a manual submission.
    pub async fn start(&mut self) {
        self.set_alert(None);
        self.set_status(AuthenticationStatus::DeterminingMethod);

        let has_stored_pair =
            self.store.contains(StoreKey::Username) && self.store.contains(StoreKey::Password);
        let capability = self.biometric.check_availability();
        let session_active = self.session.is_authenticated();

        if has_stored_pair && capability.is_ok() && !session_active {
            self.run_biometric_path().await;
        } else {
            debug!(
                stored_credentials = has_stored_pair,
                biometric_available = capability.is_ok(),
                session_active,
                "awaiting manual credential submission"
            );
        }
    }

    /// Manual credential submission from the host.
    pub async fn submit_manual(&mut self, username: &str, password: &str) {
        self.set_alert(None);
        self.set_status(AuthenticationStatus::ValidatingInput);

        let credentials = Credentials::new(username, password);
        if !credentials.is_complete() {
            self.fail_attempt(AlertInfo::simple(
                VERIFICATION_FAILED_TITLE,
                INCORRECT_CREDENTIALS_MESSAGE,
            ));
            return;
        }

        self.authenticate(credentials, AuthMethod::Password).await;
    }

    /// Resolution of the save-credentials prompt. Ignored unless the
    /// controller is actually waiting on one.
    pub fn resolve_save_prompt(&mut self, decision: SaveDecision) {
        let awaiting_decision = self.pending_token.is_some()
            && self.status == AuthenticationStatus::Authorized(AuthMethod::Password);
        if !awaiting_decision {
            debug!(?decision, "no save prompt pending, ignoring decision");
            return;
        }

        match decision {
            SaveDecision::Decline => {
                self.pending_credentials = None;
                self.persist_token();
            }
            SaveDecision::Enable => {
                self.set_status(AuthenticationStatus::SavingCredentials);
                let Some(credentials) = self.pending_credentials.take() else {
                    warn!("save prompt resolved without parked credentials");
                    self.fail_attempt(AlertInfo::simple(ERROR_TITLE, SAVE_FAILED_MESSAGE));
                    return;
                };
                match self.save_credentials(&credentials) {
                    Ok(()) => self.persist_token(),
                    Err(e) => {
                        warn!(error = %e, "could not save credentials");
                        // The token is deliberately not persisted on this
                        // branch; the attempt has to be retried.
                        self.fail_attempt(AlertInfo::simple(ERROR_TITLE, SAVE_FAILED_MESSAGE));
                    }
                }
            }
        }
    }

    /// Ends the current session and resets the machine for the next
    /// attempt.
    pub fn logout(&mut self) {
        self.pending_token = None;
        self.pending_credentials = None;
        self.session.clear();
        self.set_alert(None);
        self.set_status(AuthenticationStatus::DeterminingMethod);
    }

    // =========================================================================
    // Biometric path
    // =========================================================================

    async fn run_biometric_path(&mut self) {
        self.set_status(AuthenticationStatus::AwaitingBiometric);

        // Capability can lapse between foreground events; re-check right
        // before prompting.
        if let Err(reason) = self.biometric.check_availability() {
            warn!(reason = %reason, "biometric capability lost before challenge");
            self.fail_attempt(AlertInfo::simple(ERROR_TITLE, BIOMETRIC_UNAVAILABLE_MESSAGE));
            return;
        }

        if let Err(reason) = self.biometric.challenge().await {
            warn!(reason = %reason, "biometric challenge not passed");
            self.fail_attempt(AlertInfo::simple(ERROR_TITLE, BIOMETRIC_FAILED_MESSAGE));
            return;
        }

        let credentials = match self.read_stored_credentials() {
            Ok(credentials) => credentials,
            Err(e) => {
                warn!(error = %e, "stored credentials unreadable after challenge");
                self.fail_attempt(AlertInfo::simple(ERROR_TITLE, e.to_string()));
                return;
            }
        };

        self.authenticate(credentials, AuthMethod::Biometric).await;
    }

    fn read_stored_credentials(&self) -> Result<Credentials, StoreError> {
        let username = self.store.retrieve(StoreKey::Username)?;
        let password = self.store.retrieve(StoreKey::Password)?;
        Ok(Credentials::new(username, password))
    }

    // =========================================================================
    // Exchange and post-authorization
    // =========================================================================

    async fn authenticate(&mut self, credentials: Credentials, method: AuthMethod) {
        self.set_status(AuthenticationStatus::Authenticating);

        let token = match self.client.exchange(&credentials).await {
            Ok(token) => token,
            Err(e) => {
                error!(error = %e, "token exchange failed");
                self.fail_attempt(AlertInfo::simple(ERROR_TITLE, e.to_string()));
                return;
            }
        };

        self.pending_token = Some(token);
        self.set_alert(None);
        self.set_status(AuthenticationStatus::Authorized(method));

        match method {
            AuthMethod::Biometric => {
                // This path required stored credentials, nothing to offer.
                drop(credentials);
                self.persist_token();
            }
            AuthMethod::Password => {
                let already_stored = self.store.contains(StoreKey::Username)
                    && self.store.contains(StoreKey::Password);
                if already_stored {
                    drop(credentials);
                    self.persist_token();
                } else {
                    // Park the pair until the user decides; it is wiped as
                    // soon as the attempt settles either way.
                    self.pending_credentials = Some(credentials);
                    self.set_alert(Some(AlertInfo::with_actions(
                        SAVE_CREDENTIALS_TITLE,
                        SAVE_CREDENTIALS_MESSAGE,
                    )));
                }
            }
        }
    }

    /// Stores the credential pair, replacing any existing entries. The two
    /// writes are not transactional in the backing store, so a failed
    /// second write rolls the first one back: the pair never half-exists.
    fn save_credentials(&self, credentials: &Credentials) -> Result<(), StoreError> {
        self.store_overwriting(StoreKey::Username, &credentials.username)?;
        if let Err(e) = self.store_overwriting(StoreKey::Password, &credentials.password) {
            if let Err(rollback) = self.store.erase(StoreKey::Username) {
                warn!(error = %rollback, "username rollback failed after password write error");
            }
            return Err(e);
        }
        Ok(())
    }

    fn store_overwriting(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        match self.store.store(key, value) {
            Err(StoreError::DuplicateEntry(_)) => {
                self.store.erase(key)?;
                self.store.store(key, value)
            }
            result => result,
        }
    }

    fn persist_token(&mut self) {
        self.set_status(AuthenticationStatus::PersistingToken);
        self.set_alert(None);
        self.pending_credentials = None;
        if let Some(token) = self.pending_token.take() {
            self.session.set_token(token);
        }
        self.set_status(AuthenticationStatus::DeterminingMethod);
    }

    /// Abandons the attempt: wipes attempt-scoped state, raises the alert,
    /// and returns the machine to idle.
    fn fail_attempt(&mut self, alert: AlertInfo) {
        self.pending_token = None;
        self.pending_credentials = None;
        self.set_alert(Some(alert));
        self.set_status(AuthenticationStatus::DeterminingMethod);
    }

    fn set_status(&mut self, status: AuthenticationStatus) {
        if self.status != status {
            self.status = status;
            self.status_observers.notify(&status);
        }
    }

    fn set_alert(&mut self, alert: Option<AlertInfo>) {
        if self.alert != alert {
            self.alert = alert;
            self.alert_observers.notify(&self.alert);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
