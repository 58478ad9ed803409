//! Authentication gate.
//!
//! The only component that reads or writes the durable session token. Stores
//! reach it through [`CredentialSource`]; the binary and navigation code use
//! the session operations directly.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{
    AuthResponse, DomainError, LoginRequest, Navigation, RegisterRequest, Route, SessionState,
    SessionUser,
};
use crate::ports::{AuthProvider, CredentialSource, CredentialStore};

pub struct AuthGate {
    provider: Arc<dyn AuthProvider>,
    credentials: Arc<dyn CredentialStore>,
    session: RwLock<SessionState>,
    init_lock: Mutex<()>,
}

impl AuthGate {
    pub fn new(provider: Arc<dyn AuthProvider>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            provider,
            credentials,
            session: RwLock::new(SessionState::default()),
            init_lock: Mutex::new(()),
        }
    }

    pub fn session(&self) -> SessionState {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated
    }

    pub fn is_initialized(&self) -> bool {
        self.read().is_initialized
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.read().user.clone()
    }

    pub async fn login(&self, request: LoginRequest) -> Result<SessionUser, DomainError> {
        request.validate()?;
        let result = self.provider.login(&request).await;
        self.establish("login", result)
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<SessionUser, DomainError> {
        request.validate()?;
        let result = self.provider.register(&request).await;
        self.establish("registration", result)
    }

    /// Ends the session. Without a stored token this does nothing.
    pub async fn logout(&self) -> Result<(), DomainError> {
        let Some(token) = self.credentials.load()? else {
            return Ok(());
        };

        match self.provider.logout(&token).await {
            Ok(()) => {}
            // The server already forgot the token; finish locally.
            Err(e) if e.is_auth_rejection() => debug!(error = %e, "Token already revoked"),
            Err(e) => {
                warn!(error = %e, "Logout failed");
                self.write().error = Some(format!("Logout failed: {}", e));
                return Err(e);
            }
        }

        self.credentials.clear()?;
        let mut session = self.write();
        session.user = None;
        session.is_authenticated = false;
        session.error = None;
        info!("Logged out");
        Ok(())
    }

    /// Restores the session from the stored token.
    ///
    /// A token the server refuses is discarded. The session counts as
    /// initialized afterwards whatever the outcome.
    pub async fn restore(&self) -> Result<Option<SessionUser>, DomainError> {
        let result = self.restore_inner().await;
        self.write().is_initialized = true;
        result
    }

    async fn restore_inner(&self) -> Result<Option<SessionUser>, DomainError> {
        let Some(token) = self.credentials.load()? else {
            debug!("No stored session");
            return Ok(None);
        };

        match self.provider.current_user(&token).await {
            Ok(user) => {
                info!(email = %user.email, "Session restored");
                let mut session = self.write();
                session.user = Some(user.clone());
                session.is_authenticated = true;
                Ok(Some(user))
            }
            Err(e @ DomainError::Transport(_)) => {
                warn!(error = %e, "Could not reach the backend to restore the session");
                self.write().error = Some(e.to_string());
                Err(e)
            }
            Err(e) => {
                info!(error = %e, "Stored session is no longer valid");
                self.discard();
                Ok(None)
            }
        }
    }

    /// Restores the session once; later calls return immediately.
    pub async fn initialize(&self) -> Result<(), DomainError> {
        let _lock = self.init_lock.lock().await;
        if self.is_initialized() {
            return Ok(());
        }
        self.restore().await.map(|_| ())
    }

    /// Decides whether navigation to `route` may proceed.
    pub async fn guard(&self, route: &Route) -> Result<Navigation, DomainError> {
        self.initialize().await?;
        let decision = Navigation::decide(route, self.is_authenticated());
        if decision != Navigation::Proceed {
            debug!(path = %route.path, ?decision, "Navigation redirected");
        }
        Ok(decision)
    }

    fn establish(
        &self,
        attempt: &str,
        result: Result<AuthResponse, DomainError>,
    ) -> Result<SessionUser, DomainError> {
        let response = match result {
            Ok(response) if !response.token.is_empty() => response,
            Ok(_) => return Err(self.attempt_failed(attempt, DomainError::Unauthorized("no token returned".into()))),
            Err(e) => return Err(self.attempt_failed(attempt, e)),
        };

        self.credentials.save(&response.token)?;
        let user = response.user.clone();
        let mut session = self.write();
        session.user = user.clone();
        session.is_authenticated = true;
        session.is_initialized = true;
        session.error = None;
        info!(attempt, email = user.as_ref().map(|u| u.email.as_str()).unwrap_or(""), "Authenticated");

        user.ok_or_else(|| DomainError::Decode("authentication response carried no user".into()))
    }

    fn attempt_failed(&self, attempt: &str, error: DomainError) -> DomainError {
        let error = match error {
            DomainError::Http { message, .. } => DomainError::Unauthorized(message),
            other => other,
        };
        warn!(attempt, error = %error, "Authentication failed");
        self.write().error = Some(format!("{} failed: {}", capitalize(attempt), error));
        error
    }

    /// Drops the token and the in-memory session.
    fn discard(&self) {
        if let Err(e) = self.credentials.clear() {
            warn!(error = %e, "Failed to clear stored token");
        }
        let mut session = self.write();
        session.user = None;
        session.is_authenticated = false;
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.session.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.session.write().unwrap_or_else(|e| e.into_inner())
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl CredentialSource for AuthGate {
    fn bearer(&self) -> Result<String, DomainError> {
        match self.credentials.load()? {
            Some(token) if !token.trim().is_empty() => Ok(token),
            _ => Err(DomainError::MissingCredential),
        }
    }

    fn reject(&self) {
        warn!("Backend rejected the session token");
        self.discard();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::memory::MemoryAuthProvider;
    use crate::infrastructure::storage::MemoryCredentialStore;

    fn gate() -> (AuthGate, Arc<MemoryCredentialStore>) {
        let credentials = Arc::new(MemoryCredentialStore::default());
        let provider = Arc::new(MemoryAuthProvider::with_account(
            "Admin",
            "admin@pne.test",
            "password123",
        ));
        (AuthGate::new(provider, credentials.clone()), credentials)
    }

    #[tokio::test]
    async fn test_login_persists_token() {
        let (gate, credentials) = gate();
        assert!(matches!(gate.bearer(), Err(DomainError::MissingCredential)));

        let user = gate
            .login(LoginRequest::new("admin@pne.test", "password123"))
            .await
            .unwrap();
        assert_eq!(user.email, "admin@pne.test");
        assert!(gate.is_authenticated());
        assert_eq!(gate.bearer().unwrap(), credentials.load().unwrap().unwrap());
    }

    #[tokio::test]
    async fn test_bad_login_records_error() {
        let (gate, credentials) = gate();
        let err = gate
            .login(LoginRequest::new("admin@pne.test", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
        assert!(gate.session().error.is_some());
        assert!(credentials.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reject_clears_session() {
        let (gate, credentials) = gate();
        gate.login(LoginRequest::new("admin@pne.test", "password123"))
            .await
            .unwrap();

        gate.reject();
        assert!(!gate.is_authenticated());
        assert!(credentials.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_restore_discards_unknown_token() {
        let (gate, credentials) = gate();
        credentials.save("stale").unwrap();

        assert_eq!(gate.restore().await.unwrap(), None);
        assert!(gate.is_initialized());
        assert!(credentials.load().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_guard_initializes_and_redirects() {
        let (gate, _) = gate();
        let decision = gate.guard(&Route::protected("/contacts")).await.unwrap();
        assert!(gate.is_initialized());
        assert_eq!(
            decision,
            Navigation::RedirectToLogin {
                redirect: "/contacts".into()
            }
        );

        gate.login(LoginRequest::new("admin@pne.test", "password123"))
            .await
            .unwrap();
        assert_eq!(
            gate.guard(&Route::guest("/login")).await.unwrap(),
            Navigation::RedirectToDashboard
        );
    }

    #[tokio::test]
    async fn test_logout_without_token_is_noop() {
        let (gate, _) = gate();
        gate.logout().await.unwrap();

        gate.login(LoginRequest::new("admin@pne.test", "password123"))
            .await
            .unwrap();
        gate.logout().await.unwrap();
        assert!(!gate.is_authenticated());
        assert!(matches!(gate.bearer(), Err(DomainError::MissingCredential)));
    }
}
