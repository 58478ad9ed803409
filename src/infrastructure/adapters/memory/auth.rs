use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use tracing::debug;

use crate::domain::{AuthResponse, DomainError, LoginRequest, RegisterRequest, SessionUser};
use crate::ports::AuthProvider;

struct Account {
    user: SessionUser,
    password: String,
}

/// Accounts and issued tokens held in process memory.
#[derive(Default)]
pub struct MemoryAuthProvider {
    accounts: RwLock<Vec<Account>>,
    /// token -> account email
    sessions: RwLock<HashMap<String, String>>,
    next_token: AtomicU64,
}

impl MemoryAuthProvider {
    pub fn with_account(name: &str, email: &str, password: &str) -> Self {
        let provider = Self::default();
        provider.add_account(name, email, password);
        provider
    }

    pub fn add_account(&self, name: &str, email: &str, password: &str) -> SessionUser {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        let user = SessionUser {
            id: Some((accounts.len() + 1).to_string()),
            name: name.to_string(),
            email: email.to_string(),
            role: Some("admin".to_string()),
            email_verified_at: Some(chrono::Utc::now().to_rfc3339()),
            created_at: None,
            updated_at: None,
        };
        accounts.push(Account {
            user: user.clone(),
            password: password.to_string(),
        });
        user
    }

    fn issue(&self, user: SessionUser) -> AuthResponse {
        let token = format!("memory-{}", self.next_token.fetch_add(1, Ordering::SeqCst) + 1);
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token.clone(), user.email.clone());
        debug!(email = %user.email, "Issued in-memory token");
        AuthResponse {
            token,
            user: Some(user),
        }
    }
}

fn unauthenticated() -> DomainError {
    DomainError::Unauthorized("Unauthenticated.".to_string())
}

#[async_trait]
impl AuthProvider for MemoryAuthProvider {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, DomainError> {
        let user = self
            .accounts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|a| a.user.email == request.email && a.password == request.password)
            .map(|a| a.user.clone())
            .ok_or_else(|| DomainError::Unauthorized("Invalid credentials".to_string()))?;
        Ok(self.issue(user))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, DomainError> {
        let taken = self
            .accounts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(|a| a.user.email == request.email);
        if taken {
            return Err(DomainError::Http {
                status: 422,
                message: "The email has already been taken.".to_string(),
            });
        }
        let user = self.add_account(&request.name, &request.email, &request.password);
        Ok(self.issue(user))
    }

    async fn logout(&self, token: &str) -> Result<(), DomainError> {
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(token)
            .map(|_| ())
            .ok_or_else(unauthenticated)
    }

    async fn current_user(&self, token: &str) -> Result<SessionUser, DomainError> {
        let email = self
            .sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .cloned()
            .ok_or_else(unauthenticated)?;
        self.accounts
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|a| a.user.email == email)
            .map(|a| a.user.clone())
            .ok_or_else(unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_lifecycle() {
        let provider = MemoryAuthProvider::with_account("Admin", "admin@pne.test", "password123");
        let response = provider
            .login(&LoginRequest::new("admin@pne.test", "password123"))
            .await
            .unwrap();
        assert_eq!(
            provider.current_user(&response.token).await.unwrap().name,
            "Admin"
        );

        provider.logout(&response.token).await.unwrap();
        assert!(provider
            .current_user(&response.token)
            .await
            .unwrap_err()
            .is_auth_rejection());
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let provider = MemoryAuthProvider::with_account("Admin", "admin@pne.test", "password123");
        let request = RegisterRequest {
            name: "Other".into(),
            email: "admin@pne.test".into(),
            password: "secret123".into(),
            password_confirmation: "secret123".into(),
        };
        assert!(matches!(
            provider.register(&request).await,
            Err(DomainError::Http { status: 422, .. })
        ));
    }
}
