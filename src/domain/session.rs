use serde::{Deserialize, Serialize};

use crate::domain::{optional_string_or_number, require, DomainError};

/// The signed-in operator as `/api/v1/user` reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Clone, PartialEq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

#[derive(Clone, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), DomainError> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("password", &self.password)?;
        if self.password != self.password_confirmation {
            return Err(DomainError::validation("passwords do not match"));
        }
        Ok(())
    }
}

/// Body of a successful login or registration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Option<SessionUser>,
}

/// Snapshot of the authentication state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub user: Option<SessionUser>,
    pub is_authenticated: bool,
    pub is_initialized: bool,
    pub error: Option<String>,
}

/// A navigation target and its access requirements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub requires_auth: bool,
    pub guest_only: bool,
}

impl Route {
    pub fn protected(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            requires_auth: true,
            guest_only: false,
        }
    }

    pub fn guest(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            requires_auth: false,
            guest_only: true,
        }
    }

    pub fn public(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            requires_auth: false,
            guest_only: false,
        }
    }
}

/// Outcome of checking a route against the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    /// `redirect` is the originally requested path, to resume after login.
    RedirectToLogin { redirect: String },
    RedirectToDashboard,
}

impl Navigation {
    pub fn decide(route: &Route, authenticated: bool) -> Self {
        if route.requires_auth && !authenticated {
            return Navigation::RedirectToLogin {
                redirect: route.path.clone(),
            };
        }
        if authenticated && (route.guest_only || route.path.starts_with("/auth")) {
            return Navigation::RedirectToDashboard;
        }
        Navigation::Proceed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_decisions() {
        assert_eq!(
            Navigation::decide(&Route::protected("/locations"), false),
            Navigation::RedirectToLogin {
                redirect: "/locations".into()
            }
        );
        assert_eq!(
            Navigation::decide(&Route::protected("/locations"), true),
            Navigation::Proceed
        );
        assert_eq!(
            Navigation::decide(&Route::guest("/login"), true),
            Navigation::RedirectToDashboard
        );
        assert_eq!(
            Navigation::decide(&Route::public("/auth/reset"), true),
            Navigation::RedirectToDashboard
        );
        assert_eq!(
            Navigation::decide(&Route::public("/auth/reset"), false),
            Navigation::Proceed
        );
    }

    #[test]
    fn test_register_requires_matching_passwords() {
        let request = RegisterRequest {
            name: "Ann".into(),
            email: "ann@pne.test".into(),
            password: "secret123".into(),
            password_confirmation: "secret124".into(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_debug_hides_password() {
        let request = LoginRequest::new("a@b.c", "hunter22");
        assert!(!format!("{:?}", request).contains("hunter22"));
    }
}
