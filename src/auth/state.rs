//! Auth context seeded by the dashboard layout.
//!
//! Cookie presence and a resolved user are two distinct trust levels. The
//! layout only knows whether a `token` cookie exists; the user is known once
//! a [`UserResolver`] has vouched for the token.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::auth::validate_jwt;
use crate::database::models::User;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),
}

/// Verifies a raw token and returns its user
#[async_trait]
pub trait UserResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<User, AuthError>;
}

/// Resolves users from HS256 JWTs
pub struct JwtUserResolver {
    secret: String,
}

impl JwtUserResolver {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }
}

#[async_trait]
impl UserResolver for JwtUserResolver {
    async fn resolve(&self, token: &str) -> Result<User, AuthError> {
        validate_jwt(token, &self.secret)
            .map(|claims| claims.into_user())
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unknown,
    Unauthenticated,
    Authenticated(User),
}

impl AuthState {
    pub fn initial(has_token: bool) -> Self {
        if has_token {
            AuthState::Unknown
        } else {
            AuthState::Unauthenticated
        }
    }

    /// Settle an `Unknown` state. Terminal states ignore later results.
    pub fn resolve(self, result: Result<User, AuthError>) -> Self {
        match self {
            AuthState::Unknown => match result {
                Ok(user) => AuthState::Authenticated(user),
                Err(err) => {
                    debug!("user resolution failed: {}", err);
                    AuthState::Unauthenticated
                }
            },
            terminal => terminal,
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, AuthState::Unknown)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthState::Unknown => "unknown",
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::Authenticated(_) => "authenticated",
        }
    }
}

/// Per-request auth context handed to dashboard pages
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub has_token: bool,
    pub state: AuthState,
}

impl AuthContext {
    pub fn new(has_token: bool) -> Self {
        Self {
            has_token,
            state: AuthState::initial(has_token),
        }
    }

    /// Build the context for a request and settle it against the resolver.
    pub async fn establish(token: Option<&str>, resolver: &Arc<dyn UserResolver>) -> Self {
        let mut context = Self::new(token.is_some());
        if let Some(token) = token {
            let result = resolver.resolve(token).await;
            context.state = context.state.resolve(result);
        }
        context
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user()
    }
}
