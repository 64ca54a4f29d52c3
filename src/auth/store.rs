//! Authentication state
//!
//! There is no auth backend yet: login and signup accept any credentials and
//! only record who is signed in. The flag is persisted independently of the
//! website collection.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::db::{KvRepository, AUTH_KEY};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthState {
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub is_authenticated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid input: {0}")]
    Validation(String),
}

pub struct AuthStore {
    state: RwLock<AuthState>,
    kv: Option<KvRepository>,
}

impl AuthStore {
    /// Signed-out store without persistence
    pub fn new() -> Self {
        Self {
            state: RwLock::new(AuthState::default()),
            kv: None,
        }
    }

    /// Load persisted auth state; missing or corrupt state means signed out
    pub async fn load(kv: KvRepository) -> Self {
        let mut state: AuthState = kv.load(AUTH_KEY).await.unwrap_or_default();
        if state.is_authenticated && state.user.is_none() {
            warn!("Persisted auth flag has no user, signing out");
            state = AuthState::default();
        }

        Self {
            state: RwLock::new(state),
            kv: Some(kv),
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn login(&self, email: &str, _password: &str) -> Result<User, AuthError> {
        let email = require_email(email)?;
        let name = email.split('@').next().unwrap_or(email).to_string();

        let user = User {
            id: "1".to_string(),
            name,
            email: email.to_string(),
            avatar: None,
        };

        self.sign_in(user).await
    }

    pub async fn signup(&self, name: &str, email: &str, _password: &str) -> Result<User, AuthError> {
        let email = require_email(email)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::Validation("name is required".to_string()));
        }

        let user = User {
            id: "1".to_string(),
            name: name.to_string(),
            email: email.to_string(),
            avatar: None,
        };

        self.sign_in(user).await
    }

    /// Stand-in for Google OAuth: signs in a generated Google user
    pub async fn login_with_google(&self) -> Result<User, AuthError> {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(|c| char::from(c).to_ascii_lowercase())
            .collect();

        let user = User {
            id: format!("google-{}-{}", Utc::now().timestamp_millis(), suffix),
            name: "Google User".to_string(),
            email: "googleuser@gmail.com".to_string(),
            avatar: Some(
                "https://ui-avatars.com/api/?name=Google+User&background=4285F4&color=fff&bold=true"
                    .to_string(),
            ),
        };

        self.sign_in(user).await
    }

    pub async fn logout(&self) {
        *self.state.write().await = AuthState::default();
        info!("Signed out");
        self.persist().await;
    }

    async fn sign_in(&self, user: User) -> Result<User, AuthError> {
        {
            let mut state = self.state.write().await;
            state.user = Some(user.clone());
            state.is_authenticated = true;
        }

        info!("Signed in as {}", user.email);
        self.persist().await;

        Ok(user)
    }

    async fn persist(&self) {
        let Some(kv) = &self.kv else {
            return;
        };

        let snapshot = self.state.read().await.clone();
        if let Err(e) = kv.save(AUTH_KEY, &snapshot).await {
            warn!("Failed to persist auth state: {:#}", e);
        }
    }
}

impl Default for AuthStore {
    fn default() -> Self {
        Self::new()
    }
}

fn require_email(email: &str) -> Result<&str, AuthError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::Validation("email is required".to_string()));
    }
    Ok(email)
}
