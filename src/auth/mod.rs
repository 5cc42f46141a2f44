//! Login gate: credentials check, authorization policy and session cookies.

pub mod policy;
pub mod session;

use thiserror::Error;
use tracing::{info, warn};

use crate::db::InvoiceStore;
use crate::error::StoreError;
use crate::models::User;
use crate::validation::{LoginForm, validate_credentials};

pub use policy::{Access, authorize};
pub use session::{Session, SessionKeys};

#[derive(Debug, Error)]
pub enum AuthError {
    /// Deliberately the same for unknown emails, wrong passwords and
    /// malformed input.
    #[error("Invalid credentials.")]
    InvalidCredentials,

    #[error("failed to fetch user: {0}")]
    Store(#[from] StoreError),
}

pub async fn authenticate(store: &dyn InvoiceStore, form: &LoginForm) -> Result<User, AuthError> {
    let Ok(credentials) = validate_credentials(form) else {
        info!("Invalid credentials");
        return Err(AuthError::InvalidCredentials);
    };

    let Some(user) = store.find_user_by_email(&credentials.email).await? else {
        info!("Invalid credentials");
        return Err(AuthError::InvalidCredentials);
    };

    if verify_password(credentials.password, user.password.clone()).await {
        info!(user_id = %user.id, "user signed in");
        Ok(user)
    } else {
        info!("Invalid credentials");
        Err(AuthError::InvalidCredentials)
    }
}

/// bcrypt is CPU-bound, so it runs off the async workers.
async fn verify_password(password: String, hash: String) -> bool {
    let result = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await;
    match result {
        Ok(Ok(matches)) => matches,
        Ok(Err(error)) => {
            warn!(%error, "stored password hash is unreadable");
            false
        }
        Err(error) => {
            warn!(%error, "password verification task failed");
            false
        }
    }
}
