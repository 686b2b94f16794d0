// app/src/services/auth_service.rs

//! Admin bearer-token hashing and verification (argon2).

use crate::errors::AppError;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument};

/// Produces the PHC string stored in `ADMIN_TOKEN_HASH`.
#[instrument(name = "auth_service::hash_admin_token", skip(token), err(Display))]
pub fn hash_admin_token(token: &str) -> Result<String, AppError> {
  if token.trim().is_empty() {
    return Err(AppError::InvalidArgument("Admin token cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(token.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| {
      error!(error = %e, "Argon2 token hashing failed.");
      AppError::Internal(format!("Token hashing failed: {}", e))
    })
}

/// `Ok(false)` for a wrong token; `Err` only when the stored hash itself is unusable.
#[instrument(name = "auth_service::verify_admin_token", skip_all, err(Display))]
pub fn verify_admin_token(stored_hash: &str, provided: &str) -> Result<bool, AppError> {
  if provided.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
    error!(error = %e, "Stored admin token hash is not a valid PHC string.");
    AppError::Config(format!("Invalid ADMIN_TOKEN_HASH: {}", e))
  })?;

  match Argon2::default().verify_password(provided.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Admin token mismatch.");
      Ok(false)
    }
    Err(e) => Err(AppError::Internal(format!("Token verification failed: {}", e))),
  }
}
