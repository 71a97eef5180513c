//! Handshake authentication
//!
//! Resolves the bearer credential presented at upgrade time to an active
//! user. Any failure refuses the connection.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{User, UserRepository};
use crate::shared::error::AuthError;

/// JWT claims for token validation
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Validate the token and load the account it names.
pub async fn authenticate(
    token: Option<&str>,
    secret: &str,
    users: &dyn UserRepository,
) -> Result<User, AuthError> {
    let token = token.filter(|t| !t.is_empty()).ok_or(AuthError::MissingToken)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    let user_id: Uuid = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AuthError::InvalidSubject(token_data.claims.sub.clone()))?;

    let user = users
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::UnknownUser(user_id))?;

    if !user.is_active {
        return Err(AuthError::InactiveAccount(user_id));
    }
    Ok(user)
}
