use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token payload. Carries the account id and expiry, nothing else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // user ID
    pub exp: usize, // expires at (unix timestamp)
}
