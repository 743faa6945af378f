pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};

// Re-export necessary items
pub use extractors::AuthContext;
pub use middleware::{Authenticate, Authorize};
pub use password::{BcryptHasher, PasswordHasher};
pub use token::{Claims, JwtService, TokenService};

/// Response returned by a successful login.
///
/// The token is the only credential issued; there is no session or refresh token.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}
