//! Authentication and authorization
//!
//! - [`JwtService`] - identity-provider token validation
//! - [`CurrentUser`] - registered caller, resolved through the role directory
//! - [`require_auth`] - authentication middleware
//! - [`require_admin`] / [`require_staff`] - role gates for route groups

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use extractor::CurrentUser;
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, TokenIdentity};
pub use middleware::{CurrentUserExt, require_admin, require_auth, require_staff};
