//! Authentication and authorization

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use jwt::{Claims, JwtService, TokenError, TokenKind, TokenPair};
pub use middleware::{
    authentication_gate, extract_token, AuthContext, AuthFailure, Authenticator, Principal,
    RequireAuth,
};
pub use password::PasswordHasher;
pub use policy::{authorize_owner, ensure_owner, Owned, ResourceKind};
