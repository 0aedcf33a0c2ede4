pub mod cookie;
pub mod gate;
pub mod handlers;
pub mod password;
pub mod session;
pub mod validation;

pub use gate::{auth_gate, require_auth, Identity};
pub use session::{SessionClaims, SessionKeys};
