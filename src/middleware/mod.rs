pub mod auth;
pub mod guards;

pub use auth::{authenticate_jwt, extract_principal, CurrentUser};
pub use guards::{
    ensure_admin, ensure_admin_or_correct_user, ensure_logged_in, require_admin,
    require_admin_or_correct_user, require_logged_in,
};
