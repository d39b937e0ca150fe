//! Fixtures shared by unit tests.

use crate::auth::{create_token, Principal};

pub fn principal(username: &str, is_admin: bool) -> Principal {
    Principal {
        username: username.to_string(),
        is_admin,
    }
}

/// `Authorization` header value carrying a token signed with the configured secret.
pub fn bearer(username: &str, is_admin: bool) -> String {
    let token = create_token(username, is_admin).expect("configured secret signs tokens");
    format!("Bearer {}", token)
}

/// Regular users `u1`, `u2` and admin `uA`, as used by the route tests.
pub fn u1_token() -> String {
    bearer("u1", false)
}

pub fn u2_token() -> String {
    bearer("u2", false)
}

pub fn admin_token() -> String {
    bearer("uA", true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_distinct_per_user() {
        assert_ne!(u1_token(), u2_token());
        assert!(admin_token().starts_with("Bearer "));
    }
}
