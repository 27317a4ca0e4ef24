//! Current user lookup
//!
//! Login lives outside the core; sessions are attributed to whoever the
//! login layer reports, or to the guest account.

/// User id recorded when nobody is logged in
pub const GUEST_USER: &str = "Guest";

/// Source of the logged-in user id
pub trait CurrentUser {
    fn current_user_id(&self) -> Option<String>;
}

/// Fixed login state, for hosts that resolve the user up front
#[derive(Debug, Clone, Default)]
pub struct LoggedInUser(pub Option<String>);

impl LoggedInUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self(Some(user_id.into()))
    }

    pub fn anonymous() -> Self {
        Self(None)
    }
}

impl CurrentUser for LoggedInUser {
    fn current_user_id(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Logged-in user id, or `GUEST_USER` when missing or blank
pub fn resolve_user_id(source: &dyn CurrentUser) -> String {
    source
        .current_user_id()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| GUEST_USER.to_string())
}
