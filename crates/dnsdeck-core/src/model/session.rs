use serde::Serialize;

use super::{Credential, Role, User};

/// Authentication state of the client.
///
/// `is_authenticated()` is derived from `token` and `user`, so the two
/// can never disagree with it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Session {
    pub user: Option<User>,
    #[serde(skip)]
    pub token: Option<Credential>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_admin)
    }

    pub fn is_agent(&self) -> bool {
        self.user.as_ref().is_some_and(User::is_agent)
    }
}
