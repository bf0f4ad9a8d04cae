/// Who is asking, as seen by the host's session store.
pub trait SessionSource {
    /// Current user id, 0 when nobody is logged in.
    fn user_id(&self) -> u64;
    /// Secret bound to the current session.
    fn session_token(&self) -> String;
}

impl<S: SessionSource + ?Sized> SessionSource for &S {
    fn user_id(&self) -> u64 {
        (**self).user_id()
    }
    fn session_token(&self) -> String {
        (**self).session_token()
    }
}

/// A session captured up front, e.g. from request extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticSession {
    pub user_id: u64,
    pub token: String,
}

impl StaticSession {
    pub fn new(user_id: u64, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: token.into(),
        }
    }

    pub fn logged_out() -> Self {
        Self::default()
    }
}

impl SessionSource for StaticSession {
    fn user_id(&self) -> u64 {
        self.user_id
    }
    fn session_token(&self) -> String {
        self.token.clone()
    }
}
