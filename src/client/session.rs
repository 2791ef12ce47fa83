use std::sync::RwLock;

/// Bearer token of the signed-in account.
///
/// Set on login, cleared on logout or on any 401, read before every
/// entry request.
#[derive(Debug, Default)]
pub struct SessionContext {
    token: RwLock<Option<String>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, token: String) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
    }

    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.read().map(|t| t.is_some()).unwrap_or(false)
    }
}
