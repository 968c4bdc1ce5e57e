//! Browser session source

use warden_core::SessionSource;

/// Reads the signed-in username from `localStorage`
#[derive(Debug, Clone)]
pub struct BrowserSession {
    key: String,
}

impl BrowserSession {
    /// Session stored under `key`
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }
}

impl SessionSource for BrowserSession {
    fn current_user(&self) -> Option<String> {
        web_sys::window()?
            .local_storage()
            .ok()??
            .get_item(&self.key)
            .ok()?
            .filter(|u| !u.trim().is_empty())
    }
}
