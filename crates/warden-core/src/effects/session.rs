//! Session effects

/// Reports the signed-in user, if any
pub trait SessionSource {
    /// Username of the current session
    fn current_user(&self) -> Option<String>;
}
