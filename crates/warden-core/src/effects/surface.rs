//! Document surface effects

use crate::errors::WardenResult;

/// The visible page the enforcer takes over.
pub trait DocumentSurface {
    /// Stop in-flight navigation and loading
    fn halt(&self);

    /// Replace the whole visible body with `html`
    fn replace_body(&self, html: &str) -> WardenResult<()>;

    /// Current body markup, if readable
    fn body(&self) -> Option<String>;

    /// Whether an element with `id` is in the document
    fn has_element(&self, id: &str) -> bool;
}
