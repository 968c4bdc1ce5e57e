//! Recording document surface

use std::sync::{Arc, Mutex, PoisonError};
use warden_core::{DocumentSurface, WardenError, WardenResult};

#[derive(Debug, Default)]
struct Page {
    body: Option<String>,
    halts: usize,
    replacements: usize,
}

/// In-memory page that records what the enforcer did to it
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    page: Arc<Mutex<Page>>,
    detached: bool,
    reserialize: bool,
}

impl RecordingSurface {
    /// Page with an empty body
    pub fn new() -> Self {
        Self::with_body("")
    }

    /// Page showing `html`
    pub fn with_body(html: impl Into<String>) -> Self {
        let surface = Self::default();
        surface.lock().body = Some(html.into());
        surface
    }

    /// Page showing `html` whose body reads back the way a browser
    /// serializes `innerHTML`: quotes in text come back unescaped.
    pub fn reserializing(html: impl Into<String>) -> Self {
        Self {
            reserialize: true,
            ..Self::with_body(html)
        }
    }

    /// Page with no document; every replacement fails
    pub fn detached() -> Self {
        Self {
            detached: true,
            ..Self::default()
        }
    }

    /// Times the page was halted
    pub fn halts(&self) -> usize {
        self.lock().halts
    }

    /// Times the body was actually replaced
    pub fn replacements(&self) -> usize {
        self.lock().replacements
    }

    /// Whether the page was left exactly as it started
    pub fn untouched(&self) -> bool {
        let page = self.lock();
        page.halts == 0 && page.replacements == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Page> {
        self.page.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentSurface for RecordingSurface {
    fn halt(&self) {
        self.lock().halts += 1;
    }

    fn replace_body(&self, html: &str) -> WardenResult<()> {
        if self.detached {
            return Err(WardenError::surface("document has no body"));
        }
        let html = if self.reserialize {
            html.replace("&quot;", "\"").replace("&#39;", "'")
        } else {
            html.to_string()
        };
        let mut page = self.lock();
        page.body = Some(html);
        page.replacements += 1;
        Ok(())
    }

    fn body(&self) -> Option<String> {
        self.lock().body.clone()
    }

    fn has_element(&self, id: &str) -> bool {
        let needle = format!(r#"id="{id}""#);
        self.lock()
            .body
            .as_deref()
            .is_some_and(|body| body.contains(&needle))
    }
}
