//! DOM enforcement surface

use super::js_message;
use warden_core::{DocumentSurface, WardenError, WardenResult};

/// The live document of the current window
#[derive(Debug, Clone, Copy, Default)]
pub struct DomSurface;

impl DocumentSurface for DomSurface {
    fn halt(&self) {
        if let Some(window) = web_sys::window() {
            if let Err(e) = window.stop() {
                tracing::debug!(error = %js_message(&e), "window.stop failed");
            }
        }
    }

    fn replace_body(&self, html: &str) -> WardenResult<()> {
        let body = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.body())
            .ok_or_else(|| WardenError::surface("document has no body"))?;
        body.set_inner_html(html);
        Ok(())
    }

    fn body(&self) -> Option<String> {
        web_sys::window()?
            .document()?
            .body()
            .map(|b| b.inner_html())
    }

    fn has_element(&self, id: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
            .is_some()
    }
}
