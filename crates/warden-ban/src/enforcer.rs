//! Block-screen enforcement

use std::sync::Arc;
use tracing::info;
use warden_core::{DocumentSurface, WardenResult};

/// Element id of the block screen root
pub const BLOCK_SCREEN_ID: &str = "warden-block";

/// Escape text for inclusion in HTML element content or attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Fixed, non-dismissable notice carrying the escaped reason
pub fn render_block_screen(reason: &str) -> String {
    format!(
        concat!(
            r#"<div id="{id}" role="alertdialog" aria-modal="true" "#,
            r#"style="position:fixed;inset:0;z-index:2147483647;display:flex;height:100vh;"#,
            r#"background:#000;color:red;align-items:center;justify-content:center;"#,
            r#"font-family:sans-serif;">"#,
            r#"<h1>BANNED: {reason}</h1></div>"#
        ),
        id = BLOCK_SCREEN_ID,
        reason = escape_html(reason),
    )
}

/// Replaces the visible page with the block screen.
///
/// Idempotent: once an element with [`BLOCK_SCREEN_ID`] is on the page,
/// later calls only halt. Must run before protected content is revealed.
#[derive(Clone)]
pub struct Enforcer {
    surface: Arc<dyn DocumentSurface>,
}

impl Enforcer {
    /// Enforcer driving `surface`
    pub fn new(surface: Arc<dyn DocumentSurface>) -> Self {
        Self { surface }
    }

    /// Halt the page and show the block screen
    pub fn enforce(&self, reason: &str) -> WardenResult<()> {
        self.surface.halt();
        if self.surface.has_element(BLOCK_SCREEN_ID) {
            return Ok(());
        }
        self.surface.replace_body(&render_block_screen(reason))?;
        info!(%reason, "ban enforced");
        Ok(())
    }
}

impl std::fmt::Debug for Enforcer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enforcer").finish_non_exhaustive()
    }
}
