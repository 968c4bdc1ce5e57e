//! Browser environment probe

use wasm_bindgen::JsCast;
use warden_core::{EnvironmentProbe, EnvironmentSignals};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, Window};

const CANVAS_TEXT: &str = "h8pedia,fp <canvas> 1.0";

/// Reads navigator, screen, timezone and canvas signals.
///
/// Every signal that throws or is missing stays at its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserEnvironment;

/// Draw fixed text over two overlapping fills and read the image back.
///
/// Font rasterisation, anti-aliasing and GPU differences perturb the
/// encoded pixels.
fn canvas_signature(window: &Window) -> Option<String> {
    let document = window.document()?;
    let canvas = document
        .create_element("canvas")
        .ok()?
        .dyn_into::<HtmlCanvasElement>()
        .ok()?;
    canvas.set_width(240);
    canvas.set_height(60);
    let ctx = canvas
        .get_context("2d")
        .ok()??
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()?;

    ctx.set_text_baseline("top");
    ctx.set_font("14px 'Arial'");
    ctx.set_fill_style_str("#f60");
    ctx.fill_rect(125.0, 1.0, 62.0, 20.0);
    ctx.set_fill_style_str("#069");
    ctx.fill_text(CANVAS_TEXT, 2.0, 15.0).ok()?;
    ctx.set_fill_style_str("rgba(102, 204, 0, 0.7)");
    ctx.fill_text(CANVAS_TEXT, 4.0, 17.0).ok()?;

    canvas.to_data_url().ok()
}

impl EnvironmentProbe for BrowserEnvironment {
    fn signals(&self) -> EnvironmentSignals {
        let Some(window) = web_sys::window() else {
            return EnvironmentSignals::default();
        };
        let navigator = window.navigator();
        let screen = window.screen().ok();
        let dimension = |v: Result<i32, _>| v.ok().and_then(|n| u32::try_from(n).ok()).unwrap_or(0);

        EnvironmentSignals {
            user_agent: navigator.user_agent().unwrap_or_default(),
            language: navigator.language().unwrap_or_default(),
            screen_width: screen.as_ref().map_or(0, |s| dimension(s.width())),
            screen_height: screen.as_ref().map_or(0, |s| dimension(s.height())),
            color_depth: screen.as_ref().map_or(0, |s| dimension(s.color_depth())),
            timezone_offset_minutes: js_sys::Date::new_0().get_timezone_offset() as i32,
            hardware_concurrency: navigator.hardware_concurrency() as u32,
            platform: navigator.platform().unwrap_or_default(),
            canvas_signature: canvas_signature(&window).unwrap_or_default(),
        }
    }
}
