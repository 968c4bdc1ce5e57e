//! # Warden Web
//!
//! wasm-bindgen surface for the site's pages. A page constructs a
//! [`BanGuard`] once and awaits `guardPage()` before revealing protected
//! content; moderator pages call `banUser`.
//!
//! Compiled only for `wasm32`; on other targets the crate is empty.

#![cfg(target_arch = "wasm32")]

mod error;
mod guard;

pub use error::{WebError, WebResult};
pub use guard::BanGuard;

use wasm_bindgen::prelude::*;

/// Module start hook: panic messages and logs go to the console
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    warden_effects::init_logging();
}
