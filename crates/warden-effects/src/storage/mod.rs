//! Storage channel handlers
//!
//! Browser-backed channels live in [`crate::browser`].

pub mod cookie_jar;
pub mod memory;

pub use cookie_jar::find_cookie;
pub use memory::MemoryChannel;
