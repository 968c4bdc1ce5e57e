//! Remote database handlers

pub mod memory;
pub mod rest;

pub use memory::MemoryDatabase;
pub use rest::RestDatabase;
