//! Hardware Abstraction Layer for the panel input path.
//!
//! Thin wrappers around ESP-IDF services.
//! Decoding logic stays in core modules, HAL is just plumbing.

pub mod intr;

pub use intr::EspIntrRegistrar;
