//! Utility functions for code generation and request handling.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`client_info`] - Client address and user agent extraction

pub mod client_info;
pub mod code_generator;
