//! Operation handler modules
//!
//! One module per area of the registry:
//! - runtimes and their labels
//! - applications, their labels and API definitions
//! - label definitions
//! - API credential bindings

pub mod application;
pub mod auth;
pub mod label;
pub mod runtime;
