//! Builder utilities for operation requests

pub mod request;
