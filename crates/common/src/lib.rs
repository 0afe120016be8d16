//! Common utilities and types shared across statusprobe components.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
