//! Web server status probing.
//!
//! This crate polls a server's HTTP status endpoint and decodes the JSON
//! payload it returns into a [`ServerStatus`]:
//!
//! ```json
//! {"status": 200, "version": "1.0.0", "error": ""}
//! ```
//!
//! The round trip latency is measured by the prober itself, from just before
//! the request is sent until the full body has been read.
//!
//! # Example
//!
//! ```no_run
//! use statusprobe::{HttpProber, ServerProber};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let prober = HttpProber::new()?;
//! let status = prober.query("http://localhost:8081/health").await?;
//!
//! if status.is_server_error() {
//!     eprintln!("server reports {}: {}", status.status_code, status.error_message);
//! }
//! # Ok(())
//! # }
//! ```

pub mod prober;
pub mod types;

pub use prober::{HttpProber, ProbeError, ServerProber};
pub use types::{SERVER_ERROR_THRESHOLD, ServerStatus};
