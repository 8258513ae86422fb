//! # nodewatch-client
//!
//! Async HTTP client for the application-server system health API.
//!
//! The client wraps the three endpoints the dashboard reads from and
//! unwraps their `{"result": ...}` envelope into the typed payloads of
//! [`nodewatch_types`].
//!
//! ```rust,no_run
//! use nodewatch_client::MonitoringClient;
//!
//! # async fn example() -> Result<(), nodewatch_client::ClientError> {
//! let client = MonitoringClient::builder().build()?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;

pub use client::{MonitoringClient, MonitoringClientBuilder, DEFAULT_ENDPOINT};
pub use error::ClientError;
