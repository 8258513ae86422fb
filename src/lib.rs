//! # nodewatch
//!
//! A terminal dashboard for the health, performance and capacity of an
//! application-server fleet.
//!
//! The dashboard pulls three snapshots from the system health API (the
//! cluster overview, per-node performance series and the comparative
//! insights table) and derives everything it shows from them and from an
//! optional node/application inventory.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(derivation)   │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │ Request / Response (sequenced)                      │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── HttpSource (nodewatch-client) | FileSource  │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: dashboard state, request sequencing, navigation and export
//! - **[`source`]**: the [`DataSource`] trait with the HTTP and fixture sources
//! - **[`data`]**: classification, aggregation, trends, time ranges, series
//!   mapping, filtering, findings
//! - **[`ui`]**: ratatui views for nodes, applications and insights
//! - **[`config`]** / **[`logging`]**: layered settings and tracing setup
//!
//! ## Usage
//!
//! ```bash
//! # Live API
//! nodewatch --endpoint http://monitor:8080/api/fobr/system_health --range 24h
//!
//! # Offline, from a fixture, with an inventory for the Applications view
//! nodewatch --fixture demos/cluster.json --inventory demos/inventory.json
//!
//! # Write the derived state as JSON and exit
//! nodewatch --fixture demos/cluster.json --export state.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use nodewatch::{App, FileSource, Inventory, RangeToken, Theme, Thresholds};
//!
//! let source = Box::new(FileSource::new("cluster.json"));
//! let mut app = App::new(
//!     source,
//!     Thresholds::default(),
//!     RangeToken::SixHours,
//!     Inventory::default(),
//!     Theme::dark(),
//! );
//! app.refresh();
//! app.poll_responses();
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod logging;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::Settings;
pub use data::{
    ApplicationMetric, FilterCriteria, FleetNode, HealthStatus, Inventory, NodeMetric, RangeToken,
    Thresholds,
};
pub use source::{DataSource, FileSource, HttpSource, Request, RequestKind, Response};
pub use ui::Theme;
