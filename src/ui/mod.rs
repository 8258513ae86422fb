//! Terminal rendering.
//!
//! ```text
//! ┌ header: fleet counts, throughput, range ─────────────┐
//! │ tabs: 1:Nodes | 2:Applications | 3:Insights          │
//! │                                                       │
//! │ nodes | applications | insights                       │
//! │        (+ detail overlay, + help overlay)             │
//! │                                                       │
//! └ status bar: breadcrumb, source, freshness, keys ─────┘
//! ```
//!
//! Views only read [`App`](crate::app::App); every figure they show comes
//! from the `data` layer.

pub mod applications;
pub mod common;
pub mod detail;
pub mod insights;
pub mod nodes;
pub mod theme;

pub use theme::Theme;
