//! Data source abstraction for fetching monitoring payloads.
//!
//! The dashboard issues [`Request`]s and later polls for [`Response`]s. A
//! source never blocks the UI thread: [`HttpSource`] runs requests on a
//! tokio runtime, [`FileSource`] answers them from a fixture file.
//!
//! Each request carries a sequence id handed out by the [`RequestTracker`].
//! The tracker drops responses that a newer request of the same kind has
//! superseded.

mod file;
mod http;
mod sequence;

pub use file::{Fixture, FileSource};
pub use http::HttpSource;
pub use sequence::RequestTracker;

use std::fmt::{self, Debug};

use nodewatch_types::{ClusterInsights, ClusterOverview, NodeDetails, TimeRange};

/// Endpoint a request targets. Sequencing is per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestKind {
    Overview,
    NodeDetail,
    Insights,
}

impl RequestKind {
    pub const ALL: [RequestKind; 3] =
        [RequestKind::Overview, RequestKind::NodeDetail, RequestKind::Insights];

    pub fn label(&self) -> &'static str {
        match self {
            RequestKind::Overview => "overview",
            RequestKind::NodeDetail => "node details",
            RequestKind::Insights => "insights",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fetch for one time range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Overview(TimeRange),
    NodeDetail { node_id: String, range: TimeRange },
    Insights(TimeRange),
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Overview(_) => RequestKind::Overview,
            Request::NodeDetail { .. } => RequestKind::NodeDetail,
            Request::Insights(_) => RequestKind::Insights,
        }
    }

    pub fn range(&self) -> &TimeRange {
        match self {
            Request::Overview(range) | Request::Insights(range) => range,
            Request::NodeDetail { range, .. } => range,
        }
    }
}

/// Outcome of a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Overview(ClusterOverview),
    NodeDetail { node_id: String, details: NodeDetails },
    Insights(ClusterInsights),
    Failed { message: String },
}

/// A completed request, tagged with the sequence id it was issued with.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub kind: RequestKind,
    pub seq: u64,
    pub payload: Payload,
}

impl Response {
    pub fn failed(kind: RequestKind, seq: u64, message: impl Into<String>) -> Self {
        Self {
            kind,
            seq,
            payload: Payload::Failed {
                message: message.into(),
            },
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.payload, Payload::Failed { .. })
    }

    /// The failure message, if the request failed.
    pub fn failure(&self) -> Option<&str> {
        match &self.payload {
            Payload::Failed { message } => Some(message),
            _ => None,
        }
    }
}

/// Trait for fetching monitoring data from various backends.
///
/// Implementations answer every request exactly once, with either data or
/// [`Payload::Failed`].
pub trait DataSource: Send + Debug {
    /// Start a request. Must not block.
    fn request(&mut self, seq: u64, request: Request);

    /// Take the next completed response, if any. Must not block.
    fn poll(&mut self) -> Option<Response>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI status bar.
    fn description(&self) -> &str;
}
