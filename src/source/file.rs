//! File-based data source.
//!
//! Answers requests from a fixture JSON file holding one payload per
//! endpoint, for offline use and demos:
//!
//! ```json
//! {
//!   "overview": { "data": [...], "count": 3 },
//!   "nodes": { "<node_id>": { "data": {...} } },
//!   "insights": { "data": [...], "node_statuses": [...], "stats_card": {...} }
//! }
//! ```
//!
//! The file is re-read when its modification time changes, so editing it
//! while the dashboard runs shows up on the next refresh.

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use nodewatch_types::{ClusterInsights, ClusterOverview, NodeDetails};
use serde::Deserialize;
use tracing::{debug, error};

use super::{DataSource, Payload, Request, Response};

/// Canned payloads, keyed like the API's endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Fixture {
    pub overview: ClusterOverview,
    pub nodes: HashMap<String, NodeDetails>,
    pub insights: ClusterInsights,
}

/// A data source that serves requests from a fixture file.
///
/// The time range of a request is ignored; the fixture is one snapshot.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_modified: Option<SystemTime>,
    fixture: Option<Fixture>,
    ready: VecDeque<Response>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_modified: None,
            fixture: None,
            ready: VecDeque::new(),
        }
    }

    /// Returns the path being served.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    /// Re-read the fixture if the file changed since the last read.
    fn refresh(&mut self) -> Result<&Fixture, String> {
        let current = self.modified_time();
        let changed = match (&self.last_modified, &current) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(last), Some(current)) => current > last,
        };

        if changed || self.fixture.is_none() {
            let content = fs::read_to_string(&self.path)
                .map_err(|e| format!("Read error: {}", e))?;
            let fixture: Fixture =
                serde_json::from_str(&content).map_err(|e| format!("Parse error: {}", e))?;
            debug!(path = %self.path.display(), "Loaded fixture");
            self.last_modified = current;
            self.fixture = Some(fixture);
        }

        self.fixture.as_ref().ok_or_else(|| "No fixture loaded".to_string())
    }

    fn answer(&mut self, request: Request) -> Result<Payload, String> {
        let fixture = self.refresh()?;
        Ok(match request {
            Request::Overview(_) => Payload::Overview(fixture.overview.clone()),
            Request::Insights(_) => Payload::Insights(fixture.insights.clone()),
            Request::NodeDetail { node_id, .. } => {
                let details = fixture
                    .nodes
                    .get(&node_id)
                    .cloned()
                    .ok_or_else(|| format!("No details for node {}", node_id))?;
                Payload::NodeDetail { node_id, details }
            }
        })
    }
}

impl DataSource for FileSource {
    fn request(&mut self, seq: u64, request: Request) {
        let kind = request.kind();
        let payload = self.answer(request).unwrap_or_else(|message| {
            error!(%kind, seq, error = %message, "Fixture request failed");
            Payload::Failed { message }
        });
        self.ready.push_back(Response { kind, seq, payload });
    }

    fn poll(&mut self) -> Option<Response> {
        self.ready.pop_front()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::RequestKind;
    use nodewatch_types::TimeRange;
    use std::io::{Seek, Write};
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "overview": {
                "data": [
                    {"node_id": "n1", "node_name": "appnode01", "health_status": "NORMAL"},
                    {"node_id": "n2", "node_name": "appnode02", "health_status": "CRITICAL"}
                ],
                "count": 2
            },
            "nodes": {
                "n1": {"data": {"total_transactions": "1200", "response_time_ms": [
                    {"datetime": "2024-01-02 09:00:00", "sys_id": "s", "response_time_ms": 120}
                ]}}
            },
            "insights": {"node_statuses": [{"node_id": "n1", "node_name": "appnode01", "health_status": "normal"}]}
        }"#
    }

    fn range() -> TimeRange {
        TimeRange::new("2024-01-02 09:00:00", "2024-01-02 10:00:00")
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/fixture.json");
        assert_eq!(source.path(), Path::new("/tmp/fixture.json"));
        assert_eq!(source.description(), "file: /tmp/fixture.json");
    }

    #[test]
    fn test_answers_every_kind() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();
        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        source.request(1, Request::Overview(range()));
        source.request(
            2,
            Request::NodeDetail {
                node_id: "n1".into(),
                range: range(),
            },
        );
        source.request(3, Request::Insights(range()));

        let overview = source.poll().unwrap();
        assert_eq!((overview.kind, overview.seq), (RequestKind::Overview, 1));
        match overview.payload {
            Payload::Overview(o) => assert_eq!(o.len(), 2),
            other => panic!("unexpected payload: {other:?}"),
        }

        let detail = source.poll().unwrap();
        match detail.payload {
            Payload::NodeDetail { node_id, details } => {
                assert_eq!(node_id, "n1");
                assert_eq!(details.data.total_transactions.value(), 1200.0);
                assert_eq!(details.data.response_time_ms.len(), 1);
            }
            other => panic!("unexpected payload: {other:?}"),
        }

        let insights = source.poll().unwrap();
        assert_eq!(insights.kind, RequestKind::Insights);
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_unknown_node_fails() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();
        let mut source = FileSource::new(file.path());

        source.request(
            5,
            Request::NodeDetail {
                node_id: "n9".into(),
                range: range(),
            },
        );
        let response = source.poll().unwrap();
        assert!(response.is_failure());
        assert_eq!(response.seq, 5);
        assert!(response.failure().unwrap().contains("n9"));
    }

    #[test]
    fn test_detects_changes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();
        let mut source = FileSource::new(file.path());
        source.request(1, Request::Overview(range()));
        let _ = source.poll();

        std::thread::sleep(std::time::Duration::from_millis(10));
        file.as_file().set_len(0).unwrap();
        file.rewind().unwrap();
        writeln!(file, r#"{{"overview": {{"data": []}}}}"#).unwrap();
        file.flush().unwrap();

        source.request(2, Request::Overview(range()));
        // may be flaky on filesystems with coarse mtime resolution
        if let Some(Response {
            payload: Payload::Overview(o),
            ..
        }) = source.poll()
        {
            assert!(o.len() <= 2);
        }
    }

    #[test]
    fn test_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/fixture.json");
        source.request(1, Request::Overview(range()));
        let response = source.poll().unwrap();
        assert!(response.failure().unwrap().contains("Read error"));
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();
        let mut source = FileSource::new(file.path());
        source.request(1, Request::Insights(range()));
        let response = source.poll().unwrap();
        assert!(response.failure().unwrap().contains("Parse error"));
    }

    #[test]
    fn test_demo_fixture() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/cluster.json");
        let mut source = FileSource::new(path);
        source.request(1, Request::Overview(range()));
        source.request(
            2,
            Request::NodeDetail {
                node_id: "n-04".into(),
                range: range(),
            },
        );
        source.request(3, Request::Insights(range()));

        let responses: Vec<Response> = std::iter::from_fn(|| source.poll()).collect();
        assert_eq!(responses.len(), 3);
        let failures: Vec<&str> = responses.iter().filter_map(Response::failure).collect();
        assert!(failures.is_empty(), "{:?}", failures);
    }
}
