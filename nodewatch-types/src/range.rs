//! The `start_date` / `end_date` query pair.

use alloc::string::String;

/// An absolute time window as the API expects it.
///
/// Both ends are formatted with [`WIRE_DATETIME_FORMAT`](crate::WIRE_DATETIME_FORMAT).
/// The pair is sent verbatim as the `start_date` and `end_date` query
/// parameters of every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

impl TimeRange {
    /// Create a window from already formatted endpoints.
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Query parameters in the order the API documents them.
    pub fn query(&self) -> [(&'static str, &str); 2] {
        [("start_date", self.start.as_str()), ("end_date", self.end.as_str())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs() {
        let range = TimeRange::new("2024-01-01 10:00:00", "2024-01-02 10:00:00");
        assert_eq!(
            range.query(),
            [("start_date", "2024-01-01 10:00:00"), ("end_date", "2024-01-02 10:00:00")]
        );
    }
}
