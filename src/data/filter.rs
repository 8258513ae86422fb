//! Composable filtering of node and application collections.

use serde::Serialize;

use super::classify::HealthStatus;
use super::status::Classified;

/// Status selector of the filter bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StatusFilter {
    #[default]
    All,
    Only(HealthStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: HealthStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }

    /// Cycle All → Healthy → Warning → Critical → All.
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Only(HealthStatus::Healthy),
            StatusFilter::Only(HealthStatus::Healthy) => StatusFilter::Only(HealthStatus::Warning),
            StatusFilter::Only(HealthStatus::Warning) => StatusFilter::Only(HealthStatus::Critical),
            StatusFilter::Only(HealthStatus::Critical) => StatusFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

/// Active filter predicates. All of them must hold for an entity to pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the display name.
    pub search: String,
    pub status: StatusFilter,
    /// Restrict to critical entities whatever `status` says.
    pub critical_only: bool,
}

impl FilterCriteria {
    /// Whether any predicate narrows the collection.
    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.status != StatusFilter::All || self.critical_only
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches<T: Classified + ?Sized>(&self, entity: &T) -> bool {
        let status = entity.status();
        if self.critical_only && status != HealthStatus::Critical {
            return false;
        }
        if !self.status.matches(status) {
            return false;
        }
        self.search.is_empty() || matches_search(entity.display_name(), &self.search)
    }

    /// Keep the entities that pass, in their relative order.
    pub fn apply<'a, T: Classified>(&self, entities: &'a [T]) -> Vec<&'a T> {
        entities.iter().filter(|e| self.matches(*e)).collect()
    }
}

/// Case-insensitive substring match.
pub fn matches_search(name: &str, search: &str) -> bool {
    name.to_lowercase().contains(&search.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entity {
        name: String,
        status: HealthStatus,
    }

    impl Classified for Entity {
        fn status(&self) -> HealthStatus {
            self.status
        }

        fn display_name(&self) -> &str {
            &self.name
        }
    }

    fn entity(name: &str, status: HealthStatus) -> Entity {
        Entity {
            name: name.to_string(),
            status,
        }
    }

    fn fleet() -> Vec<Entity> {
        vec![
            entity("appnode01", HealthStatus::Warning),
            entity("AppNode02", HealthStatus::Healthy),
            entity("dbnode01", HealthStatus::Critical),
            entity("appnode03", HealthStatus::Critical),
        ]
    }

    fn names(filtered: &[&Entity]) -> Vec<String> {
        filtered.iter().map(|e| e.name.clone()).collect()
    }

    #[test]
    fn test_no_filter_is_identity() {
        let entities = fleet();
        let criteria = FilterCriteria::default();
        assert!(!criteria.is_active());
        assert_eq!(criteria.apply(&entities).len(), entities.len());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let criteria = FilterCriteria {
            search: "APPNODE".into(),
            ..Default::default()
        };
        assert_eq!(names(&criteria.apply(&fleet())), vec!["appnode01", "AppNode02", "appnode03"]);
    }

    #[test]
    fn test_status_filter() {
        let criteria = FilterCriteria {
            status: StatusFilter::Only(HealthStatus::Critical),
            ..Default::default()
        };
        assert_eq!(names(&criteria.apply(&fleet())), vec!["dbnode01", "appnode03"]);
    }

    #[test]
    fn test_critical_only_overrides_status() {
        let criteria = FilterCriteria {
            status: StatusFilter::Only(HealthStatus::Warning),
            critical_only: true,
            ..Default::default()
        };
        assert!(criteria.apply(&fleet()).is_empty());

        let criteria = FilterCriteria {
            critical_only: true,
            ..Default::default()
        };
        assert_eq!(names(&criteria.apply(&fleet())), vec!["dbnode01", "appnode03"]);
    }

    #[test]
    fn test_predicates_compose() {
        let criteria = FilterCriteria {
            search: "app".into(),
            critical_only: true,
            ..Default::default()
        };
        assert_eq!(names(&criteria.apply(&fleet())), vec!["appnode03"]);
    }

    #[test]
    fn test_clear() {
        let mut criteria = FilterCriteria {
            search: "x".into(),
            status: StatusFilter::Only(HealthStatus::Healthy),
            critical_only: true,
        };
        assert!(criteria.is_active());
        criteria.clear();
        assert_eq!(criteria, FilterCriteria::default());
    }

    #[test]
    fn test_status_filter_cycle() {
        let mut f = StatusFilter::All;
        for _ in 0..4 {
            f = f.next();
        }
        assert_eq!(f, StatusFilter::All);
        assert_eq!(StatusFilter::All.next().label(), "Healthy");
    }

    fn status_strategy() -> impl Strategy<Value = HealthStatus> {
        prop_oneof![
            Just(HealthStatus::Healthy),
            Just(HealthStatus::Warning),
            Just(HealthStatus::Critical),
        ]
    }

    proptest! {
        #[test]
        fn empty_criteria_is_identity(
            raw in proptest::collection::vec(("[a-zA-Z0-9]{0,12}", status_strategy()), 0..40)
        ) {
            let entities: Vec<Entity> =
                raw.iter().map(|(n, s)| entity(n, *s)).collect();
            let filtered: Vec<Entity> =
                FilterCriteria::default().apply(&entities).into_iter().cloned().collect();
            prop_assert_eq!(filtered, entities);
        }

        #[test]
        fn filtering_preserves_order(
            raw in proptest::collection::vec(("[a-c]{1,3}", status_strategy()), 0..40),
            search in "[a-c]{0,2}",
        ) {
            let entities: Vec<Entity> =
                raw.iter().map(|(n, s)| entity(n, *s)).collect();
            let criteria = FilterCriteria { search, ..Default::default() };
            let expected: Vec<&Entity> =
                entities.iter().filter(|e| e.name.contains(&criteria.search)).collect();
            prop_assert_eq!(criteria.apply(&entities), expected);
        }
    }
}
