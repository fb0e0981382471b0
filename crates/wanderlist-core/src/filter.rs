use serde::Deserialize;

use crate::models::{Destination, Priority, TripType, VisitStatus};

/// Criteria for narrowing a destination list. Unset criteria match anything;
/// set criteria must all match.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DestinationFilter {
    pub priority: Option<Priority>,
    pub continent: Option<String>,
    pub trip_type: Option<TripType>,
    pub visit_status: Option<VisitStatus>,
}

impl DestinationFilter {
    pub fn is_empty(&self) -> bool {
        *self == DestinationFilter::default()
    }

    pub fn matches(&self, destination: &Destination) -> bool {
        self.priority.map_or(true, |p| destination.priority == p)
            && self
                .continent
                .as_deref()
                .map_or(true, |c| destination.continent == c)
            && self
                .trip_type
                .map_or(true, |t| destination.trip_type.contains(&t))
            && self
                .visit_status
                .map_or(true, |s| destination.visit_status == s)
    }

    pub fn apply<'a, I>(&self, destinations: I) -> Vec<Destination>
    where
        I: IntoIterator<Item = &'a Destination>,
    {
        destinations
            .into_iter()
            .filter(|d| self.matches(d))
            .cloned()
            .collect()
    }
}
