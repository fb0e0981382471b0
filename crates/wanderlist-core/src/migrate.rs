//! Conversion of the pre-budget record shape.
//!
//! Legacy records carry a `low`/`medium`/`high` priority, a single free-text
//! `vibe` and a coarse `cost` tier instead of an itemised budget.

use std::{collections::BTreeSet, str::FromStr};

use rust_decimal::Decimal;
use serde_json::Value;

use crate::{
    models::{budget::Budget, Destination, Priority, TripType},
    normalize::normalize,
};

const LEGACY_TIERS: [&str; 3] = ["low", "medium", "high"];

/// Estimate used when a legacy `cost` tier is not one of the known tiers.
pub const DEFAULT_COST_ESTIMATE: i64 = 3000;

pub fn is_legacy(raw: &Value) -> bool {
    let Some(obj) = raw.as_object() else {
        return false;
    };
    obj.contains_key("vibe")
        || obj.contains_key("cost")
        || obj
            .get("priority")
            .and_then(Value::as_str)
            .map(|p| LEGACY_TIERS.contains(&p.trim().to_ascii_lowercase().as_str()))
            .unwrap_or(false)
}

pub fn legacy_priority(tier: Option<&str>) -> Priority {
    match tier.map(|t| t.trim().to_ascii_lowercase()).as_deref() {
        Some("high") => Priority::BucketList,
        Some("medium") => Priority::Soon,
        _ => Priority::Someday,
    }
}

pub fn cost_estimate(tier: &str) -> Decimal {
    let estimate = match tier.trim().to_ascii_lowercase().as_str() {
        "low" => 1000,
        "medium" => 3000,
        "high" => 5000,
        _ => DEFAULT_COST_ESTIMATE,
    };
    Decimal::from(estimate)
}

/// Converts a legacy record to canonical shape. Fields the legacy shape never
/// had are hydrated exactly as [`normalize`] would.
pub fn migrate_legacy(raw: &Value) -> Destination {
    let mut destination = normalize(raw);
    let Some(obj) = raw.as_object() else {
        return destination;
    };

    destination.priority = legacy_priority(obj.get("priority").and_then(Value::as_str));

    if let Some(vibe) = obj.get("vibe").filter(|v| !v.is_null()) {
        destination.trip_type = match vibe.as_str().map(TripType::from_str) {
            Some(Ok(tag)) => BTreeSet::from([tag]),
            _ => {
                tracing::warn!(id = %destination.id, vibe = %vibe, "Legacy vibe has no matching trip type");
                BTreeSet::new()
            }
        };
    }

    if let Some(cost) = obj.get("cost").filter(|v| !v.is_null()) {
        let tier = cost.as_str().unwrap_or_default();
        destination.budget = Budget::from_estimate(cost_estimate(tier));
    }

    destination
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{budget::BudgetCategory, DestinationId};
    use serde_json::json;

    #[test]
    fn test_high_priority_medium_cost() {
        let d = migrate_legacy(&json!({"priority": "high", "cost": "medium"}));
        assert_eq!(d.priority, Priority::BucketList);
        assert_eq!(d.priority.as_str(), "Bucket List");
        assert_eq!(d.budget.total.estimated, Decimal::from(3000));
        assert_eq!(d.budget.flight.estimated, Decimal::from(900));
        assert_eq!(d.budget.accommodation.estimated, Decimal::from(900));
        assert_eq!(d.budget.activities.estimated, Decimal::from(450));
        assert_eq!(d.budget.food.estimated, Decimal::from(450));
        assert_eq!(d.budget.misc.estimated, Decimal::from(300));
        assert!(BudgetCategory::ALL.iter().all(|c| d.budget.line(*c).actual.is_none()));
        assert_eq!(d.budget.total.actual, None);
    }

    #[test]
    fn test_priority_mapping() {
        let priority = |p: Value| migrate_legacy(&json!({ "priority": p })).priority;
        assert_eq!(priority(json!("high")), Priority::BucketList);
        assert_eq!(priority(json!("medium")), Priority::Soon);
        assert_eq!(priority(json!("low")), Priority::Someday);
        assert_eq!(priority(json!("whenever")), Priority::Someday);
        assert_eq!(priority(json!(null)), Priority::Someday);
    }

    #[test]
    fn test_cost_tiers() {
        let total = |c: &str| migrate_legacy(&json!({ "cost": c })).budget.total.estimated;
        assert_eq!(total("low"), Decimal::from(1000));
        assert_eq!(total("high"), Decimal::from(5000));
        assert_eq!(total("astronomical"), Decimal::from(3000));
    }

    #[test]
    fn test_vibe_becomes_trip_type() {
        let d = migrate_legacy(&json!({"vibe": "beach"}));
        assert_eq!(d.trip_type, BTreeSet::from([TripType::Beach]));

        let d = migrate_legacy(&json!({"vibe": "chill"}));
        assert!(d.trip_type.is_empty());
    }

    #[test]
    fn test_carried_fields_and_defaults() {
        let d = migrate_legacy(&json!({
            "id": 1650000000000_i64,
            "name": "Banff",
            "lat": 51.18,
            "lng": -115.57,
            "notes": "lakes",
            "priority": "medium"
        }));
        assert_eq!(d.id, DestinationId(1650000000000));
        assert_eq!(d.name, "Banff");
        assert_eq!(d.notes, "lakes");
        assert_eq!(d.priority, Priority::Soon);
        assert!(d.must_see.is_empty());
        assert!(d.photos.is_empty());
        assert_eq!(d.budget, Budget::default());
    }

    #[test]
    fn test_is_legacy() {
        assert!(is_legacy(&json!({"priority": "High"})));
        assert!(is_legacy(&json!({"vibe": "city"})));
        assert!(is_legacy(&json!({"priority": "Soon", "cost": "low"})));
        assert!(!is_legacy(&json!({"priority": "Bucket List"})));
        assert!(!is_legacy(&json!({})));
        assert!(!is_legacy(&json!([])));

        let canonical = serde_json::to_value(Destination::new("Oslo", 59.9, 10.7)).unwrap();
        assert!(!is_legacy(&canonical));
    }
}
