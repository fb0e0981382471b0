//! Hydration of loosely-shaped JSON into canonical [`Destination`] records.
//!
//! `normalize` never fails: every field that is absent or of the wrong type
//! falls back to its default, so old or partial documents always load.

use std::{collections::BTreeSet, str::FromStr};

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::models::{
    budget::{Budget, BudgetCategory, BudgetLine},
    date_format, Destination, DestinationId, Photo, Priority, TripType, VisitStatus,
    DEFAULT_CREATED_BY,
};

pub fn normalize(raw: &Value) -> Destination {
    let empty = Map::new();
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            tracing::debug!("Normalizing non-object value into a default record");
            &empty
        }
    };

    let id = match obj.get("id").and_then(parse_id) {
        Some(id) => {
            DestinationId::observe(id);
            id
        }
        None => DestinationId::generate(),
    };

    let mut destination = Destination {
        id,
        name: string_field(obj, "name"),
        lat: number_field(obj, "lat"),
        lng: number_field(obj, "lng"),
        continent: string_field(obj, "continent"),
        country: string_field(obj, "country"),
        priority: enum_field::<Priority>(obj, "priority"),
        visit_status: enum_field::<VisitStatus>(obj, "visitStatus"),
        visit_date: obj
            .get("visitDate")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        notes: string_field(obj, "notes"),
        trip_type: trip_types(obj.get("tripType")),
        must_see: string_list(obj, "mustSee"),
        restaurants: string_list(obj, "restaurants"),
        best_time_to_visit: string_list(obj, "bestTimeToVisit"),
        budget: budget(obj.get("budget")),
        inspiration_links: string_list(obj, "inspirationLinks"),
        photos: photos(obj.get("photos")),
        created_by: obj
            .get("createdBy")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CREATED_BY)
            .to_string(),
        last_updated: obj
            .get("lastUpdated")
            .and_then(Value::as_str)
            .and_then(date_format::parse)
            .unwrap_or_else(crate::models::today),
    };
    destination.budget.compute_totals();
    destination
}

/// Reads a stored id: an integer, an integral float within `i64` range, or a
/// numeric string.
pub fn parse_id(v: &Value) -> Option<DestinationId> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f))
                    .map(|f| f as i64)
            })
            .map(DestinationId),
        Value::String(s) => DestinationId::from_str(s).ok(),
        _ => None,
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    obj.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn number_field(obj: &Map<String, Value>, key: &str) -> f64 {
    match obj.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn enum_field<T: FromStr + Default>(obj: &Map<String, Value>, key: &str) -> T {
    obj.get(key)
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or_default()
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

fn trip_types(v: Option<&Value>) -> BTreeSet<TripType> {
    let mut tags = BTreeSet::new();
    let items: Vec<&Value> = match v {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(single @ Value::String(_)) => vec![single],
        _ => return tags,
    };
    for item in items {
        match item.as_str().map(TripType::from_str) {
            Some(Ok(tag)) => {
                tags.insert(tag);
            }
            _ => tracing::debug!(tag = %item, "Dropping unknown trip type"),
        }
    }
    tags
}

fn photos(v: Option<&Value>) -> Vec<Photo> {
    let Some(Value::Array(items)) = v else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(url) => Some(Photo {
                url: url.clone(),
                caption: String::new(),
            }),
            Value::Object(p) => p.get("url").and_then(Value::as_str).map(|url| Photo {
                url: url.to_string(),
                caption: string_field(p, "caption"),
            }),
            _ => None,
        })
        .collect()
}

fn budget(v: Option<&Value>) -> Budget {
    let mut budget = Budget::default();
    let Some(Value::Object(obj)) = v else {
        return budget;
    };
    for category in BudgetCategory::ALL {
        if let Some(Value::Object(line)) = obj.get(category.key()) {
            *budget.line_mut(category) = BudgetLine {
                estimated: amount(line.get("estimated")).unwrap_or(Decimal::ZERO),
                actual: amount(line.get("actual")),
            };
        }
    }
    budget
}

/// Non-negative amount from a JSON number or numeric string.
fn amount(v: Option<&Value>) -> Option<Decimal> {
    let parsed = match v? {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }?;
    (parsed >= Decimal::ZERO).then_some(parsed)
}
