use std::{
    collections::BTreeSet,
    fmt::Display,
    str::FromStr,
    sync::atomic::{AtomicI64, Ordering},
};

use serde::{Deserialize, Serialize};
use time::Date;

pub mod budget;
pub mod date_format;

use budget::Budget;

/// Default value of `createdBy` for records entered by the local user.
pub const DEFAULT_CREATED_BY: &str = "me";

static LAST_ISSUED_ID: AtomicI64 = AtomicI64::new(0);

/// Ids at or above this are kept as-is but not tracked by the generator.
pub const MAX_TRACKED_ID: i64 = i64::MAX / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(pub i64);

impl DestinationId {
    /// Issues a fresh id from the wall clock in milliseconds. Ids issued by one
    /// process are strictly increasing, and always above any id passed to
    /// [`DestinationId::observe`] below [`MAX_TRACKED_ID`], so a burst of
    /// creations never collides.
    pub fn generate() -> Self {
        let now = (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        let mut last = LAST_ISSUED_ID.load(Ordering::SeqCst);
        loop {
            let next = now.max(last.saturating_add(1));
            match LAST_ISSUED_ID.compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst) {
                Ok(_) => return DestinationId(next),
                Err(current) => last = current,
            }
        }
    }

    /// Records an id that already exists so later generated ids stay above it.
    pub fn observe(id: DestinationId) {
        if id.0 >= MAX_TRACKED_ID {
            tracing::debug!(%id, "Id beyond generator range, not tracked");
            return;
        }
        LAST_ISSUED_ID.fetch_max(id.0, Ordering::SeqCst);
    }
}

impl Display for DestinationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DestinationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(DestinationId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "Bucket List")]
    BucketList,
    Soon,
    #[default]
    Someday,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::BucketList => "Bucket List",
            Priority::Soon => "Soon",
            Priority::Someday => "Someday",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match squash(s).as_str() {
            "bucketlist" => Ok(Priority::BucketList),
            "soon" => Ok(Priority::Soon),
            "someday" => Ok(Priority::Someday),
            _ => Err(format!("unknown priority: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    #[default]
    #[serde(rename = "not visited")]
    NotVisited,
    Planned,
    Visited,
}

impl VisitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VisitStatus::NotVisited => "not visited",
            VisitStatus::Planned => "planned",
            VisitStatus::Visited => "visited",
        }
    }
}

impl Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match squash(s).as_str() {
            "notvisited" => Ok(VisitStatus::NotVisited),
            "planned" => Ok(VisitStatus::Planned),
            "visited" => Ok(VisitStatus::Visited),
            _ => Err(format!("unknown visit status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Beach,
    City,
    Cultural,
    Food,
    Historical,
    Mountains,
    Nature,
    Relaxation,
    Romantic,
    Adventure,
}

impl TripType {
    pub const ALL: [TripType; 10] = [
        TripType::Beach,
        TripType::City,
        TripType::Cultural,
        TripType::Food,
        TripType::Historical,
        TripType::Mountains,
        TripType::Nature,
        TripType::Relaxation,
        TripType::Romantic,
        TripType::Adventure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::Beach => "beach",
            TripType::City => "city",
            TripType::Cultural => "cultural",
            TripType::Food => "food",
            TripType::Historical => "historical",
            TripType::Mountains => "mountains",
            TripType::Nature => "nature",
            TripType::Relaxation => "relaxation",
            TripType::Romantic => "romantic",
            TripType::Adventure => "adventure",
        }
    }
}

impl Display for TripType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = squash(s);
        TripType::ALL
            .iter()
            .find(|t| t.as_str() == wanted)
            .copied()
            .ok_or_else(|| format!("unknown trip type: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Photo {
    pub url: String,
    pub caption: String,
}

/// A destination in canonical shape: every field present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Destination {
    pub id: DestinationId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub continent: String,
    pub country: String,
    pub priority: Priority,
    pub visit_status: VisitStatus,
    /// Only meaningful when `visit_status` is `Visited`.
    pub visit_date: Option<String>,
    pub notes: String,
    pub trip_type: BTreeSet<TripType>,
    pub must_see: Vec<String>,
    pub restaurants: Vec<String>,
    pub best_time_to_visit: Vec<String>,
    pub budget: Budget,
    pub inspiration_links: Vec<String>,
    pub photos: Vec<Photo>,
    pub created_by: String,
    #[serde(with = "date_format")]
    pub last_updated: Date,
}

impl Default for Destination {
    fn default() -> Self {
        Self {
            id: DestinationId::generate(),
            name: String::new(),
            lat: 0.0,
            lng: 0.0,
            continent: String::new(),
            country: String::new(),
            priority: Priority::default(),
            visit_status: VisitStatus::default(),
            visit_date: None,
            notes: String::new(),
            trip_type: BTreeSet::new(),
            must_see: Vec::new(),
            restaurants: Vec::new(),
            best_time_to_visit: Vec::new(),
            budget: Budget::default(),
            inspiration_links: Vec::new(),
            photos: Vec::new(),
            created_by: DEFAULT_CREATED_BY.to_string(),
            last_updated: today(),
        }
    }
}

impl Destination {
    /// A fresh record for a newly picked point, everything else defaulted.
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
            ..Default::default()
        }
    }

    /// Returns the shape written to storage: totals recomputed and
    /// `last_updated` stamped with today's date. `self` is left untouched.
    pub fn serialize_for_persistence(&self) -> Destination {
        self.serialize_for_persistence_on(today())
    }

    pub fn serialize_for_persistence_on(&self, date: Date) -> Destination {
        let mut persisted = self.clone();
        persisted.budget.compute_totals();
        persisted.last_updated = date;
        persisted
    }
}

pub fn today() -> Date {
    time::OffsetDateTime::now_utc().date()
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
