use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use wanderlist_core::{
    is_legacy, migrate_legacy, normalize, parse_id, Destination, DestinationId, KeyValueStore,
    StorageError, StoragePort,
};

/// Key the collection document lives under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "travelWishlistLocations";

/// Storage port over a single JSON document in a key-value store.
///
/// Every write rewrites the whole document. Reads tolerate damage: elements
/// that are not objects are dropped, and an unreadable document reads as an
/// empty collection. Stored elements without an id are given one, and the
/// document is written back so the id sticks.
///
/// Mutations through one handle are serialized by a write lock held from the
/// read to the write. Separate handles over the same key, including other
/// processes, are not coordinated and can lose updates.
pub struct LocalStorage<S: KeyValueStore + ?Sized> {
    store: Arc<S>,
    key: String,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore + ?Sized> LocalStorage<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: Arc<S>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>, StorageError> {
        self.write_lock
            .lock()
            .map_err(|_| StorageError::Other("local storage write lock poisoned".to_string()))
    }

    fn load_raw(&self) -> Result<Vec<Value>, StorageError> {
        let Some(document) = self.store.get(&self.key)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Value>(&document) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(_) => Err(StorageError::Format(format!(
                "stored document under '{}' is not an array",
                self.key
            ))),
            Err(e) => Err(StorageError::Format(format!(
                "stored document under '{}' is not valid JSON: {}",
                self.key, e
            ))),
        }
    }

    /// Loads the collection, surfacing an unreadable document as
    /// [`StorageError::Format`] instead of hiding it.
    pub fn load_strict(&self) -> Result<Vec<Destination>, StorageError> {
        let items = self.load_raw()?;
        if !items.iter().any(lacks_id) {
            return Ok(normalize_items(&items, &self.key));
        }
        let _guard = self.lock()?;
        self.load_strict_locked()
    }

    /// Same as [`LocalStorage::load_strict`]; the caller holds the write lock.
    /// Ids given to id-less elements are written back into the stored
    /// elements, leaving their other fields as they were.
    fn load_strict_locked(&self) -> Result<Vec<Destination>, StorageError> {
        let mut items = self.load_raw()?;
        let mut assigned = 0;
        for item in items.iter_mut().filter(|item| lacks_id(item)) {
            if let Value::Object(obj) = item {
                obj.insert("id".to_string(), Value::from(DestinationId::generate().0));
                assigned += 1;
            }
        }
        if assigned > 0 {
            self.store.set(&self.key, &serde_json::to_string(&items)?)?;
            tracing::info!(key = %self.key, assigned, "Persisted ids for records stored without one");
        }
        Ok(normalize_items(&items, &self.key))
    }

    fn load(&self) -> Result<Vec<Destination>, StorageError> {
        self.degrade(self.load_strict())
    }

    fn load_locked(&self) -> Result<Vec<Destination>, StorageError> {
        self.degrade(self.load_strict_locked())
    }

    fn degrade(
        &self,
        loaded: Result<Vec<Destination>, StorageError>,
    ) -> Result<Vec<Destination>, StorageError> {
        match loaded {
            Err(StorageError::Format(reason)) => {
                tracing::warn!(key = %self.key, %reason, "Discarding unreadable document");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    fn write(&self, destinations: &[Destination]) -> Result<(), StorageError> {
        let document = serde_json::to_string(destinations)?;
        self.store.set(&self.key, &document)?;
        tracing::debug!(key = %self.key, count = destinations.len(), "Wrote document");
        Ok(())
    }
}

/// True for an object element whose id is missing or unreadable.
fn lacks_id(item: &Value) -> bool {
    item.as_object()
        .map_or(false, |obj| obj.get("id").and_then(parse_id).is_none())
}

fn normalize_items(items: &[Value], key: &str) -> Vec<Destination> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if item.is_object() {
                Some(normalize(item))
            } else {
                tracing::warn!(key, index, "Dropping malformed record");
                None
            }
        })
        .collect()
}

/// Collapses repeated ids onto the first occurrence, keeping the last content.
fn dedupe_by_id(destinations: Vec<Destination>) -> Vec<Destination> {
    let mut result: Vec<Destination> = Vec::with_capacity(destinations.len());
    for destination in destinations {
        match result.iter().position(|d| d.id == destination.id) {
            Some(index) => {
                tracing::warn!(id = %destination.id, "Duplicate id in payload, later record wins");
                result[index] = destination;
            }
            None => result.push(destination),
        }
    }
    result
}

impl<S: KeyValueStore + ?Sized> StoragePort for LocalStorage<S> {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    fn get_all(&self) -> Result<Vec<Destination>, StorageError> {
        self.load()
    }

    fn get_one(&self, id: DestinationId) -> Result<Option<Destination>, StorageError> {
        Ok(self.load()?.into_iter().find(|d| d.id == id))
    }

    fn save(&self, destination: &Destination) -> Result<Destination, StorageError> {
        let persisted = destination.serialize_for_persistence();
        DestinationId::observe(persisted.id);

        let _guard = self.lock()?;
        let mut destinations = self.load_locked()?;

        match destinations.iter().position(|d| d.id == persisted.id) {
            Some(index) => destinations[index] = persisted.clone(),
            None => destinations.push(persisted.clone()),
        }

        self.write(&destinations)?;
        Ok(persisted)
    }

    fn delete(&self, id: DestinationId) -> Result<bool, StorageError> {
        let _guard = self.lock()?;
        let mut destinations = self.load_locked()?;
        let before = destinations.len();
        destinations.retain(|d| d.id != id);

        if destinations.len() == before {
            return Ok(false);
        }
        self.write(&destinations)?;
        Ok(true)
    }

    fn import_values(&self, payload: &Value) -> Result<Vec<Destination>, StorageError> {
        let items = payload.as_array().ok_or_else(|| {
            StorageError::Format("expected an array of destinations".to_string())
        })?;

        let destinations = dedupe_by_id(normalize_items(items, &self.key));
        let _guard = self.lock()?;
        self.write(&destinations)?;
        tracing::info!(key = %self.key, count = destinations.len(), "Imported destinations");
        Ok(destinations)
    }

    fn export_all(&self) -> Result<String, StorageError> {
        let destinations = self.load()?;
        Ok(serde_json::to_string(&destinations)?)
    }

    fn migrate_from_legacy(&self) -> Result<usize, StorageError> {
        let _guard = self.lock()?;
        let items = self.load_raw()?;
        let legacy = items.iter().filter(|item| is_legacy(item)).count();
        if legacy == 0 {
            tracing::debug!(key = %self.key, "No legacy records to migrate");
            return Ok(0);
        }

        let destinations: Vec<Destination> = items
            .iter()
            .filter(|item| item.is_object())
            .map(|item| {
                if is_legacy(item) {
                    migrate_legacy(item).serialize_for_persistence()
                } else {
                    normalize(item)
                }
            })
            .collect();

        self.write(&destinations)?;
        tracing::info!(key = %self.key, migrated = legacy, "Migrated legacy records");
        Ok(legacy)
    }
}
