use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Display name of a tracked listing, unique within a catalog.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub String);

impl PropertyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PropertyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub url: String,
}

impl Property {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: PropertyId(id.into()),
            url: url.into(),
        }
    }
}

/// Canonical availability of a listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Available,
    NotAvailable,
    Unknown,
}

impl Status {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::NotAvailable => "not_available",
            Self::Unknown => "unknown",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::NotAvailable => "Not Available",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a pass alerts on transitions only or on everything currently vacant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    #[default]
    Scheduled,
    Manual,
}

impl RunMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Some(Self::Scheduled),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Manual => "manual",
        }
    }
}

/// Last known status per property.
///
/// Entries that were filled in by default (no prior observation on record) are tracked
/// separately so the detector can tell a first registration from a genuine
/// `not_available` reading. Only the statuses are ever persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusRecord {
    entries: BTreeMap<PropertyId, Status>,
    defaulted: BTreeSet<PropertyId>,
}

impl StatusRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: BTreeMap<PropertyId, Status>) -> Self {
        Self {
            entries,
            defaulted: BTreeSet::new(),
        }
    }

    /// Status on record, `not_available` when the property has never been stored.
    pub fn get(&self, id: &PropertyId) -> Status {
        self.entries
            .get(id)
            .copied()
            .unwrap_or(Status::NotAvailable)
    }

    pub fn contains(&self, id: &PropertyId) -> bool {
        self.entries.contains_key(id)
    }

    /// True when no observation for `id` has ever been recorded.
    pub fn is_first_registration(&self, id: &PropertyId) -> bool {
        !self.entries.contains_key(id) || self.defaulted.contains(id)
    }

    /// Records an observed status, clearing any default marker.
    pub fn set(&mut self, id: PropertyId, status: Status) {
        self.defaulted.remove(&id);
        self.entries.insert(id, status);
    }

    /// Inserts a `not_available` placeholder unless an entry already exists.
    pub fn register_default(&mut self, id: PropertyId) {
        if !self.entries.contains_key(&id) {
            self.entries.insert(id.clone(), Status::NotAvailable);
            self.defaulted.insert(id);
        }
    }

    pub fn entries(&self) -> &BTreeMap<PropertyId, Status> {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyId, Status)> {
        self.entries.iter().map(|(id, status)| (id, *status))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(PropertyId, Status)> for StatusRecord {
    fn from_iter<T: IntoIterator<Item = (PropertyId, Status)>>(iter: T) -> Self {
        Self::from_entries(iter.into_iter().collect())
    }
}

/// One status per tracked property, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observations {
    entries: Vec<(Property, Status)>,
}

impl Observations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `status` for `property`; a repeated property overwrites its earlier reading
    /// in place so the original order is kept.
    pub fn record(&mut self, property: Property, status: Status) {
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.id == property.id)
        {
            Some(entry) => entry.1 = status,
            None => self.entries.push((property, status)),
        }
    }

    pub fn get(&self, id: &PropertyId) -> Option<Status> {
        self.entries
            .iter()
            .find(|(property, _)| &property.id == id)
            .map(|(_, status)| *status)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Property, Status)> {
        self.entries
            .iter()
            .map(|(property, status)| (property, *status))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(Property, Status)> for Observations {
    fn from_iter<T: IntoIterator<Item = (Property, Status)>>(iter: T) -> Self {
        let mut observations = Self::new();
        for (property, status) in iter {
            observations.record(property, status);
        }
        observations
    }
}

/// A property that moved from `not_available` to `available` during one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionEvent {
    pub property: Property,
    pub status: Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_as_snake_case() {
        let json = serde_json::to_string(&Status::NotAvailable).expect("serializes");
        assert_eq!(json, "\"not_available\"");
        let parsed: Status = serde_json::from_str("\"unknown\"").expect("parses");
        assert_eq!(parsed, Status::Unknown);
    }

    #[test]
    fn missing_entries_read_as_not_available_first_registrations() {
        let record = StatusRecord::new();
        let id = PropertyId::from("Maple Court");
        assert_eq!(record.get(&id), Status::NotAvailable);
        assert!(record.is_first_registration(&id));
    }

    #[test]
    fn set_clears_default_marker() {
        let mut record = StatusRecord::new();
        let id = PropertyId::from("Maple Court");
        record.register_default(id.clone());
        assert!(record.is_first_registration(&id));
        record.set(id.clone(), Status::Unknown);
        assert!(!record.is_first_registration(&id));
        assert_eq!(record.get(&id), Status::Unknown);
    }

    #[test]
    fn register_default_keeps_existing_entries() {
        let id = PropertyId::from("Maple Court");
        let mut record: StatusRecord = [(id.clone(), Status::Available)].into_iter().collect();
        record.register_default(id.clone());
        assert_eq!(record.get(&id), Status::Available);
        assert!(!record.is_first_registration(&id));
    }

    #[test]
    fn observations_keep_first_position_on_overwrite() {
        let a = Property::new("A", "https://example.com/a");
        let b = Property::new("B", "https://example.com/b");
        let mut observations = Observations::new();
        observations.record(a.clone(), Status::Unknown);
        observations.record(b.clone(), Status::NotAvailable);
        observations.record(a.clone(), Status::Available);

        let order: Vec<_> = observations
            .iter()
            .map(|(property, status)| (property.id.as_str().to_string(), status))
            .collect();
        assert_eq!(
            order,
            vec![
                ("A".to_string(), Status::Available),
                ("B".to_string(), Status::NotAvailable)
            ]
        );
    }

    #[test]
    fn run_mode_parse_is_case_insensitive() {
        assert_eq!(RunMode::parse(" MANUAL "), Some(RunMode::Manual));
        assert_eq!(RunMode::parse("scheduled"), Some(RunMode::Scheduled));
        assert_eq!(RunMode::parse("nightly"), None);
    }
}
