//! In-memory entity store for units and incidents.
//!
//! The store keeps each entity kind in insertion order. Upserting an existing
//! id replaces the record in place, so listing order never changes on update.
//! Deleting removes the record and closes the gap.
//!
//! Upserts enforce the referential rules of the model:
//! - an incident's `assigned_unit` must name a unit in the store
//! - a unit is the assignee of at most one open incident

pub mod fixtures;

use crate::models::{Incident, Unit};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Records that can be stored in a [`Table`].
trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Unit {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Incident {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Insertion-ordered map from id to record.
#[derive(Debug, Clone)]
struct Table<T> {
    rows: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Keyed> Table<T> {
    fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&i| &self.rows[i])
    }

    /// Insert or replace in place. Returns true if the id was new.
    fn upsert(&mut self, row: T) -> bool {
        match self.index.get(row.key()) {
            Some(&i) => {
                self.rows[i] = row;
                false
            }
            None => {
                self.index.insert(row.key().to_string(), self.rows.len());
                self.rows.push(row);
                true
            }
        }
    }

    fn remove(&mut self, id: &str) -> Option<T> {
        let i = self.index.remove(id)?;
        let row = self.rows.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(row)
    }

    fn rows(&self) -> &[T] {
        &self.rows
    }
}

/// Serializable snapshot of a store, used for roster files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub incidents: Vec<Incident>,
}

impl Roster {
    /// Load a roster from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Other(format!("Failed to read roster {}: {}", path.display(), e))
        })?;
        let roster = serde_json::from_str(&content)?;
        Ok(roster)
    }
}

/// Unit and incident records for a single session.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    units: Table<Unit>,
    incidents: Table<Incident>,
}

impl EntityStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a roster. Units are loaded before incidents so that
    /// assignments resolve; every record goes through the upsert checks.
    ///
    /// A repeated unit or incident id is `InvalidInput`.
    pub fn from_roster(roster: Roster) -> Result<Self> {
        let mut store = Self::new();
        for unit in roster.units {
            if store.find_unit(&unit.id).is_some() {
                return Err(Error::InvalidInput(format!(
                    "duplicate unit id in roster: {}",
                    unit.id
                )));
            }
            store.upsert_unit(unit)?;
        }
        for incident in roster.incidents {
            if store.find_incident(&incident.id).is_some() {
                return Err(Error::InvalidInput(format!(
                    "duplicate incident id in roster: {}",
                    incident.id
                )));
            }
            store.upsert_incident(incident)?;
        }
        debug!(
            units = store.units.rows().len(),
            incidents = store.incidents.rows().len(),
            "loaded roster"
        );
        Ok(store)
    }

    /// Snapshot the store as a roster, preserving order.
    pub fn to_roster(&self) -> Roster {
        Roster {
            units: self.units.rows().to_vec(),
            incidents: self.incidents.rows().to_vec(),
        }
    }

    // === Units ===

    /// Get a unit by id, or `None` if absent.
    pub fn find_unit(&self, id: &str) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Get a unit by id.
    pub fn get_unit(&self, id: &str) -> Result<&Unit> {
        self.find_unit(id)
            .ok_or_else(|| Error::NotFound(format!("Unit not found: {}", id)))
    }

    /// Insert or replace a unit. Returns true if the unit was new.
    pub fn upsert_unit(&mut self, unit: Unit) -> Result<bool> {
        validate_id(&unit.id, "unit")?;
        unit.position.validate()?;
        Ok(self.units.upsert(unit))
    }

    /// All units in registration order.
    pub fn list_units(&self) -> &[Unit] {
        self.units.rows()
    }

    /// Remove a unit. Fails while any incident still references it.
    pub fn delete_unit(&mut self, id: &str) -> Result<Unit> {
        self.get_unit(id)?;
        if let Some(incident) = self
            .incidents
            .rows()
            .iter()
            .find(|i| i.assigned_unit.as_deref() == Some(id))
        {
            return Err(Error::Conflict(format!(
                "Unit {} is assigned to incident {}",
                id, incident.id
            )));
        }
        self.units
            .remove(id)
            .ok_or_else(|| Error::NotFound(format!("Unit not found: {}", id)))
    }

    // === Incidents ===

    /// Get an incident by id, or `None` if absent.
    pub fn find_incident(&self, id: &str) -> Option<&Incident> {
        self.incidents.get(id)
    }

    /// Get an incident by id.
    pub fn get_incident(&self, id: &str) -> Result<&Incident> {
        self.find_incident(id)
            .ok_or_else(|| Error::NotFound(format!("Incident not found: {}", id)))
    }

    /// Insert or replace an incident. Returns true if the incident was new.
    ///
    /// Fails with `NotFound` if the assigned unit does not exist, and with
    /// `Conflict` if the incident is open and its unit already works a
    /// different open incident.
    pub fn upsert_incident(&mut self, incident: Incident) -> Result<bool> {
        validate_id(&incident.id, "incident")?;
        if incident.category.trim().is_empty() {
            return Err(Error::InvalidInput(
                "incident category cannot be empty".to_string(),
            ));
        }
        incident.location.validate()?;

        if let Some(ref unit_id) = incident.assigned_unit {
            self.get_unit(unit_id)?;
            if incident.is_open() {
                if let Some(other) = self.open_incident_for(unit_id) {
                    if other.id != incident.id {
                        return Err(Error::Conflict(format!(
                            "Unit {} is already assigned to open incident {}",
                            unit_id, other.id
                        )));
                    }
                }
            }
        }

        Ok(self.incidents.upsert(incident))
    }

    /// All incidents in report order.
    pub fn list_incidents(&self) -> &[Incident] {
        self.incidents.rows()
    }

    /// Open (pending or in-progress) incidents in report order.
    pub fn open_incidents(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.rows().iter().filter(|i| i.is_open())
    }

    /// Remove an incident.
    pub fn delete_incident(&mut self, id: &str) -> Result<Incident> {
        self.incidents
            .remove(id)
            .ok_or_else(|| Error::NotFound(format!("Incident not found: {}", id)))
    }

    /// The open incident a unit is working, if any.
    pub fn open_incident_for(&self, unit_id: &str) -> Option<&Incident> {
        self.open_incidents()
            .find(|i| i.assigned_unit.as_deref() == Some(unit_id))
    }

    /// Next sequential incident id (`INC-NNN`).
    ///
    /// One past the highest numeric `INC-` suffix in the store; ids in other
    /// formats are ignored. Fails with `InvalidInput` once the sequence is
    /// exhausted.
    pub fn next_incident_id(&self) -> Result<String> {
        let max = self
            .incidents
            .rows()
            .iter()
            .filter_map(|i| i.id.strip_prefix("INC-"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        let next = max.checked_add(1).ok_or_else(|| {
            Error::InvalidInput(format!("incident id sequence exhausted at INC-{}", max))
        })?;
        Ok(format!("INC-{:03}", next))
    }
}

fn validate_id(id: &str, what: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} id cannot be empty", what)));
    }
    if id.chars().any(char::is_whitespace) {
        return Err(Error::InvalidInput(format!(
            "{} id cannot contain whitespace: {:?}",
            what, id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IncidentPriority, IncidentStatus, Position, UnitKind, UnitStatus};

    fn pos() -> Position {
        Position::new(40.75, -73.99)
    }

    fn unit(id: &str) -> Unit {
        Unit::new(id, UnitKind::Police, pos())
    }

    fn incident(id: &str) -> Incident {
        Incident::new(id, "Theft Report", IncidentPriority::Medium, pos())
    }

    fn ids<T: Keyed>(rows: &[T]) -> Vec<&str> {
        rows.iter().map(|r| r.key()).collect()
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = EntityStore::new();
        assert!(matches!(store.get_unit("UNIT-01"), Err(Error::NotFound(_))));
        assert!(matches!(store.get_incident("INC-001"), Err(Error::NotFound(_))));
        assert!(store.find_unit("UNIT-01").is_none());
    }

    #[test]
    fn test_upsert_reports_insert_vs_update() {
        let mut store = EntityStore::new();
        assert!(store.upsert_unit(unit("UNIT-01")).unwrap());
        assert!(!store.upsert_unit(unit("UNIT-01")).unwrap());
        assert_eq!(store.list_units().len(), 1);
    }

    #[test]
    fn test_list_preserves_insertion_order_across_updates() {
        let mut store = EntityStore::new();
        for id in ["UNIT-03", "UNIT-01", "UNIT-02"] {
            store.upsert_unit(unit(id)).unwrap();
        }
        store
            .upsert_unit(unit("UNIT-01").with_status(UnitStatus::OffDuty))
            .unwrap();

        assert_eq!(ids(store.list_units()), vec!["UNIT-03", "UNIT-01", "UNIT-02"]);
        assert_eq!(store.get_unit("UNIT-01").unwrap().status, UnitStatus::OffDuty);
    }

    #[test]
    fn test_incident_order_preserved_across_updates() {
        let mut store = EntityStore::new();
        store.upsert_incident(incident("INC-002")).unwrap();
        store.upsert_incident(incident("INC-001")).unwrap();
        store
            .upsert_incident(incident("INC-002").with_status(IncidentStatus::Resolved))
            .unwrap();
        assert_eq!(ids(store.list_incidents()), vec!["INC-002", "INC-001"]);
    }

    #[test]
    fn test_delete_closes_gap_and_keeps_index() {
        let mut store = EntityStore::new();
        for id in ["A-1", "B-2", "C-3"] {
            store.upsert_unit(unit(id)).unwrap();
        }
        let removed = store.delete_unit("A-1").unwrap();
        assert_eq!(removed.id, "A-1");
        assert_eq!(ids(store.list_units()), vec!["B-2", "C-3"]);
        assert_eq!(store.get_unit("C-3").unwrap().id, "C-3");

        store
            .upsert_unit(unit("C-3").with_status(UnitStatus::Returning))
            .unwrap();
        assert_eq!(ids(store.list_units()), vec!["B-2", "C-3"]);
        assert!(matches!(store.delete_unit("A-1"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_delete_referenced_unit_conflicts() {
        let mut store = EntityStore::new();
        store.upsert_unit(unit("UNIT-02")).unwrap();
        store
            .upsert_incident(
                incident("INC-003")
                    .with_status(IncidentStatus::Resolved)
                    .with_assigned_unit("UNIT-02"),
            )
            .unwrap();
        assert!(matches!(store.delete_unit("UNIT-02"), Err(Error::Conflict(_))));

        store.delete_incident("INC-003").unwrap();
        assert!(store.delete_unit("UNIT-02").is_ok());
    }

    #[test]
    fn test_upsert_incident_with_missing_unit() {
        let mut store = EntityStore::new();
        let err = store
            .upsert_incident(incident("INC-001").with_assigned_unit("UNIT-99"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(store.list_incidents().is_empty());
    }

    #[test]
    fn test_upsert_incident_enforces_one_open_incident_per_unit() {
        let mut store = EntityStore::new();
        store.upsert_unit(unit("UNIT-04")).unwrap();
        store
            .upsert_incident(incident("INC-001").with_assigned_unit("UNIT-04"))
            .unwrap();

        let err = store
            .upsert_incident(incident("INC-002").with_assigned_unit("UNIT-04"))
            .unwrap_err();
        assert!(matches!(err, Error::Conflict(_)));

        // A resolved incident may still name the unit.
        store
            .upsert_incident(
                incident("INC-002")
                    .with_status(IncidentStatus::Resolved)
                    .with_assigned_unit("UNIT-04"),
            )
            .unwrap();

        // Re-upserting the same open incident is not a conflict with itself.
        store
            .upsert_incident(incident("INC-001").with_assigned_unit("UNIT-04"))
            .unwrap();
    }

    #[test]
    fn test_upsert_rejects_bad_records() {
        let mut store = EntityStore::new();
        assert!(matches!(store.upsert_unit(unit("")), Err(Error::InvalidInput(_))));
        assert!(matches!(
            store.upsert_unit(unit("UNIT 1")),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            store.upsert_unit(Unit::new("U-1", UnitKind::Police, Position::new(100.0, 0.0))),
            Err(Error::InvalidInput(_))
        ));
        let mut blank = incident("INC-001");
        blank.category = "  ".to_string();
        assert!(matches!(store.upsert_incident(blank), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_open_incident_for() {
        let mut store = EntityStore::new();
        store.upsert_unit(unit("UNIT-02")).unwrap();
        store
            .upsert_incident(
                incident("INC-003")
                    .with_status(IncidentStatus::Resolved)
                    .with_assigned_unit("UNIT-02"),
            )
            .unwrap();
        assert!(store.open_incident_for("UNIT-02").is_none());

        store
            .upsert_incident(incident("INC-004").with_assigned_unit("UNIT-02"))
            .unwrap();
        assert_eq!(store.open_incident_for("UNIT-02").unwrap().id, "INC-004");
    }

    #[test]
    fn test_next_incident_id() {
        let mut store = EntityStore::new();
        assert_eq!(store.next_incident_id().unwrap(), "INC-001");
        store.upsert_incident(incident("INC-007")).unwrap();
        store.upsert_incident(incident("EMG-2024-001")).unwrap();
        store.upsert_incident(incident("INC-002")).unwrap();
        assert_eq!(store.next_incident_id().unwrap(), "INC-008");
    }

    #[test]
    fn test_next_incident_id_at_end_of_sequence() {
        let mut store = EntityStore::new();
        store.upsert_incident(incident("INC-4294967294")).unwrap();
        assert_eq!(store.next_incident_id().unwrap(), "INC-4294967295");

        store.upsert_incident(incident("INC-4294967295")).unwrap();
        assert!(matches!(
            store.next_incident_id(),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_roster_rejects_duplicate_ids() {
        let roster = Roster {
            units: vec![unit("U-1"), Unit::new("U-1", UnitKind::Ambulance, pos())],
            incidents: vec![],
        };
        let err = EntityStore::from_roster(roster).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("U-1")), "got {err:?}");

        let roster = Roster {
            units: vec![],
            incidents: vec![incident("INC-001"), incident("INC-001")],
        };
        assert!(matches!(
            EntityStore::from_roster(roster),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_roster_roundtrip_keeps_order() {
        let mut store = EntityStore::new();
        store.upsert_unit(unit("UNIT-02")).unwrap();
        store.upsert_unit(unit("UNIT-01")).unwrap();
        store
            .upsert_incident(incident("INC-001").with_assigned_unit("UNIT-01"))
            .unwrap();

        let json = serde_json::to_string(&store.to_roster()).unwrap();
        let roster: Roster = serde_json::from_str(&json).unwrap();
        let copy = EntityStore::from_roster(roster).unwrap();
        assert_eq!(ids(copy.list_units()), vec!["UNIT-02", "UNIT-01"]);
        assert_eq!(
            copy.get_incident("INC-001").unwrap().assigned_unit.as_deref(),
            Some("UNIT-01")
        );
    }

    #[test]
    fn test_from_roster_rejects_dangling_assignment() {
        let roster = Roster {
            units: vec![],
            incidents: vec![incident("INC-001").with_assigned_unit("GHOST-1")],
        };
        assert!(matches!(
            EntityStore::from_roster(roster),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_roster_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("roster.json");
        std::fs::write(
            &path,
            r#"{"units": [{"id": "AMB-009", "kind": "ambulance",
                "position": {"latitude": 40.7, "longitude": -74.0}}]}"#,
        )
        .unwrap();
        let roster = Roster::load(&path).unwrap();
        assert_eq!(roster.units.len(), 1);
        assert!(roster.incidents.is_empty());
        assert_eq!(roster.units[0].status, UnitStatus::Available);

        assert!(Roster::load(&dir.path().join("missing.json")).is_err());
    }
}
