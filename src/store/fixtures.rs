//! Built-in demo roster used when no roster file is given.

use super::{EntityStore, Roster};
use crate::Result;
use crate::models::{
    Incident, IncidentPriority, IncidentStatus, Position, Unit, UnitKind, UnitStatus,
};

/// The demo fleet and incident log.
pub fn demo_roster() -> Roster {
    let units = vec![
        Unit::new("AMB-001", UnitKind::Ambulance, Position::new(40.7128, -74.0060)),
        Unit::new("AMB-002", UnitKind::Ambulance, Position::new(40.7589, -73.9851))
            .with_status(UnitStatus::EnRoute),
        Unit::new("POL-001", UnitKind::Police, Position::new(40.7505, -73.9934))
            .with_status(UnitStatus::OnScene),
        Unit::new("POL-002", UnitKind::Police, Position::new(40.7282, -73.9942)),
        Unit::new("UNIT-01", UnitKind::Police, Position::new(40.7411, -73.9897))
            .with_callsign("Officer Smith"),
        Unit::new("UNIT-02", UnitKind::Police, Position::new(40.7150, -74.0020))
            .with_status(UnitStatus::OnScene)
            .with_callsign("Officer Johnson"),
        Unit::new("UNIT-03", UnitKind::Police, Position::new(40.7831, -73.9712))
            .with_callsign("Officer Davis"),
        Unit::new("UNIT-04", UnitKind::Police, Position::new(40.7359, -73.9911))
            .with_status(UnitStatus::EnRoute)
            .with_callsign("Officer Wilson"),
    ];

    let incidents = vec![
        Incident::new(
            "INC-001",
            "Traffic Accident",
            IncidentPriority::High,
            Position::new(40.7377, -73.9920),
        )
        .with_status(IncidentStatus::InProgress)
        .with_assigned_unit("UNIT-04")
        .with_address("5th Avenue & Main St"),
        Incident::new(
            "INC-002",
            "Theft Report",
            IncidentPriority::Medium,
            Position::new(40.7505, -73.9934),
        )
        .with_address("Shopping Mall"),
        Incident::new(
            "INC-003",
            "Domestic Dispute",
            IncidentPriority::High,
            Position::new(40.7162, -74.0018),
        )
        .with_status(IncidentStatus::Resolved)
        .with_assigned_unit("UNIT-02")
        .with_address("Residential Area"),
        Incident::new(
            "EMG-2024-001",
            "Medical Emergency",
            IncidentPriority::High,
            Position::new(40.7614, -73.9776),
        )
        .with_address("123 Main Street, Downtown")
        .with_description("Chest pain, conscious and breathing"),
    ];

    Roster { units, incidents }
}

/// A store loaded with [`demo_roster`].
pub fn demo_store() -> Result<EntityStore> {
    EntityStore::from_roster(demo_roster())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_store_loads() {
        let store = demo_store().unwrap();
        assert_eq!(store.list_units().len(), 8);
        assert_eq!(store.list_incidents().len(), 4);
        assert_eq!(store.open_incidents().count(), 3);
    }

    #[test]
    fn test_demo_assignments() {
        let store = demo_store().unwrap();
        assert_eq!(store.open_incident_for("UNIT-04").unwrap().id, "INC-001");
        // UNIT-02 is only on a resolved incident
        assert!(store.open_incident_for("UNIT-02").is_none());
        assert!(store.get_incident("INC-002").unwrap().assigned_unit.is_none());
    }
}
