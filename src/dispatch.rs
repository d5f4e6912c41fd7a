//! Dispatch operations over the entity store.
//!
//! The assignment rule lives here: an incident has at most one assigned unit,
//! and a unit works at most one open incident at a time. Status changes and
//! incident reports also go through this module so every mutation is logged
//! in one place.

use crate::models::geo::{distance_km, eta_minutes};
use crate::models::{
    Incident, IncidentPriority, IncidentStatus, Position, Unit, UnitKind, UnitStatus,
};
use crate::store::EntityStore;
use crate::{Error, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

/// Assign a unit to an incident and return the updated incident.
///
/// Re-assigning the same pair is a no-op. Assigning a different unit to an
/// already-assigned incident replaces the previous assignee.
///
/// # Errors
/// - `NotFound` if either id is absent from the store
/// - `Conflict` if the incident is resolved, or the unit is already assigned
///   to a different open incident
pub fn assign(store: &mut EntityStore, incident_id: &str, unit_id: &str) -> Result<Incident> {
    let incident = store.get_incident(incident_id)?;
    store.get_unit(unit_id)?;

    if !incident.is_open() {
        return Err(Error::Conflict(format!(
            "Incident {} is resolved and cannot take a unit",
            incident_id
        )));
    }

    if let Some(other) = store.open_incident_for(unit_id) {
        if other.id != incident_id {
            return Err(Error::Conflict(format!(
                "Unit {} is already assigned to open incident {}",
                unit_id, other.id
            )));
        }
    }

    if incident.assigned_unit.as_deref() == Some(unit_id) {
        debug!(incident = incident_id, unit = unit_id, "already assigned");
        return Ok(incident.clone());
    }

    let mut updated = incident.clone();
    let previous = updated.assigned_unit.replace(unit_id.to_string());
    updated.updated_at = Utc::now();
    store.upsert_incident(updated.clone())?;

    info!(
        incident = incident_id,
        unit = unit_id,
        previous = previous.as_deref().unwrap_or("-"),
        "assigned unit"
    );
    Ok(updated)
}

/// Clear an incident's assignee and return the incident.
///
/// Idempotent: an already-unassigned incident is returned unchanged.
pub fn unassign(store: &mut EntityStore, incident_id: &str) -> Result<Incident> {
    let incident = store.get_incident(incident_id)?;
    if incident.assigned_unit.is_none() {
        debug!(incident = incident_id, "already unassigned");
        return Ok(incident.clone());
    }

    let mut updated = incident.clone();
    let previous = updated.assigned_unit.take();
    updated.updated_at = Utc::now();
    store.upsert_incident(updated.clone())?;

    info!(
        incident = incident_id,
        previous = previous.as_deref().unwrap_or("-"),
        "unassigned unit"
    );
    Ok(updated)
}

/// Report a unit's status. Any status may follow any other.
pub fn set_unit_status(store: &mut EntityStore, unit_id: &str, status: UnitStatus) -> Result<Unit> {
    let mut unit = store.get_unit(unit_id)?.clone();
    let previous = unit.status;
    unit.status = status;
    unit.updated_at = Utc::now();
    store.upsert_unit(unit.clone())?;

    info!(unit = unit_id, from = %previous, to = %status, "unit status changed");
    Ok(unit)
}

/// Change an incident's status.
///
/// Re-opening a resolved incident keeps its assignee, which fails with
/// `Conflict` if that unit has since taken another open incident.
pub fn set_incident_status(
    store: &mut EntityStore,
    incident_id: &str,
    status: IncidentStatus,
) -> Result<Incident> {
    let mut incident = store.get_incident(incident_id)?.clone();
    let previous = incident.status;

    if status.is_open() && !previous.is_open() {
        if let Some(ref unit_id) = incident.assigned_unit {
            if let Some(other) = store.open_incident_for(unit_id) {
                return Err(Error::Conflict(format!(
                    "Cannot reopen {}: unit {} is now on open incident {}",
                    incident_id, unit_id, other.id
                )));
            }
        }
    }

    incident.status = status;
    incident.updated_at = Utc::now();
    store.upsert_incident(incident.clone())?;

    info!(incident = incident_id, from = %previous, to = %status, "incident status changed");
    Ok(incident)
}

/// Record a new pending incident with the next sequential id.
pub fn report_incident(
    store: &mut EntityStore,
    category: &str,
    priority: IncidentPriority,
    location: Position,
) -> Result<Incident> {
    let category = category.trim();
    if category.is_empty() {
        return Err(Error::InvalidInput(
            "incident category cannot be empty".to_string(),
        ));
    }

    let incident = Incident::new(store.next_incident_id()?, category, priority, location);
    store.upsert_incident(incident.clone())?;

    info!(incident = %incident.id, category, priority = %priority, "incident reported");
    Ok(incident)
}

/// A unit that could respond to an incident, with travel estimates.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub unit: Unit,
    pub distance_km: f64,
    pub eta_minutes: u32,
}

impl Candidate {
    /// Estimate travel from `unit` to `location`.
    pub fn new(unit: &Unit, location: &Position) -> Self {
        let distance = distance_km(&unit.position, location);
        Self {
            unit: unit.clone(),
            distance_km: distance,
            eta_minutes: eta_minutes(distance),
        }
    }
}

/// The closest available unit that is free to take the incident.
///
/// Candidates are `available` units not working another open incident,
/// optionally restricted to one kind. Ties go to the earlier-registered unit.
/// Returns `Ok(None)` when nothing qualifies.
pub fn nearest_available(
    store: &EntityStore,
    incident_id: &str,
    kind: Option<UnitKind>,
) -> Result<Option<Candidate>> {
    let incident = store.get_incident(incident_id)?;

    let mut best: Option<Candidate> = None;
    for unit in store.list_units() {
        if unit.status != UnitStatus::Available {
            continue;
        }
        if kind.is_some_and(|k| k != unit.kind) {
            continue;
        }
        if let Some(other) = store.open_incident_for(&unit.id) {
            if other.id != incident.id {
                continue;
            }
        }

        let candidate = Candidate::new(unit, &incident.location);
        let closer = best
            .as_ref()
            .is_none_or(|b| candidate.distance_km < b.distance_km);
        if closer {
            best = Some(candidate);
        }
    }

    debug!(
        incident = incident_id,
        unit = best.as_ref().map(|c| c.unit.id.as_str()).unwrap_or("-"),
        "nearest available"
    );
    Ok(best)
}
