//! Unit and incident commands, the dashboards, and roster export.
//!
//! Reads are open to anyone. Mutations need a session: unit status may be set
//! by either role, everything touching incidents needs `police`.

use super::{Output, json};
use crate::dispatch::{self, Candidate};
use crate::models::geo::{distance_km, eta_minutes};
use crate::models::{
    Incident, IncidentPriority, IncidentStatus, Position, Role, Unit, UnitKind, UnitStatus,
};
use crate::policy::{self, StatusStyle};
use crate::session;
use crate::storage::Storage;
use crate::store::{EntityStore, Roster};
use crate::{Error, Result};
use serde::Serialize;

// === Views ===

/// A unit paired with its display style.
#[derive(Debug, Clone, Serialize)]
pub struct UnitView {
    #[serde(flatten)]
    pub unit: Unit,
    pub style: StatusStyle,
    /// Open incident the unit is working, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incident: Option<String>,
}

impl UnitView {
    fn new(store: &EntityStore, unit: &Unit) -> Self {
        Self {
            unit: unit.clone(),
            style: policy::style_unit_status(unit.status),
            incident: store.open_incident_for(&unit.id).map(|i| i.id.clone()),
        }
    }

    fn line(&self) -> String {
        let mut line = format!(
            "{:<8} {:<9} {:<10} {}",
            self.unit.id, self.unit.kind, self.style.label, self.unit.position
        );
        if let Some(ref callsign) = self.unit.callsign {
            line.push_str(&format!("  {}", callsign));
        }
        if let Some(ref incident) = self.incident {
            line.push_str(&format!("  -> {}", incident));
        }
        line
    }
}

impl Output for UnitView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        self.line()
    }
}

/// An incident paired with its priority and status styles.
#[derive(Debug, Clone, Serialize)]
pub struct IncidentView {
    #[serde(flatten)]
    pub incident: Incident,
    pub priority_style: StatusStyle,
    pub status_style: StatusStyle,
}

impl IncidentView {
    fn new(incident: &Incident) -> Self {
        Self {
            incident: incident.clone(),
            priority_style: policy::style_priority(incident.priority),
            status_style: policy::style_incident_status(incident.status),
        }
    }

    fn line(&self) -> String {
        format!(
            "{:<12} {:<6} {:<11} {:<8} {}",
            self.incident.id,
            self.priority_style.label,
            self.status_style.label,
            self.incident.assigned_unit.as_deref().unwrap_or("-"),
            self.incident.category
        )
    }
}

impl Output for IncidentView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let i = &self.incident;
        let mut lines = vec![
            format!("{} {}", i.id, i.category),
            format!("  Priority: {}", self.priority_style.label),
            format!("  Status:   {}", self.status_style.label),
            format!("  Unit:     {}", i.assigned_unit.as_deref().unwrap_or("unassigned")),
            format!("  Location: {}", i.location),
        ];
        if let Some(ref address) = i.address {
            lines.push(format!("  Address:  {}", address));
        }
        if let Some(ref description) = i.description {
            lines.push(format!("  Notes:    {}", description));
        }
        lines.join("\n")
    }
}

// === Units ===

#[derive(Serialize)]
pub struct UnitList {
    pub units: Vec<UnitView>,
    pub count: usize,
}

impl Output for UnitList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.units.is_empty() {
            return "No units found.".to_string();
        }
        let mut lines = vec![format!("{} unit(s):", self.count)];
        lines.extend(self.units.iter().map(|u| format!("  {}", u.line())));
        lines.join("\n")
    }
}

/// List units in registration order, optionally filtered.
pub fn unit_list(
    store: &EntityStore,
    kind: Option<UnitKind>,
    status: Option<UnitStatus>,
) -> Result<UnitList> {
    let units: Vec<UnitView> = store
        .list_units()
        .iter()
        .filter(|u| kind.is_none_or(|k| u.kind == k))
        .filter(|u| status.is_none_or(|s| u.status == s))
        .map(|u| UnitView::new(store, u))
        .collect();
    Ok(UnitList {
        count: units.len(),
        units,
    })
}

pub fn unit_show(store: &EntityStore, id: &str) -> Result<UnitView> {
    Ok(UnitView::new(store, store.get_unit(id)?))
}

/// Report a unit's status. Either role may do this.
pub fn unit_status(
    storage: &Storage,
    store: &mut EntityStore,
    id: &str,
    status: UnitStatus,
) -> Result<UnitView> {
    session::current(storage)?;
    let unit = dispatch::set_unit_status(store, id, status)?;
    Ok(UnitView::new(store, &unit))
}

// === Incidents ===

#[derive(Serialize)]
pub struct IncidentList {
    pub incidents: Vec<IncidentView>,
    pub count: usize,
}

impl Output for IncidentList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.incidents.is_empty() {
            return "No incidents found.".to_string();
        }
        let mut lines = vec![format!("{} incident(s):", self.count)];
        lines.extend(self.incidents.iter().map(|i| format!("  {}", i.line())));
        lines.join("\n")
    }
}

pub fn incident_list(store: &EntityStore, open_only: bool) -> Result<IncidentList> {
    let incidents: Vec<IncidentView> = store
        .list_incidents()
        .iter()
        .filter(|i| !open_only || i.is_open())
        .map(IncidentView::new)
        .collect();
    Ok(IncidentList {
        count: incidents.len(),
        incidents,
    })
}

pub fn incident_show(store: &EntityStore, id: &str) -> Result<IncidentView> {
    Ok(IncidentView::new(store.get_incident(id)?))
}

/// Record a new pending incident.
pub fn incident_report(
    storage: &Storage,
    store: &mut EntityStore,
    category: &str,
    priority: IncidentPriority,
    lat: f64,
    lng: f64,
) -> Result<IncidentView> {
    session::require(storage, Role::Police)?;
    let incident = dispatch::report_incident(store, category, priority, Position::new(lat, lng))?;
    Ok(IncidentView::new(&incident))
}

pub fn incident_status(
    storage: &Storage,
    store: &mut EntityStore,
    id: &str,
    status: IncidentStatus,
) -> Result<IncidentView> {
    session::require(storage, Role::Police)?;
    let incident = dispatch::set_incident_status(store, id, status)?;
    Ok(IncidentView::new(&incident))
}

pub fn incident_assign(
    storage: &Storage,
    store: &mut EntityStore,
    incident_id: &str,
    unit_id: &str,
) -> Result<IncidentView> {
    session::require(storage, Role::Police)?;
    let incident = dispatch::assign(store, incident_id, unit_id)?;
    Ok(IncidentView::new(&incident))
}

pub fn incident_unassign(
    storage: &Storage,
    store: &mut EntityStore,
    incident_id: &str,
) -> Result<IncidentView> {
    session::require(storage, Role::Police)?;
    let incident = dispatch::unassign(store, incident_id)?;
    Ok(IncidentView::new(&incident))
}

#[derive(Serialize)]
pub struct NearestResult {
    pub incident: String,
    pub candidate: Option<Candidate>,
}

impl Output for NearestResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match &self.candidate {
            Some(c) => format!(
                "Nearest available unit for {}: {} ({:.2} km, ETA {} min)",
                self.incident, c.unit.id, c.distance_km, c.eta_minutes
            ),
            None => format!("No available unit for {}", self.incident),
        }
    }
}

pub fn incident_nearest(
    store: &EntityStore,
    incident_id: &str,
    kind: Option<UnitKind>,
) -> Result<NearestResult> {
    Ok(NearestResult {
        incident: incident_id.to_string(),
        candidate: dispatch::nearest_available(store, incident_id, kind)?,
    })
}

// === Boards ===

/// Dispatcher overview.
#[derive(Serialize)]
pub struct PoliceBoard {
    pub active_incidents: usize,
    pub units_on_duty: usize,
    pub incidents: Vec<IncidentView>,
    pub units: Vec<UnitView>,
}

/// The open call assigned to a unit, with travel estimates from the unit.
#[derive(Serialize)]
pub struct ActiveCall {
    #[serde(flatten)]
    pub incident: IncidentView,
    pub distance_km: f64,
    pub eta_minutes: u32,
}

/// One unit's view of its own status and call.
#[derive(Serialize)]
pub struct DriverBoard {
    pub unit: UnitView,
    pub call: Option<ActiveCall>,
}

#[derive(Serialize)]
#[serde(tag = "board", rename_all = "kebab-case")]
pub enum Board {
    Police(PoliceBoard),
    Driver(DriverBoard),
}

impl Output for Board {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match self {
            Board::Police(b) => {
                let mut lines = vec![
                    format!(
                        "Active incidents: {}   Units on duty: {}",
                        b.active_incidents, b.units_on_duty
                    ),
                    String::new(),
                    "Incidents:".to_string(),
                ];
                lines.extend(b.incidents.iter().map(|i| format!("  {}", i.line())));
                lines.push(String::new());
                lines.push("Units:".to_string());
                lines.extend(b.units.iter().map(|u| format!("  {}", u.line())));
                lines.join("\n")
            }
            Board::Driver(b) => {
                let mut lines = vec![format!("{} [{}]", b.unit.unit.id, b.unit.style.label)];
                match &b.call {
                    Some(call) => {
                        let i = &call.incident.incident;
                        lines.push(format!(
                            "Active call: {} {} ({})",
                            i.id, i.category, call.incident.priority_style.label
                        ));
                        if let Some(ref address) = i.address {
                            lines.push(format!("  {}", address));
                        }
                        lines.push(format!(
                            "  {:.2} km away, ETA {} min",
                            call.distance_km, call.eta_minutes
                        ));
                    }
                    None => lines.push("No active call".to_string()),
                }
                lines.join("\n")
            }
        }
    }
}

pub fn police_board(store: &EntityStore) -> PoliceBoard {
    let incidents: Vec<IncidentView> = store.open_incidents().map(IncidentView::new).collect();
    let units: Vec<UnitView> = store
        .list_units()
        .iter()
        .map(|u| UnitView::new(store, u))
        .collect();
    PoliceBoard {
        active_incidents: incidents.len(),
        units_on_duty: units.iter().filter(|u| u.unit.status.is_on_duty()).count(),
        incidents,
        units,
    }
}

pub fn driver_board(store: &EntityStore, unit_id: &str) -> Result<DriverBoard> {
    let unit = store.get_unit(unit_id)?;
    let call = store.open_incident_for(unit_id).map(|incident| {
        let distance = distance_km(&unit.position, &incident.location);
        ActiveCall {
            incident: IncidentView::new(incident),
            distance_km: distance,
            eta_minutes: eta_minutes(distance),
        }
    });
    Ok(DriverBoard {
        unit: UnitView::new(store, unit),
        call,
    })
}

/// Show the board for the logged-in role.
///
/// With `unit` the driver board for that unit is shown to either role;
/// without it police get the dispatcher overview and drivers get an error.
pub fn board(storage: &Storage, store: &EntityStore, unit: Option<&str>) -> Result<Board> {
    let session = session::current(storage)?;
    match (unit, session.role) {
        (Some(unit_id), _) => Ok(Board::Driver(driver_board(store, unit_id)?)),
        (None, Role::Police) => Ok(Board::Police(police_board(store))),
        (None, Role::Driver) => Err(Error::InvalidInput(
            "driver board needs a unit: sn board --unit <ID>".to_string(),
        )),
    }
}

// === Style ===

/// Value domains the status policy can style.
pub const STYLE_DOMAINS: &[&str] = &["unit-status", "priority", "incident-status"];

#[derive(Serialize)]
pub struct StyleResult {
    pub domain: String,
    pub value: String,
    #[serde(flatten)]
    pub style: StatusStyle,
    pub hex: &'static str,
}

impl Output for StyleResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        format!("{} -> {} ({}, {})", self.value, self.style.label, self.style.color, self.hex)
    }
}

/// Look up the style for a raw value. Unknown values get the fallback style.
pub fn style(domain: &str, value: &str) -> Result<StyleResult> {
    let style = match domain {
        "unit-status" => policy::unit_status_style(value),
        "priority" => policy::incident_priority_style(value),
        "incident-status" => policy::incident_status_style(value),
        _ => {
            return Err(Error::InvalidInput(format!(
                "unknown style domain {} (expected one of: {})",
                domain,
                STYLE_DOMAINS.join(", ")
            )));
        }
    };
    Ok(StyleResult {
        domain: domain.to_string(),
        value: value.to_string(),
        hex: style.hex(),
        style,
    })
}

// === Roster ===

impl Output for Roster {
    fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
    }

    fn to_human(&self) -> String {
        let open = self.incidents.iter().filter(|i| i.is_open()).count();
        format!(
            "{} units, {} incidents ({} open)",
            self.units.len(),
            self.incidents.len(),
            open
        )
    }
}

pub fn roster_export(store: &EntityStore) -> Result<Roster> {
    Ok(store.to_roster())
}
