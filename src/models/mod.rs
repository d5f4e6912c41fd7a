//! Data models for Siren entities.
//!
//! This module defines the core data structures:
//! - `Unit` - A responder vehicle with kind, position and status
//! - `Incident` - A reported emergency with priority, location and an optional assignee
//! - `Role` - The operator role recorded by the session flag
//!
//! Every enum serializes as kebab-case (`en-route`, `in-progress`) and parses
//! case-insensitively with a few spellings the dashboards used (`En Route`,
//! `On Call`, `off_duty`).

pub mod geo;

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalize a user-supplied enum value: lowercase, with spaces and underscores as dashes.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace([' ', '_'], "-")
}

/// Kind of responder vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitKind {
    Ambulance,
    Police,
}

impl UnitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitKind::Ambulance => "ambulance",
            UnitKind::Police => "police",
        }
    }
}

impl FromStr for UnitKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "ambulance" | "amb" => Ok(UnitKind::Ambulance),
            "police" | "pol" => Ok(UnitKind::Police),
            _ => Err(Error::InvalidInput(format!("Invalid unit kind: {}", s))),
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unit status as reported from the driver dashboard.
///
/// Transitions are unconstrained: any status can follow any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitStatus {
    #[default]
    Available,
    EnRoute,
    OnScene,
    Returning,
    OffDuty,
}

impl UnitStatus {
    /// All unit statuses, in dashboard order.
    pub const ALL: [UnitStatus; 5] = [
        UnitStatus::Available,
        UnitStatus::EnRoute,
        UnitStatus::OnScene,
        UnitStatus::Returning,
        UnitStatus::OffDuty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnitStatus::Available => "available",
            UnitStatus::EnRoute => "en-route",
            UnitStatus::OnScene => "on-scene",
            UnitStatus::Returning => "returning",
            UnitStatus::OffDuty => "off-duty",
        }
    }

    /// Whether the unit counts as on duty for the police board.
    pub fn is_on_duty(&self) -> bool {
        !matches!(self, UnitStatus::OffDuty)
    }
}

impl FromStr for UnitStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "available" => Ok(UnitStatus::Available),
            "en-route" | "enroute" => Ok(UnitStatus::EnRoute),
            "on-scene" | "onscene" | "on-call" => Ok(UnitStatus::OnScene),
            "returning" => Ok(UnitStatus::Returning),
            "off-duty" | "offduty" => Ok(UnitStatus::OffDuty),
            _ => Err(Error::InvalidInput(format!("Invalid unit status: {}", s))),
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Incident priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncidentPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl IncidentPriority {
    pub const ALL: [IncidentPriority; 3] = [
        IncidentPriority::High,
        IncidentPriority::Medium,
        IncidentPriority::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentPriority::High => "high",
            IncidentPriority::Medium => "medium",
            IncidentPriority::Low => "low",
        }
    }
}

impl FromStr for IncidentPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "high" => Ok(IncidentPriority::High),
            "medium" | "med" => Ok(IncidentPriority::Medium),
            "low" => Ok(IncidentPriority::Low),
            _ => Err(Error::InvalidInput(format!("Invalid priority: {}", s))),
        }
    }
}

impl fmt::Display for IncidentPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Incident lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IncidentStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
}

impl IncidentStatus {
    pub const ALL: [IncidentStatus; 3] = [
        IncidentStatus::Pending,
        IncidentStatus::InProgress,
        IncidentStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::Pending => "pending",
            IncidentStatus::InProgress => "in-progress",
            IncidentStatus::Resolved => "resolved",
        }
    }

    /// Open incidents are the ones that hold a unit.
    pub fn is_open(&self) -> bool {
        !matches!(self, IncidentStatus::Resolved)
    }
}

impl FromStr for IncidentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "pending" => Ok(IncidentStatus::Pending),
            "in-progress" | "inprogress" => Ok(IncidentStatus::InProgress),
            "resolved" => Ok(IncidentStatus::Resolved),
            _ => Err(Error::InvalidInput(format!(
                "Invalid incident status: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator role recorded by the session flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Driver,
    Police,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Driver => "driver",
            Role::Police => "police",
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize(s).as_str() {
            "driver" => Ok(Role::Driver),
            "police" | "officer" => Ok(Role::Police),
            _ => Err(Error::InvalidInput(format!(
                "Invalid role: {} (expected driver or police)",
                s
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Reject non-finite or out-of-range coordinates.
    pub fn validate(&self) -> Result<()> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidInput(format!(
                "latitude must be within -90..90, got {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidInput(format!(
                "longitude must be within -180..180, got {}",
                self.longitude
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A responder vehicle tracked by the fleet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Unique identifier (e.g., "AMB-001", "UNIT-04")
    pub id: String,

    /// Vehicle kind
    pub kind: UnitKind,

    /// Last reported position
    pub position: Position,

    /// Current status
    #[serde(default)]
    pub status: UnitStatus,

    /// Crew label shown on the police board (e.g., "Officer Smith")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callsign: Option<String>,

    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Unit {
    /// Register a new unit. Units start `available`.
    pub fn new(id: impl Into<String>, kind: UnitKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            status: UnitStatus::default(),
            callsign: None,
            updated_at: Utc::now(),
        }
    }

    pub fn with_status(mut self, status: UnitStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_callsign(mut self, callsign: impl Into<String>) -> Self {
        self.callsign = Some(callsign.into());
        self
    }
}

/// A reported emergency event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    /// Unique identifier (e.g., "INC-001")
    pub id: String,

    /// Free-text category (e.g., "Traffic Accident")
    pub category: String,

    pub priority: IncidentPriority,

    pub location: Position,

    #[serde(default)]
    pub status: IncidentStatus,

    /// Id of the responding unit. Non-owning: the unit lives in the store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_unit: Option<String>,

    /// Street address as reported
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Caller's description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Report timestamp
    #[serde(default = "Utc::now")]
    pub reported_at: DateTime<Utc>,

    /// Last update timestamp
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Incident {
    /// Create a new pending, unassigned incident.
    pub fn new(
        id: impl Into<String>,
        category: impl Into<String>,
        priority: IncidentPriority,
        location: Position,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            category: category.into(),
            priority,
            location,
            status: IncidentStatus::default(),
            assigned_unit: None,
            address: None,
            description: None,
            reported_at: now,
            updated_at: now,
        }
    }

    pub fn with_status(mut self, status: IncidentStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_assigned_unit(mut self, unit_id: impl Into<String>) -> Self {
        self.assigned_unit = Some(unit_id.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_status_parse_aliases() {
        assert_eq!("available".parse::<UnitStatus>().unwrap(), UnitStatus::Available);
        assert_eq!("En Route".parse::<UnitStatus>().unwrap(), UnitStatus::EnRoute);
        assert_eq!("on_scene".parse::<UnitStatus>().unwrap(), UnitStatus::OnScene);
        assert_eq!("On Call".parse::<UnitStatus>().unwrap(), UnitStatus::OnScene);
        assert_eq!("OFF-DUTY".parse::<UnitStatus>().unwrap(), UnitStatus::OffDuty);
        assert!("parked".parse::<UnitStatus>().is_err());
    }

    #[test]
    fn test_unit_status_serde_kebab_case() {
        let json = serde_json::to_string(&UnitStatus::EnRoute).unwrap();
        assert_eq!(json, "\"en-route\"");
        let status: UnitStatus = serde_json::from_str("\"off-duty\"").unwrap();
        assert_eq!(status, UnitStatus::OffDuty);
    }

    #[test]
    fn test_unit_status_display_matches_parse() {
        for status in UnitStatus::ALL {
            assert_eq!(status.to_string().parse::<UnitStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_incident_status_open() {
        assert!(IncidentStatus::Pending.is_open());
        assert!(IncidentStatus::InProgress.is_open());
        assert!(!IncidentStatus::Resolved.is_open());
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("driver".parse::<Role>().unwrap(), Role::Driver);
        assert_eq!("Police".parse::<Role>().unwrap(), Role::Police);
        assert_eq!("officer".parse::<Role>().unwrap(), Role::Police);
        let err = "dispatcher".parse::<Role>().unwrap_err();
        assert!(err.to_string().contains("expected driver or police"));
    }

    #[test]
    fn test_position_validate() {
        assert!(Position::new(40.7128, -74.0060).validate().is_ok());
        assert!(Position::new(91.0, 0.0).validate().is_err());
        assert!(Position::new(0.0, -181.0).validate().is_err());
        assert!(Position::new(f64::NAN, 0.0).validate().is_err());
    }

    #[test]
    fn test_incident_new_defaults() {
        let incident = Incident::new(
            "INC-010",
            "Structure Fire",
            IncidentPriority::High,
            Position::new(40.0, -73.0),
        );
        assert_eq!(incident.status, IncidentStatus::Pending);
        assert!(incident.assigned_unit.is_none());
        assert!(incident.is_open());
    }

    #[test]
    fn test_incident_deserialize_minimal() {
        let json = r#"{
            "id": "INC-100",
            "category": "Noise Complaint",
            "priority": "low",
            "location": {"latitude": 40.7, "longitude": -73.9}
        }"#;
        let incident: Incident = serde_json::from_str(json).unwrap();
        assert_eq!(incident.status, IncidentStatus::Pending);
        assert_eq!(incident.priority, IncidentPriority::Low);
        assert!(incident.assigned_unit.is_none());
    }
}
