//! Status policy: display semantics for unit and incident states.
//!
//! Every dashboard colors a unit status, incident priority or incident status
//! through these lookups instead of branching locally. Lookups are total: any
//! unrecognized value maps to [`token::MUTED`] with an "Unknown" label.

use crate::models::{IncidentPriority, IncidentStatus, UnitStatus};
use serde::Serialize;

/// Color tokens shared with the front-end theme.
pub mod token {
    /// Healthy / ready (green)
    pub const SUCCESS: &str = "success";
    /// Needs attention (amber)
    pub const WARNING: &str = "warning";
    /// Critical (red)
    pub const EMERGENCY: &str = "emergency";
    /// Neutral accent (blue)
    pub const PRIMARY: &str = "primary";
    /// Fallback for inactive or unrecognized values
    pub const MUTED: &str = "muted";
}

/// Hex values for each color token.
pub mod palette {
    pub const SUCCESS: &str = "#22c55e";
    pub const WARNING: &str = "#f59e0b";
    pub const EMERGENCY: &str = "#dc2626";
    pub const PRIMARY: &str = "#2563eb";
    pub const MUTED: &str = "#94a3b8";
}

/// Label used for any value the policy does not recognize.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Color token and label for a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusStyle {
    pub color: &'static str,
    pub label: &'static str,
}

impl StatusStyle {
    const fn new(color: &'static str, label: &'static str) -> Self {
        Self { color, label }
    }

    /// The fallback style for unrecognized input.
    pub const fn fallback() -> Self {
        Self::new(token::MUTED, UNKNOWN_LABEL)
    }

    /// Hex value of this style's color token.
    pub fn hex(&self) -> &'static str {
        token_hex(self.color)
    }
}

/// Get the hex value for a color token.
pub fn token_hex(color: &str) -> &'static str {
    match color {
        token::SUCCESS => palette::SUCCESS,
        token::WARNING => palette::WARNING,
        token::EMERGENCY => palette::EMERGENCY,
        token::PRIMARY => palette::PRIMARY,
        _ => palette::MUTED,
    }
}

pub fn style_unit_status(status: UnitStatus) -> StatusStyle {
    match status {
        UnitStatus::Available => StatusStyle::new(token::SUCCESS, "Available"),
        UnitStatus::EnRoute => StatusStyle::new(token::WARNING, "En Route"),
        UnitStatus::OnScene => StatusStyle::new(token::EMERGENCY, "On Scene"),
        UnitStatus::Returning => StatusStyle::new(token::PRIMARY, "Returning"),
        UnitStatus::OffDuty => StatusStyle::new(token::MUTED, "Off Duty"),
    }
}

pub fn style_priority(priority: IncidentPriority) -> StatusStyle {
    match priority {
        IncidentPriority::High => StatusStyle::new(token::EMERGENCY, "High"),
        IncidentPriority::Medium => StatusStyle::new(token::WARNING, "Medium"),
        IncidentPriority::Low => StatusStyle::new(token::SUCCESS, "Low"),
    }
}

pub fn style_incident_status(status: IncidentStatus) -> StatusStyle {
    match status {
        IncidentStatus::Pending => StatusStyle::new(token::WARNING, "Pending"),
        IncidentStatus::InProgress => StatusStyle::new(token::PRIMARY, "In Progress"),
        IncidentStatus::Resolved => StatusStyle::new(token::SUCCESS, "Resolved"),
    }
}

/// Style a raw unit status string (e.g., "en-route", "On Call").
pub fn unit_status_style(status: &str) -> StatusStyle {
    status
        .parse::<UnitStatus>()
        .map(style_unit_status)
        .unwrap_or_else(|_| StatusStyle::fallback())
}

/// Style a raw priority string (e.g., "High").
pub fn incident_priority_style(priority: &str) -> StatusStyle {
    priority
        .parse::<IncidentPriority>()
        .map(style_priority)
        .unwrap_or_else(|_| StatusStyle::fallback())
}

/// Style a raw incident status string (e.g., "In Progress").
pub fn incident_status_style(status: &str) -> StatusStyle {
    status
        .parse::<IncidentStatus>()
        .map(style_incident_status)
        .unwrap_or_else(|_| StatusStyle::fallback())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_unit_status_has_style() {
        for raw in ["available", "en-route", "on-scene", "returning", "off-duty"] {
            let style = unit_status_style(raw);
            assert!(!style.color.is_empty(), "{raw}");
            assert!(!style.label.is_empty(), "{raw}");
            assert_ne!(style.label, UNKNOWN_LABEL, "{raw}");
        }
    }

    #[test]
    fn test_unit_status_colors() {
        assert_eq!(unit_status_style("available").color, token::SUCCESS);
        assert_eq!(unit_status_style("en-route").color, token::WARNING);
        assert_eq!(unit_status_style("on-scene").color, token::EMERGENCY);
        assert_eq!(unit_status_style("returning").color, token::PRIMARY);
        assert_eq!(unit_status_style("off-duty").color, token::MUTED);
    }

    #[test]
    fn test_unit_status_dashboard_spellings() {
        assert_eq!(unit_status_style("En Route").label, "En Route");
        assert_eq!(unit_status_style("On Call").label, "On Scene");
        assert_eq!(unit_status_style("On Call").color, token::EMERGENCY);
        assert_eq!(unit_status_style("Off Duty").label, "Off Duty");
    }

    #[test]
    fn test_unknown_values_fall_back() {
        assert_eq!(unit_status_style("teleporting"), StatusStyle::fallback());
        assert_eq!(unit_status_style(""), StatusStyle::fallback());
        assert_eq!(incident_priority_style("urgent"), StatusStyle::fallback());
        assert_eq!(incident_status_style("archived"), StatusStyle::fallback());
        assert_eq!(StatusStyle::fallback().color, token::MUTED);
    }

    #[test]
    fn test_priority_colors() {
        assert_eq!(incident_priority_style("High").color, token::EMERGENCY);
        assert_eq!(incident_priority_style("medium").color, token::WARNING);
        assert_eq!(incident_priority_style("LOW").color, token::SUCCESS);
    }

    #[test]
    fn test_incident_status_labels() {
        assert_eq!(incident_status_style("In Progress").label, "In Progress");
        assert_eq!(incident_status_style("pending").label, "Pending");
        assert_eq!(incident_status_style("resolved").color, token::SUCCESS);
    }

    #[test]
    fn test_token_hex() {
        assert_eq!(token_hex(token::EMERGENCY), palette::EMERGENCY);
        assert_eq!(token_hex("nonsense"), palette::MUTED);
        assert_eq!(style_unit_status(UnitStatus::Available).hex(), palette::SUCCESS);
    }
}
