//! Berth model.
//!
//! Berths are heterogeneous servers: each has physical limits, a
//! specialization, quay equipment and a maintenance calendar.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TimeWindow;

/// Berth specialization tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialization {
    Container,
    Multipurpose,
    Petroleum,
    Liquid,
    DryBulk,
    Lng,
    Gas,
    General,
    BreakBulk,
    Other(String),
}

impl Specialization {
    /// Parses a free-form specialization label.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "container" => Specialization::Container,
            "multipurpose" | "multi-purpose" => Specialization::Multipurpose,
            "petroleum" | "oil" | "tanker" => Specialization::Petroleum,
            "liquid" | "liquid-bulk" | "chemical" => Specialization::Liquid,
            "dry-bulk" | "dry_bulk" | "bulk" => Specialization::DryBulk,
            "lng" => Specialization::Lng,
            "gas" | "lpg" => Specialization::Gas,
            "general" => Specialization::General,
            "break-bulk" | "breakbulk" => Specialization::BreakBulk,
            other => Specialization::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Specialization::Container => "container",
            Specialization::Multipurpose => "multipurpose",
            Specialization::Petroleum => "petroleum",
            Specialization::Liquid => "liquid",
            Specialization::DryBulk => "dry-bulk",
            Specialization::Lng => "lng",
            Specialization::Gas => "gas",
            Specialization::General => "general",
            Specialization::BreakBulk => "break-bulk",
            Specialization::Other(s) => s.as_str(),
        };
        write!(f, "{s}")
    }
}

/// Operational status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BerthStatus {
    #[default]
    Active,
    /// Closed for the whole planning horizon.
    Maintenance,
}

/// Geographic bounding box (decimal degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoWindow {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoWindow {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Whether `inner` lies entirely inside this box.
    pub fn encloses(&self, inner: &GeoWindow) -> bool {
        inner.min_lat >= self.min_lat
            && inner.max_lat <= self.max_lat
            && inner.min_lon >= self.min_lon
            && inner.max_lon <= self.max_lon
    }
}

/// A berth that vessels can be allocated to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Berth {
    /// Unique berth identifier.
    pub id: String,
    /// Owning terminal.
    pub terminal: String,
    /// Human-readable name.
    pub name: String,
    /// Maximum vessel LOA (m).
    pub max_loa_m: f64,
    /// Maximum vessel beam (m). `None` = no beam limit.
    pub max_beam_m: Option<f64>,
    /// Water depth alongside (m).
    pub water_depth_m: f64,
    /// Quay cranes serving the berth.
    pub crane_count: u32,
    /// Specialization tag.
    pub specialization: Specialization,
    /// Operational status.
    pub status: BerthStatus,
    /// Planned maintenance / blackout periods.
    pub maintenance_windows: Vec<TimeWindow>,
    /// Location, used for special-vessel zone policy.
    pub geo_window: Option<GeoWindow>,
}

impl Berth {
    /// Creates an active general berth with the given limits.
    pub fn new(id: impl Into<String>, max_loa_m: f64, water_depth_m: f64) -> Self {
        Self {
            id: id.into(),
            terminal: String::new(),
            name: String::new(),
            max_loa_m,
            max_beam_m: None,
            water_depth_m,
            crane_count: 0,
            specialization: Specialization::General,
            status: BerthStatus::Active,
            maintenance_windows: Vec::new(),
            geo_window: None,
        }
    }

    /// Sets the owning terminal.
    pub fn with_terminal(mut self, terminal: impl Into<String>) -> Self {
        self.terminal = terminal.into();
        self
    }

    /// Sets the berth name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the beam limit (m).
    pub fn with_max_beam(mut self, max_beam_m: f64) -> Self {
        self.max_beam_m = Some(max_beam_m);
        self
    }

    /// Sets the crane count.
    pub fn with_cranes(mut self, crane_count: u32) -> Self {
        self.crane_count = crane_count;
        self
    }

    /// Sets the specialization.
    pub fn with_specialization(mut self, specialization: Specialization) -> Self {
        self.specialization = specialization;
        self
    }

    /// Sets the operational status.
    pub fn with_status(mut self, status: BerthStatus) -> Self {
        self.status = status;
        self
    }

    /// Adds a maintenance window.
    pub fn with_maintenance(mut self, start_ms: i64, end_ms: i64) -> Self {
        self.maintenance_windows.push(TimeWindow::new(start_ms, end_ms));
        self
    }

    /// Sets the geographic window.
    pub fn with_geo_window(mut self, geo: GeoWindow) -> Self {
        self.geo_window = Some(geo);
        self
    }

    /// Whether the berth is closed at any point of `window`.
    pub fn is_under_maintenance(&self, window: &TimeWindow) -> bool {
        self.status == BerthStatus::Maintenance
            || self.maintenance_windows.iter().any(|m| m.overlaps(window))
    }

    /// Whether the berth is an LNG / gas terminal.
    pub fn is_gas_terminal(&self) -> bool {
        matches!(
            self.specialization,
            Specialization::Lng | Specialization::Gas
        )
    }
}
