//! Vessel model.
//!
//! A vessel is the job being scheduled: it arrives, occupies one berth for
//! its dwell time and departs. Vessel snapshots are immutable within a
//! planning pass and re-fetched by the caller for the next one.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::defaults;
use super::TimeWindow;

/// Declared priority tier.
///
/// Lower ordinal = scheduled first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Search and rescue, medical, distress.
    Emergency,
    /// Government or otherwise contractually privileged calls.
    Vip,
    /// Scheduled liner service.
    Liner,
    /// Tramp / charter call.
    Charter,
}

impl Priority {
    /// Ordinal 1-4 (Emergency = 1).
    pub fn ordinal(self) -> u8 {
        match self {
            Priority::Emergency => 1,
            Priority::Vip => 2,
            Priority::Liner => 3,
            Priority::Charter => 4,
        }
    }

    /// Parses an ordinal; `None` outside 1-4.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            1 => Some(Priority::Emergency),
            2 => Some(Priority::Vip),
            3 => Some(Priority::Liner),
            4 => Some(Priority::Charter),
            _ => None,
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::from_ordinal(defaults::PRIORITY_ORDINAL).unwrap_or(Priority::Charter)
    }
}

/// Cargo carried by a vessel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CargoType {
    Container,
    Tanker,
    Bulk,
    Lng,
    General,
    /// Unrecognised type; treated as compatible with every berth.
    Other(String),
}

impl CargoType {
    /// Parses a free-form cargo label.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "container" | "containers" | "box" => CargoType::Container,
            "tanker" | "oil" | "petroleum" | "chemical" | "liquid" => CargoType::Tanker,
            "bulk" | "dry-bulk" | "dry_bulk" | "bulk carrier" => CargoType::Bulk,
            "lng" | "gas" | "lpg" => CargoType::Lng,
            "general" | "general cargo" | "break-bulk" | "breakbulk" => CargoType::General,
            other => CargoType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for CargoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CargoType::Container => write!(f, "container"),
            CargoType::Tanker => write!(f, "tanker"),
            CargoType::Bulk => write!(f, "bulk"),
            CargoType::Lng => write!(f, "lng"),
            CargoType::General => write!(f, "general"),
            CargoType::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A vessel requesting a berth.
///
/// Dimensions are in metres, instants in ms since the Unix epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vessel {
    /// Unique vessel identifier.
    pub id: String,
    /// IMO number.
    pub imo: String,
    /// Human-readable name.
    pub name: String,
    /// Length overall (m).
    pub loa_m: f64,
    /// Beam (m).
    pub beam_m: f64,
    /// Draft (m).
    pub draft_m: f64,
    /// Gross tonnage.
    pub gross_tonnage: f64,
    /// Cargo type.
    pub cargo_type: CargoType,
    /// Declared priority tier.
    pub priority: Priority,
    /// Hazardous cargo on board (subject to window-vessel policy).
    pub hazardous: bool,
    /// Estimated time of arrival (ms).
    pub eta_ms: i64,
    /// Estimated time of departure (ms). `None` = default dwell.
    pub etd_ms: Option<i64>,
    /// Actual time of arrival (ms), once known.
    pub ata_ms: Option<i64>,
    /// Actual time of departure (ms), once known.
    pub atd_ms: Option<i64>,
    /// Pilots required. `None` = default.
    pub pilots_required: Option<u32>,
    /// Tugs required. `None` = derived from LOA.
    pub tugs_required: Option<u32>,
    /// Quay cranes required. `None` = derived from cargo type.
    pub cranes_required: Option<u32>,
}

impl Vessel {
    /// Creates a vessel with the given ID and ETA; other fields zeroed.
    pub fn new(id: impl Into<String>, eta_ms: i64) -> Self {
        Self {
            id: id.into(),
            imo: String::new(),
            name: String::new(),
            loa_m: 0.0,
            beam_m: 0.0,
            draft_m: 0.0,
            gross_tonnage: 0.0,
            cargo_type: CargoType::General,
            priority: Priority::default(),
            hazardous: false,
            eta_ms,
            etd_ms: None,
            ata_ms: None,
            atd_ms: None,
            pilots_required: None,
            tugs_required: None,
            cranes_required: None,
        }
    }

    /// Sets the IMO number.
    pub fn with_imo(mut self, imo: impl Into<String>) -> Self {
        self.imo = imo.into();
        self
    }

    /// Sets the vessel name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets LOA, beam and draft (m).
    pub fn with_dimensions(mut self, loa_m: f64, beam_m: f64, draft_m: f64) -> Self {
        self.loa_m = loa_m;
        self.beam_m = beam_m;
        self.draft_m = draft_m;
        self
    }

    /// Sets the gross tonnage.
    pub fn with_gross_tonnage(mut self, gt: f64) -> Self {
        self.gross_tonnage = gt;
        self
    }

    /// Sets the cargo type.
    pub fn with_cargo(mut self, cargo_type: CargoType) -> Self {
        self.cargo_type = cargo_type;
        self
    }

    /// Sets the priority tier.
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Marks the vessel as carrying hazardous cargo.
    pub fn with_hazardous(mut self, hazardous: bool) -> Self {
        self.hazardous = hazardous;
        self
    }

    /// Sets the estimated departure (ms).
    pub fn with_etd(mut self, etd_ms: i64) -> Self {
        self.etd_ms = Some(etd_ms);
        self
    }

    /// Sets the actual arrival (ms).
    pub fn with_ata(mut self, ata_ms: i64) -> Self {
        self.ata_ms = Some(ata_ms);
        self
    }

    /// Sets the actual departure (ms).
    pub fn with_atd(mut self, atd_ms: i64) -> Self {
        self.atd_ms = Some(atd_ms);
        self
    }

    /// Sets the pilot, tug and crane requirements.
    pub fn with_requirements(mut self, pilots: u32, tugs: u32, cranes: u32) -> Self {
        self.pilots_required = Some(pilots);
        self.tugs_required = Some(tugs);
        self.cranes_required = Some(cranes);
        self
    }

    /// Arrival instant used for planning (actual if known, else estimated).
    pub fn arrival_ms(&self) -> i64 {
        self.ata_ms.unwrap_or(self.eta_ms)
    }

    /// Departure instant used for planning.
    pub fn departure_ms(&self) -> i64 {
        self.atd_ms
            .or(self.etd_ms)
            .unwrap_or_else(|| self.arrival_ms().saturating_add(defaults::DWELL_MS))
    }

    /// Berth occupancy the vessel asks for.
    pub fn requested_window(&self) -> TimeWindow {
        TimeWindow::new(self.arrival_ms(), self.departure_ms())
    }

    /// Dwell time (ms).
    pub fn dwell_ms(&self) -> i64 {
        self.departure_ms().saturating_sub(self.arrival_ms())
    }

    /// Whether exclusive-use berth policy applies (hazardous cargo or LNG).
    pub fn is_window_vessel(&self) -> bool {
        self.hazardous || self.cargo_type == CargoType::Lng
    }

    /// Pilots needed for the berthing manoeuvre.
    pub fn pilots_needed(&self) -> u32 {
        self.pilots_required.unwrap_or(defaults::PILOTS_REQUIRED)
    }

    /// Tugs needed for the berthing manoeuvre.
    pub fn tugs_needed(&self) -> u32 {
        self.tugs_required
            .unwrap_or_else(|| defaults::tugs_for_loa(self.loa_m))
    }

    /// Quay cranes needed while alongside.
    pub fn cranes_needed(&self) -> u32 {
        self.cranes_required.unwrap_or(match self.cargo_type {
            CargoType::Container => defaults::CONTAINER_CRANES_REQUIRED,
            _ => 0,
        })
    }
}
