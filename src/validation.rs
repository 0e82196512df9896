//! Input validation for planning snapshots.
//!
//! Checks structural integrity of vessels, berths and existing allocations
//! before any scheduling attempt. Detects:
//! - Empty and duplicate IDs
//! - Non-positive or non-finite dimensions
//! - Inverted time windows (departure before arrival, bad maintenance
//!   windows, bad allocation windows)
//! - Instants outside the calendar range `chrono` can represent
//! - Allocations that reference unknown berths, and (for conflict scans)
//!   unknown vessels
//!
//! All problems are collected; the caller gets the full list at once.

use crate::models::{Allocation, Berth, TimeWindow, Vessel, is_representable};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An entity has an empty ID.
    MissingId,
    /// Two entities share the same ID.
    DuplicateId,
    /// A dimension is zero, negative or not a number.
    InvalidDimension,
    /// A time window does not satisfy start < end.
    InvalidWindow,
    /// An allocation references a berth that doesn't exist.
    InvalidBerthReference,
    /// An allocation references a vessel that doesn't exist.
    InvalidVesselReference,
    /// An instant is outside the representable calendar range.
    InstantOutOfRange,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Validates the snapshots supplied for a planning pass.
///
/// Checks:
/// 1. Vessel, berth and allocation IDs are non-empty and unique
/// 2. Vessel LOA, beam and draft are finite and positive
/// 3. Vessel departure is after arrival
/// 4. Berth LOA limit and water depth are finite and positive; a beam
///    limit, when present, too
/// 5. Maintenance and allocation windows satisfy start < end
/// 6. Allocations reference existing berths
/// 7. Every instant is a representable calendar date
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_snapshot(
    vessels: &[Vessel],
    berths: &[Berth],
    existing: &[Allocation],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut berth_ids = HashSet::new();
    for b in berths {
        check_id("berth", &b.id, &mut berth_ids, &mut errors);
        check_positive("berth", &b.id, "max LOA", b.max_loa_m, &mut errors);
        check_positive("berth", &b.id, "water depth", b.water_depth_m, &mut errors);
        if let Some(beam) = b.max_beam_m {
            check_positive("berth", &b.id, "max beam", beam, &mut errors);
        }
        for w in &b.maintenance_windows {
            let what = format!("Maintenance window of berth '{}'", b.id);
            check_window(&what, w, &mut errors);
            check_range(&what, w, &mut errors);
        }
    }

    let mut vessel_ids = HashSet::new();
    for v in vessels {
        check_id("vessel", &v.id, &mut vessel_ids, &mut errors);
        check_positive("vessel", &v.id, "LOA", v.loa_m, &mut errors);
        check_positive("vessel", &v.id, "beam", v.beam_m, &mut errors);
        check_positive("vessel", &v.id, "draft", v.draft_m, &mut errors);
        let what = format!("Requested window of vessel '{}'", v.id);
        check_window(&what, &v.requested_window(), &mut errors);
        for (field, value) in [
            ("ETA", Some(v.eta_ms)),
            ("ETD", v.etd_ms),
            ("ATA", v.ata_ms),
            ("ATD", v.atd_ms),
        ] {
            if let Some(ms) = value {
                check_instant(&format!("{field} of vessel '{}'", v.id), ms, &mut errors);
            }
        }
    }

    let mut allocation_ids = HashSet::new();
    for a in existing {
        check_id("allocation", &a.id, &mut allocation_ids, &mut errors);
        let what = format!("Allocation '{}'", a.id);
        check_window(&what, &a.window, &mut errors);
        check_range(&what, &a.window, &mut errors);
        if !berth_ids.contains(a.berth_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidBerthReference,
                format!(
                    "Allocation '{}' references unknown berth '{}'",
                    a.id, a.berth_id
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that every active allocation names a vessel in `vessels`.
///
/// Only needed where the vessel snapshot must cover the whole plan, as in
/// a conflict scan; a greedy pass may be given allocations of vessels it
/// is not re-planning.
pub fn validate_vessel_references(vessels: &[Vessel], existing: &[Allocation]) -> ValidationResult {
    let known: HashSet<&str> = vessels.iter().map(|v| v.id.as_str()).collect();
    let errors: Vec<ValidationError> = existing
        .iter()
        .filter(|a| a.is_active() && !known.contains(a.vessel_id.as_str()))
        .map(|a| {
            ValidationError::new(
                ValidationErrorKind::InvalidVesselReference,
                format!(
                    "Allocation '{}' references unknown vessel '{}'",
                    a.id, a.vessel_id
                ),
            )
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_id<'a>(
    entity: &str,
    id: &'a str,
    seen: &mut HashSet<&'a str>,
    errors: &mut Vec<ValidationError>,
) {
    if id.trim().is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::MissingId,
            format!("A {entity} has an empty ID"),
        ));
    } else if !seen.insert(id) {
        errors.push(ValidationError::new(
            ValidationErrorKind::DuplicateId,
            format!("Duplicate {entity} ID: {id}"),
        ));
    }
}

fn check_positive(
    entity: &str,
    id: &str,
    field: &str,
    value: f64,
    errors: &mut Vec<ValidationError>,
) {
    if !value.is_finite() || value <= 0.0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidDimension,
            format!("{entity} '{id}' has invalid {field}: {value}"),
        ));
    }
}

fn check_window(what: &str, window: &TimeWindow, errors: &mut Vec<ValidationError>) {
    if !window.is_valid() {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidWindow,
            format!(
                "{what} is not a valid window: start {} >= end {}",
                window.start_ms, window.end_ms
            ),
        ));
    }
}

fn check_range(what: &str, window: &TimeWindow, errors: &mut Vec<ValidationError>) {
    check_instant(&format!("Start of {what}"), window.start_ms, errors);
    check_instant(&format!("End of {what}"), window.end_ms, errors);
}

fn check_instant(what: &str, ms: i64, errors: &mut Vec<ValidationError>) {
    if !is_representable(ms) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InstantOutOfRange,
            format!("{what} is out of range: {ms} ms"),
        ));
    }
}
