//! Defaults for absent snapshot fields.
//!
//! Every fallback used when an optional snapshot field is missing lives in
//! this table. Values are operating defaults pending domain-expert review,
//! not derived constants.

use super::time_window::HOUR_MS;

/// Dwell time assumed when a vessel has no departure estimate (ms).
pub const DWELL_MS: i64 = 24 * HOUR_MS;

/// Pilots required when a vessel does not declare a requirement.
pub const PILOTS_REQUIRED: u32 = 1;

/// LOA thresholds (m) for the default tug requirement: below the first
/// value one tug, below the second two, otherwise three.
pub const TUG_LOA_THRESHOLDS: (f64, f64) = (150.0, 250.0);

/// Cranes assumed for container vessels that do not declare a requirement.
pub const CONTAINER_CRANES_REQUIRED: u32 = 2;

/// History component score for a vessel that never used the berth.
pub const NEUTRAL_HISTORY_SCORE: f64 = 0.5;

/// Estimated berth time consumed per vessel already queued (ms).
pub const QUEUE_SLOT_MS: i64 = 2 * HOUR_MS;

/// Waiting time at which the waiting component drops to one half (ms).
pub const REFERENCE_WAIT_MS: i64 = 6 * HOUR_MS;

/// Priority ordinal assumed for an unrecognised priority tier.
pub const PRIORITY_ORDINAL: u8 = 4;

/// Default number of tugs for a vessel of the given LOA.
pub fn tugs_for_loa(loa_m: f64) -> u32 {
    let (small, medium) = TUG_LOA_THRESHOLDS;
    if loa_m < small {
        1
    } else if loa_m < medium {
        2
    } else {
        3
    }
}
