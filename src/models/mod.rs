//! Berth allocation domain models.
//!
//! Plain typed records supplied by the caller (vessels, berths, resource
//! availability) and the records the engines produce (allocations,
//! violations, conflicts, resolutions).
//!
//! # Domain Mappings
//!
//! | u-berth | Scheduling term |
//! |---------|-----------------|
//! | Vessel | Job |
//! | Berth | Heterogeneous machine |
//! | Allocation | Assignment |
//! | AllocationSet | Schedule |

mod allocation;
mod berth;
mod conflict;
pub mod defaults;
mod resource;
mod time_window;
mod vessel;

pub use allocation::{
    Allocation, AllocationResult, AllocationSet, AllocationStatus, ConstraintName,
    UnallocatedVessel, Violation, ViolationKind, has_hard,
};
pub use berth::{Berth, BerthStatus, GeoWindow, Specialization};
pub use conflict::{
    CascadingEffect, Conflict, ConflictReport, ConflictType, ProposedChange, Resolution,
    ResolutionStrategy,
};
pub use resource::{ResourceAvailability, ResourceKind};
pub use time_window::{
    HOUR_MS, MINUTE_MS, TimeWindow, hour_of_day, hour_start, is_representable,
    is_weekend,
};
pub use vessel::{CargoType, Priority, Vessel};
