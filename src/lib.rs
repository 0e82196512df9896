//! Berth allocation framework.
//!
//! Decides which vessel goes to which berth and when, given vessel
//! characteristics, berth limits, existing allocations and port resources.
//! Every engine is a pure, synchronous function over caller-supplied
//! snapshots; the crate does no I/O.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Vessel`, `Berth`, `TimeWindow`,
//!   `Allocation`, `AllocationSet`, `Violation`, `Conflict`, `Resolution`
//! - **`config`**: Port configuration (weights, penalties, thresholds, GA)
//! - **`validation`**: Structural input checks, run before any planning
//! - **`constraints`**: Hard and soft constraint validator
//! - **`scoring`**: Multi-factor 0-100 candidate scoring
//! - **`scheduler`**: Priority-driven greedy allocation and KPIs
//! - **`ga`**: Genetic search over vessel-to-berth assignments
//! - **`conflict`**: Overlap and pilot/tug shortage detection, ranked
//!   resolutions, commit with re-detection
//! - **`planner`**: Facade wiring the engines over one snapshot
//!
//! # Example
//!
//! ```
//! use u_berth::models::{Berth, Priority, Vessel, HOUR_MS};
//! use u_berth::planner::{BerthPlanner, PlanningSnapshot};
//!
//! let snapshot = PlanningSnapshot::new(
//!     vec![
//!         Vessel::new("V1", 10 * HOUR_MS)
//!             .with_dimensions(300.0, 45.0, 14.0)
//!             .with_etd(18 * HOUR_MS)
//!             .with_priority(Priority::Emergency),
//!     ],
//!     vec![Berth::new("B1", 320.0, 18.0)],
//! );
//!
//! let planner = BerthPlanner::default();
//! let result = planner.allocate(&snapshot).unwrap();
//! assert_eq!(result.allocated[0].berth_id, "B1");
//! ```
//!
//! # References
//!
//! - Imai, Nishimura & Papadimitriou (2001), "The dynamic berth allocation
//!   problem for a container port"
//! - Bierwirth & Meisel (2015), "A follow-up survey of berth allocation and
//!   quay crane scheduling problems in container terminals"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"

pub mod config;
pub mod conflict;
pub mod constraints;
pub mod error;
pub mod ga;
pub mod models;
pub mod planner;
pub mod scheduler;
pub mod scoring;
pub mod validation;

pub use config::PortConfig;
pub use error::{PlanningError, PlanningResult};
pub use planner::{BerthPlanner, PlanningSnapshot};
