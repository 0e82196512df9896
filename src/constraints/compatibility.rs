//! Cargo type vs. berth specialization table.

use crate::models::{CargoType, Specialization};

/// How well a berth specialization suits a cargo type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// The berth is built for this cargo.
    Preferred,
    /// The berth can handle the cargo.
    Accepted,
    /// The berth is not equipped for the cargo.
    Mismatch,
}

impl Compatibility {
    /// Score contribution in [0, 1].
    pub fn score(self) -> f64 {
        match self {
            Compatibility::Preferred => 1.0,
            Compatibility::Accepted => 0.8,
            Compatibility::Mismatch => 0.0,
        }
    }
}

/// Looks up the compatibility of a cargo type with a specialization.
///
/// | Cargo | Preferred | Accepted |
/// |-------|-----------|----------|
/// | container | container | multipurpose |
/// | tanker | petroleum | liquid |
/// | bulk | dry-bulk | multipurpose |
/// | LNG | LNG | gas |
/// | general | general | multipurpose, break-bulk |
///
/// Unrecognised cargo types are compatible with every berth; unrecognised
/// specializations accept every cargo.
pub fn compatibility(cargo: &CargoType, specialization: &Specialization) -> Compatibility {
    use Specialization as S;

    if let S::Other(_) = specialization {
        return Compatibility::Accepted;
    }

    let (preferred, accepted): (&[S], &[S]) = match cargo {
        CargoType::Container => (&[S::Container], &[S::Multipurpose]),
        CargoType::Tanker => (&[S::Petroleum], &[S::Liquid]),
        CargoType::Bulk => (&[S::DryBulk], &[S::Multipurpose]),
        CargoType::Lng => (&[S::Lng], &[S::Gas]),
        CargoType::General => (&[S::General], &[S::Multipurpose, S::BreakBulk]),
        CargoType::Other(_) => return Compatibility::Preferred,
    };

    if preferred.contains(specialization) {
        Compatibility::Preferred
    } else if accepted.contains(specialization) {
        Compatibility::Accepted
    } else {
        Compatibility::Mismatch
    }
}
