//! Conservation checker
//!
//! Validates an operation's declared invariant class against before and
//! after snapshots of the fields it touched. Operations that inject
//! energy by design (resonance, regeneration, fractal generation)
//! declare [`InvariantClass::Unconstrained`] and skip the energy check;
//! the entropy law applies to every class.

use crate::error::{Error, Result};
use crate::field::FieldState;

/// Tolerance for the energy conservation check
pub const ENERGY_TOLERANCE: f64 = 1e-10;

/// Numerical slack permitted on the entropy non-decrease check
pub const ENTROPY_SLACK: f64 = 1e-10;

/// Which conservation law an operation declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantClass {
    /// Total energy across touched fields must match before/after
    Conserving,
    /// No energy constraint; entropy must still not decrease
    EntropyOnly,
    /// Declared exception: the operation injects energy by design
    Unconstrained,
}

/// Verify the declared invariant over per-field before/after snapshots.
///
/// `before` and `after` must correspond by index and cover exactly the
/// pre-existing fields the operation touched; entities the operation
/// created have no before-state and are not checked here.
pub fn check(class: InvariantClass, before: &[FieldState], after: &[FieldState]) -> Result<()> {
    debug_assert_eq!(before.len(), after.len());

    if class == InvariantClass::Conserving {
        let sum_before: f64 = before.iter().map(FieldState::total_energy).sum();
        let sum_after: f64 = after.iter().map(FieldState::total_energy).sum();
        let difference = (sum_after - sum_before).abs();
        if difference > ENERGY_TOLERANCE {
            return Err(Error::ConservationViolation {
                before: sum_before,
                after: sum_after,
                difference,
            });
        }
    }

    // Second law: entropy never decreases, whatever the class
    for (pre, post) in before.iter().zip(after) {
        if post.entropy < pre.entropy - ENTROPY_SLACK {
            return Err(Error::EntropyViolation {
                field: post.name.clone(),
                before: pre.entropy,
                after: post.entropy,
            });
        }
    }

    Ok(())
}
