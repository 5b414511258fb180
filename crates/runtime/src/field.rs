//! Field entity
//!
//! A field is the mutable record one operation acts on: energy split
//! into kinetic and potential components, plus the auxiliary state the
//! operations read and write. Behavior lives in [`crate::ops`]; this
//! module is data and invariant predicates only.

use std::f64::consts::TAU;

use crate::types::{FieldName, FieldSnapshot, PhaseState};

/// Entropy assigned to every newly created field
pub const CREATION_ENTROPY: f64 = 1.0;

/// Mutable state of one named field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldState {
    pub name: FieldName,
    /// Kinetic energy component; total energy is kinetic + potential
    pub kinetic: f64,
    pub potential: f64,
    /// Non-decreasing over the field's lifetime
    pub entropy: f64,
    /// Clamped to [0, 1] after every operation
    pub coherence: f64,
    /// Normalized to [0, 2π) after every operation
    pub phase_angle: f64,
    /// Regenerative potential; grows with regeneration and symbiosis
    pub capacity: f64,
    /// Operations this field has participated in
    pub age: u64,
    pub phase_state: PhaseState,
    pub frequency: f64,
    /// Symmetric relation: if set, the partner references this field back
    pub entangled_with: Option<FieldName>,
    pub position: [f64; 3],
    pub gradient: [f64; 3],
    /// 0 for created fields, parent depth + spawn depth for offspring
    pub fractal_depth: u32,
}

impl FieldState {
    /// Create a fresh field. The initial energy is all kinetic.
    pub fn new(name: FieldName, energy: f64, frequency: f64, position: [f64; 3]) -> Self {
        Self {
            name,
            kinetic: energy,
            potential: 0.0,
            entropy: CREATION_ENTROPY,
            coherence: 0.0,
            phase_angle: 0.0,
            capacity: 1.0,
            age: 0,
            phase_state: PhaseState::Normal,
            frequency,
            entangled_with: None,
            position,
            gradient: [0.0; 3],
            fractal_depth: 0,
        }
    }

    /// Derived total energy
    pub fn total_energy(&self) -> f64 {
        self.kinetic + self.potential
    }

    /// Euclidean distance to another field's position
    pub fn distance_to(&self, other: &FieldState) -> f64 {
        let dx = other.position[0] - self.position[0];
        let dy = other.position[1] - self.position[1];
        let dz = other.position[2] - self.position[2];
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Clamp coherence and normalize the phase angle.
    ///
    /// Applied after every handler, independent of its invariant class.
    pub fn normalize(&mut self) {
        self.coherence = self.coherence.clamp(0.0, 1.0);
        self.phase_angle = self.phase_angle.rem_euclid(TAU);
    }

    /// Bounds predicate used by tests and debug assertions
    pub fn within_bounds(&self) -> bool {
        (0.0..=1.0).contains(&self.coherence)
            && (0.0..TAU).contains(&self.phase_angle)
            && self.entropy >= 0.0
            && self.capacity >= 0.0
            && self.total_energy() >= 0.0
    }

    /// Read-only copy for external callers
    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            name: self.name.clone(),
            kinetic: self.kinetic,
            potential: self.potential,
            total_energy: self.total_energy(),
            entropy: self.entropy,
            coherence: self.coherence,
            phase_angle: self.phase_angle,
            capacity: self.capacity,
            age: self.age,
            phase_state: self.phase_state,
            frequency: self.frequency,
            entangled_with: self.entangled_with.clone(),
            position: self.position,
            gradient: self.gradient,
            fractal_depth: self.fractal_depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_field_defaults() {
        let field = FieldState::new("sun".into(), 200.0, 1.0, [0.0; 3]);
        assert_eq!(field.total_energy(), 200.0);
        assert_eq!(field.kinetic, 200.0);
        assert_eq!(field.potential, 0.0);
        assert_eq!(field.entropy, CREATION_ENTROPY);
        assert_eq!(field.phase_state, PhaseState::Normal);
        assert_eq!(field.capacity, 1.0);
        assert!(field.within_bounds());
    }

    #[test]
    fn test_normalize_clamps() {
        let mut field = FieldState::new("f".into(), 1.0, 1.0, [0.0; 3]);
        field.coherence = 1.7;
        field.phase_angle = TAU + 0.5;
        field.normalize();
        assert_eq!(field.coherence, 1.0);
        assert!((field.phase_angle - 0.5).abs() < 1e-12);

        field.coherence = -0.2;
        field.phase_angle = -0.5;
        field.normalize();
        assert_eq!(field.coherence, 0.0);
        assert!((field.phase_angle - (TAU - 0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_distance() {
        let a = FieldState::new("a".into(), 1.0, 1.0, [0.0, 0.0, 0.0]);
        let b = FieldState::new("b".into(), 1.0, 1.0, [3.0, 4.0, 0.0]);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
        assert_eq!(a.distance_to(&b), b.distance_to(&a));
    }
}
