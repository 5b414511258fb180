//! Core runtime types

use std::fmt;

use cyclic_dsl::PhaseName;
use serde::{Deserialize, Serialize};

/// Unique identifier for a field
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FieldName(pub String);

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for FieldName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FieldName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Matter-like phase of a field, in transition order
///
/// The ordinal distance between two phases determines the energy cost
/// and entropy increase of a transition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PhaseState {
    Crystalline,
    Normal,
    Liquid,
    Gas,
    Plasma,
}

impl PhaseState {
    /// All phases in transition order
    pub const ALL: [PhaseState; 5] = [
        PhaseState::Crystalline,
        PhaseState::Normal,
        PhaseState::Liquid,
        PhaseState::Gas,
        PhaseState::Plasma,
    ];

    /// Position in the transition order
    pub fn ordinal(&self) -> u32 {
        *self as u32
    }

    /// Ordinal distance to another phase
    pub fn distance(&self, other: PhaseState) -> u32 {
        self.ordinal().abs_diff(other.ordinal())
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PhaseState::Crystalline => "crystalline",
            PhaseState::Normal => "normal",
            PhaseState::Liquid => "liquid",
            PhaseState::Gas => "gas",
            PhaseState::Plasma => "plasma",
        };
        f.write_str(name)
    }
}

impl From<PhaseName> for PhaseState {
    fn from(name: PhaseName) -> Self {
        match name {
            PhaseName::Crystalline => PhaseState::Crystalline,
            PhaseName::Normal => PhaseState::Normal,
            PhaseName::Liquid => PhaseState::Liquid,
            PhaseName::Gas => PhaseState::Gas,
            PhaseName::Plasma => PhaseState::Plasma,
        }
    }
}

/// Read-only copy of a field's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub name: FieldName,
    pub kinetic: f64,
    pub potential: f64,
    /// Derived: kinetic + potential
    pub total_energy: f64,
    pub entropy: f64,
    pub coherence: f64,
    pub phase_angle: f64,
    pub capacity: f64,
    pub age: u64,
    pub phase_state: PhaseState,
    pub frequency: f64,
    pub entangled_with: Option<FieldName>,
    pub position: [f64; 3],
    pub gradient: [f64; 3],
    pub fractal_depth: u32,
}

/// Outcome of one committed operation
#[derive(Debug, Clone, Serialize)]
pub struct OperationResult {
    /// Operation kind, e.g. "exchange" or "fractal"
    pub operation: String,
    /// Post-state of the fields the operation mutated
    pub mutated: Vec<FieldSnapshot>,
    /// Fields the operation created (fractal generation only)
    pub created: Vec<FieldSnapshot>,
    /// Net energy change across mutated and created fields. Zero within
    /// tolerance for conserving operations; positive for resonance,
    /// regeneration and fractal generation, which inject energy by design.
    pub energy_delta: f64,
}

/// Aggregate view over the whole registry
#[derive(Debug, Clone, Serialize)]
pub struct SystemSummary {
    pub fields: usize,
    pub total_energy: f64,
    pub total_entropy: f64,
    pub mean_capacity: f64,
    pub mean_coherence: f64,
}
