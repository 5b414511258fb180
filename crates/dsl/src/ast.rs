//! Operation requests
//!
//! A [`Request`] is the parsed form of one command: the operation kind,
//! its operand field names, and any numeric parameters. Requests are
//! ephemeral; the runtime consumes them immediately.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default decay rate when `∂decay(field)` omits the rate parameter
pub const DEFAULT_DECAY_RATE: f64 = 0.05;

/// One of the named matter-like phases, in transition order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseName {
    Crystalline,
    Normal,
    Liquid,
    Gas,
    Plasma,
}

impl PhaseName {
    pub const ALL: [PhaseName; 5] = [
        PhaseName::Crystalline,
        PhaseName::Normal,
        PhaseName::Liquid,
        PhaseName::Gas,
        PhaseName::Plasma,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseName::Crystalline => "crystalline",
            PhaseName::Normal => "normal",
            PhaseName::Liquid => "liquid",
            PhaseName::Gas => "gas",
            PhaseName::Plasma => "plasma",
        }
    }
}

impl fmt::Display for PhaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhaseName::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or(())
    }
}

/// A parsed command: one of the ten operation shapes
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// ∇F(a↔b)|∂E/∂t=0
    Exchange { a: String, b: String },
    /// ∮regenerate(field, energy)
    Regenerate { field: String, energy: f64 },
    /// ∂decay(field, rate)
    Decay { field: String, rate: f64 },
    /// ∇∇(a⇄b)
    Symbiosis { a: String, b: String },
    /// ⊗(a, b)
    Entangle { a: String, b: String },
    /// ~(a ≈ b)
    Resonance { a: String, b: String },
    /// ∂phase(field, target)
    PhaseTransition { field: String, target: PhaseName },
    /// ∮^n(field, depth); `order` is the cycle-order marker n
    Fractal { field: String, order: u32, depth: u32 },
    /// ∇spatial(a, b)
    SpatialGradient { a: String, b: String },
    /// ∇³F(a↔b↔c...)
    Network { fields: Vec<String> },
}

impl Request {
    /// Operation name for result reporting and logs
    pub fn name(&self) -> &'static str {
        match self {
            Request::Exchange { .. } => "exchange",
            Request::Regenerate { .. } => "regenerate",
            Request::Decay { .. } => "decay",
            Request::Symbiosis { .. } => "symbiosis",
            Request::Entangle { .. } => "entangle",
            Request::Resonance { .. } => "resonance",
            Request::PhaseTransition { .. } => "phase_transition",
            Request::Fractal { .. } => "fractal",
            Request::SpatialGradient { .. } => "spatial_gradient",
            Request::Network { .. } => "network",
        }
    }

    /// Operand field names, in command order
    pub fn operands(&self) -> Vec<&str> {
        match self {
            Request::Exchange { a, b }
            | Request::Symbiosis { a, b }
            | Request::Entangle { a, b }
            | Request::Resonance { a, b }
            | Request::SpatialGradient { a, b } => vec![a, b],
            Request::Regenerate { field, .. }
            | Request::Decay { field, .. }
            | Request::PhaseTransition { field, .. }
            | Request::Fractal { field, .. } => vec![field],
            Request::Network { fields } => fields.iter().map(String::as_str).collect(),
        }
    }
}
