//! Interpreter facade
//!
//! Composes parser, registry, handlers and checker. Each command runs
//! parse → resolve → snapshot → apply → check → commit, one at a time.
//! Handlers mutate staged copies of the resolved fields; the registry
//! only sees a mutation after its invariant check passed, so a rejected
//! operation leaves the registry in its previous, validated state.

use cyclic_dsl::Request;
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::conservation::{self, InvariantClass};
use crate::error::{Error, Result};
use crate::field::FieldState;
use crate::ops;
use crate::registry::FieldRegistry;
use crate::types::{FieldName, FieldSnapshot, OperationResult, PhaseState, SystemSummary};

/// One interpreter session: owns the registry, no global state
#[derive(Debug, Default)]
pub struct Interpreter {
    registry: FieldRegistry,
}

/// Result of one script line
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    Created {
        line: usize,
        field: FieldName,
        energy: f64,
    },
    Executed {
        line: usize,
        result: OperationResult,
    },
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a field with default frequency and position
    pub fn create_field(&mut self, name: &str, energy: f64) -> Result<()> {
        self.create_field_with(name, energy, 1.0, [0.0; 3])
    }

    /// Create a field with explicit frequency and position
    pub fn create_field_with(
        &mut self,
        name: &str,
        energy: f64,
        frequency: f64,
        position: [f64; 3],
    ) -> Result<()> {
        debug!(field = name, energy, frequency, "creating field");
        self.registry.create(name.into(), energy, frequency, position)
    }

    /// Parse and execute one command
    pub fn execute(&mut self, command: &str) -> Result<OperationResult> {
        // Parsing
        let request = cyclic_dsl::parse(command).map_err(|source| Error::Syntax {
            command: command.to_string(),
            source,
        })?;
        debug!(op = request.name(), %command, "command parsed");
        self.apply(&request)
    }

    /// Execute a multi-line script: one command per line, `name = energy`
    /// creation lines allowed, blank and `#`/`//` comment lines skipped.
    /// Stops at the first error, annotated with its line number.
    pub fn run_script(&mut self, source: &str) -> Result<Vec<ScriptEvent>> {
        let mut events = Vec::new();
        for (idx, raw) in source.lines().enumerate() {
            let line = idx + 1;
            let text = raw.trim();
            if text.is_empty() || text.starts_with('#') || text.starts_with("//") {
                continue;
            }

            if let Some((name, energy)) = creation_line(text) {
                self.create_field(&name, energy).map_err(|e| Error::Script {
                    line,
                    source: Box::new(e),
                })?;
                events.push(ScriptEvent::Created {
                    line,
                    field: name.into(),
                    energy,
                });
            } else {
                let result = self.execute(text).map_err(|e| Error::Script {
                    line,
                    source: Box::new(e),
                })?;
                events.push(ScriptEvent::Executed { line, result });
            }
        }
        Ok(events)
    }

    /// Read-only copy of one field
    pub fn get_field(&self, name: &str) -> Result<FieldSnapshot> {
        Ok(self.registry.resolve(&name.into())?.snapshot())
    }

    /// Read-only copies of all fields, in creation order
    pub fn list_fields(&self) -> Vec<FieldSnapshot> {
        self.registry.all().map(FieldState::snapshot).collect()
    }

    /// Aggregate view over the whole registry
    pub fn summary(&self) -> SystemSummary {
        let fields = self.registry.len();
        let total_energy = self.registry.all().map(FieldState::total_energy).sum();
        let total_entropy = self.registry.all().map(|f| f.entropy).sum();
        let (mean_capacity, mean_coherence) = if fields == 0 {
            (0.0, 0.0)
        } else {
            let n = fields as f64;
            (
                self.registry.all().map(|f| f.capacity).sum::<f64>() / n,
                self.registry.all().map(|f| f.coherence).sum::<f64>() / n,
            )
        };
        SystemSummary {
            fields,
            total_energy,
            total_entropy,
            mean_capacity,
            mean_coherence,
        }
    }

    /// Direct registry access (read-only), used by tests and tooling
    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    fn apply(&mut self, request: &Request) -> Result<OperationResult> {
        // Resolving: operand names must exist and be distinct
        let names = self.resolve_operands(request)?;
        trace!(op = request.name(), fields = names.len(), "operands resolved");

        // Snapshotting
        let before: Vec<FieldState> = names
            .iter()
            .map(|n| self.registry.resolve(n).cloned())
            .collect::<Result<_>>()?;
        let mut staged = before.clone();

        // Applying, on staged copies; the registry is untouched until commit
        let (class, mut created) = self.run_handler(request, &mut staged)?;

        for field in &mut staged {
            field.age += 1;
            field.normalize();
        }
        for child in &mut created {
            child.normalize();
        }

        // Checking
        if let Err(violation) = conservation::check(class, &before, &staged) {
            warn!(op = request.name(), error = %violation, "invariant violated, mutation discarded");
            return Err(violation);
        }

        let mutated: Vec<FieldSnapshot> = staged.iter().map(FieldState::snapshot).collect();
        let created_snapshots: Vec<FieldSnapshot> =
            created.iter().map(FieldState::snapshot).collect();
        let energy_before: f64 = before.iter().map(FieldState::total_energy).sum();
        let energy_after: f64 = staged.iter().map(FieldState::total_energy).sum::<f64>()
            + created.iter().map(FieldState::total_energy).sum::<f64>();

        // Commit
        for field in staged {
            self.registry.commit(field);
        }
        for child in created {
            // Child names were verified free before mutation
            self.registry.insert_new(child)?;
        }
        trace!(op = request.name(), "committed");

        Ok(OperationResult {
            operation: request.name().to_string(),
            mutated,
            created: created_snapshots,
            energy_delta: energy_after - energy_before,
        })
    }

    fn resolve_operands(&self, request: &Request) -> Result<Vec<FieldName>> {
        let mut names: Vec<FieldName> =
            request.operands().into_iter().map(FieldName::from).collect();

        // The network pair order is fixed by sorting; other operations
        // keep command order
        if matches!(request, Request::Network { .. }) {
            names.sort();
        }

        // The same field twice would alias one entity into two slots
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(Error::InvalidState {
                    field: name.clone(),
                    reason: "field appears more than once in one command".to_string(),
                });
            }
        }

        for name in &names {
            self.registry.resolve(name)?;
        }
        Ok(names)
    }

    fn run_handler(
        &self,
        request: &Request,
        staged: &mut [FieldState],
    ) -> Result<(InvariantClass, Vec<FieldState>)> {
        let class = match request {
            Request::Exchange { .. } => {
                let (a, b) = pair(staged);
                ops::exchange(a, b)
            }
            Request::Regenerate { energy, .. } => ops::regenerate(&mut staged[0], *energy)?,
            Request::Decay { rate, .. } => ops::decay(&mut staged[0], *rate)?,
            Request::Symbiosis { .. } => {
                let (a, b) = pair(staged);
                ops::symbiosis(a, b)?
            }
            Request::Entangle { .. } => {
                let (a, b) = pair(staged);
                ops::entangle(a, b)?
            }
            Request::Resonance { .. } => {
                let (a, b) = pair(staged);
                ops::resonance(a, b)
            }
            Request::PhaseTransition { target, .. } => {
                ops::phase_transition(&mut staged[0], PhaseState::from(*target))?
            }
            Request::Fractal { depth, .. } => {
                let (children, class) = ops::fractal_spawn(&staged[0], *depth)?;
                for child in &children {
                    if self.registry.contains(&child.name) {
                        return Err(Error::DuplicateName(child.name.clone()));
                    }
                }
                return Ok((class, children));
            }
            Request::SpatialGradient { .. } => {
                let (a, b) = pair(staged);
                ops::spatial_gradient(a, b)
            }
            Request::Network { .. } => ops::network(staged),
        };
        Ok((class, Vec::new()))
    }
}

/// Split a two-operand staging slice into its halves
fn pair(staged: &mut [FieldState]) -> (&mut FieldState, &mut FieldState) {
    let (left, right) = staged.split_at_mut(1);
    (&mut left[0], &mut right[0])
}

/// Recognize a script-level creation line: `name = energy`
fn creation_line(text: &str) -> Option<(String, f64)> {
    let (name, value) = text.split_once('=')?;
    let name = name.trim();
    let mut chars = name.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return None;
    }
    let energy: f64 = value.trim().parse().ok()?;
    Some((name.to_string(), energy))
}
