//! Field registry
//!
//! Sole owner of all field entities, keyed by unique name. Iteration
//! follows insertion order (IndexMap), so enumeration is deterministic
//! and stable within one operation's execution.

use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::field::FieldState;
use crate::types::FieldName;

/// Owns every field entity in the interpreter session
#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: IndexMap<FieldName, FieldState>,
}

impl FieldRegistry {
    /// Create a new field with default attributes
    pub fn create(
        &mut self,
        name: FieldName,
        energy: f64,
        frequency: f64,
        position: [f64; 3],
    ) -> Result<()> {
        if energy < 0.0 {
            return Err(Error::InvalidState {
                field: name,
                reason: format!("initial energy must be non-negative, got {energy}"),
            });
        }
        if frequency <= 0.0 {
            return Err(Error::InvalidState {
                field: name,
                reason: format!("frequency must be positive, got {frequency}"),
            });
        }
        if self.fields.contains_key(&name) {
            return Err(Error::DuplicateName(name));
        }
        let field = FieldState::new(name.clone(), energy, frequency, position);
        self.fields.insert(name, field);
        Ok(())
    }

    /// Look up a field or fail
    pub fn resolve(&self, name: &FieldName) -> Result<&FieldState> {
        self.fields
            .get(name)
            .ok_or_else(|| Error::UnknownField(name.clone()))
    }

    pub fn contains(&self, name: &FieldName) -> bool {
        self.fields.contains_key(name)
    }

    /// Write back a mutated field. The name must already be registered;
    /// new entities go through [`FieldRegistry::insert_new`].
    pub(crate) fn commit(&mut self, field: FieldState) {
        self.fields.insert(field.name.clone(), field);
    }

    /// Insert a freshly created entity (fractal offspring)
    pub(crate) fn insert_new(&mut self, field: FieldState) -> Result<()> {
        if self.fields.contains_key(&field.name) {
            return Err(Error::DuplicateName(field.name));
        }
        self.fields.insert(field.name.clone(), field);
        Ok(())
    }

    /// All fields in insertion order
    pub fn all(&self) -> impl Iterator<Item = &FieldState> {
        self.fields.values()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Entanglement symmetry predicate: every link is mirrored by its
    /// partner. Handlers write both sides of the relation; this check
    /// backs the tests that prove they do.
    pub fn entanglement_symmetric(&self) -> bool {
        self.fields.values().all(|field| match &field.entangled_with {
            None => true,
            Some(partner) => self
                .fields
                .get(partner)
                .is_some_and(|p| p.entangled_with.as_ref() == Some(&field.name)),
        })
    }
}
