//! Operation handlers
//!
//! One routine per operation kind. Handlers receive resolved field
//! entities and numeric parameters, mutate them, and report the
//! invariant class the conservation checker must enforce afterwards.
//! They never touch the registry, never clamp (the facade normalizes
//! coherence and phase angle after every handler) and never bump `age`
//! (the facade ages every participating field once per operation).

use std::f64::consts::TAU;

use crate::conservation::InvariantClass;
use crate::error::{Error, Result};
use crate::field::FieldState;
use crate::types::{FieldName, PhaseState};

/// Fraction of the energy difference moved by one exchange
const EXCHANGE_RATE: f64 = 0.1;
/// Energy transfers split 60/40 across kinetic/potential components
const KINETIC_SHARE: f64 = 0.6;
const POTENTIAL_SHARE: f64 = 0.4;
/// Entropy produced per joule moved in exchange-like flows
const FLOW_ENTROPY: f64 = 0.01;
/// Phase synchronization strength during exchange
const PHASE_COUPLING: f64 = 0.1;
/// Coherence retained through one exchange
const EXCHANGE_COHERENCE: f64 = 0.99;

/// Regeneration: share of input applied as work vs. capacity growth
const WORK_FRACTION: f64 = 0.7;
const CAPACITY_FRACTION: f64 = 0.3;
/// Ceiling on the capacity efficiency bonus
const EFFICIENCY_CAP: f64 = 0.2;
const REGEN_ENTROPY: f64 = 0.005;
const REGEN_COHERENCE_GAIN: f64 = 0.01;

/// Entropy produced per joule dissipated by decay
const DECAY_ENTROPY: f64 = 0.1;
/// Coherence retained through one decay step
const DECAY_COHERENCE: f64 = 0.95;
/// Capacity loss as a fraction of the decay rate
const DECAY_CAPACITY_LOSS: f64 = 0.1;

/// Share of each partner's energy contributed in symbiosis
const SYMBIOSIS_SHARE: f64 = 0.05;
/// Energy cost of the symbiotic interaction itself
const SYMBIOSIS_COST: f64 = 0.01;

const ENTANGLE_COHERENCE_BOOST: f64 = 0.2;

/// Resonance gain constant; bounds amplification at 1 + k = 1.20
const RESONANCE_GAIN: f64 = 0.2;
const RESONANCE_COHERENCE_GAIN: f64 = 0.1;
/// Frequencies must match this closely for phase locking
const PHASE_LOCK_THRESHOLD: f64 = 0.5;

/// Energy cost per step of ordinal phase distance
const PHASE_COST_PER_STEP: f64 = 10.0;
/// Entropy produced per step of ordinal phase distance
const PHASE_ENTROPY_PER_STEP: f64 = 2.0;
/// Coherence retained on transition into plasma
const PLASMA_COHERENCE: f64 = 0.5;

/// Spawned fields keep this fraction of the parent's capacity
const SPAWN_CAPACITY: f64 = 0.8;
/// Grid spacing of the deterministic spawn layout
const SPAWN_SPACING: f64 = 0.1;
/// Guard against 2^depth overflowing the registry
const MAX_SPAWN_DEPTH: u32 = 16;

/// Distance floor for gradient flow (coincident positions)
const MIN_DISTANCE: f64 = 0.01;
/// Flow rate along a spatial gradient
const GRADIENT_FLOW_RATE: f64 = 0.05;
/// Step applied to the stored gradient vectors
const GRADIENT_STEP: f64 = 0.1;

/// Move `amount` joules between two fields, split across components.
/// A negative amount flows in the opposite direction.
fn transfer(from: &mut FieldState, to: &mut FieldState, amount: f64) {
    from.kinetic -= amount * KINETIC_SHARE;
    from.potential -= amount * POTENTIAL_SHARE;
    to.kinetic += amount * KINETIC_SHARE;
    to.potential += amount * POTENTIAL_SHARE;
}

/// Bidirectional exchange: ∇F(a↔b)|∂E/∂t=0
///
/// Moves a fraction of the energy difference from the higher- to the
/// lower-energy field, nudges the phases toward each other, and charges
/// both sides a small entropy toll.
pub fn exchange(a: &mut FieldState, b: &mut FieldState) -> InvariantClass {
    let flow = EXCHANGE_RATE * (a.total_energy() - b.total_energy());
    transfer(a, b, flow);

    let entropy_increase = flow.abs() * FLOW_ENTROPY;
    a.entropy += entropy_increase;
    b.entropy += entropy_increase;

    a.coherence *= EXCHANGE_COHERENCE;
    b.coherence *= EXCHANGE_COHERENCE;

    let coupling = PHASE_COUPLING * (b.phase_angle - a.phase_angle);
    a.phase_angle += coupling;
    b.phase_angle -= coupling;

    InvariantClass::Conserving
}

/// Regenerative cycle: ∮regenerate(field, input)
///
/// 70% of the input becomes work, 30% grows capacity; the capacity
/// growth feeds back as an efficiency bonus on the whole energy store,
/// producing compound growth over repeated calls.
pub fn regenerate(field: &mut FieldState, input: f64) -> Result<InvariantClass> {
    if input < 0.0 {
        return Err(Error::InvalidState {
            field: field.name.clone(),
            reason: format!("regeneration input must be non-negative, got {input}"),
        });
    }

    let work = input * WORK_FRACTION;
    let growth = 1.0 + input * CAPACITY_FRACTION / 100.0;
    field.capacity *= growth;

    let bonus = (growth - 1.0).min(EFFICIENCY_CAP);
    field.kinetic = (field.kinetic + work * KINETIC_SHARE) * (1.0 + bonus);
    field.potential = (field.potential + work * POTENTIAL_SHARE) * (1.0 + bonus);

    field.entropy += input * REGEN_ENTROPY;
    field.coherence += REGEN_COHERENCE_GAIN;

    Ok(InvariantClass::Unconstrained)
}

/// Natural decay: ∂decay(field, rate)
pub fn decay(field: &mut FieldState, rate: f64) -> Result<InvariantClass> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(Error::InvalidState {
            field: field.name.clone(),
            reason: format!("decay rate must be within [0, 1], got {rate}"),
        });
    }

    let lost = field.total_energy() * rate;
    field.kinetic *= 1.0 - rate;
    field.potential *= 1.0 - rate;
    field.entropy += lost * DECAY_ENTROPY;
    field.coherence *= DECAY_COHERENCE;
    field.capacity *= 1.0 - rate * DECAY_CAPACITY_LOSS;

    Ok(InvariantClass::EntropyOnly)
}

/// Symbiosis: ∇∇(a⇄b)
///
/// Each field regenerates from 5% of the other's energy, pays a small
/// interaction cost, and both frequencies entrain to their mean.
pub fn symbiosis(a: &mut FieldState, b: &mut FieldState) -> Result<InvariantClass> {
    let a_contribution = a.total_energy() * SYMBIOSIS_SHARE;
    let b_contribution = b.total_energy() * SYMBIOSIS_SHARE;

    regenerate(a, b_contribution)?;
    regenerate(b, a_contribution)?;

    let half_cost = SYMBIOSIS_COST * (a_contribution + b_contribution) / 2.0;
    for field in [&mut *a, &mut *b] {
        field.kinetic -= half_cost * KINETIC_SHARE;
        field.potential -= half_cost * POTENTIAL_SHARE;
    }

    let mean = (a.frequency + b.frequency) / 2.0;
    a.frequency = mean;
    b.frequency = mean;

    Ok(InvariantClass::EntropyOnly)
}

/// Quantum entanglement: ⊗(a, b)
///
/// Links the two fields symmetrically and boosts both coherences.
/// Fails if either side is already entangled with a third party.
pub fn entangle(a: &mut FieldState, b: &mut FieldState) -> Result<InvariantClass> {
    ensure_unentangled(a, &b.name)?;
    ensure_unentangled(b, &a.name)?;

    a.entangled_with = Some(b.name.clone());
    b.entangled_with = Some(a.name.clone());
    a.coherence += ENTANGLE_COHERENCE_BOOST;
    b.coherence += ENTANGLE_COHERENCE_BOOST;

    Ok(InvariantClass::Conserving)
}

fn ensure_unentangled(field: &FieldState, partner: &FieldName) -> Result<()> {
    match &field.entangled_with {
        Some(existing) if existing != partner => Err(Error::InvalidState {
            field: field.name.clone(),
            reason: format!("already entangled with {existing}; that link must be cleared first"),
        }),
        _ => Ok(()),
    }
}

/// Resonance: ~(a ≈ b)
///
/// Amplifies both fields by 1 + k·exp(−|Δf|), capped at 20%, and locks
/// the phases together when the frequencies are close. A declared
/// exception to energy conservation: the amplification injects energy.
pub fn resonance(a: &mut FieldState, b: &mut FieldState) -> InvariantClass {
    let strength = (-(a.frequency - b.frequency).abs()).exp();
    let amplification = 1.0 + RESONANCE_GAIN * strength;

    for field in [&mut *a, &mut *b] {
        field.kinetic *= amplification;
        field.potential *= amplification;
        field.coherence += RESONANCE_COHERENCE_GAIN * strength;
    }

    if strength > PHASE_LOCK_THRESHOLD {
        let locked = (a.phase_angle + b.phase_angle) / 2.0;
        a.phase_angle = locked;
        b.phase_angle = locked;
    }

    InvariantClass::Unconstrained
}

/// Phase transition: ∂phase(field, target)
///
/// Charges energy and produces entropy proportional to the ordinal
/// distance between phases. Fails without mutation when the field
/// cannot afford the cost.
pub fn phase_transition(field: &mut FieldState, target: PhaseState) -> Result<InvariantClass> {
    let distance = field.phase_state.distance(target);
    let cost = f64::from(distance) * PHASE_COST_PER_STEP;
    let total = field.total_energy();
    if total < cost {
        return Err(Error::InsufficientEnergy {
            field: field.name.clone(),
            required: cost,
            available: total,
        });
    }

    if distance > 0 {
        // total >= cost > 0 here, so the division is safe
        let keep = 1.0 - cost / total;
        field.kinetic *= keep;
        field.potential *= keep;
        field.entropy += f64::from(distance) * PHASE_ENTROPY_PER_STEP;
        if target == PhaseState::Plasma {
            field.coherence *= PLASMA_COHERENCE;
        }
        field.phase_state = target;
    }

    Ok(InvariantClass::EntropyOnly)
}

/// Fractal generation: ∮^n(field, depth)
///
/// Builds 2^depth offspring, each carrying an equal share of the
/// parent's energy and entropy at 2^depth times its frequency, laid out
/// on a fixed grid around the parent. The parent is left unchanged, so
/// the registry's total energy grows by the parent's energy: a declared
/// exception to conservation.
pub fn fractal_spawn(parent: &FieldState, depth: u32) -> Result<(Vec<FieldState>, InvariantClass)> {
    if depth > MAX_SPAWN_DEPTH {
        return Err(Error::InvalidState {
            field: parent.name.clone(),
            reason: format!("fractal depth {depth} exceeds the supported maximum {MAX_SPAWN_DEPTH}"),
        });
    }

    let count = 1usize << depth;
    let share = count as f64;

    let mut children = Vec::with_capacity(count);
    for i in 0..count {
        children.push(FieldState {
            name: format!("{}_fractal_{}_{}", parent.name, depth, i).into(),
            kinetic: parent.kinetic / share,
            potential: parent.potential / share,
            entropy: parent.entropy / share,
            coherence: parent.coherence,
            phase_angle: parent.phase_angle + i as f64 * (TAU / share),
            capacity: parent.capacity * SPAWN_CAPACITY,
            age: 0,
            phase_state: parent.phase_state,
            frequency: parent.frequency * share,
            entangled_with: None,
            position: [
                parent.position[0] + (i % 2) as f64 * SPAWN_SPACING,
                parent.position[1] + ((i / 2) % 2) as f64 * SPAWN_SPACING,
                parent.position[2] + (i / 4) as f64 * SPAWN_SPACING,
            ],
            gradient: parent.gradient,
            fractal_depth: parent.fractal_depth + depth,
        });
    }

    Ok((children, InvariantClass::Unconstrained))
}

/// Spatial gradient flow: ∇spatial(a, b)
///
/// Energy flows down the energy difference, attenuated by distance;
/// both stored gradient vectors shift along the separation axis.
pub fn spatial_gradient(a: &mut FieldState, b: &mut FieldState) -> InvariantClass {
    let delta = [
        b.position[0] - a.position[0],
        b.position[1] - a.position[1],
        b.position[2] - a.position[2],
    ];
    let distance = a.distance_to(b).max(MIN_DISTANCE);

    // At the distance floor the raw flow can exceed the donor's energy;
    // half the difference is the equalization bound, so total energy
    // stays non-negative on both sides.
    let difference = a.total_energy() - b.total_energy();
    let cap = difference.abs() / 2.0;
    let flow = (difference / distance * GRADIENT_FLOW_RATE).clamp(-cap, cap);
    transfer(a, b, flow);

    let entropy_increase = flow.abs() * FLOW_ENTROPY;
    a.entropy += entropy_increase;
    b.entropy += entropy_increase;

    for axis in 0..3 {
        a.gradient[axis] -= delta[axis] * GRADIENT_STEP;
        b.gradient[axis] += delta[axis] * GRADIENT_STEP;
    }

    InvariantClass::Conserving
}

/// Multi-field network: ∇³F(a↔b↔c...)
///
/// Applies the exchange algorithm once to every unordered pair. The
/// caller passes the fields sorted by name, which fixes the pair order
/// and keeps results reproducible.
pub fn network(fields: &mut [FieldState]) -> InvariantClass {
    for i in 0..fields.len() {
        for j in (i + 1)..fields.len() {
            let (left, right) = fields.split_at_mut(j);
            exchange(&mut left[i], &mut right[0]);
        }
    }
    InvariantClass::Conserving
}
