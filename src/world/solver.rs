// src/world/solver.rs
use std::collections::{BTreeMap, HashMap};

use crate::models::{BodyHandle, RigidBody};
use crate::utils::{
    add_vectors, cross_product, dot_product, matrix_vector_product, scale_vector,
    subtract_vectors, tangent_basis, Matrix3, SessionConfig, Vector3, ZERO_MATRIX,
};
use crate::world::ContactManifold;

/// Velocity state of one body while impulses are being iterated
struct SolverBody {
    handle: BodyHandle,
    inv_mass: f64,
    inv_inertia: Matrix3,
    linear_velocity: Vector3,
    angular_velocity: Vector3,
    writable: bool,
}

impl SolverBody {
    fn from_body(body: &RigidBody) -> Self {
        let active = body.is_active();
        Self {
            handle: body.id(),
            inv_mass: if active { body.inv_mass } else { 0.0 },
            inv_inertia: if active { body.inv_inertia_world() } else { ZERO_MATRIX },
            linear_velocity: body.linear_velocity(),
            angular_velocity: body.angular_velocity(),
            writable: active,
        }
    }

    fn velocity_at(&self, r: Vector3) -> Vector3 {
        add_vectors(self.linear_velocity, cross_product(self.angular_velocity, r))
    }

    fn apply_impulse(&mut self, impulse: Vector3, r: Vector3) {
        self.linear_velocity = add_vectors(self.linear_velocity, scale_vector(impulse, self.inv_mass));
        self.angular_velocity = add_vectors(
            self.angular_velocity,
            matrix_vector_product(&self.inv_inertia, cross_product(r, impulse)),
        );
    }

    /// `n · ((I⁻¹ (r × n)) × r)`, the rotational part of the effective mass along `n`
    fn angular_term(&self, r: Vector3, n: Vector3) -> f64 {
        let rn = cross_product(r, n);
        dot_product(n, cross_product(matrix_vector_product(&self.inv_inertia, rn), r))
    }
}

struct ContactConstraint {
    a: usize,
    b: usize,
    ra: Vector3,
    rb: Vector3,
    normal: Vector3,
    tangents: [Vector3; 2],
    normal_mass: f64,
    tangent_mass: [f64; 2],
    velocity_bias: f64,
    friction: f64,
    normal_impulse: f64,
    tangent_impulse: [f64; 2],
}

fn effective_mass(a: &SolverBody, b: &SolverBody, ra: Vector3, rb: Vector3, n: Vector3) -> f64 {
    let k = a.inv_mass + b.inv_mass + a.angular_term(ra, n) + b.angular_term(rb, n);
    if k > 0.0 { 1.0 / k } else { 0.0 }
}

fn relative_velocity(bodies: &[SolverBody], c: &ContactConstraint) -> Vector3 {
    subtract_vectors(bodies[c.a].velocity_at(c.ra), bodies[c.b].velocity_at(c.rb))
}

fn apply_pair_impulse(bodies: &mut [SolverBody], c: &ContactConstraint, impulse: Vector3) {
    bodies[c.a].apply_impulse(impulse, c.ra);
    bodies[c.b].apply_impulse(scale_vector(impulse, -1.0), c.rb);
}

/// Resolves contact velocities with sequential impulses and writes the result back.
///
/// Normal impulses are accumulated and clamped to stay pushing; friction impulses are
/// clamped to the Coulomb cone of the current normal impulse. Impacts faster than the
/// restitution threshold get a bounce target of `-restitution * approach speed`.
/// Static and sleeping bodies take part with infinite mass.
pub fn solve_contacts(
    bodies: &mut BTreeMap<BodyHandle, RigidBody>,
    manifolds: &[ContactManifold],
    config: &SessionConfig,
) {
    if manifolds.is_empty() {
        return;
    }

    let mut index: HashMap<BodyHandle, usize> = HashMap::new();
    let mut states: Vec<SolverBody> = Vec::new();
    let mut slot = |handle: BodyHandle, states: &mut Vec<SolverBody>| -> Option<usize> {
        if let Some(&i) = index.get(&handle) {
            return Some(i);
        }
        let body = bodies.get(&handle)?;
        states.push(SolverBody::from_body(body));
        index.insert(handle, states.len() - 1);
        Some(states.len() - 1)
    };

    let mut constraints = Vec::new();
    for manifold in manifolds {
        let (Some(a), Some(b)) = (
            slot(manifold.body_a, &mut states),
            slot(manifold.body_b, &mut states),
        ) else {
            continue;
        };
        let material = match (bodies.get(&manifold.body_a), bodies.get(&manifold.body_b)) {
            (Some(body_a), Some(body_b)) => body_a.material().combine(body_b.material()),
            _ => continue,
        };
        let (position_a, position_b) = match (bodies.get(&manifold.body_a), bodies.get(&manifold.body_b)) {
            (Some(body_a), Some(body_b)) => (body_a.position(), body_b.position()),
            _ => continue,
        };

        for contact in &manifold.contacts {
            let ra = subtract_vectors(contact.point, position_a);
            let rb = subtract_vectors(contact.point, position_b);
            let normal = contact.normal;
            let (t1, t2) = tangent_basis(normal);

            let approach = dot_product(
                subtract_vectors(states[a].velocity_at(ra), states[b].velocity_at(rb)),
                normal,
            );
            let velocity_bias = if approach < -config.restitution_threshold {
                -material.restitution * approach
            } else {
                0.0
            };

            constraints.push(ContactConstraint {
                a,
                b,
                ra,
                rb,
                normal,
                tangents: [t1, t2],
                normal_mass: effective_mass(&states[a], &states[b], ra, rb, normal),
                tangent_mass: [
                    effective_mass(&states[a], &states[b], ra, rb, t1),
                    effective_mass(&states[a], &states[b], ra, rb, t2),
                ],
                velocity_bias,
                friction: material.friction,
                normal_impulse: 0.0,
                tangent_impulse: [0.0, 0.0],
            });
        }
    }

    for _ in 0..config.solver_iterations {
        for c in constraints.iter_mut() {
            let v = relative_velocity(&states, c);

            for k in 0..2 {
                let vt = dot_product(v, c.tangents[k]);
                let limit = c.friction * c.normal_impulse;
                let previous = c.tangent_impulse[k];
                c.tangent_impulse[k] = (previous - vt * c.tangent_mass[k]).clamp(-limit, limit);
                let delta = c.tangent_impulse[k] - previous;
                apply_pair_impulse(&mut states, c, scale_vector(c.tangents[k], delta));
            }

            let vn = dot_product(relative_velocity(&states, c), c.normal);
            let previous = c.normal_impulse;
            c.normal_impulse = (previous + (c.velocity_bias - vn) * c.normal_mass).max(0.0);
            let delta = c.normal_impulse - previous;
            apply_pair_impulse(&mut states, c, scale_vector(c.normal, delta));
        }
    }

    for state in states.into_iter().filter(|s| s.writable) {
        if let Some(body) = bodies.get_mut(&state.handle) {
            body.linear_velocity = state.linear_velocity;
            body.angular_velocity = state.angular_velocity;
        }
    }
}

/// Pushes overlapping bodies apart along the deepest contact normal of each manifold.
///
/// Only the penetration beyond the slop is corrected, by `correction_percent` of it,
/// split by inverse mass. Velocities are left alone.
pub fn correct_positions(
    bodies: &mut BTreeMap<BodyHandle, RigidBody>,
    manifolds: &[ContactManifold],
    config: &SessionConfig,
) {
    for manifold in manifolds {
        let Some(deepest) = manifold.deepest() else {
            continue;
        };
        let depth = (deepest.penetration - config.penetration_slop).max(0.0) * config.correction_percent;
        if depth <= 0.0 {
            continue;
        }

        let inv_mass = |handle: &BodyHandle| {
            bodies
                .get(handle)
                .filter(|body| body.is_active())
                .map_or(0.0, |body| body.inv_mass)
        };
        let inv_a = inv_mass(&manifold.body_a);
        let inv_b = inv_mass(&manifold.body_b);
        let total = inv_a + inv_b;
        if total <= 0.0 {
            continue;
        }

        let correction = scale_vector(deepest.normal, depth / total);
        if let Some(body) = bodies.get_mut(&manifold.body_a).filter(|_| inv_a > 0.0) {
            body.position = add_vectors(body.position, scale_vector(correction, inv_a));
        }
        if let Some(body) = bodies.get_mut(&manifold.body_b).filter(|_| inv_b > 0.0) {
            body.position = subtract_vectors(body.position, scale_vector(correction, inv_b));
        }
    }
}
