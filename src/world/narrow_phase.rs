// src/world/narrow_phase.rs
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::models::{BodyHandle, CollisionShape, RigidBody};
use crate::utils::{dot_product, scale_vector, subtract_vectors, Vector3};
use crate::geometry::ConvexHullShape;

/// One point of contact between two bodies.
///
/// `normal` points from body B towards body A, so pushing A along it separates the pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub point: Vector3,
    pub normal: Vector3,
    pub penetration: f64,
}

/// All contacts found between one pair of bodies in one sub-step
#[derive(Debug, Clone, PartialEq)]
pub struct ContactManifold {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub contacts: Vec<ContactPoint>,
}

impl ContactManifold {
    /// Deepest contact of the manifold
    pub fn deepest(&self) -> Option<&ContactPoint> {
        self.contacts
            .iter()
            .max_by(|a, b| a.penetration.total_cmp(&b.penetration))
    }
}

/// Generates contacts for every candidate pair from the current (pre-integration) poses.
///
/// The bodies are only read, so with the `parallel` feature the pairs are processed on the
/// rayon pool; results come back in pair order either way.
pub fn generate_contacts(
    bodies: &BTreeMap<BodyHandle, RigidBody>,
    pairs: &[(BodyHandle, BodyHandle)],
) -> Vec<ContactManifold> {
    let collide_pair = |&(a, b): &(BodyHandle, BodyHandle)| match (bodies.get(&a), bodies.get(&b)) {
        (Some(a), Some(b)) => collide(a, b),
        _ => None,
    };

    #[cfg(feature = "parallel")]
    {
        pairs.par_iter().filter_map(collide_pair).collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        pairs.iter().filter_map(collide_pair).collect()
    }
}

/// Contacts between two bodies, or `None` if they do not touch.
///
/// A hull is always reported as body A when paired with a half-space.
///
/// Hull pairs only test each hull's vertices against the other hull, so two hulls
/// crossing edge to edge with no vertex inside the other produce no contact.
pub fn collide(a: &RigidBody, b: &RigidBody) -> Option<ContactManifold> {
    let contacts = match (a.shape(), b.shape()) {
        (CollisionShape::ConvexHull(_), CollisionShape::HalfSpace { normal }) => {
            hull_against_half_space(a, b, *normal)
        }
        (CollisionShape::HalfSpace { .. }, CollisionShape::ConvexHull(_)) => return collide(b, a),
        (CollisionShape::ConvexHull(hull_a), CollisionShape::ConvexHull(hull_b)) => {
            let mut contacts = vertices_inside(a, b, hull_b, 1.0);
            contacts.extend(vertices_inside(b, a, hull_a, -1.0));
            contacts
        }
        (CollisionShape::HalfSpace { .. }, CollisionShape::HalfSpace { .. }) => Vec::new(),
    };

    if contacts.is_empty() {
        return None;
    }
    Some(ContactManifold {
        body_a: a.id(),
        body_b: b.id(),
        contacts,
    })
}

fn hull_against_half_space(hull: &RigidBody, plane: &RigidBody, local_normal: Vector3) -> Vec<ContactPoint> {
    let normal = plane.orientation().rotate_point(local_normal);
    let origin = plane.position();

    hull.world_vertices()
        .into_iter()
        .filter_map(|vertex| {
            let depth = dot_product(normal, subtract_vectors(vertex, origin));
            (depth < 0.0).then_some(ContactPoint {
                point: vertex,
                normal,
                penetration: -depth,
            })
        })
        .collect()
}

/// Vertices of `probe` lying inside `target`, each pushed out through the target face
/// it is closest to. `sign` flips the face normal so it always points from B to A.
fn vertices_inside(
    probe: &RigidBody,
    target: &RigidBody,
    target_hull: &ConvexHullShape,
    sign: f64,
) -> Vec<ContactPoint> {
    probe
        .world_vertices()
        .into_iter()
        .filter_map(|vertex| {
            let local = target.to_local(vertex);
            let (plane, distance) = target_hull.closest_face(local)?;
            if distance >= 0.0 {
                return None;
            }
            let normal = target.orientation().rotate_point(plane.normal);
            Some(ContactPoint {
                point: vertex,
                normal: scale_vector(normal, sign),
                penetration: -distance,
            })
        })
        .collect()
}
