// src/world/broad_phase.rs
use crate::models::BodyHandle;
use crate::utils::{Vector3, add_vectors, subtract_vectors};

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3,
    pub max: Vector3,
}

impl Aabb {
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Box around a bounding sphere
    pub fn from_sphere(center: Vector3, radius: f64) -> Self {
        let r = (radius, radius, radius);
        Self {
            min: subtract_vectors(center, r),
            max: add_vectors(center, r),
        }
    }

    /// Touching boxes count as overlapping
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.0 <= other.max.0
            && self.max.0 >= other.min.0
            && self.min.1 <= other.max.1
            && self.max.1 >= other.min.1
            && self.min.2 <= other.max.2
            && self.max.2 >= other.min.2
    }
}

/// Returns every pair of overlapping boxes, each as `(lower handle, higher handle)`, sorted.
///
/// Boxes are sorted by their lower x bound and swept once; only boxes whose x
/// intervals are still open get the full overlap test.
///
/// # Example
/// ```
/// use rs_dice::models::BodyHandle;
/// use rs_dice::world::{sweep_and_prune, Aabb};
///
/// let boxes = [
///     (BodyHandle(1), Aabb::from_sphere((0.0, 0.0, 0.0), 1.0)),
///     (BodyHandle(2), Aabb::from_sphere((1.5, 0.0, 0.0), 1.0)),
///     (BodyHandle(3), Aabb::from_sphere((10.0, 0.0, 0.0), 1.0)),
/// ];
/// assert_eq!(sweep_and_prune(&boxes), vec![(BodyHandle(1), BodyHandle(2))]);
/// ```
pub fn sweep_and_prune(entries: &[(BodyHandle, Aabb)]) -> Vec<(BodyHandle, BodyHandle)> {
    let mut order: Vec<&(BodyHandle, Aabb)> = entries.iter().collect();
    order.sort_by(|a, b| a.1.min.0.total_cmp(&b.1.min.0).then(a.0.cmp(&b.0)));

    let mut active: Vec<&(BodyHandle, Aabb)> = Vec::new();
    let mut pairs = Vec::new();

    for entry in order {
        let start = entry.1.min.0;
        active.retain(|open| open.1.max.0 >= start);

        for open in &active {
            if open.1.overlaps(&entry.1) {
                let (a, b) = if open.0 < entry.0 { (open.0, entry.0) } else { (entry.0, open.0) };
                pairs.push((a, b));
            }
        }
        active.push(entry);
    }

    pairs.sort();
    pairs
}
