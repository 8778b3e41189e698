use glam::Vec3;
use rand::Rng;

/// Axis-aligned box described by its centre and half-size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub center: Vec3,
    pub extents: Vec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::from_size(Vec3::ZERO, Vec3::splat(10.0))
    }
}

impl Bounds {
    pub fn new(center: Vec3, extents: Vec3) -> Self {
        Self {
            center,
            extents: extents.abs(),
        }
    }

    /// Builds a box from its full edge lengths.
    pub fn from_size(center: Vec3, size: Vec3) -> Self {
        Self::new(center, size * 0.5)
    }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self::new((min + max) * 0.5, (max - min) * 0.5)
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.extents
    }

    pub fn size(&self) -> Vec3 {
        self.extents * 2.0
    }

    /// Returns `true` if `p` lies inside the box or on its surface.
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min()).all() && p.cmple(self.max()).all()
    }

    /// Grows the box so that it also covers `p`.
    pub fn encapsulate(&mut self, p: Vec3) {
        *self = Self::from_min_max(self.min().min(p), self.max().max(p));
    }

    /// Uniformly random point inside the box.
    pub fn random_point(&self, rng: &mut (impl Rng + ?Sized)) -> Vec3 {
        let (min, max) = (self.min(), self.max());
        Vec3::new(
            rng.random_range(min.x..=max.x),
            rng.random_range(min.y..=max.y),
            rng.random_range(min.z..=max.z),
        )
    }

    /// Slab test against the segment `origin + dir * t`, `t` in `[0, max_t]`.
    pub fn intersects_ray(&self, origin: Vec3, dir: Vec3, max_t: f32) -> bool {
        let (min, max) = (self.min(), self.max());
        let mut t_min = 0.0_f32;
        let mut t_max = max_t;

        for axis in 0..3 {
            let (o, d) = (origin[axis], dir[axis]);
            if d.abs() <= f32::EPSILON {
                if o < min[axis] || o > max[axis] {
                    return false;
                }
                continue;
            }

            let inv_d = 1.0 / d;
            let mut t0 = (min[axis] - o) * inv_d;
            let mut t1 = (max[axis] - o) * inv_d;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_max < t_min {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn contains_is_inclusive_on_faces() {
        let b = Bounds::from_size(Vec3::ZERO, Vec3::splat(10.0));
        assert!(b.contains(Vec3::ZERO));
        assert!(b.contains(Vec3::new(5.0, -5.0, 5.0)));
        assert!(!b.contains(Vec3::new(5.01, 0.0, 0.0)));
        assert!(!b.contains(Vec3::new(7.0, 0.0, 0.0)));
    }

    #[test]
    fn random_point_stays_inside() {
        let b = Bounds::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 4.0, 2.0));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(b.contains(b.random_point(&mut rng)));
        }
    }

    #[test]
    fn encapsulate_grows_to_cover_point() {
        let mut b = Bounds::new(Vec3::ZERO, Vec3::ONE);
        b.encapsulate(Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(b.min(), Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(b.max(), Vec3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn intersects_ray_respects_length() {
        let b = Bounds::new(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE);
        assert!(b.intersects_ray(Vec3::ZERO, Vec3::X, 10.0));
        assert!(!b.intersects_ray(Vec3::ZERO, Vec3::X, 3.0));
        assert!(!b.intersects_ray(Vec3::ZERO, Vec3::Y, 10.0));
        assert!(!b.intersects_ray(Vec3::ZERO, -Vec3::X, 10.0));
    }
}
