//! Small geometric helpers shared by growth and meshing.
//!
//! Only `glam`'s plain value types are used here; the rotations and
//! samplings themselves are computed explicitly so that their edge cases
//! (antiparallel vectors, degenerate inputs) are under our control.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::{Quat, Vec3};
use rand::Rng;

/// Tolerance under which two unit vectors are treated as (anti)parallel.
const PARALLEL_EPS: f32 = 1e-6;

/// Exponent applied to the warped radius when sampling the crown volume.
const SHELL_BIAS: f32 = 0.8;

/// Returns the minimal rotation taking direction `from` onto direction `to`.
///
/// Inputs need not be normalized. If either is zero-length the identity is
/// returned. For antiparallel inputs the rotation is a half turn around an
/// arbitrary axis perpendicular to `from`.
pub fn shortest_arc(from: Vec3, to: Vec3) -> Quat {
    let (Some(from), Some(to)) = (from.try_normalize(), to.try_normalize()) else {
        return Quat::IDENTITY;
    };

    let d = from.dot(to);
    if d >= 1.0 - PARALLEL_EPS {
        return Quat::IDENTITY;
    }
    if d <= -1.0 + PARALLEL_EPS {
        return Quat::from_axis_angle(from.any_orthonormal_vector(), PI);
    }

    // q = (from x to, 1 + from . to), normalized, is the half-angle form.
    let axis = from.cross(to);
    Quat::from_xyzw(axis.x, axis.y, axis.z, 1.0 + d).normalize()
}

/// Converts spherical coordinates to Cartesian.
///
/// `alpha` is the polar angle measured from +Z, `theta` the azimuth in the
/// XY plane.
#[inline]
pub fn spherical_to_cartesian(radius: f32, alpha: f32, theta: f32) -> Vec3 {
    let (sin_a, cos_a) = alpha.sin_cos();
    let (sin_t, cos_t) = theta.sin_cos();
    Vec3::new(radius * cos_t * sin_a, radius * sin_t * sin_a, radius * cos_a)
}

/// Warps a uniform scalar `u` in `[0, 1)` into a radius in `[0, radius)`.
///
/// The warp `sin(u * pi/2)^0.8` pushes samples toward the outer shell,
/// which gives a denser, canopy-like distribution.
#[inline]
pub fn shell_biased_radius(u: f32, radius: f32) -> f32 {
    (u * FRAC_PI_2).sin().powf(SHELL_BIAS) * radius
}

/// Samples a point inside a ball of the given radius centered at the origin,
/// biased toward the shell by [`shell_biased_radius`].
pub fn sample_crown_point(radius: f32, rng: &mut impl Rng) -> Vec3 {
    let r = shell_biased_radius(rng.random::<f32>(), radius);
    let alpha = rng.random_range(0.0..PI);
    let theta = rng.random_range(0.0..TAU);
    spherical_to_cartesian(r, alpha, theta)
}

/// Samples a direction uniformly on the unit sphere.
pub fn random_unit_vector(rng: &mut impl Rng) -> Vec3 {
    let z: f32 = rng.random_range(-1.0..=1.0);
    let theta = rng.random_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    let (sin_t, cos_t) = theta.sin_cos();
    Vec3::new(r * cos_t, r * sin_t, z)
}
