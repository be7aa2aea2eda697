//! Planar geometry helpers.
//!
//! Distances are Euclidean in degree space. This ignores longitude
//! shrinkage away from the equator, which is acceptable for the
//! sub-kilometre radii the game works with.

use core::f64::consts::TAU;

use pokespawn_types::GeoPoint;
use rand::Rng;

/// Approximate length of one degree of latitude, in metres.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Retries when a sampled point lands outside the annulus after rounding.
const MAX_NUDGES: u32 = 64;

/// Convert a distance in metres to degrees.
pub fn meters_to_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Convert a distance in degrees to metres.
pub fn degrees_to_meters(degrees: f64) -> f64 {
    degrees * METERS_PER_DEGREE
}

/// Draw a point in the annulus `inner <= r < outer` around `center`.
///
/// The radius is uniform in `[inner, outer)` and the angle uniform in
/// `[0, 2π)`. Points therefore cluster toward the inner edge; uniform
/// area density is not a goal.
///
/// The bounds hold for the measured [`GeoPoint::planar_distance`], not
/// only for the drawn radius: a point that rounding puts on the wrong side
/// of either edge is moved along its ray until it is back inside.
pub fn sample_annulus<R: Rng + ?Sized>(
    center: GeoPoint,
    inner: f64,
    outer: f64,
    rng: &mut R,
) -> GeoPoint {
    let mut radius = if inner < outer {
        rng.random_range(inner..outer)
    } else {
        inner
    };
    let (sin, cos) = rng.random_range(0.0..TAU).sin_cos();
    let mut point = center.offset(radius * cos, radius * sin);

    // Start at one ulp of the larger coordinate and double per retry.
    let mut step = f64::EPSILON
        * center
            .latitude
            .abs()
            .max(center.longitude.abs())
            .max(radius)
            .max(1.0);
    for _ in 0..MAX_NUDGES {
        let distance = center.planar_distance(point);
        if distance < inner {
            radius += step;
        } else if inner < outer && distance >= outer {
            radius = (radius - step).max(inner);
        } else {
            break;
        }
        step *= 2.0;
        point = center.offset(radius * cos, radius * sin);
    }
    point
}
