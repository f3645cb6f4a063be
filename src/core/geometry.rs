//! Joint angle from three landmarks
//!
//! Angle at `vertex` between the rays to `proximal` and `distal`, taken as
//! the difference of the two rays' `atan2` directions and folded into
//! [0, 180]. The fold makes the result undirected: swapping `proximal` and
//! `distal` gives the same value.

use std::f64::consts::PI;
use crate::types::Point2D;

/// Calculate the joint angle in degrees, in [0, 180]
///
/// Never fails. Zero-length segments are not rejected: a ray of length
/// zero has direction `atan2(0, 0) = 0`, so three coincident points give 0°
/// and a single collapsed segment measures the other ray against the +x axis.
pub fn joint_angle(proximal: &Point2D, vertex: &Point2D, distal: &Point2D) -> f64 {
    let radians = (distal.y - vertex.y).atan2(distal.x - vertex.x)
        - (proximal.y - vertex.y).atan2(proximal.x - vertex.x);

    let angle = (radians * 180.0 / PI).abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}
