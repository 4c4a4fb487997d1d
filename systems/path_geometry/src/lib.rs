#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Smooth road geometry built from ordered waypoints.
//!
//! The road is a Catmull-Rom spline sampled into a dense polyline with a
//! cumulative arc-length table alongside it. Every distance-based query the
//! simulation performs (enemy positioning, placement clearance) runs against
//! the sampled polyline, so the spline itself is only evaluated at build
//! time. Rebuilding is wholesale: a layout change constructs a fresh
//! [`PathGeometry`] and the old one is dropped.

use curve_defence_core::{FieldPoint, PathError};
use glam::Vec2;

/// Polyline samples generated per waypoint segment.
const SAMPLES_PER_SEGMENT: usize = 18;

/// Immutable sampled road with arc-length lookups.
#[derive(Clone, Debug, PartialEq)]
pub struct PathGeometry {
    samples: Vec<FieldPoint>,
    cumulative: Vec<f32>,
    total: f32,
}

impl PathGeometry {
    /// Builds the road from ordered waypoints, base end first.
    ///
    /// The endpoints are duplicated as phantom controls so the spline passes
    /// through the first and last waypoint exactly.
    pub fn from_waypoints(waypoints: &[FieldPoint]) -> Result<Self, PathError> {
        if waypoints.len() < 2 {
            return Err(PathError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }
        if let Some(index) = waypoints.iter().position(|point| !point.is_finite()) {
            return Err(PathError::NonFiniteWaypoint { index });
        }

        let samples = sample_spline(waypoints);
        let mut cumulative = Vec::with_capacity(samples.len());
        cumulative.push(0.0);
        for window in samples.windows(2) {
            let step = window[0].distance_to(window[1]);
            let previous = cumulative[cumulative.len() - 1];
            cumulative.push(previous + step);
        }
        let total = cumulative[cumulative.len() - 1];

        Ok(Self {
            samples,
            cumulative,
            total,
        })
    }

    /// Arc length of the whole road in playfield units.
    #[must_use]
    pub const fn total_length(&self) -> f32 {
        self.total
    }

    /// Point on the road at the provided arc-length distance from the base.
    ///
    /// Distances at or below zero clamp to the base end, distances at or
    /// beyond the total length clamp to the spawn end. Interior lookups
    /// binary-search the cumulative table and interpolate within the found
    /// sample span.
    #[must_use]
    pub fn point_at(&self, distance: f32) -> FieldPoint {
        if distance <= 0.0 {
            return self.samples[0];
        }
        if distance >= self.total {
            return self.samples[self.samples.len() - 1];
        }

        let upper = self
            .cumulative
            .partition_point(|&reached| reached <= distance);
        let index = upper.saturating_sub(1).min(self.samples.len() - 2);
        let span = self.cumulative[index + 1] - self.cumulative[index];
        let t = if span <= 0.0 {
            0.0
        } else {
            (distance - self.cumulative[index]) / span
        };
        let a = vec(self.samples[index]);
        let b = vec(self.samples[index + 1]);
        point(a.lerp(b, t))
    }

    /// Shortest distance from an arbitrary point to the road centreline.
    ///
    /// Every polyline segment is tested with the projection clamped to the
    /// segment, so points past either end measure against the end sample
    /// rather than an infinite line.
    #[must_use]
    pub fn distance_to(&self, from: FieldPoint) -> f32 {
        let probe = vec(from);
        let mut best = f32::INFINITY;
        for window in self.samples.windows(2) {
            let candidate = point_segment_distance(probe, vec(window[0]), vec(window[1]));
            if candidate < best {
                best = candidate;
            }
        }
        best
    }

    /// Sampled polyline in base-to-spawn order, for consumers drawing the road.
    #[must_use]
    pub fn samples(&self) -> &[FieldPoint] {
        &self.samples
    }

    /// Position of the base end of the road.
    #[must_use]
    pub fn base(&self) -> FieldPoint {
        self.samples[0]
    }

    /// Position of the spawn end of the road.
    #[must_use]
    pub fn spawn_end(&self) -> FieldPoint {
        self.samples[self.samples.len() - 1]
    }
}

fn sample_spline(waypoints: &[FieldPoint]) -> Vec<FieldPoint> {
    let mut extended = Vec::with_capacity(waypoints.len() + 2);
    extended.push(vec(waypoints[0]));
    extended.extend(waypoints.iter().copied().map(vec));
    extended.push(vec(waypoints[waypoints.len() - 1]));

    let mut samples = Vec::with_capacity((waypoints.len() - 1) * SAMPLES_PER_SEGMENT + 1);
    for segment in 1..extended.len() - 2 {
        let p0 = extended[segment - 1];
        let p1 = extended[segment];
        let p2 = extended[segment + 1];
        let p3 = extended[segment + 2];
        for step in 0..SAMPLES_PER_SEGMENT {
            let t = step as f32 / SAMPLES_PER_SEGMENT as f32;
            samples.push(point(catmull_rom(p0, p1, p2, p3, t)));
        }
    }
    samples.push(waypoints[waypoints.len() - 1]);
    samples
}

fn catmull_rom(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t2 = t * t;
    let t3 = t2 * t;
    0.5 * (2.0 * p1
        + (p2 - p0) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3)
}

fn point_segment_distance(probe: Vec2, a: Vec2, b: Vec2) -> f32 {
    let span = b - a;
    let length_squared = span.length_squared();
    if length_squared <= f32::EPSILON {
        return probe.distance(a);
    }
    let t = ((probe - a).dot(span) / length_squared).clamp(0.0, 1.0);
    probe.distance(a + span * t)
}

fn vec(point: FieldPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}

fn point(vec: Vec2) -> FieldPoint {
    FieldPoint::new(vec.x, vec.y)
}
