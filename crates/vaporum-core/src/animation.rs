//! Timers and spline interpolation for unit movement.

use crate::hex::HexCoord;
use glam::Vec3;

/// Elapsed-time countdown advanced by the frame tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Timer {
    duration: f32,
    elapsed: f32,
}

impl Timer {
    pub fn new(duration_seconds: f32) -> Self {
        Self {
            duration: duration_seconds.max(0.0),
            elapsed: 0.0,
        }
    }

    pub fn tick(&mut self, delta_seconds: f32) {
        self.elapsed = (self.elapsed + delta_seconds.max(0.0)).min(self.duration);
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Progress in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }
}

/// Catmull-Rom spline through a list of points.
///
/// Each segment is a cubic Hermite curve; interior tangents are half the
/// chord between the neighboring points and both ends have zero velocity,
/// so the curve starts and stops at rest.
#[derive(Clone, Debug, PartialEq)]
pub struct CatmullRomSpline {
    points: Vec<Vec3>,
    velocities: Vec<Vec3>,
}

impl CatmullRomSpline {
    pub fn new(points: Vec<Vec3>) -> Self {
        let n = points.len();
        let velocities = (0..n)
            .map(|i| {
                if i == 0 || i + 1 >= n {
                    Vec3::ZERO
                } else {
                    (points[i + 1] - points[i - 1]) * 0.5
                }
            })
            .collect();
        Self { points, velocities }
    }

    /// Number of curve segments.
    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Evaluate at parametric `t` in `[0, segment_count]` (clamped).
    pub fn evaluate(&self, t: f32) -> Vec3 {
        match self.points.len() {
            0 => return Vec3::ZERO,
            1 => return self.points[0],
            _ => {}
        }

        let segments = self.segment_count();
        let t = t.clamp(0.0, segments as f32);
        let index = (t.floor() as usize).min(segments - 1);
        let local = t - index as f32;

        let p0 = self.points[index];
        let p1 = self.points[index + 1];
        let v0 = self.velocities[index];
        let v1 = self.velocities[index + 1];
        hermite(p0, v0, p1, v1, local)
    }
}

fn hermite(p0: Vec3, v0: Vec3, p1: Vec3, v1: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;
    p0 * h00 + v0 * h10 + p1 * h01 + v1 * h11
}

/// In-flight movement of a unit along a tile path.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveAnimation {
    path: Vec<HexCoord>,
    spline: CatmullRomSpline,
    timer: Timer,
    seconds_per_tile: f32,
}

impl MoveAnimation {
    /// Animate along `path` in travel order; takes `seconds_per_tile` per step.
    pub fn new(path: Vec<HexCoord>, seconds_per_tile: f32) -> Self {
        let spline = CatmullRomSpline::new(path.iter().map(HexCoord::world_position).collect());
        let timer = Timer::new(seconds_per_tile * spline.segment_count() as f32);
        Self {
            path,
            spline,
            timer,
            seconds_per_tile,
        }
    }

    pub fn path(&self) -> &[HexCoord] {
        &self.path
    }

    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Advance time and return the new position.
    pub fn advance(&mut self, delta_seconds: f32) -> Vec3 {
        self.timer.tick(delta_seconds);
        self.position()
    }

    /// Current position along the path.
    pub fn position(&self) -> Vec3 {
        if self.seconds_per_tile <= 0.0 {
            return self.spline.evaluate(self.spline.segment_count() as f32);
        }
        self.spline.evaluate(self.timer.elapsed() / self.seconds_per_tile)
    }

    pub fn is_finished(&self) -> bool {
        self.timer.is_finished()
    }
}

/// Yaw in degrees of a ground-plane direction, `None` for a zero vector.
pub fn yaw_of(direction: Vec3) -> Option<f32> {
    if direction.x == 0.0 && direction.y == 0.0 {
        None
    } else {
        Some(direction.y.atan2(direction.x).to_degrees())
    }
}

/// Rotate `current` toward `goal` by at most `max_delta` degrees along the shorter arc.
pub fn turn_toward_degrees(current: f32, goal: f32, max_delta: f32) -> f32 {
    let diff = (goal - current + 180.0).rem_euclid(360.0) - 180.0;
    if diff.abs() <= max_delta {
        goal
    } else {
        current + max_delta * diff.signum()
    }
}
