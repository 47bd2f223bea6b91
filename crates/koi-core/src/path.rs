//! Flight paths for bugs hovering over the pond.
//!
//! A [`BugPath`] threads a cubic Hermite curve through its nodes and keeps a
//! progress cursor measured in arc length along that curve.

use rand::Rng;

use crate::math::Vec3;
use crate::samplers::Sampler;

/// Cubic Hermite spline through a list of points, Catmull-Rom tangents.
#[derive(Debug, Clone)]
pub struct CubicHermite {
    points: Vec<Vec3>,
    tangents: Vec<Vec3>,
}

impl CubicHermite {
    pub fn new(points: Vec<Vec3>) -> Self {
        let n = points.len();
        let tangents = (0..n)
            .map(|i| match (i, n) {
                (_, 0 | 1) => Vec3::ZERO,
                (0, _) => points[1] - points[0],
                (i, n) if i == n - 1 => points[i] - points[i - 1],
                (i, _) => (points[i + 1] - points[i - 1]) * 0.5,
            })
            .collect();

        Self { points, tangents }
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Point on segment `segment` at local parameter `u` in `[0, 1]`.
    pub fn sample(&self, segment: usize, u: f32) -> Vec3 {
        let p0 = self.points[segment];
        let p1 = self.points[segment + 1];
        let m0 = self.tangents[segment];
        let m1 = self.tangents[segment + 1];

        let u2 = u * u;
        let u3 = u2 * u;

        p0 * (2.0 * u3 - 3.0 * u2 + 1.0)
            + m0 * (u3 - 2.0 * u2 + u)
            + p1 * (-2.0 * u3 + 3.0 * u2)
            + m1 * (u3 - u2)
    }
}

/// Arc-length parameterized flattening of a [`CubicHermite`].
#[derive(Debug, Clone)]
pub struct CubicHermiteSampler {
    samples: Vec<Vec3>,
    distances: Vec<f32>,
    pub length: f32,
}

impl CubicHermiteSampler {
    /// Flatten `curve` into points at most roughly `resolution` apart.
    /// The curve must have at least one point.
    pub fn new(curve: &CubicHermite, resolution: f32) -> Self {
        let mut samples = vec![curve.points[0]];
        let mut distances = vec![0.0];

        for segment in 0..curve.segment_count() {
            let chord = curve.points[segment].distance(&curve.points[segment + 1]);
            let steps = ((chord / resolution).ceil() as usize).max(1);

            for step in 1..=steps {
                let point = curve.sample(segment, step as f32 / steps as f32);
                let last = samples[samples.len() - 1];
                let travelled = distances[distances.len() - 1] + last.distance(&point);

                samples.push(point);
                distances.push(travelled);
            }
        }

        let length = distances[distances.len() - 1];

        Self {
            samples,
            distances,
            length,
        }
    }

    pub fn start(&self) -> Vec3 {
        self.samples[0]
    }

    /// Write the point `at` units along the curve into `out`. The cursor
    /// is clamped to the curve's ends.
    pub fn sample(&self, out: &mut Vec3, at: f32) {
        let last = self.samples.len() - 1;

        if last == 0 || at <= 0.0 {
            *out = self.samples[0];
            return;
        }
        if at >= self.length {
            *out = self.samples[last];
            return;
        }

        let next = self.distances.partition_point(|&d| d <= at).min(last);
        let previous = next - 1;
        let span = self.distances[next] - self.distances[previous];
        let t = if span > 0.0 {
            (at - self.distances[previous]) / span
        } else {
            0.0
        };

        *out = self.samples[previous].lerp(&self.samples[next], t);
    }
}

/// A point a bug path passes through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathNode {
    pub position: Vec3,
}

impl PathNode {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }
}

/// A flight path with a progress cursor.
#[derive(Debug, Clone)]
pub struct BugPath {
    nodes: Vec<PathNode>,
    at: f32,
    position: Vec3,
    curve: CubicHermiteSampler,
}

impl BugPath {
    pub const CURVE_RESOLUTION: f32 = 0.05;
    /// Favours low values, so fresh bugs tend to start near the beginning.
    pub const INITIAL_POSITION: Sampler = Sampler::power(0.0, 1.0, 5.0);

    /// Build a path; `None` when there are no nodes.
    pub fn new(nodes: Vec<PathNode>) -> Option<Self> {
        if nodes.is_empty() {
            return None;
        }

        let curve = Self::make_curve(&nodes);
        let position = curve.start();

        Some(Self {
            nodes,
            at: 0.0,
            position,
            curve,
        })
    }

    fn make_curve(nodes: &[PathNode]) -> CubicHermiteSampler {
        let points = nodes.iter().map(|node| node.position).collect();

        CubicHermiteSampler::new(&CubicHermite::new(points), Self::CURVE_RESOLUTION)
    }

    pub fn set_random_position(&mut self, rng: &mut impl Rng) {
        self.at = self.curve.length * Self::INITIAL_POSITION.draw(rng);
    }

    /// Advance the cursor; true once it has passed the end of the path.
    /// The cursor is not wrapped, picking a new path is up to the caller.
    pub fn move_by(&mut self, delta: f32) -> bool {
        self.at += delta;
        self.at > self.curve.length
    }

    /// Current position on the curve.
    pub fn position(&mut self) -> &Vec3 {
        self.curve.sample(&mut self.position, self.at);
        &self.position
    }

    pub fn at(&self) -> f32 {
        self.at
    }

    pub fn start(&self) -> Vec3 {
        self.curve.start()
    }

    pub fn last_node(&self) -> &PathNode {
        &self.nodes[self.nodes.len() - 1]
    }

    pub fn length(&self) -> f32 {
        self.curve.length
    }
}
