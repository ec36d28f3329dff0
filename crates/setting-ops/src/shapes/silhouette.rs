//! Girdle outline of a stone as a function of azimuth.

use std::f64::consts::TAU;

use mesh_kernel::normalize_angle;
use nalgebra::{Point2, Vector2};
use setting_types::{StoneShape, StoneSpec};

/// Footprint of a stone at its girdle, centred on the vertical axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Silhouette {
    /// Semi-axes along x and y.
    Ellipse { a: f64, b: f64 },
    /// Convex polygon, vertices sorted by azimuth.
    Polygon { vertices: Vec<Point2<f64>> },
}

fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

impl Silhouette {
    pub fn from_spec(spec: &StoneSpec) -> Self {
        let hx = spec.width / 2.0;
        let hy = spec.length / 2.0;
        match spec.shape {
            StoneShape::Round => Silhouette::Ellipse { a: hx, b: hy },
            StoneShape::Princess => Self::polygon(vec![
                Point2::new(hx, hy),
                Point2::new(-hx, hy),
                Point2::new(-hx, -hy),
                Point2::new(hx, -hy),
            ]),
            StoneShape::Radiant => {
                let c = spec.shape.proportions().corner_cut * spec.width.min(spec.length);
                Self::polygon(vec![
                    Point2::new(hx, -hy + c),
                    Point2::new(hx, hy - c),
                    Point2::new(hx - c, hy),
                    Point2::new(-hx + c, hy),
                    Point2::new(-hx, hy - c),
                    Point2::new(-hx, -hy + c),
                    Point2::new(-hx + c, -hy),
                    Point2::new(hx - c, -hy),
                ])
            }
        }
    }

    fn polygon(mut vertices: Vec<Point2<f64>>) -> Self {
        vertices.sort_by(|p, q| {
            normalize_angle(p.y.atan2(p.x)).total_cmp(&normalize_angle(q.y.atan2(q.x)))
        });
        Silhouette::Polygon { vertices }
    }

    /// Distance from the axis to the outline along azimuth `phi`.
    pub fn radius_at(&self, phi: f64) -> f64 {
        let (s, c) = phi.sin_cos();
        match self {
            Silhouette::Ellipse { a, b } => a * b / ((b * c).powi(2) + (a * s).powi(2)).sqrt(),
            Silhouette::Polygon { vertices } => {
                let dir = Vector2::new(c, s);
                let n = vertices.len();
                let mut best = f64::INFINITY;
                for i in 0..n {
                    let p = vertices[i].coords;
                    let e = vertices[(i + 1) % n].coords - p;
                    let denom = cross(&dir, &e);
                    if denom.abs() < 1e-15 {
                        continue;
                    }
                    let t = cross(&p, &e) / denom;
                    let u = cross(&p, &dir) / denom;
                    if t > 0.0 && (-1e-12..=1.0 + 1e-12).contains(&u) && t < best {
                        best = t;
                    }
                }
                best
            }
        }
    }

    /// Outline point along azimuth `phi`.
    ///
    /// Polygon corners are returned exactly when `phi` is a corner azimuth.
    pub fn point_at(&self, phi: f64) -> Point2<f64> {
        if let Silhouette::Polygon { vertices } = self {
            let phi = normalize_angle(phi);
            if let Some(v) = vertices
                .iter()
                .find(|v| normalize_angle(v.y.atan2(v.x)) == phi)
            {
                return *v;
            }
        }
        let r = self.radius_at(phi);
        let (s, c) = phi.sin_cos();
        Point2::new(r * c, r * s)
    }

    pub fn max_radius(&self) -> f64 {
        match self {
            Silhouette::Ellipse { a, b } => a.max(*b),
            Silhouette::Polygon { vertices } => vertices
                .iter()
                .map(|v| v.coords.norm())
                .fold(0.0, f64::max),
        }
    }

    /// Azimuths of polygon corners; empty for smooth outlines.
    pub fn corner_azimuths(&self) -> Vec<f64> {
        match self {
            Silhouette::Ellipse { .. } => Vec::new(),
            Silhouette::Polygon { vertices } => vertices
                .iter()
                .map(|v| normalize_angle(v.y.atan2(v.x)))
                .collect(),
        }
    }

    /// Azimuth of the first prong.
    ///
    /// Smooth outlines start on the +X axis. Faceted outlines start on the
    /// first-quadrant corner that reaches furthest from the axis, the one
    /// nearest the footprint diagonal on ties, so four prongs grip a square
    /// on its outermost corners.
    pub fn grip_azimuth(&self) -> f64 {
        match self {
            Silhouette::Ellipse { .. } => 0.0,
            Silhouette::Polygon { vertices } => {
                let hx = vertices.iter().map(|v| v.x).fold(0.0, f64::max);
                let hy = vertices.iter().map(|v| v.y).fold(0.0, f64::max);
                let diagonal = hy.atan2(hx);
                let reach = self.max_radius();
                vertices
                    .iter()
                    .filter(|v| v.x > 0.0 && v.y > 0.0)
                    .filter(|v| v.coords.norm() >= reach * (1.0 - 1e-9))
                    .map(|v| v.y.atan2(v.x))
                    .min_by(|a, b| (a - diagonal).abs().total_cmp(&(b - diagonal).abs()))
                    .unwrap_or(diagonal)
            }
        }
    }

    /// Outline stations before seat windows are added: uniform for an
    /// ellipse, the corners for a polygon.
    pub fn base_stations(&self, segments: usize) -> Vec<f64> {
        match self {
            Silhouette::Ellipse { .. } => (0..segments)
                .map(|j| TAU * j as f64 / segments as f64)
                .collect(),
            Silhouette::Polygon { .. } => self.corner_azimuths(),
        }
    }
}
