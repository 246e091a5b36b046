//! Procedural geometry for the four floating shape kinds.

use fnv::FnvHashSet;
use glam::Vec3;
use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const TORUS_KNOT_RADIUS: f32 = 1.0;
pub const TORUS_KNOT_TUBE: f32 = 0.3;
pub const TORUS_KNOT_TUBULAR_SEGMENTS: u32 = 100;
pub const TORUS_KNOT_RADIAL_SEGMENTS: u32 = 16;
pub const TORUS_KNOT_P: f32 = 2.0;
pub const TORUS_KNOT_Q: f32 = 3.0;
pub const SPHERE_WIDTH_SEGMENTS: u32 = 32;
pub const SPHERE_HEIGHT_SEGMENTS: u32 = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    #[default]
    Icosahedron,
    Octahedron,
    TorusKnot,
    Sphere,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown shape kind `{0}`")]
pub struct UnknownShape(pub String);

impl FromStr for ShapeKind {
    type Err = UnknownShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "icosahedron" => Ok(Self::Icosahedron),
            "octahedron" => Ok(Self::Octahedron),
            "torus" | "torusknot" | "torus-knot" | "torus_knot" => Ok(Self::TorusKnot),
            "sphere" => Ok(Self::Sphere),
            _ => Err(UnknownShape(s.to_string())),
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Icosahedron => "icosahedron",
            Self::Octahedron => "octahedron",
            Self::TorusKnot => "torus-knot",
            Self::Sphere => "sphere",
        };
        f.write_str(name)
    }
}

impl ShapeKind {
    /// Parse a shape tag, falling back to [`ShapeKind::Icosahedron`] for
    /// anything unrecognised.
    pub fn from_tag(tag: &str) -> Self {
        tag.parse().unwrap_or_else(|e: UnknownShape| {
            log::warn!("{e}; using {}", Self::default());
            Self::default()
        })
    }

    pub fn geometry(self) -> Geometry {
        match self {
            Self::Icosahedron => icosahedron(1.0),
            Self::Octahedron => octahedron(1.0),
            Self::TorusKnot => torus_knot(
                TORUS_KNOT_RADIUS,
                TORUS_KNOT_TUBE,
                TORUS_KNOT_TUBULAR_SEGMENTS,
                TORUS_KNOT_RADIAL_SEGMENTS,
                TORUS_KNOT_P,
                TORUS_KNOT_Q,
            ),
            Self::Sphere => sphere(1.0, SPHERE_WIDTH_SEGMENTS, SPHERE_HEIGHT_SEGMENTS),
        }
    }
}

/// GPU vertex for wireframe line lists.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Indexed triangle mesh with per-vertex normals.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Unique undirected triangle edges, in first-seen order.
    pub fn edges(&self) -> Vec<[u32; 2]> {
        let mut seen = FnvHashSet::default();
        let mut out = Vec::with_capacity(self.indices.len());
        for tri in self.indices.chunks_exact(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let key = (a.min(b), a.max(b));
                if seen.insert(key) {
                    out.push([a, b]);
                }
            }
        }
        out
    }

    /// Flattened line-list vertices for wireframe drawing.
    pub fn line_vertices(&self) -> Vec<LineVertex> {
        self.edges()
            .into_iter()
            .flat_map(|edge| edge.map(|i| self.vertex(i)))
            .collect()
    }

    fn vertex(&self, i: u32) -> LineVertex {
        let i = i as usize;
        LineVertex {
            position: self.positions[i].to_array(),
            normal: self.normals[i].to_array(),
        }
    }
}

fn from_unit_vertices(raw: &[[f32; 3]], indices: &[u32], radius: f32) -> Geometry {
    let normals: Vec<Vec3> = raw.iter().map(|v| Vec3::from(*v).normalize()).collect();
    Geometry {
        positions: normals.iter().map(|n| *n * radius).collect(),
        normals,
        indices: indices.to_vec(),
    }
}

pub fn icosahedron(radius: f32) -> Geometry {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    let raw = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let indices = [
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7,
        1, 8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9,
        8, 1,
    ];
    from_unit_vertices(&raw, &indices, radius)
}

pub fn octahedron(radius: f32) -> Geometry {
    let raw = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];
    let indices = [
        0, 2, 4, 0, 4, 3, 0, 3, 5, 0, 5, 2, 1, 2, 5, 1, 5, 3, 1, 3, 4, 1, 4, 2,
    ];
    from_unit_vertices(&raw, &indices, radius)
}

/// UV sphere; rows run pole to pole, each row has a duplicated seam vertex.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let w = width_segments.max(3);
    let h = height_segments.max(2);
    let mut g = Geometry::default();
    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let (sin_theta, cos_theta) = (v * PI).sin_cos();
            let (sin_phi, cos_phi) = (u * TAU).sin_cos();
            let n = Vec3::new(-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta);
            g.positions.push(n * radius);
            g.normals.push(n.normalize_or_zero());
        }
    }
    let row = w + 1;
    for iy in 0..h {
        for ix in 0..w {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                g.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != h - 1 {
                g.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    g
}

fn torus_knot_curve(u: f32, p: f32, q: f32, radius: f32) -> Vec3 {
    let (su, cu) = u.sin_cos();
    let qu = q / p * u;
    let cs = qu.cos();
    Vec3::new(
        radius * (2.0 + cs) * 0.5 * cu,
        radius * (2.0 + cs) * su * 0.5,
        radius * qu.sin() * 0.5,
    )
}

/// (p, q) torus knot swept with a circular tube along a Frenet-like frame.
pub fn torus_knot(
    radius: f32,
    tube: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: f32,
    q: f32,
) -> Geometry {
    let tubular = tubular_segments.max(3);
    let radial = radial_segments.max(3);
    let mut g = Geometry::default();
    for i in 0..=tubular {
        let u = i as f32 / tubular as f32 * p * TAU;
        let p1 = torus_knot_curve(u, p, q, radius);
        let p2 = torus_knot_curve(u + 0.01, p, q, radius);
        let t = p2 - p1;
        let n = p2 + p1;
        let b = t.cross(n);
        let n = b.cross(t).normalize();
        let b = b.normalize();
        for j in 0..=radial {
            let v = j as f32 / radial as f32 * TAU;
            let cx = -tube * v.cos();
            let cy = tube * v.sin();
            let pos = p1 + n * cx + b * cy;
            g.positions.push(pos);
            g.normals.push((pos - p1).normalize_or_zero());
        }
    }
    for j in 1..=tubular {
        for i in 1..=radial {
            let a = (radial + 1) * (j - 1) + (i - 1);
            let b = (radial + 1) * j + (i - 1);
            let c = (radial + 1) * j + i;
            let d = (radial + 1) * (j - 1) + i;
            g.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    g
}
