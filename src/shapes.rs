// src/shapes.rs - Wireframe primitives and the OBJ mesh loader
use std::f32::consts::PI;
use std::path::Path;

use nalgebra::Vector3;
use thiserror::Error;

pub type Segment = [Vector3<f32>; 2];

/// The drawable shape, selected with keys 1..4.
#[derive(Debug, Clone)]
pub enum Shape {
    Cube,
    Sphere { resolution: u32 },
    Cone { resolution: u32 },
    Custom(Mesh),
}

impl Shape {
    pub fn label(&self) -> &'static str {
        match self {
            Shape::Cube => "Cube",
            Shape::Sphere { .. } => "Sphere",
            Shape::Cone { .. } => "Cone",
            Shape::Custom(_) => "Mesh",
        }
    }

    /// Re-tessellate the current shape; cube and custom meshes have no
    /// resolution and are left untouched.
    pub fn set_resolution(&mut self, resolution: u32) {
        match self {
            Shape::Sphere { resolution: res } | Shape::Cone { resolution: res } => {
                *res = resolution;
            }
            Shape::Cube | Shape::Custom(_) => {}
        }
    }

    /// World-space line segments of the wireframe, unit-sized and centered
    /// on the origin (the cone sits on its base at y=0).
    pub fn edges(&self) -> Vec<Segment> {
        match self {
            Shape::Cube => cube_edges(),
            Shape::Sphere { resolution } => sphere_edges(1.0, *resolution),
            Shape::Cone { resolution } => cone_edges(1.0, 2.0, *resolution),
            Shape::Custom(mesh) => mesh.wire_edges(),
        }
    }
}

const CUBE_VERTICES: [[f32; 3]; 8] = [
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

// 12 cube edges plus the face diagonals on the front and back faces.
const CUBE_EDGES: [(usize, usize); 16] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
    (0, 2),
    (1, 3),
    (4, 6),
    (5, 7),
];

fn cube_edges() -> Vec<Segment> {
    CUBE_EDGES
        .iter()
        .map(|&(a, b)| {
            [
                Vector3::from(CUBE_VERTICES[a]),
                Vector3::from(CUBE_VERTICES[b]),
            ]
        })
        .collect()
}

fn sphere_edges(radius: f32, resolution: u32) -> Vec<Segment> {
    let res = resolution.max(3) as i32;
    let mut segments = Vec::new();

    // Longitude lines.
    for i in 0..res {
        let theta0 = 2.0 * PI * (i as f32 / res as f32);
        let theta1 = 2.0 * PI * ((i + 1) as f32 / res as f32);
        let (x0, y0) = (radius * theta0.cos(), radius * theta0.sin());
        let (x1, y1) = (radius * theta1.cos(), radius * theta1.sin());
        for j in 0..res {
            let phi = PI * (-0.5 + j as f32 / res as f32);
            let z = radius * phi.sin();
            let r = phi.cos();
            segments.push([
                Vector3::new(x0 * r, y0 * r, z),
                Vector3::new(x1 * r, y1 * r, z),
            ]);
        }
    }

    // Latitude lines.
    for i in 0..res {
        let phi0 = PI * (-0.5 + i as f32 / res as f32);
        let phi1 = PI * (-0.5 + (i + 1) as f32 / res as f32);
        let (z0, r0) = (radius * phi0.sin(), phi0.cos());
        let (z1, r1) = (radius * phi1.sin(), phi1.cos());
        for j in 0..=res {
            let theta = 2.0 * PI * (j as f32 / res as f32);
            let (x, y) = (radius * theta.cos(), radius * theta.sin());
            segments.push([
                Vector3::new(x * r0, y * r0, z0),
                Vector3::new(x * r1, y * r1, z1),
            ]);
        }
    }

    segments
}

fn cone_edges(radius: f32, height: f32, resolution: u32) -> Vec<Segment> {
    let res = resolution.max(3);
    let apex = Vector3::new(0.0, height, 0.0);
    let mut segments = Vec::new();
    for i in 0..res {
        let angle0 = 2.0 * PI * (i as f32 / res as f32);
        let angle1 = 2.0 * PI * ((i + 1) as f32 / res as f32);
        let p0 = Vector3::new(radius * angle0.cos(), 0.0, radius * angle0.sin());
        let p1 = Vector3::new(radius * angle1.cos(), 0.0, radius * angle1.sin());
        segments.push([p0, p1]);
        segments.push([p0, apex]);
    }
    segments
}

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("line {line}: vertex needs three coordinates")]
    MissingCoordinate { line: usize },
    #[error("line {line}: invalid number {token:?}")]
    InvalidNumber { line: usize, token: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A wireframe mesh loaded from a Wavefront OBJ file. Only `v` and `f`
/// directives are interpreted; face tokens may carry `v/vt/vn` suffixes of
/// which only the vertex index is used.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    vertices: Vec<Vector3<f32>>,
    /// 1-based vertex indices, one cyclic polygon per face.
    faces: Vec<Vec<usize>>,
}

impl Mesh {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ObjError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ObjError> {
        let mut mesh = Mesh::default();
        for (i, raw) in text.lines().enumerate() {
            let line = i + 1;
            let mut tokens = raw.split_whitespace();
            match tokens.next() {
                Some("v") => {
                    let mut coords = [0.0f32; 3];
                    for coord in &mut coords {
                        let token = tokens
                            .next()
                            .ok_or(ObjError::MissingCoordinate { line })?;
                        *coord = token.parse().map_err(|_| ObjError::InvalidNumber {
                            line,
                            token: token.to_string(),
                        })?;
                    }
                    mesh.vertices.push(Vector3::from(coords));
                }
                Some("f") => {
                    let mut face = Vec::new();
                    for token in tokens {
                        // "7/1/3" style tokens: only the vertex index matters.
                        let index_token = token.split('/').next().unwrap_or(token);
                        let index: usize =
                            index_token.parse().map_err(|_| ObjError::InvalidNumber {
                                line,
                                token: token.to_string(),
                            })?;
                        face.push(index);
                    }
                    if !face.is_empty() {
                        mesh.faces.push(face);
                    }
                }
                // Other directives (vn, vt, o, comments, ...) are ignored.
                _ => {}
            }
        }
        Ok(mesh)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Cyclic edge set of every face. A face index outside the vertex list
    /// aborts generation of the remaining faces rather than failing the
    /// whole frame, so a truncated file still renders partially.
    pub fn wire_edges(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        for face in &self.faces {
            if face
                .iter()
                .any(|&index| index == 0 || index > self.vertices.len())
            {
                tracing::warn!("mesh face references missing vertex, truncating wireframe");
                return segments;
            }
            for i in 0..face.len() {
                let a = self.vertices[face[i] - 1];
                let b = self.vertices[face[(i + 1) % face.len()] - 1];
                segments.push([a, b]);
            }
        }
        segments
    }
}
