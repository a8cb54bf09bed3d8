//! Mesh cooking.
//!
//! Raw point/index buffers are validated and turned into engine collision
//! shapes before an actor is built. Any failure is reported as a
//! [`CookingError`]; the caller decides whether to abort the scene build.

use std::fmt;

use rapier3d::prelude::*;
use thiserror::Error;

/// Default simplification budget for convex hulls.
pub const DEFAULT_VERTEX_LIMIT: usize = 256;

const FLATNESS_EPSILON: Real = 1.0e-5;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CookingError {
    #[error("mesh has no points")]
    EmptyPoints,
    #[error("triangle mesh has no triangles")]
    EmptyTriangles,
    #[error("triangle index buffer length {0} is not a multiple of 3")]
    RaggedIndices(usize),
    #[error("triangle index {index} is out of range for {points} points")]
    IndexOutOfRange { index: u32, points: usize },
    #[error("convex hull needs at least 4 points, got {0}")]
    TooFewPoints(usize),
    #[error("convex hull is degenerate (points are flat)")]
    DegenerateHull,
    #[error("convex hull has {vertices} vertices and cannot be reduced to {limit}")]
    VertexLimitExceeded { vertices: usize, limit: usize },
}

/// Opaque cooked collision mesh.
#[derive(Clone)]
pub struct CookedMesh {
    shape: SharedShape,
    vertex_count: usize,
    triangle_count: usize,
}

impl CookedMesh {
    pub fn shape(&self) -> &SharedShape {
        &self.shape
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Number of input triangles (zero for convex hulls).
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }
}

impl fmt::Debug for CookedMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookedMesh")
            .field("vertex_count", &self.vertex_count)
            .field("triangle_count", &self.triangle_count)
            .finish()
    }
}

/// Cook a convex hull around `points`.
///
/// Hulls with more than `vertex_limit` vertices are simplified: the extreme
/// vertices are kept, farthest first, and the hull is rebuilt around them.
/// A limit below four cannot hold any solid hull and is an error.
pub fn cook_convex(points: &[Point<Real>], vertex_limit: usize) -> Result<CookedMesh, CookingError> {
    if points.is_empty() {
        return Err(CookingError::EmptyPoints);
    }
    if points.len() < 4 {
        return Err(CookingError::TooFewPoints(points.len()));
    }
    if is_flat(points) {
        return Err(CookingError::DegenerateHull);
    }

    let mut shape = SharedShape::convex_hull(points).ok_or(CookingError::DegenerateHull)?;
    let mut vertex_count = hull_vertices(&shape)?.len();
    if vertex_count > vertex_limit {
        if vertex_limit < 4 {
            return Err(CookingError::VertexLimitExceeded {
                vertices: vertex_count,
                limit: vertex_limit,
            });
        }
        let kept = farthest_subset(hull_vertices(&shape)?, vertex_limit);
        shape = SharedShape::convex_hull(&kept).ok_or(CookingError::DegenerateHull)?;
        vertex_count = hull_vertices(&shape)?.len();
    }

    Ok(CookedMesh {
        shape,
        vertex_count,
        triangle_count: 0,
    })
}

/// Cook a triangle mesh from a point buffer and a flat index buffer
/// (three indices per triangle).
pub fn cook_triangle_mesh(points: &[Point<Real>], indices: &[u32]) -> Result<CookedMesh, CookingError> {
    if points.is_empty() {
        return Err(CookingError::EmptyPoints);
    }
    if indices.is_empty() {
        return Err(CookingError::EmptyTriangles);
    }
    if indices.len() % 3 != 0 {
        return Err(CookingError::RaggedIndices(indices.len()));
    }
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= points.len()) {
        return Err(CookingError::IndexOutOfRange {
            index,
            points: points.len(),
        });
    }

    let triangles: Vec<[u32; 3]> = indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect();
    let triangle_count = triangles.len();

    Ok(CookedMesh {
        shape: SharedShape::trimesh(points.to_vec(), triangles),
        vertex_count: points.len(),
        triangle_count,
    })
}

fn hull_vertices(shape: &SharedShape) -> Result<&[Point<Real>], CookingError> {
    shape
        .as_convex_polyhedron()
        .map(|hull| hull.points())
        .ok_or(CookingError::DegenerateHull)
}

/// Pick `count` of `vertices` (non-flat, `count >= 4`): a spanning
/// tetrahedron first, then repeatedly the vertex farthest from those kept.
fn farthest_subset(vertices: &[Point<Real>], count: usize) -> Vec<Point<Real>> {
    let argmax = |score: &dyn Fn(&Point<Real>) -> Real| {
        vertices
            .iter()
            .enumerate()
            .map(|(i, p)| (i, score(p)))
            .fold((0, Real::MIN), |best, cur| if cur.1 > best.1 { cur } else { best })
            .0
    };

    let a = argmax(&|p| (p - vertices[0]).norm_squared());
    let b = argmax(&|p| (p - vertices[a]).norm_squared());
    let ab = vertices[b] - vertices[a];
    let c = argmax(&|p| ab.cross(&(p - vertices[a])).norm_squared());
    let normal = ab.cross(&(vertices[c] - vertices[a]));
    let d = argmax(&|p| normal.dot(&(p - vertices[a])).abs());

    let mut chosen = vec![a, b, c, d];
    let mut nearest: Vec<Real> = vertices
        .iter()
        .map(|p| {
            chosen
                .iter()
                .map(|&i| (p - vertices[i]).norm_squared())
                .fold(Real::MAX, Real::min)
        })
        .collect();
    while chosen.len() < count.min(vertices.len()) {
        let next = nearest
            .iter()
            .enumerate()
            .fold((0, Real::MIN), |best, (i, &dist)| if dist > best.1 { (i, dist) } else { best })
            .0;
        if nearest[next] <= 0.0 {
            break;
        }
        chosen.push(next);
        for (dist, p) in nearest.iter_mut().zip(vertices) {
            *dist = dist.min((p - vertices[next]).norm_squared());
        }
    }
    chosen.into_iter().map(|i| vertices[i]).collect()
}

/// True when every point lies on a single plane (or line, or point).
fn is_flat(points: &[Point<Real>]) -> bool {
    let origin = points[0];
    let scale = points
        .iter()
        .map(|p| (p - origin).norm())
        .fold(0.0, Real::max)
        .max(1.0);
    let eps = FLATNESS_EPSILON * scale;

    let Some(edge) = points.iter().map(|p| p - origin).find(|e| e.norm() > eps) else {
        return true;
    };
    let Some(normal) = points
        .iter()
        .map(|p| edge.cross(&(p - origin)))
        .find(|n| n.norm() > eps * scale)
    else {
        return true;
    };
    let normal = normal.normalize();

    points.iter().all(|p| normal.dot(&(p - origin)).abs() <= eps)
}
