use glam::Vec3;
use rand::{prelude::Distribution, Rng};
use serde::{Deserialize, Serialize};
#[cfg(feature = "bevy")]
use bevy_gizmos::prelude::Gizmos;
#[cfg(feature = "bevy")]
use bevy_color::Color;

use crate::utils::flat_to_triples;
use crate::HairError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub samples: usize,
    pub seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            samples: 1,
            seed: 0,
        }
    }
}

/// A point on a surface with its unit normal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Triangle soup or indexed mesh the hair grows on.
///
/// Without indices, consecutive position triples form the triangles.
/// `normals` and `weights` are optional per-vertex attributes.
#[derive(Debug, Clone, Default)]
pub struct SurfaceMesh {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub indices: Option<Vec<u32>>,
    pub weights: Option<Vec<f32>>,
}

impl SurfaceMesh {
    pub fn new(positions: Vec<Vec3>, indices: Option<Vec<u32>>) -> Self {
        Self {
            positions,
            normals: None,
            indices,
            weights: None,
        }
    }

    pub fn from_flat_positions(flat: &[f32], indices: Option<Vec<u32>>) -> Result<Self, HairError> {
        Ok(Self::new(flat_to_triples(flat)?, indices))
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// Sets the per-vertex weight attribute, `None` restores area-only weighting.
    pub fn with_weights(mut self, weights: Option<Vec<f32>>) -> Self {
        self.weights = weights;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn triangles(&self) -> Result<Vec<[usize; 3]>, HairError> {
        let vertex_count = self.positions.len();
        match &self.indices {
            Some(indices) => indices
                .chunks_exact(3)
                .map(|tri| {
                    let mut result = [0; 3];
                    for (dst, &index) in result.iter_mut().zip(tri) {
                        if index as usize >= vertex_count {
                            return Err(HairError::InvalidIndex {
                                index,
                                vertex_count,
                            });
                        }
                        *dst = index as usize;
                    }
                    Ok(result)
                })
                .collect(),
            None => Ok((0..vertex_count / 3)
                .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
                .collect()),
        }
    }
}

/// Picks points on a surface with probability proportional to triangle area,
/// optionally scaled by the summed vertex weights of each triangle.
#[derive(Debug)]
pub struct SurfaceSampler<'a> {
    mesh: &'a SurfaceMesh,
    triangles: Vec<[usize; 3]>,
    cumulative: Vec<f32>,
    last_weighted: usize,
}

impl<'a> SurfaceSampler<'a> {
    pub fn build(mesh: &'a SurfaceMesh) -> Result<Self, HairError> {
        let triangles = mesh.triangles()?;
        if triangles.is_empty() {
            return Err(HairError::EmptySurface);
        }
        if let Some(weights) = &mesh.weights {
            if weights.len() != mesh.vertex_count() {
                return Err(HairError::WeightCountMismatch {
                    weights: weights.len(),
                    vertices: mesh.vertex_count(),
                });
            }
        }
        if let Some(normals) = &mesh.normals {
            if normals.len() != mesh.vertex_count() {
                return Err(HairError::NormalCountMismatch {
                    normals: normals.len(),
                    vertices: mesh.vertex_count(),
                });
            }
        }

        let mut cumulative = Vec::with_capacity(triangles.len());
        let mut total = 0f32;
        let mut last_weighted = 0;
        for (i, &[a, b, c]) in triangles.iter().enumerate() {
            let (pa, pb, pc) = (mesh.positions[a], mesh.positions[b], mesh.positions[c]);
            let area = 0.5 * (pb - pa).cross(pc - pa).length();
            let vertex_weight = mesh
                .weights
                .as_ref()
                .map(|w| w[a] + w[b] + w[c])
                .unwrap_or(1.);
            let weight = area * vertex_weight;
            if weight > 0. && weight.is_finite() {
                total += weight;
                last_weighted = i;
            }
            cumulative.push(total);
        }

        if !(total > 0. && total.is_finite()) {
            return Err(HairError::DegenerateSurface { total });
        }
        tracing::debug!(
            triangles = triangles.len(),
            total_weight = total,
            "built surface sampler"
        );

        Ok(Self {
            mesh,
            triangles,
            cumulative,
            last_weighted,
        })
    }

    pub fn total_weight(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or_default()
    }

    fn pick_triangle<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r = rng.gen_range(0f32..self.total_weight());
        let i = self.cumulative.partition_point(|&c| c <= r);
        // rounding at the top of the range can step past the last weighted face
        if i > self.last_weighted {
            self.last_weighted
        } else {
            i
        }
    }

    fn sample_face<R: Rng + ?Sized>(&self, face: usize, rng: &mut R) -> SamplePoint {
        let [a, b, c] = self.triangles[face];
        let positions = &self.mesh.positions;
        let (pa, pb, pc) = (positions[a], positions[b], positions[c]);

        let mut u: f32 = rng.gen();
        let mut v: f32 = rng.gen();
        if u + v > 1. {
            u = 1. - u;
            v = 1. - v;
        }
        let position = pa + (pb - pa) * u + (pc - pa) * v;

        let face_normal = (pb - pa).cross(pc - pa).normalize();
        let normal = self
            .mesh
            .normals
            .as_ref()
            .and_then(|n| {
                let w = 1. - u - v;
                (n[a] * w + n[b] * u + n[c] * v).try_normalize()
            })
            .unwrap_or(face_normal);

        SamplePoint { position, normal }
    }
}

impl Distribution<SamplePoint> for SurfaceSampler<'_> {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SamplePoint {
        let face = self.pick_triangle(rng);
        self.sample_face(face, rng)
    }
}

pub fn sample_points(
    mesh: &SurfaceMesh,
    count: usize,
    rng: &mut impl Rng,
) -> Result<Vec<SamplePoint>, HairError> {
    let sampler = SurfaceSampler::build(mesh)?;
    Ok(rng.sample_iter(&sampler).take(count).collect())
}

/// Strand roots drawn from a surface.
#[derive(Debug, Clone, Default)]
pub struct HairRoots {
    pub points: Vec<SamplePoint>,
}

impl crate::VisualDebug for HairRoots {
    type Flags = bool;
    #[cfg(feature = "bevy")]
    fn debug(&self, gizmos: &mut Gizmos, debug_flags: bool) {
        if debug_flags {
            for p in &self.points {
                gizmos.arrow(p.position, p.position + 0.2 * p.normal, Color::srgb(0.9, 0.2, 0.2));
            }
        }
    }
}
