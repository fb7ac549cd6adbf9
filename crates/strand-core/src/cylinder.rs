use glam::{Quat, Vec3};

use crate::strands::Strand;
use crate::HairError;

/// Open tube mesh used as a solid alternative to strand lines.
#[derive(Debug, Clone, Default)]
pub struct CylinderMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub triangles: Vec<u32>,
}

impl CylinderMesh {
    pub fn strand(
        start: Vec3,
        end: Vec3,
        radius: f32,
        radial_segments: usize,
    ) -> Result<Self, HairError> {
        if radial_segments < 3 {
            return Err(HairError::InvalidSegments(radial_segments));
        }
        let axis = end - start;
        let direction = axis.try_normalize().ok_or(HairError::DegenerateAxis)?;
        let rotation = Quat::from_rotation_arc(Vec3::Y, direction);

        let n = radial_segments;
        let mut mesh = Self::default();
        for base in [start, end] {
            for j in 0..n {
                let theta = j as f32 / n as f32 * std::f32::consts::TAU;
                let normal = rotation * Vec3::new(theta.sin(), 0., theta.cos());
                mesh.positions.push(base + radius * normal);
                mesh.normals.push(normal);
            }
        }
        for j in 0..n {
            let a = j as u32;
            let b = ((j + 1) % n) as u32;
            let c = (n + j) as u32;
            let d = (n + (j + 1) % n) as u32;
            mesh.triangles.extend([a, b, c, b, d, c]);
        }
        Ok(mesh)
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

/// One tube per strand, from root to tip. Strands too short to have an axis are skipped.
pub fn strand_cylinders(
    strands: &[Strand],
    radius: f32,
    radial_segments: usize,
) -> Result<Vec<CylinderMesh>, HairError> {
    let mut result = Vec::with_capacity(strands.len());
    for (i, strand) in strands.iter().enumerate() {
        let (Some(&root), Some(&tip)) = (strand.points().first(), strand.points().last()) else {
            tracing::warn!(strand = i, "empty strand, no cylinder");
            continue;
        };
        match CylinderMesh::strand(root, tip, radius, radial_segments) {
            Ok(mesh) => result.push(mesh),
            Err(HairError::DegenerateAxis) => {
                tracing::warn!(strand = i, "strand has no length, no cylinder");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(result)
}
