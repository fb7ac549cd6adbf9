use bevy::asset::RenderAssetUsages;
use bevy::math::Vec3;
use bevy::prelude::Mesh;
use bevy_render::mesh::{Indices, PrimitiveTopology};
use strand_core::{CylinderMesh, HairError, LineGeometry, SurfaceMesh};

#[derive(Debug, thiserror::Error)]
pub enum MeshConversionError {
    #[error("mesh has no float3 position attribute")]
    NoPositions,
    #[error("expected a triangle list, mesh topology is {0:?}")]
    NotTriangles(PrimitiveTopology),
    #[error(transparent)]
    Hair(#[from] HairError),
}

/// Reads the triangles of a bevy mesh as a sampling surface.
pub fn surface_from_mesh(mesh: &Mesh) -> Result<SurfaceMesh, MeshConversionError> {
    let topology = mesh.primitive_topology();
    if topology != PrimitiveTopology::TriangleList {
        return Err(MeshConversionError::NotTriangles(topology));
    }
    let positions = mesh
        .attribute(Mesh::ATTRIBUTE_POSITION)
        .and_then(|attr| attr.as_float3())
        .ok_or(MeshConversionError::NoPositions)?;
    let flat: Vec<f32> = positions.iter().flatten().copied().collect();
    let indices = mesh
        .indices()
        .map(|indices| indices.iter().map(|i| i as u32).collect());

    let mut surface = SurfaceMesh::from_flat_positions(&flat, indices)?;
    if let Some(normals) = mesh
        .attribute(Mesh::ATTRIBUTE_NORMAL)
        .and_then(|attr| attr.as_float3())
    {
        surface = surface.with_normals(normals.iter().map(|&n| Vec3::from_array(n)).collect());
    }
    Ok(surface)
}

fn float3(geometry: &LineGeometry) -> Vec<[f32; 3]> {
    geometry
        .positions()
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect()
}

pub fn line_mesh(geometry: &LineGeometry) -> Mesh {
    Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, float3(geometry))
}

/// Copies the line positions into `mesh` if they changed since the last sync.
pub fn sync_line_mesh(geometry: &mut LineGeometry, mesh: &mut Mesh) -> bool {
    if !geometry.take_needs_update() {
        return false;
    }
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, float3(geometry));
    true
}

pub fn cylinder_mesh(cylinder: &CylinderMesh) -> Mesh {
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, cylinder.positions.clone())
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, cylinder.normals.clone())
    .with_inserted_indices(Indices::U32(cylinder.triangles.clone()))
}
