use thiserror::Error;

#[derive(Debug, Error)]
pub enum HairError {
    #[error("flat coordinate buffer of length {len} is not a multiple of 3")]
    MalformedBuffer { len: usize },
    #[error("surface mesh has no triangles")]
    EmptySurface,
    #[error("surface mesh has no finite positive sampling weight (total {total})")]
    DegenerateSurface { total: f32 },
    #[error("triangle index {index} out of range for {vertex_count} vertices")]
    InvalidIndex { index: u32, vertex_count: usize },
    #[error("weight attribute has {weights} entries, mesh has {vertices} vertices")]
    WeightCountMismatch { weights: usize, vertices: usize },
    #[error("normal attribute has {normals} entries, mesh has {vertices} vertices")]
    NormalCountMismatch { normals: usize, vertices: usize },
    #[error("invalid segment count: {0}")]
    InvalidSegments(usize),
    #[error("strand length must be finite and positive, got {0}")]
    InvalidLength(f32),
    #[error("cannot derive a direction from normal {0}")]
    DegenerateNormal(glam::Vec3),
    #[error("cylinder axis has zero length")]
    DegenerateAxis,
    #[error("particle chain has no vertices")]
    EmptyChain,
    #[error("timestep must be finite and positive, got {0}")]
    InvalidTimestep(f32),
    #[error("{name} must be finite, got {value}")]
    NonFiniteForce { name: &'static str, value: glam::Vec3 },
    #[error("camera distance range [{min}, {max}] must be finite with 0 < min <= max")]
    InvalidZoomRange { min: f32, max: f32 },
    #[error("camera damping factor must be in (0, 1], got {0}")]
    InvalidDamping(f32),
    #[error("invalid hair config: {0}")]
    Config(#[from] toml::de::Error),
}
