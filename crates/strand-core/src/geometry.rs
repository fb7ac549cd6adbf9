use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::strands::Strand;
use crate::utils::{flat_to_triples, triples_to_flat, write_triples};
use crate::HairError;

/// Look shared by every strand line. Line backends are free to ignore `width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrandStyle {
    /// sRGBA
    pub color: [f32; 4],
    pub width: f32,
}

impl Default for StrandStyle {
    fn default() -> Self {
        Self {
            color: [0., 0., 0., 1.],
            width: 50.,
        }
    }
}

/// Vertex buffer of a line-list, 3 floats per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineGeometry {
    positions: Vec<f32>,
    needs_update: bool,
}

impl LineGeometry {
    pub fn from_points(points: &[Vec3]) -> Self {
        Self {
            positions: triples_to_flat(points),
            needs_update: false,
        }
    }

    pub fn from_flat(positions: Vec<f32>) -> Result<Self, HairError> {
        if positions.len() % 3 != 0 {
            return Err(HairError::MalformedBuffer {
                len: positions.len(),
            });
        }
        Ok(Self {
            positions,
            needs_update: false,
        })
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn vertices(&self) -> Result<Vec<Vec3>, HairError> {
        flat_to_triples(&self.positions)
    }

    /// Overwrites the leading vertices and flags the buffer for re-upload.
    pub fn set_vertices(&mut self, vertices: &[Vec3]) {
        write_triples(&mut self.positions, vertices);
        self.needs_update = true;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Returns whether the buffer changed since the last call, clearing the flag.
    pub fn take_needs_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }
}

/// Turns a strand into disjoint segments `(p0, p1), (p1, p2), ...`.
pub fn strand_segments(strand: &Strand) -> LineGeometry {
    let points: Vec<Vec3> = strand
        .points()
        .windows(2)
        .flat_map(|w| [w[0], w[1]])
        .collect();
    LineGeometry::from_points(&points)
}

#[derive(Debug, Clone)]
pub struct HairLines {
    pub style: Arc<StrandStyle>,
    pub lines: Vec<LineGeometry>,
}

pub fn strands_to_line_segments(strands: &[Strand], style: Arc<StrandStyle>) -> HairLines {
    let lines: Vec<_> = strands.iter().map(strand_segments).collect();
    tracing::debug!(lines = lines.len(), "converted strands to line segments");
    HairLines { style, lines }
}
