use glam::Vec3;
use serde::{Deserialize, Serialize};
#[cfg(feature = "bevy")]
use bevy_gizmos::prelude::Gizmos;
#[cfg(feature = "bevy")]
use bevy_color::Color;

use crate::surface::SamplePoint;
use crate::HairError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrandsConfig {
    /// number of particles per strand, root included
    pub segments: usize,
    pub length: f32,
}

impl Default for StrandsConfig {
    fn default() -> Self {
        Self {
            segments: 10,
            length: 1.,
        }
    }
}

impl StrandsConfig {
    pub fn validate(&self) -> Result<(), HairError> {
        if self.segments == 0 {
            return Err(HairError::InvalidSegments(self.segments));
        }
        if !(self.length.is_finite() && self.length > 0.) {
            return Err(HairError::InvalidLength(self.length));
        }
        Ok(())
    }

    pub fn spacing(&self) -> f32 {
        self.length / self.segments as f32
    }
}

/// Particle positions of one hair, root first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Strand(pub Vec<Vec3>);

impl Strand {
    pub fn root(&self) -> Option<Vec3> {
        self.0.first().copied()
    }

    pub fn points(&self) -> &[Vec3] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Straight strand growing out of `root` along its normal.
    pub fn grow_from(root: &SamplePoint, config: &StrandsConfig) -> Result<Self, HairError> {
        let normal = root
            .normal
            .try_normalize()
            .ok_or(HairError::DegenerateNormal(root.normal))?;
        let step = normal * config.spacing();
        let mut points = Vec::with_capacity(config.segments);
        let mut last = root.position;
        points.push(last);
        for _ in 1..config.segments {
            last += step;
            points.push(last);
        }
        Ok(Self(points))
    }
}

pub fn generate_strands(
    samples: &[SamplePoint],
    segments: usize,
    length: f32,
) -> Result<Vec<Strand>, HairError> {
    let config = StrandsConfig { segments, length };
    config.validate()?;
    let strands = samples
        .iter()
        .map(|root| Strand::grow_from(root, &config))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(strands = strands.len(), segments, length, "generated strands");
    Ok(strands)
}

#[derive(Debug, Clone, Default)]
pub struct HairStrands {
    pub strands: Vec<Strand>,
}

impl crate::VisualDebug for HairStrands {
    type Flags = bool;
    #[cfg(feature = "bevy")]
    fn debug(&self, gizmos: &mut Gizmos, debug_flags: bool) {
        if debug_flags {
            for strand in &self.strands {
                gizmos.linestrip(strand.0.iter().copied(), Color::srgb(1., 0.6, 0.2));
            }
        }
    }
}
