pub mod config;
pub mod cylinder;
pub mod error;
pub mod geometry;
pub mod simulation;
pub mod strands;
pub mod surface;
pub mod utils;

use std::sync::Arc;

use rand::rngs::StdRng;

pub use config::{HairConfig, OrbitConfig, RenderConfig};
pub use cylinder::{strand_cylinders, CylinderMesh};
pub use error::HairError;
pub use geometry::{strands_to_line_segments, HairLines, LineGeometry, StrandStyle};
pub use simulation::{HairSimulation, ParticleChain, SimulationConfig, StrandSimulator};
pub use strands::{generate_strands, HairStrands, Strand, StrandsConfig};
pub use surface::{sample_points, HairRoots, SamplePoint, SamplingConfig, SurfaceMesh, SurfaceSampler};
pub use utils::{flat_to_triples, triples_to_flat};

pub trait VisualDebug {
    type Flags;
    #[cfg(feature = "bevy")]
    fn debug(&self, gizmos: &mut bevy_gizmos::prelude::Gizmos, debug_flags: Self::Flags);
}

/// One stage of hair generation, built from the output of the stage before.
pub trait HairPipelinePhase: Sized {
    type Previous;
    type Config;
    type Builder;
    fn generate_from(
        prev: Self::Previous,
        config: &Self::Config,
        builder: &mut Self::Builder,
    ) -> Result<Self, HairError>;
}

pub trait Grow {
    fn grow<Next>(
        self,
        config: &Next::Config,
        builder: &mut Next::Builder,
    ) -> Result<Next, HairError>
    where
        Next: HairPipelinePhase<Previous = Self>;
}

impl<T> Grow for T {
    fn grow<Next>(
        self,
        config: &<Next as HairPipelinePhase>::Config,
        builder: &mut <Next as HairPipelinePhase>::Builder,
    ) -> Result<Next, HairError>
    where
        Next: HairPipelinePhase<Previous = T>,
    {
        Next::generate_from(self, config, builder)
    }
}

impl HairPipelinePhase for HairRoots {
    type Previous = SurfaceMesh;
    type Config = SamplingConfig;
    type Builder = StdRng;
    fn generate_from(
        prev: Self::Previous,
        config: &Self::Config,
        rng: &mut Self::Builder,
    ) -> Result<Self, HairError> {
        let points = sample_points(&prev, config.samples, rng)?;
        Ok(HairRoots { points })
    }
}

impl HairPipelinePhase for HairStrands {
    type Previous = HairRoots;
    type Config = StrandsConfig;
    type Builder = ();
    fn generate_from(
        prev: Self::Previous,
        config: &Self::Config,
        _: &mut Self::Builder,
    ) -> Result<Self, HairError> {
        let strands = generate_strands(&prev.points, config.segments, config.length)?;
        Ok(HairStrands { strands })
    }
}

impl HairPipelinePhase for HairLines {
    type Previous = HairStrands;
    type Config = Arc<StrandStyle>;
    type Builder = ();
    fn generate_from(
        prev: Self::Previous,
        style: &Self::Config,
        _: &mut Self::Builder,
    ) -> Result<Self, HairError> {
        Ok(strands_to_line_segments(&prev.strands, style.clone()))
    }
}

impl HairPipelinePhase for HairSimulation {
    type Previous = HairLines;
    type Config = SimulationConfig;
    type Builder = ();
    fn generate_from(
        prev: Self::Previous,
        config: &Self::Config,
        _: &mut Self::Builder,
    ) -> Result<Self, HairError> {
        HairSimulation::from_lines(prev, config)
    }
}
