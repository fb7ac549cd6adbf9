pub mod bevy_mesh;
pub mod camera;
pub mod loading;

use std::sync::Arc;

use bevy::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use strand_core::{
    strand_cylinders, CylinderMesh, Grow, HairConfig, HairError, HairLines, HairRoots,
    HairSimulation, HairStrands, SurfaceMesh, VisualDebug,
};

pub use bevy_mesh::{cylinder_mesh, line_mesh, surface_from_mesh, sync_line_mesh, MeshConversionError};
pub use camera::OrbitControls;
pub use loading::{HairConfigAsset, HairConfigLoader, ScalpSource};

#[derive(Copy, Clone, Default, Debug, Resource)]
pub struct DebugFlags {
    pub roots: bool,
    pub strands: bool,
    pub chains: bool,
}

/// Render entity spawned for one strand, line or tube.
#[derive(Component)]
pub struct HairLine;

/// Hair grown on a scalp entity: generation stages kept for debug drawing,
/// and the live simulation with the mesh each strand writes to.
#[derive(Component)]
pub struct Hair {
    pub roots: HairRoots,
    pub strands: HairStrands,
    pub simulation: HairSimulation,
    pub line_meshes: Vec<Handle<Mesh>>,
}

impl Hair {
    /// Runs the whole generation pipeline. `line_meshes` is left empty.
    pub fn grow(surface: SurfaceMesh, config: &HairConfig, seed: u64) -> Result<Self, HairError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let roots = surface.grow::<HairRoots>(&config.sampling, &mut rng)?;
        let strands = roots.clone().grow::<HairStrands>(&config.strands, &mut ())?;
        let simulation = strands
            .clone()
            .grow::<HairLines>(&Arc::new(config.style), &mut ())?
            .grow::<HairSimulation>(&config.physics, &mut ())?;
        info!(
            strands = strands.strands.len(),
            segments = config.strands.segments,
            "grew hair"
        );
        Ok(Self {
            roots,
            strands,
            simulation,
            line_meshes: Vec::new(),
        })
    }

    pub fn cylinders(&self, config: &HairConfig) -> Result<Vec<CylinderMesh>, HairError> {
        strand_cylinders(
            &self.strands.strands,
            config.render.cylinder_radius,
            config.render.radial_segments,
        )
    }

    /// One fixed simulation step, pushing moved vertices into the line meshes.
    pub fn step(&mut self, meshes: &mut Assets<Mesh>) {
        self.simulation.update_lines();
        for (simulator, handle) in self.simulation.simulators.iter_mut().zip(&self.line_meshes) {
            if !simulator.geometry().needs_update() {
                continue;
            }
            if let Some(mesh) = meshes.get_mut(handle) {
                sync_line_mesh(simulator.geometry_mut(), mesh);
            }
        }
    }

    pub fn debug(&self, gizmos: &mut Gizmos, flags: DebugFlags) {
        self.roots.debug(gizmos, flags.roots);
        self.strands.debug(gizmos, flags.strands);
        self.simulation.debug(gizmos, flags.chains);
    }
}
