//! Verlet integration of strand particles.
//!
//! Each strand is a chain of free particles whose first element is pinned to
//! the surface. Velocity is never stored: it is implied by the difference
//! between the current and previous positions.

use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
#[cfg(feature = "bevy")]
use bevy_gizmos::prelude::Gizmos;
#[cfg(feature = "bevy")]
use bevy_color::Color;

use crate::geometry::{HairLines, LineGeometry, StrandStyle};
use crate::HairError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub gravity: Vec3,
    pub wind: Vec3,
    /// Step used by [`StrandSimulator::update_line`], independent of frame time.
    pub fixed_timestep_seconds: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0., -9.8, 0.),
            wind: Vec3::ZERO,
            fixed_timestep_seconds: 1. / 60.,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), HairError> {
        let dt = self.fixed_timestep_seconds;
        if !(dt.is_finite() && dt > 0.) {
            return Err(HairError::InvalidTimestep(dt));
        }
        for (name, value) in [("gravity", self.gravity), ("wind", self.wind)] {
            if !value.is_finite() {
                return Err(HairError::NonFiniteForce { name, value });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleChain {
    vertices: Vec<Vec3>,
    previous_vertices: Vec<Vec3>,
    gravity: Vec3,
    wind: Vec3,
}

impl ParticleChain {
    /// Chain at rest: previous positions equal current ones.
    pub fn new(vertices: Vec<Vec3>, gravity: Vec3, wind: Vec3) -> Result<Self, HairError> {
        if vertices.is_empty() {
            return Err(HairError::EmptyChain);
        }
        Ok(Self {
            previous_vertices: vertices.clone(),
            vertices,
            gravity,
            wind,
        })
    }

    pub fn from_geometry(
        geometry: &LineGeometry,
        gravity: Vec3,
        wind: Vec3,
    ) -> Result<Self, HairError> {
        Self::new(geometry.vertices()?, gravity, wind)
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn previous_vertices(&self) -> &[Vec3] {
        &self.previous_vertices
    }

    pub fn root(&self) -> Vec3 {
        self.vertices[0]
    }

    pub fn acceleration(&self) -> Vec3 {
        self.gravity + self.wind
    }

    /// Advances every particle but the root by one step of `dt` seconds:
    /// `x' = 2x - x_prev + a dt^2`.
    pub fn update(&mut self, dt: f32) {
        let displacement = self.acceleration() * dt * dt;
        let next: Vec<Vec3> = self
            .vertices
            .iter()
            .zip(&self.previous_vertices)
            .enumerate()
            .map(|(i, (&current, &previous))| {
                if i == 0 {
                    current
                } else {
                    2. * current - previous + displacement
                }
            })
            .collect();
        self.previous_vertices = std::mem::replace(&mut self.vertices, next);
        tracing::trace!(dt, particles = self.vertices.len(), "verlet step");
    }
}

/// A particle chain bound to the line geometry it animates.
#[derive(Debug, Clone)]
pub struct StrandSimulator {
    geometry: LineGeometry,
    chain: ParticleChain,
    fixed_timestep_seconds: f32,
}

impl StrandSimulator {
    pub fn new(geometry: LineGeometry, config: &SimulationConfig) -> Result<Self, HairError> {
        config.validate()?;
        let chain = ParticleChain::from_geometry(&geometry, config.gravity, config.wind)?;
        Ok(Self {
            geometry,
            chain,
            fixed_timestep_seconds: config.fixed_timestep_seconds,
        })
    }

    pub fn chain(&self) -> &ParticleChain {
        &self.chain
    }

    pub fn geometry(&self) -> &LineGeometry {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut LineGeometry {
        &mut self.geometry
    }

    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep_seconds
    }

    pub fn update(&mut self, dt: f32) {
        self.chain.update(dt);
    }

    /// One frame: a fixed step, whatever the real frame time was, then the
    /// new positions are copied into the geometry.
    pub fn update_line(&mut self) {
        self.chain.update(self.fixed_timestep_seconds);
        self.geometry.set_vertices(&self.chain.vertices);
    }
}

/// Every strand line of a head of hair with its simulator.
#[derive(Debug, Clone)]
pub struct HairSimulation {
    pub style: Arc<StrandStyle>,
    pub simulators: Vec<StrandSimulator>,
}

impl HairSimulation {
    /// Lines without vertices cannot be simulated and are dropped.
    pub fn from_lines(lines: HairLines, config: &SimulationConfig) -> Result<Self, HairError> {
        config.validate()?;
        let mut simulators = Vec::with_capacity(lines.lines.len());
        for (i, geometry) in lines.lines.into_iter().enumerate() {
            match StrandSimulator::new(geometry, config) {
                Ok(s) => simulators.push(s),
                Err(HairError::EmptyChain) => {
                    tracing::warn!(line = i, "skipping strand line without vertices");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(Self {
            style: lines.style,
            simulators,
        })
    }

    pub fn update_lines(&mut self) {
        for s in &mut self.simulators {
            s.update_line();
        }
    }
}

impl crate::VisualDebug for HairSimulation {
    type Flags = bool;
    #[cfg(feature = "bevy")]
    fn debug(&self, gizmos: &mut Gizmos, debug_flags: bool) {
        if debug_flags {
            for s in &self.simulators {
                gizmos.linestrip(s.chain.vertices.iter().copied(), Color::srgb(0.2, 0.4, 1.0));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f32 = 1. / 60.;

    fn column(n: usize) -> Vec<Vec3> {
        (0..n).map(|i| i as f32 * Vec3::Y).collect()
    }

    #[test]
    fn starts_at_rest() {
        let chain = ParticleChain::new(column(4), Vec3::NEG_Y, Vec3::X).unwrap();
        assert_eq!(chain.vertices(), chain.previous_vertices());
        assert_eq!(chain.acceleration(), Vec3::new(1., -1., 0.));
    }

    #[test]
    fn three_particles_under_gravity() {
        let mut chain = ParticleChain::new(column(3), Vec3::new(0., -9.8, 0.), Vec3::ZERO).unwrap();
        chain.update(DT);
        assert_eq!(chain.vertices()[0], Vec3::ZERO);
        assert_relative_eq!(chain.vertices()[1].x, 0.);
        assert_relative_eq!(chain.vertices()[1].y, 1. - 9.8 / 3600., epsilon = 1e-6);
        assert_relative_eq!(chain.vertices()[1].z, 0.);
        assert_eq!(chain.previous_vertices(), column(3).as_slice());
    }

    #[test]
    fn root_stays_pinned() {
        let start = Vec3::new(0.3, 1.2, -0.7);
        let mut vertices = column(6);
        vertices[0] = start;
        let mut chain = ParticleChain::new(vertices, Vec3::new(0., -9.8, 0.), Vec3::new(3., 0., 1.)).unwrap();
        for _ in 0..500 {
            chain.update(DT);
            assert_eq!(chain.root(), start);
        }
    }

    #[test]
    fn no_acceleration_keeps_rest_shape() {
        let mut chain = ParticleChain::new(column(5), Vec3::ZERO, Vec3::ZERO).unwrap();
        for _ in 0..100 {
            chain.update(DT);
        }
        assert_eq!(chain.vertices(), column(5).as_slice());
    }

    #[test]
    fn no_acceleration_extrapolates_motion() {
        let mut chain = ParticleChain::new(column(2), Vec3::ZERO, Vec3::ZERO).unwrap();
        chain.previous_vertices[1] = Vec3::new(0., 0.9, 0.);
        chain.update(DT);
        assert_relative_eq!(chain.vertices()[1].y, 1.1, epsilon = 1e-6);
    }

    #[test]
    fn constant_second_difference() {
        let a = Vec3::new(0.5, -9.8, 0.);
        let mut chain = ParticleChain::new(column(3), Vec3::new(0., -9.8, 0.), Vec3::new(0.5, 0., 0.)).unwrap();
        let mut history = vec![chain.vertices()[2]];
        for _ in 0..4 {
            chain.update(DT);
            history.push(chain.vertices()[2]);
        }
        let step = a * DT * DT;
        assert!((history[1] - history[0]).abs_diff_eq(step, 1e-5));
        for w in history.windows(3) {
            let second = w[2] - 2. * w[1] + w[0];
            assert!(second.abs_diff_eq(step, 1e-5), "{second} != {step}");
        }
    }

    #[test]
    fn free_particles_fall_together() {
        let geometry = LineGeometry::from_points(&column(8));
        let mut sim = StrandSimulator::new(geometry, &SimulationConfig::default()).unwrap();
        for _ in 0..10 {
            sim.update_line();
            let chain = sim.chain();
            let dy = |i: usize| chain.vertices()[i].y - chain.previous_vertices()[i].y;
            assert_relative_eq!(dy(4), dy(5), epsilon = 1e-5);
        }
    }

    #[test]
    fn update_line_writes_back_to_geometry() {
        let geometry = LineGeometry::from_points(&column(3));
        let mut sim = StrandSimulator::new(geometry, &SimulationConfig::default()).unwrap();
        assert_relative_eq!(sim.fixed_timestep_seconds(), DT);
        assert!(!sim.geometry().needs_update());
        sim.update_line();
        assert!(sim.geometry().needs_update());
        assert_eq!(sim.geometry().vertices().unwrap(), sim.chain().vertices());
        assert_relative_eq!(sim.geometry().positions()[4], 1. - 9.8 * DT * DT, epsilon = 1e-6);
    }

    #[test]
    fn update_line_ignores_custom_steps() {
        let config = SimulationConfig {
            fixed_timestep_seconds: 0.1,
            ..Default::default()
        };
        let mut fixed = StrandSimulator::new(LineGeometry::from_points(&column(2)), &config).unwrap();
        let mut manual = fixed.clone();
        fixed.update_line();
        manual.update(0.1);
        assert_eq!(fixed.chain(), manual.chain());
    }

    #[test]
    fn rejects_empty_chains_and_bad_steps() {
        assert!(matches!(
            ParticleChain::new(vec![], Vec3::ZERO, Vec3::ZERO),
            Err(HairError::EmptyChain)
        ));
        let config = SimulationConfig {
            fixed_timestep_seconds: 0.,
            ..Default::default()
        };
        assert!(matches!(
            StrandSimulator::new(LineGeometry::from_points(&column(2)), &config),
            Err(HairError::InvalidTimestep(_))
        ));
        let config = SimulationConfig {
            wind: Vec3::new(f32::NAN, 0., 0.),
            ..Default::default()
        };
        assert!(matches!(
            StrandSimulator::new(LineGeometry::from_points(&column(2)), &config),
            Err(HairError::NonFiniteForce { name: "wind", .. })
        ));
    }

    #[test]
    fn hair_simulation_skips_empty_lines() {
        let lines = HairLines {
            style: Arc::new(StrandStyle::default()),
            lines: vec![LineGeometry::default(), LineGeometry::from_points(&column(2))],
        };
        let mut hair = HairSimulation::from_lines(lines, &SimulationConfig::default()).unwrap();
        assert_eq!(hair.simulators.len(), 1);
        hair.update_lines();
        assert!(hair.simulators[0].geometry().needs_update());
    }
}
