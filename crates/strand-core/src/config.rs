use serde::{Deserialize, Serialize};

use crate::geometry::StrandStyle;
use crate::simulation::SimulationConfig;
use crate::strands::StrandsConfig;
use crate::surface::SamplingConfig;
use crate::HairError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub damping_factor: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub initial_distance: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            min_distance: 1.,
            max_distance: 100.,
            initial_distance: 5.,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pan_speed: 0.002,
        }
    }
}

impl OrbitConfig {
    /// The distance range feeds `f32::clamp`, which needs `min <= max` and no NaN.
    pub fn validate(&self) -> Result<(), HairError> {
        let (min, max) = (self.min_distance, self.max_distance);
        if !(min.is_finite() && max.is_finite() && min > 0. && min <= max) {
            return Err(HairError::InvalidZoomRange { min, max });
        }
        let k = self.damping_factor;
        if !(k > 0. && k <= 1.) {
            return Err(HairError::InvalidDamping(k));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// draw each strand as a tube instead of animated lines
    pub cylinders: bool,
    pub cylinder_radius: f32,
    pub radial_segments: usize,
    /// glTF asset path of the scalp, a sphere is used when unset
    pub scalp_model: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cylinders: false,
            cylinder_radius: 0.005,
            radial_segments: 6,
            scalp_model: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HairConfig {
    pub sampling: SamplingConfig,
    pub strands: StrandsConfig,
    pub physics: SimulationConfig,
    pub style: StrandStyle,
    pub camera: OrbitConfig,
    pub render: RenderConfig,
}

impl HairConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, HairError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HairError> {
        self.strands.validate()?;
        self.physics.validate()?;
        self.camera.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn empty_document_gives_defaults() {
        let config = HairConfig::from_toml_str("").unwrap();
        assert_eq!(config, HairConfig::default());
        assert_eq!(config.sampling.samples, 1);
        assert_eq!(config.physics.gravity, Vec3::new(0., -9.8, 0.));
        assert_eq!(config.camera.damping_factor, 0.05);
        assert_eq!((config.camera.min_distance, config.camera.max_distance), (1., 100.));
    }

    #[test]
    fn sections_override_defaults() {
        let config = HairConfig::from_toml_str(
            r#"
            [sampling]
            samples = 200
            seed = 4

            [strands]
            segments = 12
            length = 0.4

            [physics]
            wind = [1.5, 0.0, 0.0]
            fixed_timestep_seconds = 0.02

            [render]
            scalp_model = "models/head.glb"
            "#,
        )
        .unwrap();
        assert_eq!(config.sampling.samples, 200);
        assert_eq!(config.strands.segments, 12);
        assert_eq!(config.physics.wind, Vec3::new(1.5, 0., 0.));
        assert_eq!(config.physics.gravity, Vec3::new(0., -9.8, 0.));
        assert_eq!(config.physics.fixed_timestep_seconds, 0.02);
        assert_eq!(config.render.scalp_model.as_deref(), Some("models/head.glb"));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            HairConfig::from_toml_str("[strands]\nsegments = 0"),
            Err(HairError::InvalidSegments(0))
        ));
        assert!(matches!(
            HairConfig::from_toml_str("[physics]\nfixed_timestep_seconds = -1.0"),
            Err(HairError::InvalidTimestep(_))
        ));
        assert!(matches!(
            HairConfig::from_toml_str("[strands]\nsegments = \"many\""),
            Err(HairError::Config(_))
        ));
    }

    #[test]
    fn rejects_non_finite_forces() {
        assert!(matches!(
            HairConfig::from_toml_str("[physics]\nwind = [nan, 0.0, 0.0]"),
            Err(HairError::NonFiniteForce { name: "wind", .. })
        ));
        assert!(matches!(
            HairConfig::from_toml_str("[physics]\ngravity = [0.0, -inf, 0.0]"),
            Err(HairError::NonFiniteForce { name: "gravity", .. })
        ));
    }

    #[test]
    fn rejects_inverted_zoom_range() {
        let result =
            HairConfig::from_toml_str("[camera]\nmin_distance = 10.0\nmax_distance = 5.0");
        assert!(matches!(
            result,
            Err(HairError::InvalidZoomRange { min, max }) if min == 10. && max == 5.
        ));
        assert!(matches!(
            HairConfig::from_toml_str("[camera]\nmax_distance = nan"),
            Err(HairError::InvalidZoomRange { .. })
        ));
        assert!(matches!(
            HairConfig::from_toml_str("[camera]\nmin_distance = 0.0"),
            Err(HairError::InvalidZoomRange { .. })
        ));
    }

    #[test]
    fn rejects_damping_outside_unit_interval() {
        for damping in ["0.0", "1.5", "-0.1"] {
            assert!(matches!(
                HairConfig::from_toml_str(&format!("[camera]\ndamping_factor = {damping}")),
                Err(HairError::InvalidDamping(_))
            ));
        }
        let config = HairConfig::from_toml_str(
            "[camera]\ndamping_factor = 1.0\nmin_distance = 3.0\nmax_distance = 3.0",
        )
        .unwrap();
        assert_eq!(config.camera.min_distance, config.camera.max_distance);
    }
}
