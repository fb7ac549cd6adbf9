use bevy::input::gestures::PinchGesture;
use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use strand_core::OrbitConfig;

/// Orbit, pan and zoom around a target with damped motion.
///
/// Input accumulates into pending deltas; every frame only `damping_factor`
/// of what is pending is applied and the rest decays.
#[derive(Component, Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub config: OrbitConfig,
    yaw_delta: f32,
    pitch_delta: f32,
    zoom_delta: f32,
    pan_delta: Vec3,
}

const MAX_PITCH: f32 = 0.5 * std::f32::consts::PI - 0.01;

impl OrbitControls {
    pub fn new(config: OrbitConfig) -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.,
            pitch: 0.2,
            distance: config
                .initial_distance
                .clamp(config.min_distance, config.max_distance),
            config,
            yaw_delta: 0.,
            pitch_delta: 0.,
            zoom_delta: 0.,
            pan_delta: Vec3::ZERO,
        }
    }

    pub fn rotate(&mut self, delta: Vec2) {
        self.yaw_delta -= delta.x * self.config.rotate_speed;
        self.pitch_delta += delta.y * self.config.rotate_speed;
    }

    /// `amount > 0` moves closer.
    pub fn zoom(&mut self, amount: f32) {
        self.zoom_delta += amount * self.config.zoom_speed;
    }

    pub fn pan(&mut self, delta: Vec2) {
        let rotation = self.rotation();
        let scale = self.config.pan_speed * self.distance;
        self.pan_delta += rotation * Vec3::new(-delta.x, delta.y, 0.) * scale;
    }

    fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw) * Quat::from_rotation_x(-self.pitch)
    }

    /// Applies a damped share of the pending motion.
    pub fn step(&mut self) {
        let k = self.config.damping_factor;
        self.yaw += k * self.yaw_delta;
        self.pitch = (self.pitch + k * self.pitch_delta).clamp(-MAX_PITCH, MAX_PITCH);
        self.distance = (self.distance * (1. - k * self.zoom_delta))
            .clamp(self.config.min_distance, self.config.max_distance);
        self.target += k * self.pan_delta;

        let decay = 1. - k;
        self.yaw_delta *= decay;
        self.pitch_delta *= decay;
        self.zoom_delta *= decay;
        self.pan_delta *= decay;
    }

    pub fn eye(&self) -> Vec3 {
        self.target + self.rotation() * Vec3::Z * self.distance
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }
}

pub fn handle_orbit_input(
    mouse: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut evr_motion: EventReader<MouseMotion>,
    mut evr_scroll: EventReader<MouseWheel>,
    mut evr_gesture_pinch: EventReader<PinchGesture>,
    mut controls: Query<&mut OrbitControls>,
    time: Res<Time>,
) {
    let Ok(mut controls) = controls.get_single_mut() else {
        return;
    };
    for ev in evr_motion.read() {
        if mouse.pressed(MouseButton::Left) {
            controls.rotate(ev.delta);
        } else if mouse.pressed(MouseButton::Right) {
            controls.pan(ev.delta);
        }
    }
    for ev in evr_scroll.read() {
        #[cfg(target_family = "wasm")]
        {
            controls.zoom(0.03 * ev.y);
        }
        #[cfg(not(target_family = "wasm"))]
        {
            controls.zoom(ev.y);
        }
    }
    for ev in evr_gesture_pinch.read() {
        controls.zoom(10. * ev.0);
    }
    let arrow_speed = 200. * time.delta_secs();
    if keyboard.pressed(KeyCode::ArrowRight) {
        controls.rotate(Vec2::new(arrow_speed, 0.));
    }
    if keyboard.pressed(KeyCode::ArrowLeft) {
        controls.rotate(Vec2::new(-arrow_speed, 0.));
    }
    if keyboard.pressed(KeyCode::ArrowUp) {
        controls.rotate(Vec2::new(0., arrow_speed));
    }
    if keyboard.pressed(KeyCode::ArrowDown) {
        controls.rotate(Vec2::new(0., -arrow_speed));
    }
    if keyboard.just_pressed(KeyCode::NumpadAdd) {
        controls.zoom(1.);
    }
    if keyboard.just_pressed(KeyCode::NumpadSubtract) {
        controls.zoom(-1.);
    }
}

pub fn update_orbit_camera(mut cameras: Query<(&mut Transform, &mut OrbitControls), With<Camera>>) {
    for (mut transform, mut controls) in &mut cameras {
        controls.step();
        *transform = controls.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_is_clamped() {
        let mut controls = OrbitControls::new(OrbitConfig::default());
        controls.zoom(1e6);
        for _ in 0..200 {
            controls.step();
        }
        assert_eq!(controls.distance, 1.);

        controls.zoom(-1e6);
        for _ in 0..200 {
            controls.step();
        }
        assert_eq!(controls.distance, 100.);
    }

    #[test]
    fn rotation_is_damped() {
        let mut controls = OrbitControls::new(OrbitConfig::default());
        controls.rotate(Vec2::new(-100., 0.));
        controls.step();
        // 100 px * 0.005 rad/px, 5% applied on the first frame
        assert!((controls.yaw - 0.025).abs() < 1e-6);
        controls.step();
        assert!(controls.yaw > 0.025 && controls.yaw < 0.5);
    }

    #[test]
    fn eye_looks_at_target_from_distance() {
        let controls = OrbitControls::new(OrbitConfig::default());
        assert!(((controls.eye() - controls.target).length() - 5.).abs() < 1e-5);
        assert!(controls.transform().forward().dot(controls.target - controls.eye()) > 0.);
    }
}
