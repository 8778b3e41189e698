//! Orbiting camera around the pipe volume.
//!
//! The camera circles a fixed target at a clamped distance. Dragging
//! orbits it, scrolling zooms, and while the simulation runs it keeps
//! slowly turning in the direction of the last horizontal drag.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use std::f32::consts::PI;

pub const MIN_DISTANCE: f32 = 60.0;
pub const MAX_DISTANCE: f32 = 200.0;

/// Pitch limit either side of the horizon (30°).
pub const MAX_PITCH: f32 = PI / 6.0;

/// Radians per dragged pixel.
const DRAG_SENSITIVITY: f32 = 0.005;
/// Distance units per scrolled pixel at maximum distance.
const SCROLL_SENSITIVITY: f32 = 0.1;
/// Idle rotation, radians per second (5°/s).
const IDLE_YAW_SPEED: f32 = 5.0 * PI / 180.0;

const NEAR: f32 = 0.5;
const FAR: f32 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCamera {
    pub target: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    fov_y: f32,
    /// `1.0` or `-1.0`: which way the idle rotation turns.
    idle_direction: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            yaw: 0.6,
            pitch: 0.3,
            distance: 80.0,
            fov_y: 45f32.to_radians(),
            idle_direction: 1.0,
        }
    }
}

impl OrbitCamera {
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Orbits by a pointer drag of `delta` pixels.
    pub fn drag(&mut self, delta: Vec2) {
        self.yaw += delta.x * DRAG_SENSITIVITY;
        self.pitch = (self.pitch + delta.y * DRAG_SENSITIVITY).clamp(-MAX_PITCH, MAX_PITCH);
        if delta.x != 0.0 {
            self.idle_direction = delta.x.signum();
        }
    }

    /// Zooms by `amount` scrolled pixels; positive moves closer. Steps get
    /// smaller as the camera gets closer.
    pub fn scroll(&mut self, amount: f32) {
        let step = amount * SCROLL_SENSITIVITY * (self.distance / MAX_DISTANCE);
        self.distance = (self.distance - step).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// Idle rotation for `dt` seconds.
    pub fn idle(&mut self, dt: f32) {
        self.yaw += self.idle_direction * IDLE_YAW_SPEED * dt;
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target
            + self.distance * Vec3::new(cos_pitch * cos_yaw, sin_pitch, cos_pitch * sin_yaw)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, aspect.max(1e-3), NEAR, FAR)
            * Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    /// Freezes the camera for one frame drawn into a `size` pixel viewport.
    pub fn projector(&self, size: Vec2) -> Projector {
        Projector {
            view_projection: self.view_projection(size.x / size.y.max(1.0)),
            eye: self.eye(),
            size,
        }
    }
}

/// World-to-screen mapping for a single frame.
#[derive(Clone, Copy, Debug)]
pub struct Projector {
    view_projection: Mat4,
    eye: Vec3,
    size: Vec2,
}

impl Projector {
    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    /// Projects `p` to viewport pixels (origin top-left) and its view
    /// depth. Returns `None` for points behind the near plane.
    pub fn project(&self, p: Vec3) -> Option<(Vec2, f32)> {
        let clip = self.view_projection * p.extend(1.0);
        if clip.w <= NEAR {
            return None;
        }
        let ndc = clip.xy() / clip.w;
        let screen = Vec2::new((ndc.x + 1.0) * 0.5, (1.0 - ndc.y) * 0.5) * self.size;
        Some((screen, clip.w))
    }
}
