use crate::bounds::Bounds;
use glam::Vec3;

/// Turns a branch may take on one geometry object before its growing
/// faces are split off into a new object.
pub const SEGMENT_TURN_CAP: u32 = 10;

/// Random face picks tolerated during one direction search before the
/// branch gives up.
pub const MAX_FACE_PICKS: u32 = 20;

/// Length of the seam-free extrusion made at every segment boundary.
pub const EXTRUDE_EPSILON: f32 = 1e-4;

/// Flat RGBA colour handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: [u8; 4],
}

impl Material {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            color: [r, g, b, 255],
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::rgb(190, 190, 200)
    }
}

/// Safety valves for the growth engine.
///
/// These bound the work done per object and per direction search; tests
/// shrink them to reach the corresponding branches quickly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthLimits {
    pub segment_turn_cap: u32,
    pub max_face_picks: u32,
    pub extrude_epsilon: f32,
}

impl Default for GrowthLimits {
    fn default() -> Self {
        Self {
            segment_turn_cap: SEGMENT_TURN_CAP,
            max_face_picks: MAX_FACE_PICKS,
            extrude_epsilon: EXTRUDE_EPSILON,
        }
    }
}

/// Per-branch settings. Children copy all of these from their parent,
/// except `max_turns`, which shrinks by the turns the parent already made.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipeConfig {
    pub size: f32,
    /// Metres per second.
    pub speed: f32,
    pub min_stretch: f32,
    pub max_stretch: f32,
    pub max_turns: u32,
    pub bounds: Bounds,
    pub limits: GrowthLimits,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            size: 1.0,
            speed: 3.0,
            min_stretch: 1.0,
            max_stretch: 10.0,
            max_turns: 200,
            bounds: Bounds::default(),
            limits: GrowthLimits::default(),
        }
    }
}

/// Settings for the whole pipe population.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnerConfig {
    pub desired_active: usize,
    pub max_on_screen: usize,
    pub pipe_size: f32,
    pub pipe_speed: f32,
    pub min_turns: u32,
    pub max_turns: u32,
    pub min_stretch: f32,
    pub max_stretch: f32,
    /// Seconds a finished family takes to fade away.
    pub fade_time: f32,
    pub bounds: Bounds,
    pub material: Material,
    pub fade_material: Material,
    /// Range of the pause between two consecutive spawns, in seconds.
    pub spawn_delay: (f32, f32),
    pub limits: GrowthLimits,
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            desired_active: 1,
            max_on_screen: 7,
            pipe_size: 1.0,
            pipe_speed: 13.0,
            min_turns: 100,
            max_turns: 200,
            min_stretch: 1.0,
            max_stretch: 10.0,
            fade_time: 2.0,
            bounds: Bounds::from_size(Vec3::ZERO, Vec3::splat(10.0)),
            material: Material::default(),
            fade_material: Material::rgb(120, 120, 130),
            spawn_delay: (0.5, 1.0),
            limits: GrowthLimits::default(),
        }
    }
}

impl SpawnerConfig {
    /// Clamps every value into its usable range. Nothing else is checked.
    pub fn clamped(mut self) -> Self {
        self.desired_active = self.desired_active.max(1);
        self.max_on_screen = self.max_on_screen.max(self.desired_active);
        self.pipe_size = self.pipe_size.max(0.1);
        self.pipe_speed = self.pipe_speed.max(0.0);
        self.max_turns = self.max_turns.max(self.min_turns);
        self.min_stretch = self.min_stretch.max(0.0);
        self.max_stretch = self.max_stretch.max(self.min_stretch);
        self.fade_time = self.fade_time.max(0.0);
        self.spawn_delay.0 = self.spawn_delay.0.max(0.0);
        self.spawn_delay.1 = self.spawn_delay.1.max(self.spawn_delay.0);
        self
    }

    /// Branch settings for a freshly spawned root with the given budget.
    pub fn pipe_config(&self, max_turns: u32) -> PipeConfig {
        PipeConfig {
            size: self.pipe_size,
            speed: self.pipe_speed,
            min_stretch: self.min_stretch,
            max_stretch: self.max_stretch,
            max_turns,
            bounds: self.bounds,
            limits: self.limits,
        }
    }
}
