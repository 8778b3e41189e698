/// Timed opacity decay: wait `delay` seconds, then go from fully opaque
/// to fully transparent over `duration` seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fade {
    duration: f32,
    delay_left: f32,
    progress: f32,
}

impl Fade {
    pub fn new(duration: f32, delay: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            delay_left: delay.max(0.0),
            progress: 0.0,
        }
    }

    /// Advances by `dt` seconds. Returns `true` once the fade is complete.
    pub fn advance(&mut self, dt: f32) -> bool {
        let mut dt = dt.max(0.0);
        if self.delay_left > 0.0 {
            let used = dt.min(self.delay_left);
            self.delay_left -= used;
            dt -= used;
            if self.delay_left > 0.0 {
                return false;
            }
        }

        if self.duration <= 0.0 {
            self.progress = 1.0;
        } else {
            self.progress = (self.progress + dt / self.duration).min(1.0);
        }
        self.is_done()
    }

    /// Fraction of the decay completed, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn opacity(&self) -> f32 {
        1.0 - self.progress
    }

    pub fn is_done(&self) -> bool {
        self.progress >= 1.0
    }
}
