use std::collections::VecDeque;

/// Frames averaged by [`FpsCounter`].
pub const FPS_SAMPLES: usize = 30;

/// Rolling frame-rate average over the last [`FPS_SAMPLES`] frame deltas.
#[derive(Debug, Default)]
pub struct FpsCounter {
    deltas: VecDeque<f32>,
    total: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one frame that took `dt` seconds. Non-positive deltas are
    /// ignored.
    pub fn push(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        if self.deltas.len() == FPS_SAMPLES
            && let Some(old) = self.deltas.pop_front()
        {
            self.total -= old;
        }
        self.deltas.push_back(dt);
        self.total += dt;
    }

    /// Frames per second, or `0.0` before the first frame.
    pub fn fps(&self) -> f32 {
        if self.deltas.is_empty() || self.total <= 0.0 {
            return 0.0;
        }
        self.deltas.len() as f32 / self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn empty_counter_reads_zero() {
        assert_eq!(FpsCounter::new().fps(), 0.0);
    }

    #[test]
    fn averages_recent_frames() {
        let mut fps = FpsCounter::new();
        fps.push(1.0 / 60.0);
        fps.push(1.0 / 30.0);
        assert_relative_eq!(fps.fps(), 40.0, epsilon = 1e-3);

        fps.push(0.0);
        fps.push(-1.0);
        assert_relative_eq!(fps.fps(), 40.0, epsilon = 1e-3);
    }

    #[test]
    fn old_frames_roll_out() {
        let mut fps = FpsCounter::new();
        for _ in 0..FPS_SAMPLES {
            fps.push(0.5);
        }
        assert_relative_eq!(fps.fps(), 2.0, epsilon = 1e-3);

        for _ in 0..FPS_SAMPLES {
            fps.push(0.01);
        }
        assert_relative_eq!(fps.fps(), 100.0, epsilon = 0.1);
    }
}
