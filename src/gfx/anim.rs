pub fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Fixed-duration animation driven by the frame loop's clock.
#[derive(Debug, Clone)]
pub struct Timeline {
    start_time: f32,
    duration: f32,
    current_time: f32,
}

impl Timeline {
    pub fn new(duration: f32) -> Self {
        Self {
            start_time: 0.0,
            duration,
            current_time: 0.0,
        }
    }

    pub fn start(&mut self, now: f32) {
        self.start_time = now;
        self.current_time = now;
    }

    pub fn update(&mut self, now: f32) {
        self.current_time = now;
    }

    pub fn progress(&self) -> f32 {
        let elapsed = self.current_time - self.start_time;
        (elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn eased_progress(&self) -> f32 {
        ease_in_out(self.progress())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_clamps_to_unit_range() {
        let mut tl = Timeline::new(2.0);
        tl.start(10.0);
        tl.update(9.0);
        assert_eq!(tl.progress(), 0.0);
        tl.update(11.0);
        assert_eq!(tl.progress(), 0.5);
        tl.update(20.0);
        assert_eq!(tl.progress(), 1.0);
        assert!(tl.is_complete());
    }

    #[test]
    fn ease_endpoints_fixed() {
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert_eq!(ease_in_out(0.5), 0.5);
        assert_eq!(lerp(2.0, 4.0, 0.5), 3.0);
    }
}
