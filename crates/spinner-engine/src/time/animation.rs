/// Pyramid spin rate about +Y.
pub const PYRAMID_DEGREES_PER_SECOND: f64 = 90.0;

/// Cube spin rate about (1, 1, 1); negative spins the other way.
pub const CUBE_DEGREES_PER_SECOND: f64 = -75.0;

/// Rotation angles of the two scene objects, in degrees.
///
/// Angles grow without bound; rotation is periodic so no wraparound is applied.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct AnimationState {
    pub pyramid_angle: f64,
    pub cube_angle: f64,
}

/// Advances [`AnimationState`] from wall-clock timestamps.
#[derive(Debug, Clone, Default)]
pub struct AnimationClock {
    last_millis: Option<f64>,
    state: AnimationState,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the last timestamp; the next tick is a zero-delta bootstrap.
    pub fn reset(&mut self) {
        self.last_millis = None;
    }

    /// Advances the angles to `now_millis` and returns them.
    ///
    /// The first tick only records the timestamp so startup does not produce
    /// a jump. A timestamp earlier than the previous one counts as zero
    /// elapsed time.
    pub fn tick(&mut self, now_millis: f64) -> AnimationState {
        if let Some(last) = self.last_millis {
            let elapsed = (now_millis - last).max(0.0);
            self.state.pyramid_angle += PYRAMID_DEGREES_PER_SECOND * elapsed / 1000.0;
            self.state.cube_angle += CUBE_DEGREES_PER_SECOND * elapsed / 1000.0;
        }
        self.last_millis = Some(now_millis);
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_zero_delta() {
        let mut clock = AnimationClock::new();
        assert_eq!(clock.tick(123_456.0), AnimationState::default());
    }

    #[test]
    fn half_second_advances_both_angles() {
        let mut clock = AnimationClock::new();
        clock.tick(1000.0);
        let s = clock.tick(1500.0);
        assert_eq!(s.pyramid_angle, 45.0);
        assert_eq!(s.cube_angle, -37.5);
    }

    #[test]
    fn angles_move_monotonically() {
        let mut clock = AnimationClock::new();
        let mut prev = clock.tick(0.0);
        for t in [16.0, 33.0, 33.0, 50.0, 1000.0, 60_000.0] {
            let s = clock.tick(t);
            assert!(s.pyramid_angle >= prev.pyramid_angle);
            assert!(s.cube_angle <= prev.cube_angle);
            prev = s;
        }
    }

    #[test]
    fn angles_are_not_wrapped() {
        let mut clock = AnimationClock::new();
        clock.tick(0.0);
        let s = clock.tick(10_000.0);
        assert_eq!(s.pyramid_angle, 900.0);
        assert_eq!(s.cube_angle, -750.0);
    }

    #[test]
    fn reset_makes_next_tick_zero_delta() {
        let mut clock = AnimationClock::new();
        clock.tick(0.0);
        let before = clock.tick(1000.0);
        clock.reset();
        assert_eq!(clock.tick(50_000.0), before);
        let after = clock.tick(51_000.0);
        assert_eq!(after.pyramid_angle, before.pyramid_angle + 90.0);
    }

    #[test]
    fn backwards_timestamp_counts_as_zero() {
        let mut clock = AnimationClock::new();
        clock.tick(2000.0);
        let s = clock.tick(1000.0);
        assert_eq!(s, AnimationState::default());
        // The earlier timestamp becomes the new baseline.
        assert_eq!(clock.tick(1500.0).pyramid_angle, 45.0);
    }
}
