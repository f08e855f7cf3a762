/// Fraction of the remaining distance covered per frame
const EASE_FACTOR: f64 = 0.18;
/// Below this distance the bar snaps onto its target
const SNAP_EPSILON: f64 = 0.001;

/// Displayed position of one progress bar, easing toward a target
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BarAnimation {
    /// Current displayed fill in [0, 1]
    pub position: f64,
    /// Fill the bar is moving toward; `None` until a bucket sets it
    pub target: Option<f64>,
}

impl BarAnimation {
    pub fn set_target(&mut self, fraction: f64) {
        self.target = Some(fraction.clamp(0.0, 1.0));
    }

    pub fn is_animating(&self) -> bool {
        self.target.is_some_and(|target| target != self.position)
    }

    /// Advance one frame. Returns whether the position changed.
    pub fn step(&mut self) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        if target == self.position {
            return false;
        }
        let diff = target - self.position;
        if diff.abs() <= SNAP_EPSILON {
            self.position = target;
        } else {
            self.position += diff * EASE_FACTOR;
        }
        true
    }
}
