//! Scene state and scroll direction tags

/// Progress state of a scene with respect to the scroll position.
///
/// Zero-duration scenes only ever toggle between `Before` and `During`;
/// they have no end boundary and therefore never reach `After`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SceneState {
    /// Scroll position is before the scene's start offset.
    #[default]
    Before,
    /// Scroll position is inside the scene's offset window.
    During,
    /// Scroll position is past the scene's end offset.
    After,
}

impl SceneState {
    /// Check whether the scene is in its active scroll timeframe.
    pub fn is_active(&self) -> bool {
        matches!(self, SceneState::During)
    }
}

/// Last computed scroll movement of a container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollDirection {
    /// No movement since the last update pass.
    #[default]
    Paused,
    /// Scrolling down (vertical) or right (horizontal).
    Forward,
    /// Scrolling up (vertical) or left (horizontal).
    Reverse,
}

impl ScrollDirection {
    /// Derive the direction from a signed scroll delta.
    pub fn from_delta(delta: f64) -> Self {
        if delta == 0.0 {
            ScrollDirection::Paused
        } else if delta > 0.0 {
            ScrollDirection::Forward
        } else {
            ScrollDirection::Reverse
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_delta() {
        assert_eq!(ScrollDirection::from_delta(0.0), ScrollDirection::Paused);
        assert_eq!(ScrollDirection::from_delta(12.5), ScrollDirection::Forward);
        assert_eq!(ScrollDirection::from_delta(-0.1), ScrollDirection::Reverse);
    }

    #[test]
    fn only_during_is_active() {
        assert!(!SceneState::Before.is_active());
        assert!(SceneState::During.is_active());
        assert!(!SceneState::After.is_active());
    }
}
