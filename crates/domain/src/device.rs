use serde::{Deserialize, Serialize};

use crate::values::Breakpoints;

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1920, 1080)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Square,
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeState {
    Small,
    Medium,
    Large,
}

/// Responsive fields recorded on every page view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceData {
    #[serde(rename = "nbs_page_responsive_orientation")]
    pub orientation: Orientation,
    #[serde(rename = "nbs_page_responsive_state")]
    pub state: SizeState,
}

impl DeviceData {
    /// Classify a viewport.
    ///
    /// Orientation checks run in order: an exact multiple is square, a
    /// remainder equal to the width (width < height) is portrait, anything
    /// else is landscape. A zero height has no ratio and is landscape.
    pub fn classify(viewport: Viewport, breakpoints: &Breakpoints) -> Self {
        let Viewport { width, height } = viewport;

        let orientation = match width.checked_rem(height) {
            Some(0) => Orientation::Square,
            Some(rem) if rem == width => Orientation::Portrait,
            _ => Orientation::Landscape,
        };

        let state = if width <= breakpoints.small {
            SizeState::Small
        } else if width <= breakpoints.medium {
            SizeState::Medium
        } else {
            SizeState::Large
        };

        Self { orientation, state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(width: u32, height: u32) -> DeviceData {
        DeviceData::classify(Viewport::new(width, height), &Breakpoints::default())
    }

    #[test]
    fn test_square() {
        assert_eq!(classify(1, 1).orientation, Orientation::Square);
        assert_eq!(classify(100, 100).orientation, Orientation::Square);
        assert_eq!(classify(300, 300).state, SizeState::Small);
    }

    #[test]
    fn test_portrait() {
        assert_eq!(classify(3, 4).orientation, Orientation::Portrait);
        assert_eq!(classify(9, 16).orientation, Orientation::Portrait);
        let tablet = classify(768, 1024);
        assert_eq!(tablet.orientation, Orientation::Portrait);
        assert_eq!(tablet.state, SizeState::Medium);
    }

    #[test]
    fn test_landscape() {
        assert_eq!(classify(5, 4).orientation, Orientation::Landscape);
        assert_eq!(classify(16, 9).orientation, Orientation::Landscape);
        let monitor = classify(1920, 1080);
        assert_eq!(monitor.orientation, Orientation::Landscape);
        assert_eq!(monitor.state, SizeState::Large);
    }

    #[test]
    fn test_exact_multiple_is_square() {
        // 2000 % 1000 == 0 so the square check wins
        assert_eq!(classify(2000, 1000).orientation, Orientation::Square);
    }

    #[test]
    fn test_size_states() {
        assert_eq!(classify(300, 1000).state, SizeState::Small);
        assert_eq!(classify(480, 1000).state, SizeState::Small);
        assert_eq!(classify(700, 1000).state, SizeState::Medium);
        assert_eq!(classify(768, 1000).state, SizeState::Medium);
        assert_eq!(classify(900, 1000).state, SizeState::Large);
    }

    #[test]
    fn test_zero_height_is_landscape() {
        assert_eq!(classify(300, 0).orientation, Orientation::Landscape);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(classify(1280, 1024)).unwrap();
        assert_eq!(json["nbs_page_responsive_orientation"], "landscape");
        assert_eq!(json["nbs_page_responsive_state"], "large");
    }
}
