use serde::{Deserialize, Serialize};

use crate::tree::LayoutNode;

/// Smallest width/height worth restoring
const MIN_EXTENT: f64 = 10.0;

/// Top-left position and size of a window, in screen units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WindowBounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// On-screen and not degenerate: `x,y >= 0`, `width,height > 10`
    pub fn is_plausible(&self) -> bool {
        self.x >= 0.0 && self.y >= 0.0 && self.width > MIN_EXTENT && self.height > MIN_EXTENT
    }
}

/// A top-level window or dialog whose geometry is persisted
pub trait WindowHandle {
    fn bounds(&self) -> WindowBounds;

    fn set_bounds(&mut self, bounds: WindowBounds);

    fn is_maximized(&self) -> bool;

    fn set_maximized(&mut self, maximized: bool);

    /// Content tree, once attached
    fn root(&self) -> Option<&dyn LayoutNode> {
        None
    }

    fn root_mut(&mut self) -> Option<&mut dyn LayoutNode> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausible_bounds() {
        assert!(WindowBounds::new(0.0, 0.0, 300.0, 200.0).is_plausible());
        assert!(!WindowBounds::new(-5.0, 10.0, 300.0, 200.0).is_plausible());
        assert!(!WindowBounds::new(10.0, -1.0, 300.0, 200.0).is_plausible());
        assert!(!WindowBounds::new(10.0, 10.0, 10.0, 200.0).is_plausible());
        assert!(!WindowBounds::new(10.0, 10.0, 300.0, 10.0).is_plausible());
        assert!(!WindowBounds::default().is_plausible());
    }
}
