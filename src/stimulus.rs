pub const MIN_SIZE: u32 = 1;
pub const MAX_SIZE: u32 = 100;
pub const DEFAULT_SIZE: u32 = 10;

/// Axis along which the stimulus line is drawn; toggled periodically while
/// a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn flipped(self) -> Self {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// Draw instruction for one stimulus glyph: a single line segment in canvas
/// pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub thickness: u32,
}

/// Drawable state of the blinking cross: screen position, size, orientation
/// and base line thickness. Produces draw instructions; putting them on
/// screen is the controller's job.
#[derive(Debug, Clone)]
pub struct Stimulus {
    x: i32,
    y: i32,
    size: u32,
    orientation: Orientation,
    thickness: u32,
}

impl Stimulus {
    pub fn new(x: i32, y: i32, thickness: u32) -> Self {
        Self {
            x,
            y,
            size: DEFAULT_SIZE,
            orientation: Orientation::Horizontal,
            thickness,
        }
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn toggle_orientation(&mut self) {
        self.orientation = self.orientation.flipped();
        log::info!("switch to {}", self.orientation);
    }

    /// Grows the stimulus by one, clamped at the maximum. Returns the
    /// resulting size.
    pub fn increase_size(&mut self) -> u32 {
        self.size = (self.size + 1).min(MAX_SIZE);
        self.size
    }

    /// Shrinks the stimulus by one, clamped at the minimum. Returns the
    /// resulting size.
    pub fn decrease_size(&mut self) -> u32 {
        self.size = self.size.saturating_sub(1).max(MIN_SIZE);
        self.size
    }

    /// Line width after scaling the base thickness with the current size.
    pub fn scaled_thickness(&self) -> u32 {
        self.thickness * self.size / 10 + 1
    }

    /// The line segment to draw: centered on the stimulus position,
    /// extending `size` pixels either way along the orientation axis.
    pub fn segment(&self) -> Segment {
        let s = self.size as i32;
        let thickness = self.scaled_thickness();
        match self.orientation {
            Orientation::Horizontal => Segment {
                x1: self.x - s,
                y1: self.y,
                x2: self.x + s,
                y2: self.y,
                thickness,
            },
            Orientation::Vertical => Segment {
                x1: self.x,
                y1: self.y - s,
                x2: self.x,
                y2: self.y + s,
                thickness,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increase_clamps_at_max() {
        let mut stim = Stimulus::new(0, 0, 3);
        for _ in 0..200 {
            stim.increase_size();
        }
        assert_eq!(stim.size(), MAX_SIZE);
        assert_eq!(stim.increase_size(), MAX_SIZE);
    }

    #[test]
    fn decrease_clamps_at_min() {
        let mut stim = Stimulus::new(0, 0, 3);
        for _ in 0..200 {
            stim.decrease_size();
        }
        assert_eq!(stim.size(), MIN_SIZE);
        assert_eq!(stim.decrease_size(), MIN_SIZE);
    }

    #[test]
    fn toggle_flips_between_both_orientations() {
        let mut stim = Stimulus::new(0, 0, 3);
        assert_eq!(stim.orientation(), Orientation::Horizontal);
        stim.toggle_orientation();
        assert_eq!(stim.orientation(), Orientation::Vertical);
        stim.toggle_orientation();
        assert_eq!(stim.orientation(), Orientation::Horizontal);
    }

    #[test]
    fn segment_extends_size_along_axis() {
        let mut stim = Stimulus::new(100, 80, 3);
        let seg = stim.segment();
        assert_eq!((seg.x1, seg.y1, seg.x2, seg.y2), (90, 80, 110, 80));

        stim.toggle_orientation();
        let seg = stim.segment();
        assert_eq!((seg.x1, seg.y1, seg.x2, seg.y2), (100, 70, 100, 90));
    }

    #[test]
    fn thickness_scales_with_size() {
        let mut stim = Stimulus::new(0, 0, 3);
        // default size 10: 3 * 10 / 10 + 1
        assert_eq!(stim.scaled_thickness(), 4);
        for _ in 0..9 {
            stim.decrease_size();
        }
        // size 1: 3 * 1 / 10 + 1, integer division truncates
        assert_eq!(stim.scaled_thickness(), 1);
    }

    #[test]
    fn move_to_repositions_segment() {
        let mut stim = Stimulus::new(0, 0, 1);
        stim.move_to(250, 333);
        assert_eq!(stim.position(), (250, 333));
        let seg = stim.segment();
        assert_eq!(seg.y1, 333);
        assert_eq!(seg.x1, 250 - DEFAULT_SIZE as i32);
    }
}
