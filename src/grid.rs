use std::fmt;

/// 1-indexed cell coordinate inside the test grid; (1,1) is the top-left
/// cell. Distinct from screen pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
}

impl GridPos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Forward/Backward walk the grid in row-major order, wrapping at row
/// boundaries; Up/Down change row only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Direction {
    Forward,
    Backward,
    Up,
    Down,
}

/// Dense per-cell score storage, row-major, all cells initially unset.
/// Cells are only ever written by a record at that position; values can be
/// overwritten but never cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix {
    width: u32,
    height: u32,
    cells: Vec<Option<u32>>,
}

impl ScoreMatrix {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    fn index(&self, pos: GridPos) -> usize {
        ((pos.y - 1) * self.width + (pos.x - 1)) as usize
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, pos: GridPos) -> Option<u32> {
        self.cells[self.index(pos)]
    }

    fn set(&mut self, pos: GridPos, score: u32) {
        let idx = self.index(pos);
        self.cells[idx] = Some(score);
    }

    pub fn unset_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_none()).count()
    }

    /// Rows top-to-bottom, each row's columns left-to-right.
    pub fn rows(&self) -> impl Iterator<Item = &[Option<u32>]> {
        self.cells.chunks(self.width as usize)
    }
}

/// Tracks a single cursor position inside a fixed-size grid and a recorded
/// score per cell. Pure logic; knows nothing about rendering.
#[derive(Debug)]
pub struct GridNavigator {
    size: GridPos,
    pos: GridPos,
    scores: ScoreMatrix,
}

impl GridNavigator {
    /// Grid dimensions must be at least 1x1; the config layer enforces this
    /// before a session starts.
    pub fn new(width: u32, height: u32) -> Self {
        debug_assert!(width >= 1 && height >= 1);
        Self {
            size: GridPos::new(width, height),
            pos: GridPos::new(1, 1),
            scores: ScoreMatrix::new(width, height),
        }
    }

    pub fn position(&self) -> GridPos {
        self.pos
    }

    pub fn scores(&self) -> &ScoreMatrix {
        &self.scores
    }

    /// Attempts to move the cursor. Returns false and leaves the position
    /// unchanged when the move would leave the grid.
    pub fn step(&mut self, direction: Direction) -> bool {
        let moved = match direction {
            Direction::Forward => self.step_forward(),
            Direction::Backward => self.step_backward(),
            Direction::Up => self.step_up(),
            Direction::Down => self.step_down(),
        };
        if moved {
            log::info!("moved {} to {}", direction, self.pos);
        }
        moved
    }

    fn step_forward(&mut self) -> bool {
        if self.pos == self.size {
            log::info!("not moving, end of grid");
            return false;
        }
        self.pos = if self.pos.x >= self.size.x {
            GridPos::new(1, self.pos.y + 1)
        } else {
            GridPos::new(self.pos.x + 1, self.pos.y)
        };
        true
    }

    fn step_backward(&mut self) -> bool {
        if self.pos == GridPos::new(1, 1) {
            log::info!("not moving, beginning of grid");
            return false;
        }
        self.pos = if self.pos.x <= 1 {
            GridPos::new(self.size.x, self.pos.y - 1)
        } else {
            GridPos::new(self.pos.x - 1, self.pos.y)
        };
        true
    }

    fn step_up(&mut self) -> bool {
        if self.pos.y == 1 {
            log::info!("not moving, top of grid");
            return false;
        }
        self.pos = GridPos::new(self.pos.x, self.pos.y - 1);
        true
    }

    fn step_down(&mut self) -> bool {
        if self.pos.y == self.size.y {
            log::info!("not moving, bottom of grid");
            return false;
        }
        self.pos = GridPos::new(self.pos.x, self.pos.y + 1);
        true
    }

    /// Stores `score` at the current position, overwriting any previous
    /// value.
    pub fn record(&mut self, score: u32) {
        self.scores.set(self.pos, score);
    }

    /// Recorded score at the current position, if any.
    pub fn score(&self) -> Option<u32> {
        self.scores.get(self.pos)
    }

    pub fn score_at(&self, pos: GridPos) -> Option<u32> {
        self.scores.get(pos)
    }

    /// Number of cells without a recorded score.
    pub fn remaining(&self) -> usize {
        self.scores.unset_count()
    }

    /// Screen pixel position of the current cell, spreading the grid evenly
    /// over the canvas with a margin of one cell pitch on every side.
    /// Truncating integer division.
    pub fn screen_position(&self, canvas_width: u32, canvas_height: u32) -> (i32, i32) {
        let x = self.pos.x * canvas_width / (self.size.x + 1);
        let y = self.pos.y * canvas_height / (self.size.y + 1);
        (x as i32, y as i32)
    }
}
