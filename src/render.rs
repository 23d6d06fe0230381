/// Opaque handle for one drawn item, returned by every draw call so the
/// item can later be cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlyphId(u64);

/// One retained drawing primitive in canvas pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    Line {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        thickness: u32,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
    },
}

/// Where the session draws. Implementations keep whatever was drawn until
/// it is cleared by handle; clearing an unknown handle is a no-op.
pub trait RenderSink {
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, thickness: u32) -> GlyphId;
    fn draw_text(&mut self, x: i32, y: i32, text: String) -> GlyphId;
    fn clear(&mut self, id: GlyphId);
    fn clear_all(&mut self);
}

/// Pixel dimensions of the drawing area, queried for grid-to-screen
/// placement.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Retained list of drawn glyphs with a fixed logical size. The TUI paints
/// it on every frame; tests inspect it directly.
#[derive(Debug)]
pub struct GlyphBuffer {
    width: u32,
    height: u32,
    next_id: u64,
    glyphs: Vec<(GlyphId, Glyph)>,
}

impl GlyphBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            next_id: 0,
            glyphs: Vec::new(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Glyph> {
        self.glyphs.iter().map(|(_, g)| g)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    fn push(&mut self, glyph: Glyph) -> GlyphId {
        self.next_id += 1;
        let id = GlyphId(self.next_id);
        self.glyphs.push((id, glyph));
        id
    }
}

impl RenderSink for GlyphBuffer {
    fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, thickness: u32) -> GlyphId {
        self.push(Glyph::Line {
            x1,
            y1,
            x2,
            y2,
            thickness,
        })
    }

    fn draw_text(&mut self, x: i32, y: i32, text: String) -> GlyphId {
        self.push(Glyph::Text { x, y, text })
    }

    fn clear(&mut self, id: GlyphId) {
        self.glyphs.retain(|(gid, _)| *gid != id);
    }

    fn clear_all(&mut self) {
        self.glyphs.clear();
    }
}

impl Canvas for GlyphBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}
