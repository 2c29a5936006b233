//! Render Module: retained draw batches and a double-buffered cell grid.
//!
//! Responsibilities:
//! - Hold logical primitives (rectangles, labels, carets) in a `Batch`
//! - Rasterize visible primitives into the front buffer in group order
//! - Diff front vs back buffer to produce a minimal CellUpdate list
//! - Send diff to TerminalBackend and swap buffers

use crate::terminal::TerminalBackend;
use crate::types::{colors, Buffer, Cell, CellAttrs, CellUpdate, Rect, COLOR_DEFAULT};
use unicode_width::UnicodeWidthChar;

/// Draw groups. Lower groups are drawn first.
pub mod group {
    pub const BACKGROUND: u8 = 0;
    pub const FOREGROUND: u8 = 1;
    pub const OVERLAY_BACKGROUND: u8 = 2;
    pub const OVERLAY_FOREGROUND: u8 = 3;
}

// ============================================================================
// Primitives
// ============================================================================

/// Stable handle to a primitive inside one `Batch`. Never recycled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        rect: Rect,
        fill: u32,
    },
    Label {
        x: i32,
        y: i32,
        /// Maximum number of cells; text past it is clipped.
        width: Option<i32>,
        text: String,
        fg: u32,
        attrs: CellAttrs,
    },
    /// Inverts the cell underneath.
    Caret {
        x: i32,
        y: i32,
    },
}

impl Primitive {
    fn origin(&self) -> (i32, i32) {
        match self {
            Self::Rect { rect, .. } => (rect.x, rect.y),
            Self::Label { x, y, .. } | Self::Caret { x, y } => (*x, *y),
        }
    }

    fn set_origin(&mut self, nx: i32, ny: i32) {
        match self {
            Self::Rect { rect, .. } => {
                rect.x = nx;
                rect.y = ny;
            }
            Self::Label { x, y, .. } | Self::Caret { x, y } => {
                *x = nx;
                *y = ny;
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    group: u8,
    visible: bool,
    primitive: Primitive,
}

// ============================================================================
// Batch
// ============================================================================

/// Ordered set of primitives drawn together. Hiding a primitive keeps its
/// slot so that it can be shown again without re-registration.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    entries: Vec<Entry>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn add(&mut self, group: u8, primitive: Primitive) -> PrimitiveId {
        self.entries.push(Entry {
            group,
            visible: true,
            primitive,
        });
        PrimitiveId(self.entries.len() - 1)
    }

    pub fn add_rect(&mut self, group: u8, rect: Rect, fill: u32) -> PrimitiveId {
        self.add(group, Primitive::Rect { rect, fill })
    }

    pub fn add_label(
        &mut self,
        group: u8,
        x: i32,
        y: i32,
        width: Option<i32>,
        text: impl Into<String>,
        fg: u32,
    ) -> PrimitiveId {
        self.add(
            group,
            Primitive::Label {
                x,
                y,
                width,
                text: text.into(),
                fg,
                attrs: CellAttrs::empty(),
            },
        )
    }

    pub fn add_caret(&mut self, group: u8, x: i32, y: i32) -> PrimitiveId {
        self.add(group, Primitive::Caret { x, y })
    }

    pub fn get(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.entries.get(id.0).map(|e| &e.primitive)
    }

    pub fn set_visible(&mut self, id: PrimitiveId, visible: bool) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.visible = visible;
        }
    }

    pub fn is_visible(&self, id: PrimitiveId) -> bool {
        self.entries.get(id.0).is_some_and(|e| e.visible)
    }

    pub fn origin(&self, id: PrimitiveId) -> Option<(i32, i32)> {
        self.get(id).map(Primitive::origin)
    }

    pub fn move_to(&mut self, id: PrimitiveId, x: i32, y: i32) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.primitive.set_origin(x, y);
        }
    }

    pub fn set_text(&mut self, id: PrimitiveId, new_text: &str) {
        if let Some(Entry {
            primitive: Primitive::Label { text, .. },
            ..
        }) = self.entries.get_mut(id.0)
        {
            text.clear();
            text.push_str(new_text);
        }
    }

    pub fn text(&self, id: PrimitiveId) -> Option<&str> {
        match self.get(id) {
            Some(Primitive::Label { text, .. }) => Some(text),
            _ => None,
        }
    }

    pub fn set_attrs(&mut self, id: PrimitiveId, new_attrs: CellAttrs) {
        if let Some(Entry {
            primitive: Primitive::Label { attrs, .. },
            ..
        }) = self.entries.get_mut(id.0)
        {
            *attrs = new_attrs;
        }
    }

    pub fn set_fill(&mut self, id: PrimitiveId, color: u32) {
        if let Some(Entry {
            primitive: Primitive::Rect { fill, .. },
            ..
        }) = self.entries.get_mut(id.0)
        {
            *fill = color;
        }
    }

    pub fn fill(&self, id: PrimitiveId) -> Option<u32> {
        match self.get(id) {
            Some(Primitive::Rect { fill, .. }) => Some(*fill),
            _ => None,
        }
    }

    /// Rasterize every visible primitive, group by group, in registration
    /// order within a group.
    pub fn draw(&self, buffer: &mut Buffer) {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by_key(|&i| self.entries[i].group);

        for i in order {
            let entry = &self.entries[i];
            if !entry.visible {
                continue;
            }
            match &entry.primitive {
                Primitive::Rect { rect, fill } => draw_rect(buffer, *rect, *fill),
                Primitive::Label {
                    x,
                    y,
                    width,
                    text,
                    fg,
                    attrs,
                } => draw_label(buffer, *x, *y, *width, text, *fg, *attrs),
                Primitive::Caret { x, y } => draw_caret(buffer, *x, *y),
            }
        }
    }
}

fn draw_rect(buffer: &mut Buffer, rect: Rect, fill: u32) {
    for sy in rect.y..rect.bottom() {
        for sx in rect.x..rect.right() {
            if let Some(cell) = buffer.get_mut(sx, sy) {
                *cell = Cell {
                    ch: ' ',
                    fg: cell.fg,
                    bg: fill,
                    attrs: CellAttrs::empty(),
                };
            }
        }
    }
}

/// Labels only replace glyph, foreground and attributes; the background of
/// whatever was drawn underneath shows through.
fn draw_label(
    buffer: &mut Buffer,
    x: i32,
    y: i32,
    width: Option<i32>,
    text: &str,
    fg: u32,
    attrs: CellAttrs,
) {
    let limit = width.unwrap_or(i32::MAX);
    let mut col = 0i32;
    for ch in text.chars() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0) as i32;
        if w == 0 {
            continue;
        }
        if col + w > limit {
            break;
        }
        if let Some(cell) = buffer.get_mut(x + col, y) {
            cell.ch = ch;
            cell.fg = fg;
            cell.attrs = attrs;
        }
        col += w;
    }
}

fn draw_caret(buffer: &mut Buffer, x: i32, y: i32) {
    if let Some(cell) = buffer.get_mut(x, y) {
        let inv_fg = if cell.bg != COLOR_DEFAULT { cell.bg } else { colors::BLACK };
        let inv_bg = if cell.fg != COLOR_DEFAULT { cell.fg } else { colors::WHITE };
        cell.fg = inv_fg;
        cell.bg = inv_bg;
    }
}

// ============================================================================
// Render Pipeline
// ============================================================================

pub struct Renderer {
    front_buffer: Buffer,
    back_buffer: Buffer,
    last_diff_cells: usize,
}

impl Renderer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            front_buffer: Buffer::new(width, height),
            back_buffer: Buffer::new(width, height),
            last_diff_cells: 0,
        }
    }

    /// Execute the full render pipeline:
    /// 1. Resize buffers to the backend if needed
    /// 2. Clear front buffer and draw the batch into it
    /// 3. Diff front vs back
    /// 4. Send diff to backend
    /// 5. Swap buffers
    pub fn render(
        &mut self,
        batch: &Batch,
        backend: &mut dyn TerminalBackend,
    ) -> Result<(), String> {
        let (w, h) = backend.size();
        if self.front_buffer.width != w || self.front_buffer.height != h {
            self.front_buffer.resize(w, h);
            self.back_buffer.resize(w, h);
            self.back_buffer.invalidate();
        }

        self.front_buffer.clear();
        batch.draw(&mut self.front_buffer);

        let diff = diff_buffers(&self.front_buffer, &self.back_buffer);
        self.last_diff_cells = diff.len();

        backend.write_diff(&diff)?;
        backend.flush()?;

        std::mem::swap(&mut self.front_buffer, &mut self.back_buffer);
        log::trace!("render: {} cells changed", self.last_diff_cells);
        Ok(())
    }

    /// The frame most recently sent to the backend.
    pub fn last_frame(&self) -> &Buffer {
        &self.back_buffer
    }

    pub fn last_diff_cells(&self) -> usize {
        self.last_diff_cells
    }
}

// ============================================================================
// Buffer Diffing
// ============================================================================

/// Cells of `front` that differ from the same position in `back`. Both
/// buffers must have the same size.
fn diff_buffers(front: &Buffer, back: &Buffer) -> Vec<CellUpdate> {
    front
        .iter()
        .zip(back.iter())
        .filter(|((_, _, f), (_, _, b))| f != b)
        .map(|((x, y, cell), _)| CellUpdate { x, y, cell: *cell })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
