//! Shared types, enums, and constants.
//!
//! Geometry, colour encoding, the cell grid, and raw terminal input all live
//! here because every other module touches at least one of them.

use bitflags::bitflags;

// ============================================================================
// Geometry
// ============================================================================

/// Axis-aligned rectangle in cell coordinates. Origin is top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

// ============================================================================
// Colours
// ============================================================================
//
// A colour is a u32: 0 means "terminal default", otherwise the high byte is
// 0x01 and the low 24 bits hold 0xRRGGBB.

pub const COLOR_DEFAULT: u32 = 0;

const RGB_TAG: u32 = 0x0100_0000;

pub const fn rgb(r: u8, g: u8, b: u8) -> u32 {
    RGB_TAG | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// `(r, g, b)` for an RGB colour, `None` for the terminal default.
pub fn rgb_components(color: u32) -> Option<(u8, u8, u8)> {
    (color & 0xFF00_0000 == RGB_TAG).then(|| {
        let [_, r, g, b] = color.to_be_bytes();
        (r, g, b)
    })
}

/// Form palette.
pub mod colors {
    use super::rgb;

    pub const BLACK: u32 = rgb(0, 0, 0);
    pub const GRAY: u32 = rgb(100, 100, 100);
    pub const ALT_GRAY: u32 = rgb(120, 120, 120);
    pub const WHITE: u32 = rgb(255, 255, 255);
    pub const LIGHT_GRAY: u32 = rgb(200, 200, 200);
    pub const RED: u32 = rgb(255, 0, 0);
}

// ============================================================================
// Cell Attributes (bitflags)
// ============================================================================

bitflags! {
    #[repr(transparent)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CellAttrs: u8 {
        const BOLD = 0b01;
        const DIM  = 0b10;
    }
}

// ============================================================================
// Key Code Constants
// ============================================================================

pub mod key {
    pub const BACKSPACE: u32 = 0x0100;
    pub const ENTER: u32 = 0x0101;
    pub const LEFT: u32 = 0x0102;
    pub const RIGHT: u32 = 0x0103;
    pub const UP: u32 = 0x0104;
    pub const DOWN: u32 = 0x0105;
    pub const HOME: u32 = 0x0106;
    pub const END: u32 = 0x0107;
    pub const TAB: u32 = 0x010A;
    pub const BACK_TAB: u32 = 0x010B;
    pub const DELETE: u32 = 0x010C;
    pub const ESCAPE: u32 = 0x010E;
}

pub mod modifier {
    pub const SHIFT: u32 = 0x01;
    pub const CTRL: u32 = 0x02;
    pub const ALT: u32 = 0x04;
}

pub mod mouse_button {
    pub const LEFT: u8 = 0;
    pub const MIDDLE: u8 = 1;
    pub const RIGHT: u8 = 2;
    pub const SCROLL_UP: u8 = 3;
    pub const SCROLL_DOWN: u8 = 4;
}

// ============================================================================
// Cell & Buffer
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: u32,
    pub bg: u32,
    pub attrs: CellAttrs,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: COLOR_DEFAULT,
        bg: COLOR_DEFAULT,
        attrs: CellAttrs::empty(),
    };

    /// Never produced by drawing; marks a cell that must be repainted.
    const STALE: Cell = Cell {
        ch: '\0',
        ..Cell::BLANK
    };
}

impl Default for Cell {
    fn default() -> Self {
        Cell::BLANK
    }
}

/// Row-major cell grid the size of the terminal.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
}

impl Buffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width as usize * height as usize],
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Mark every cell stale so the next diff against this buffer repaints
    /// the whole screen.
    pub fn invalidate(&mut self) {
        self.cells.fill(Cell::STALE);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let in_bounds = (0..self.width as i32).contains(&x) && (0..self.height as i32).contains(&y);
        in_bounds.then(|| y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Cells with their coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (u16, u16, &Cell)> + '_ {
        let w = self.width.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, c)| ((i % w) as u16, (i / w) as u16, c))
    }

    /// Row contents as a string, for tests and debugging.
    pub fn row_text(&self, y: i32) -> String {
        (0..self.width as i32)
            .filter_map(|x| self.get(x, y).map(|c| c.ch))
            .collect()
    }
}

// ============================================================================
// Cell Update (for TerminalBackend trait)
// ============================================================================

#[derive(Debug, Clone)]
pub struct CellUpdate {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

// ============================================================================
// Terminal Input Event
// ============================================================================

#[derive(Debug, Clone)]
pub enum TerminalInputEvent {
    Key {
        code: u32,
        modifiers: u32,
        character: char,
    },
    MouseMove {
        x: u16,
        y: u16,
    },
    MouseDown {
        x: u16,
        y: u16,
        button: u8,
        modifiers: u32,
    },
    Resize {
        width: u16,
        height: u16,
    },
    FocusGained,
    FocusLost,
}
