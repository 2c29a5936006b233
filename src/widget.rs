//! Widget capability contract.
//!
//! Every interactive element of the form implements `Widget`. Methods a
//! widget has no use for keep their default no-op body: a button that
//! receives `insert_char` simply ignores it.
//!
//! Widgets never own their drawing: they hold `PrimitiveId`s into the
//! `Batch` they were built in and receive that batch on every call that can
//! change what is on screen.

use crate::render::Batch;

/// Pointer shape requested by the widget under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerStyle {
    #[default]
    Default,
    Text,
    Hand,
}

pub trait Widget {
    /// Whether the cell `(x, y)` lands on this widget.
    fn hit_test(&self, x: i32, y: i32) -> bool;

    /// Pointer moved to `(x, y)`. Returns the pointer style to use when the
    /// pointer is over this widget, `None` otherwise.
    fn on_pointer_motion(&mut self, _batch: &mut Batch, _x: i32, _y: i32) -> Option<PointerStyle> {
        None
    }

    fn begin_focus(&mut self, _batch: &mut Batch, _x: i32, _y: i32) {}

    /// `(x, y)` is the pointer position that caused focus to move away.
    fn end_focus(&mut self, _batch: &mut Batch, _x: i32, _y: i32) {}

    fn is_focused(&self) -> bool {
        false
    }

    /// When true, a press on this widget while it already holds focus ends
    /// the focus instead of re-entering it.
    fn releases_focus_on_press(&self) -> bool {
        false
    }

    fn insert_char(&mut self, _batch: &mut Batch, _ch: char) {}

    fn delete_backward(&mut self, _batch: &mut Batch) {}

    fn delete_forward(&mut self, _batch: &mut Batch) {}

    fn arrow_left(&mut self, _batch: &mut Batch) {}

    fn arrow_right(&mut self, _batch: &mut Batch) {}

    fn arrow_up(&mut self, _batch: &mut Batch) {}

    fn arrow_down(&mut self, _batch: &mut Batch) {}

    fn home(&mut self, _batch: &mut Batch) {}

    fn end(&mut self, _batch: &mut Batch) {}

    fn x(&self) -> i32;

    fn y(&self) -> i32;

    /// Move the widget. All sub-elements move with it.
    fn set_position(&mut self, batch: &mut Batch, x: i32, y: i32);

    fn width(&self) -> i32;

    fn height(&self) -> i32;

    fn value(&self) -> Option<&str>;
}
