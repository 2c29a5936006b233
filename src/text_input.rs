//! Single-line editable text field.
//!
//! The cursor is a grapheme index in `0..=grapheme_count(text)`. The caret
//! primitive is only visible while the field holds focus; the text itself is
//! always readable through `value()`.

use crate::render::{group, Batch, PrimitiveId};
use crate::text_utils::{grapheme_count, grapheme_to_byte_idx, prefix_width};
use crate::types::{colors, Rect};
use crate::widget::{PointerStyle, Widget};

pub const TEXT_INPUT_PADDING: i32 = 1;

pub struct TextInput {
    rect: Rect,
    padding: i32,
    text: String,
    cursor: usize,
    /// First grapheme shown; scrolls so the caret stays inside the field.
    view_start: usize,
    focused: bool,
    background: PrimitiveId,
    label: PrimitiveId,
    caret: PrimitiveId,
}

impl TextInput {
    pub fn new(batch: &mut Batch, x: i32, y: i32, width: i32, base_text: &str) -> Self {
        let rect = Rect::new(x, y, width, 1);
        let padding = TEXT_INPUT_PADDING;
        let background = batch.add_rect(group::BACKGROUND, rect, colors::GRAY);
        let label = batch.add_label(
            group::FOREGROUND,
            x + padding,
            y,
            Some(inner_width(width, padding)),
            base_text,
            colors::BLACK,
        );
        let caret = batch.add_caret(group::OVERLAY_FOREGROUND, x + padding, y);
        batch.set_visible(caret, false);

        let mut input = Self {
            rect,
            padding,
            text: base_text.to_string(),
            cursor: 0,
            view_start: 0,
            focused: false,
            background,
            label,
            caret,
        };
        input.sync_view(batch);
        input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Grapheme count of the current text.
    pub fn len(&self) -> usize {
        grapheme_count(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Recompute the visible slice, the label position and the caret
    /// position from `rect`, `text` and `cursor`.
    fn sync_view(&mut self, batch: &mut Batch) {
        let len = self.len();
        self.cursor = self.cursor.min(len);

        let inner = inner_width(self.rect.width, self.padding) as usize;
        if self.cursor < self.view_start {
            self.view_start = self.cursor;
        }
        loop {
            let start = grapheme_to_byte_idx(&self.text, self.view_start);
            let caret_offset = prefix_width(&self.text[start..], self.cursor - self.view_start);
            if caret_offset < inner || self.view_start >= self.cursor {
                break;
            }
            self.view_start += 1;
        }

        let start = grapheme_to_byte_idx(&self.text, self.view_start);
        let visible = &self.text[start..];
        let caret_offset = prefix_width(visible, self.cursor - self.view_start) as i32;

        let text_x = self.rect.x + self.padding;
        batch.set_text(self.label, visible);
        batch.move_to(self.label, text_x, self.rect.y);
        batch.move_to(self.caret, text_x + caret_offset, self.rect.y);
    }
}

fn inner_width(width: i32, padding: i32) -> i32 {
    (width - 2 * padding).max(1)
}

impl Widget for TextInput {
    fn hit_test(&self, x: i32, y: i32) -> bool {
        self.rect.contains(x, y)
    }

    fn on_pointer_motion(&mut self, _batch: &mut Batch, x: i32, y: i32) -> Option<PointerStyle> {
        self.hit_test(x, y).then_some(PointerStyle::Text)
    }

    fn begin_focus(&mut self, batch: &mut Batch, _x: i32, _y: i32) {
        self.focused = true;
        batch.set_visible(self.caret, true);
    }

    fn end_focus(&mut self, batch: &mut Batch, _x: i32, _y: i32) {
        self.focused = false;
        batch.set_visible(self.caret, false);
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn insert_char(&mut self, batch: &mut Batch, ch: char) {
        let byte_idx = grapheme_to_byte_idx(&self.text, self.cursor);
        let before = self.len();
        self.text.insert(byte_idx, ch);
        // A combining mark merges into the previous cluster instead of
        // adding one.
        if self.len() > before {
            self.cursor += 1;
        }
        self.sync_view(batch);
    }

    fn delete_backward(&mut self, batch: &mut Batch) {
        if self.cursor == 0 {
            return;
        }
        let start = grapheme_to_byte_idx(&self.text, self.cursor - 1);
        let end = grapheme_to_byte_idx(&self.text, self.cursor);
        self.text.replace_range(start..end, "");
        self.cursor -= 1;
        self.sync_view(batch);
    }

    fn delete_forward(&mut self, batch: &mut Batch) {
        if self.cursor >= self.len() {
            return;
        }
        let start = grapheme_to_byte_idx(&self.text, self.cursor);
        let end = grapheme_to_byte_idx(&self.text, self.cursor + 1);
        self.text.replace_range(start..end, "");
        self.sync_view(batch);
    }

    fn arrow_left(&mut self, batch: &mut Batch) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.sync_view(batch);
        }
    }

    fn arrow_right(&mut self, batch: &mut Batch) {
        if self.cursor < self.len() {
            self.cursor += 1;
            self.sync_view(batch);
        }
    }

    fn home(&mut self, batch: &mut Batch) {
        self.cursor = 0;
        self.sync_view(batch);
    }

    fn end(&mut self, batch: &mut Batch) {
        self.cursor = self.len();
        self.sync_view(batch);
    }

    fn x(&self) -> i32 {
        self.rect.x
    }

    fn y(&self) -> i32 {
        self.rect.y
    }

    fn set_position(&mut self, batch: &mut Batch, x: i32, y: i32) {
        self.rect.x = x;
        self.rect.y = y;
        batch.move_to(self.background, x, y);
        self.sync_view(batch);
    }

    fn width(&self) -> i32 {
        self.rect.width
    }

    fn height(&self) -> i32 {
        self.rect.height
    }

    fn value(&self) -> Option<&str> {
        Some(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(batch: &mut Batch) -> TextInput {
        TextInput::new(batch, 2, 3, 12, "")
    }

    fn type_str(w: &mut TextInput, batch: &mut Batch, s: &str) {
        for ch in s.chars() {
            w.insert_char(batch, ch);
        }
    }

    #[test]
    fn test_focus_toggles_caret() {
        let mut batch = Batch::new();
        let mut w = input(&mut batch);
        assert!(!batch.is_visible(w.caret));

        w.begin_focus(&mut batch, 3, 3);
        assert!(w.is_focused());
        assert!(batch.is_visible(w.caret));

        w.end_focus(&mut batch, 0, 0);
        assert!(!w.is_focused());
        assert!(!batch.is_visible(w.caret));
    }

    #[test]
    fn test_insert_splices_at_cursor() {
        let mut batch = Batch::new();
        let mut w = input(&mut batch);
        type_str(&mut w, &mut batch, "ac");
        w.arrow_left(&mut batch);
        w.insert_char(&mut batch, 'b');

        assert_eq!(w.value(), Some("abc"));
        assert_eq!(w.cursor(), 2);
        assert_eq!(batch.text(w.label), Some("abc"));
    }

    #[test]
    fn test_delete_backward_at_start_is_no_op() {
        let mut batch = Batch::new();
        let mut w = input(&mut batch);
        w.delete_backward(&mut batch);
        assert_eq!(w.value(), Some(""));
        assert_eq!(w.cursor(), 0);

        type_str(&mut w, &mut batch, "xy");
        w.arrow_left(&mut batch);
        w.arrow_left(&mut batch);
        w.delete_backward(&mut batch);
        assert_eq!(w.value(), Some("xy"));
        assert_eq!(w.cursor(), 0);
    }

    #[test]
    fn test_delete_backward_removes_previous_grapheme() {
        let mut batch = Batch::new();
        let mut w = TextInput::new(&mut batch, 0, 0, 10, "e\u{301}x");
        w.arrow_right(&mut batch);
        w.delete_backward(&mut batch);
        assert_eq!(w.value(), Some("x"));
        assert_eq!(w.cursor(), 0);
    }

    #[test]
    fn test_home_end_and_delete_forward() {
        let mut batch = Batch::new();
        let mut w = TextInput::new(&mut batch, 0, 0, 10, "abc");
        w.home(&mut batch);
        w.delete_forward(&mut batch);
        assert_eq!(w.value(), Some("bc"));
        assert_eq!(w.cursor(), 0);

        w.end(&mut batch);
        assert_eq!(w.cursor(), 2);
        w.delete_forward(&mut batch);
        assert_eq!(w.value(), Some("bc"));
    }

    #[test]
    fn test_arrow_right_reaches_end_of_text() {
        let mut batch = Batch::new();
        let mut w = TextInput::new(&mut batch, 0, 0, 10, "abc");
        for _ in 0..10 {
            w.arrow_right(&mut batch);
        }
        assert_eq!(w.cursor(), 3);
        for _ in 0..10 {
            w.arrow_left(&mut batch);
        }
        assert_eq!(w.cursor(), 0);
    }

    #[test]
    fn test_cursor_stays_in_bounds_for_any_sequence() {
        let mut batch = Batch::new();
        let mut w = input(&mut batch);
        let ops = "ab<<x>>>>--<y-----z>>";
        for op in ops.chars() {
            match op {
                '<' => w.arrow_left(&mut batch),
                '>' => w.arrow_right(&mut batch),
                '-' => w.delete_backward(&mut batch),
                c => w.insert_char(&mut batch, c),
            }
            assert!(w.cursor() <= w.len(), "cursor escaped after {op:?}");
        }
        assert_eq!(w.value(), Some("zx"));
    }

    #[test]
    fn test_caret_tracks_cursor() {
        let mut batch = Batch::new();
        let mut w = input(&mut batch);
        type_str(&mut w, &mut batch, "abc");
        assert_eq!(batch.origin(w.caret), Some((2 + 1 + 3, 3)));
        w.arrow_left(&mut batch);
        assert_eq!(batch.origin(w.caret), Some((2 + 1 + 2, 3)));
    }

    #[test]
    fn test_long_text_scrolls_to_keep_caret_visible() {
        let mut batch = Batch::new();
        let mut w = TextInput::new(&mut batch, 0, 0, 6, "");
        type_str(&mut w, &mut batch, "abcdefgh");

        // Four inner cells: the caret sits in the last one.
        assert_eq!(batch.text(w.label), Some("fgh"));
        assert_eq!(batch.origin(w.caret), Some((1 + 3, 0)));
        assert_eq!(w.value(), Some("abcdefgh"));

        for _ in 0..8 {
            w.arrow_left(&mut batch);
        }
        assert_eq!(batch.text(w.label), Some("abcdefgh"));
        assert_eq!(batch.origin(w.caret), Some((1, 0)));
    }

    #[test]
    fn test_move_keeps_sub_elements_anchored() {
        let mut batch = Batch::new();
        let mut w = input(&mut batch);
        type_str(&mut w, &mut batch, "ab");
        w.set_position(&mut batch, 20, 10);

        assert_eq!((w.x(), w.y()), (20, 10));
        assert_eq!(batch.origin(w.background), Some((20, 10)));
        assert_eq!(batch.origin(w.label), Some((21, 10)));
        assert_eq!(batch.origin(w.caret), Some((23, 10)));
        assert!(w.hit_test(20, 10));
        assert!(!w.hit_test(2, 3));
    }

    #[test]
    fn test_pointer_motion_requests_text_cursor() {
        let mut batch = Batch::new();
        let mut w = input(&mut batch);
        assert_eq!(w.on_pointer_motion(&mut batch, 5, 3), Some(PointerStyle::Text));
        assert_eq!(w.on_pointer_motion(&mut batch, 5, 4), None);
    }
}
