//! Clickable trigger with a two-tone fill that inverts under the pointer.
//!
//! A button never takes focus. A press inside its rectangle yields the
//! action it was built with; the owner decides what the action does.

use crate::render::{group, Batch, PrimitiveId};
use crate::types::{colors, mouse_button, CellAttrs, Rect};
use crate::widget::{PointerStyle, Widget};
use unicode_width::UnicodeWidthStr;

pub const BUTTON_PADDING: i32 = 1;

pub struct Button<A> {
    rect: Rect,
    padding: i32,
    caption: String,
    hovered: bool,
    on_activate: A,
    back_layer: PrimitiveId,
    front_layer: PrimitiveId,
    label: PrimitiveId,
}

impl<A: Clone> Button<A> {
    pub fn new(
        batch: &mut Batch,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        caption: &str,
        on_activate: A,
    ) -> Self {
        let rect = Rect::new(x, y, width, height);
        let padding = BUTTON_PADDING;
        let back_layer = batch.add_rect(group::BACKGROUND, rect, colors::ALT_GRAY);
        let front_layer = batch.add_rect(group::FOREGROUND, inset(rect, padding), colors::GRAY);
        let (lx, ly) = caption_origin(rect, caption);
        let label = batch.add_label(
            group::OVERLAY_FOREGROUND,
            lx,
            ly,
            Some(width),
            caption,
            colors::BLACK,
        );
        batch.set_attrs(label, CellAttrs::BOLD);

        Self {
            rect,
            padding,
            caption: caption.to_string(),
            hovered: false,
            on_activate,
            back_layer,
            front_layer,
            label,
        }
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Returns the activation action when a primary or secondary press lands
    /// inside the button.
    pub fn on_mouse_press(&self, x: i32, y: i32, button: u8) -> Option<A> {
        let accepted = matches!(button, mouse_button::LEFT | mouse_button::RIGHT);
        (accepted && self.hit_test(x, y)).then(|| self.on_activate.clone())
    }

    fn apply_fills(&self, batch: &mut Batch) {
        let (back, front) = if self.hovered {
            (colors::GRAY, colors::ALT_GRAY)
        } else {
            (colors::ALT_GRAY, colors::GRAY)
        };
        batch.set_fill(self.back_layer, back);
        batch.set_fill(self.front_layer, front);
    }
}

fn inset(rect: Rect, padding: i32) -> Rect {
    Rect::new(
        rect.x + padding,
        rect.y + padding,
        (rect.width - 2 * padding).max(0),
        (rect.height - 2 * padding).max(0),
    )
}

fn caption_origin(rect: Rect, caption: &str) -> (i32, i32) {
    let text_width = UnicodeWidthStr::width(caption) as i32;
    (
        rect.x + ((rect.width - text_width) / 2).max(0),
        rect.y + rect.height / 2,
    )
}

impl<A: Clone> Widget for Button<A> {
    fn hit_test(&self, x: i32, y: i32) -> bool {
        self.rect.contains(x, y)
    }

    fn on_pointer_motion(&mut self, batch: &mut Batch, x: i32, y: i32) -> Option<PointerStyle> {
        let inside = self.hit_test(x, y);
        if inside != self.hovered {
            self.hovered = inside;
            self.apply_fills(batch);
        }
        inside.then_some(PointerStyle::Hand)
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
        let front = inset(self.rect, self.padding);
        let (lx, ly) = caption_origin(self.rect, &self.caption);
        batch.move_to(self.back_layer, x, y);
        batch.move_to(self.front_layer, front.x, front.y);
        batch.move_to(self.label, lx, ly);
    }

    fn width(&self) -> i32 {
        self.rect.width
    }

    fn height(&self) -> i32 {
        self.rect.height
    }

    fn value(&self) -> Option<&str> {
        None
    }
}
