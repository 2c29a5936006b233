//! A form field: one widget plus its title and error-message labels.
//!
//! The title sits on the row above the widget and the error message on the
//! row below its collapsed height. Both labels move with the widget.

use crate::dropdown::DropDownList;
use crate::render::{group, Batch, PrimitiveId};
use crate::text_input::TextInput;
use crate::types::{colors, CellAttrs};
use crate::widget::Widget;

pub const TITLE_HEIGHT: i32 = 1;

pub struct ParameterSelector {
    widget: Box<dyn Widget>,
    title: Option<PrimitiveId>,
    error: PrimitiveId,
    error_message: String,
    /// Distance from the widget origin to the error row.
    error_offset: i32,
}

impl ParameterSelector {
    /// Wrap `widget` and create its (empty) error label.
    pub fn new(batch: &mut Batch, widget: Box<dyn Widget>) -> Self {
        let error_offset = widget.height();
        let error = batch.add_label(
            group::FOREGROUND,
            widget.x(),
            widget.y() + error_offset,
            Some(widget.width()),
            "",
            colors::RED,
        );
        Self {
            widget,
            title: None,
            error,
            error_message: String::new(),
            error_offset,
        }
    }

    /// Title at `(x, y)`, text input on the next row.
    pub fn make_text_input(
        batch: &mut Batch,
        title: &str,
        x: i32,
        y: i32,
        width: i32,
        base_text: &str,
    ) -> Self {
        let title_id = add_title(batch, title, x, y, width);
        let input = TextInput::new(batch, x, y + TITLE_HEIGHT, width, base_text);
        let mut selector = Self::new(batch, Box::new(input));
        selector.title = Some(title_id);
        selector
    }

    /// Title at `(x, y)`, dropdown header on the next row. The title hides
    /// while the option list is expanded.
    pub fn make_dropdown_list<S: AsRef<str>>(
        batch: &mut Batch,
        title: &str,
        options: &[S],
        x: i32,
        y: i32,
        width: i32,
    ) -> Self {
        let title_id = add_title(batch, title, x, y, width);
        let mut list = DropDownList::new(batch, options, x, y + TITLE_HEIGHT, width);
        list.set_focus_listener(Box::new(move |batch: &mut Batch, expanded| {
            batch.set_visible(title_id, !expanded);
        }));
        let mut selector = Self::new(batch, Box::new(list));
        selector.title = Some(title_id);
        selector
    }

    /// Replace the error text. An empty message clears it.
    pub fn set_error(&mut self, batch: &mut Batch, message: &str) {
        self.error_message.clear();
        self.error_message.push_str(message);
        batch.set_text(self.error, message);
    }

    pub fn clear_error(&mut self, batch: &mut Batch) {
        self.set_error(batch, "");
    }

    pub fn error_message(&self) -> Option<&str> {
        if self.error_message.is_empty() {
            None
        } else {
            Some(&self.error_message)
        }
    }

    pub fn title_id(&self) -> Option<PrimitiveId> {
        self.title
    }

    pub fn widget(&self) -> &dyn Widget {
        self.widget.as_ref()
    }

    pub fn widget_mut(&mut self) -> &mut dyn Widget {
        self.widget.as_mut()
    }

    pub fn x(&self) -> i32 {
        self.widget.x()
    }

    pub fn y(&self) -> i32 {
        self.widget.y()
    }

    pub fn set_position(&mut self, batch: &mut Batch, x: i32, y: i32) {
        self.widget.set_position(batch, x, y);
        if let Some(title) = self.title {
            batch.move_to(title, x, y - TITLE_HEIGHT);
        }
        batch.move_to(self.error, x, y + self.error_offset);
    }

    pub fn width(&self) -> i32 {
        self.widget.width()
    }

    pub fn height(&self) -> i32 {
        self.widget.height()
    }

    pub fn value(&self) -> Option<&str> {
        self.widget.value()
    }
}

fn add_title(batch: &mut Batch, title: &str, x: i32, y: i32, width: i32) -> PrimitiveId {
    let id = batch.add_label(group::FOREGROUND, x, y, Some(width), title, colors::WHITE);
    batch.set_attrs(id, CellAttrs::BOLD);
    id
}
