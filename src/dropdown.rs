//! Closed-choice selector that expands its option list while focused.
//!
//! Collapsed, only the header row is visible and hit-testable. Focus expands
//! the list below the header. Ending focus collapses the list first and then
//! resolves the pointer position against the option rows, so the press that
//! closes the list is also the press that picks an option.

use crate::render::{group, Batch, PrimitiveId};
use crate::types::{colors, Rect};
use crate::widget::Widget;

pub const ROW_HEIGHT: i32 = 1;
pub const DROPDOWN_PADDING: i32 = 1;
pub const PLACEHOLDER: &str = "<Pas de sélection>";

/// Invoked with `true` when the list expands and `false` when it collapses.
pub type FocusListener = Box<dyn FnMut(&mut Batch, bool)>;

struct OptionRow {
    background: PrimitiveId,
    label: PrimitiveId,
}

pub struct DropDownList {
    header: Rect,
    padding: i32,
    options: Vec<String>,
    selected: Option<usize>,
    expanded: bool,
    header_background: PrimitiveId,
    header_label: PrimitiveId,
    rows: Vec<OptionRow>,
    focus_listener: Option<FocusListener>,
}

impl DropDownList {
    pub fn new<S: AsRef<str>>(batch: &mut Batch, options: &[S], x: i32, y: i32, width: i32) -> Self {
        let padding = DROPDOWN_PADDING;
        let header = Rect::new(x, y, width, ROW_HEIGHT);
        let label_width = Some((width - 2 * padding).max(1));

        let header_background = batch.add_rect(group::BACKGROUND, header, colors::ALT_GRAY);
        let header_label = batch.add_label(
            group::FOREGROUND,
            x + padding,
            y,
            label_width,
            PLACEHOLDER,
            colors::BLACK,
        );

        let mut rows = Vec::with_capacity(options.len());
        for (i, option) in options.iter().enumerate() {
            let row_y = y + ROW_HEIGHT * (i as i32 + 1);
            let fill = if i % 2 == 0 {
                colors::GRAY
            } else {
                colors::ALT_GRAY
            };
            let background = batch.add_rect(
                group::OVERLAY_BACKGROUND,
                Rect::new(x, row_y, width, ROW_HEIGHT),
                fill,
            );
            let label = batch.add_label(
                group::OVERLAY_FOREGROUND,
                x + padding,
                row_y,
                label_width,
                option.as_ref(),
                colors::BLACK,
            );
            batch.set_visible(background, false);
            batch.set_visible(label, false);
            rows.push(OptionRow { background, label });
        }

        Self {
            header,
            padding,
            options: options.iter().map(|o| o.as_ref().to_string()).collect(),
            selected: None,
            expanded: false,
            header_background,
            header_label,
            rows,
            focus_listener: None,
        }
    }

    /// Register the callback notified on every expand/collapse.
    pub fn set_focus_listener(&mut self, listener: FocusListener) {
        self.focus_listener = Some(listener);
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Rectangle of option row `index`, whether or not the list is expanded.
    pub fn row_rect(&self, index: usize) -> Rect {
        Rect::new(
            self.header.x,
            self.header.y + ROW_HEIGHT * (index as i32 + 1),
            self.header.width,
            ROW_HEIGHT,
        )
    }

    /// Select `index` and mirror its label into the header. Out-of-range
    /// indices are ignored.
    pub fn select(&mut self, batch: &mut Batch, index: usize) {
        let Some(option) = self.options.get(index) else {
            return;
        };
        self.selected = Some(index);
        batch.set_text(self.header_label, option);
        log::debug!("dropdown: selected {option:?}");
    }

    fn set_rows_visible(&self, batch: &mut Batch, visible: bool) {
        for row in &self.rows {
            batch.set_visible(row.background, visible);
            batch.set_visible(row.label, visible);
        }
    }

    fn notify(&mut self, batch: &mut Batch) {
        let expanded = self.expanded;
        if let Some(listener) = self.focus_listener.as_mut() {
            listener(batch, expanded);
        }
    }
}

impl Widget for DropDownList {
    fn hit_test(&self, x: i32, y: i32) -> bool {
        Rect::new(self.header.x, self.header.y, self.width(), self.height()).contains(x, y)
    }

    fn begin_focus(&mut self, batch: &mut Batch, _x: i32, _y: i32) {
        self.set_rows_visible(batch, true);
        self.expanded = true;
        self.notify(batch);
    }

    fn end_focus(&mut self, batch: &mut Batch, x: i32, y: i32) {
        self.set_rows_visible(batch, false);
        self.expanded = false;

        if let Some(index) = (0..self.rows.len()).find(|&i| self.row_rect(i).contains(x, y)) {
            self.select(batch, index);
        }
        self.notify(batch);
    }

    fn is_focused(&self) -> bool {
        self.expanded
    }

    fn releases_focus_on_press(&self) -> bool {
        true
    }

    fn arrow_up(&mut self, batch: &mut Batch) {
        match self.selected {
            Some(i) if i > 0 => self.select(batch, i - 1),
            Some(_) => {}
            None => self.select(batch, 0),
        }
    }

    fn arrow_down(&mut self, batch: &mut Batch) {
        match self.selected {
            Some(i) => self.select(batch, i + 1),
            None => self.select(batch, 0),
        }
    }

    fn x(&self) -> i32 {
        self.header.x
    }

    fn y(&self) -> i32 {
        self.header.y
    }

    fn set_position(&mut self, batch: &mut Batch, x: i32, y: i32) {
        self.header.x = x;
        self.header.y = y;
        batch.move_to(self.header_background, x, y);
        batch.move_to(self.header_label, x + self.padding, y);
        for (i, row) in self.rows.iter().enumerate() {
            let rect = self.row_rect(i);
            batch.move_to(row.background, rect.x, rect.y);
            batch.move_to(row.label, rect.x + self.padding, rect.y);
        }
    }

    fn width(&self) -> i32 {
        self.header.width
    }

    fn height(&self) -> i32 {
        if self.expanded {
            ROW_HEIGHT * (self.options.len() as i32 + 1)
        } else {
            ROW_HEIGHT
        }
    }

    fn value(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.options.get(i))
            .map(String::as_str)
    }
}
