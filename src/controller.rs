//! Form controller: owns every widget, arbitrates focus, routes input, and
//! runs validation and the rate calculation.
//!
//! Focus rules:
//! - at most one selector widget holds focus, identified by its `Field`
//! - focus only changes through `begin_focus` / `end_focus` issued here
//! - the button never takes focus

use crate::button::Button;
use crate::error::Result;
use crate::rates::{RateCalculator, VehicleProfile};
use crate::render::{group, Batch, PrimitiveId};
use crate::selector::ParameterSelector;
use crate::types::{colors, key, modifier, mouse_button, CellAttrs};
use crate::validate::{
    validate_choice, validate_kilometers, validate_passenger_count, validate_year, Field,
    FieldError,
};
use crate::widget::{PointerStyle, Widget};

pub const ENERGY_OPTIONS: [&str; 5] = ["Essence", "Electrique", "Gaz", "Diesel", "Hybride"];
pub const CAR_TYPE_OPTIONS: [&str; 4] = ["Citadine", "Cabriolet", "Berline", "SUV / 4x4"];

// Fixed layout, in cells, for an 80x24 terminal.
const LEFT_COLUMN: i32 = 2;
const RIGHT_COLUMN: i32 = 42;
const FIELD_WIDTH: i32 = 36;
const FIRST_ROW: i32 = 1;
const ROW_SPACING: i32 = 5;
const BUTTON_RECT: (i32, i32, i32, i32) = (34, 17, 12, 3);
const HINT_ROW: i32 = 22;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Form,
    Result,
}

/// What the calculate button asks the controller to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Calculate,
}

/// Result of one validate-and-compute attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Fields that failed validation, in registration order.
    Invalid(Vec<Field>),
    /// Borrowing rate in percent.
    Computed(f64),
}

pub fn result_message(rate: f64) -> String {
    format!("Votre taux d'emprunt est de {rate:.2}%.")
}

pub struct Controller {
    fields_batch: Batch,
    result_batch: Batch,
    /// Registration order is hit-test priority order.
    selectors: Vec<(Field, ParameterSelector)>,
    focused: Option<Field>,
    button: Button<Action>,
    calculator: Box<dyn RateCalculator>,
    view: View,
    pointer_style: PointerStyle,
    result_label: PrimitiveId,
    last_rate: Option<f64>,
}

impl Controller {
    /// Build the standard five-field form.
    pub fn new(calculator: Box<dyn RateCalculator>) -> Self {
        let mut fields_batch = Batch::new();
        let mut result_batch = Batch::new();

        let (bx, by, bw, bh) = BUTTON_RECT;
        let button = Button::new(&mut fields_batch, bx, by, bw, bh, "Calculer", Action::Calculate);

        let row = |n: i32| FIRST_ROW + n * ROW_SPACING;
        let selectors = vec![
            (
                Field::Energy,
                ParameterSelector::make_dropdown_list(
                    &mut fields_batch,
                    "Quel est le type d'énergie utilisé ?",
                    &ENERGY_OPTIONS,
                    LEFT_COLUMN,
                    row(0),
                    FIELD_WIDTH,
                ),
            ),
            (
                Field::Kilometers,
                ParameterSelector::make_text_input(
                    &mut fields_batch,
                    "Kilomètres parcourus par an ?",
                    LEFT_COLUMN,
                    row(1),
                    FIELD_WIDTH,
                    "",
                ),
            ),
            (
                Field::CarType,
                ParameterSelector::make_dropdown_list(
                    &mut fields_batch,
                    "Quel est le type de voiture ?",
                    &CAR_TYPE_OPTIONS,
                    LEFT_COLUMN,
                    row(2),
                    FIELD_WIDTH,
                ),
            ),
            (
                Field::Year,
                ParameterSelector::make_text_input(
                    &mut fields_batch,
                    "De quand date votre voiture ?",
                    RIGHT_COLUMN,
                    row(0),
                    FIELD_WIDTH,
                    "",
                ),
            ),
            (
                Field::PassengerCount,
                ParameterSelector::make_text_input(
                    &mut fields_batch,
                    "Combien de personnes au foyer ?",
                    RIGHT_COLUMN,
                    row(1),
                    FIELD_WIDTH,
                    "",
                ),
            ),
        ];

        let hint = fields_batch.add_label(
            group::FOREGROUND,
            LEFT_COLUMN,
            HINT_ROW,
            None,
            "Entrée : calculer   Tab : champ suivant   Échap : quitter",
            colors::LIGHT_GRAY,
        );
        fields_batch.set_attrs(hint, CellAttrs::DIM);

        let result_label = result_batch.add_label(
            group::FOREGROUND,
            LEFT_COLUMN,
            10,
            None,
            "",
            colors::WHITE,
        );
        result_batch.set_attrs(result_label, CellAttrs::BOLD);
        let back_hint = result_batch.add_label(
            group::FOREGROUND,
            LEFT_COLUMN,
            HINT_ROW,
            None,
            "Entrée : revenir au formulaire   Échap : quitter",
            colors::LIGHT_GRAY,
        );
        result_batch.set_attrs(back_hint, CellAttrs::DIM);

        Self {
            fields_batch,
            result_batch,
            selectors,
            focused: None,
            button,
            calculator,
            view: View::Form,
            pointer_style: PointerStyle::Default,
            result_label,
            last_rate: None,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn view(&self) -> View {
        self.view
    }

    pub fn focused(&self) -> Option<Field> {
        self.focused
    }

    pub fn pointer_style(&self) -> PointerStyle {
        self.pointer_style
    }

    pub fn selector(&self, field: Field) -> Option<&ParameterSelector> {
        self.selectors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, s)| s)
    }

    pub fn button(&self) -> &Button<Action> {
        &self.button
    }

    pub fn last_rate(&self) -> Option<f64> {
        self.last_rate
    }

    pub fn result_message(&self) -> Option<&str> {
        match self.view {
            View::Result => self.result_batch.text(self.result_label),
            View::Form => None,
        }
    }

    /// Batch for the view currently on screen.
    pub fn active_batch(&self) -> &Batch {
        match self.view {
            View::Form => &self.fields_batch,
            View::Result => &self.result_batch,
        }
    }

    // ------------------------------------------------------------------
    // Focus
    // ------------------------------------------------------------------

    fn position(&self, field: Field) -> Option<usize> {
        self.selectors.iter().position(|(f, _)| *f == field)
    }

    fn begin_focus(&mut self, field: Field, x: i32, y: i32) {
        debug_assert!(self.focused.is_none(), "focus must be ended before it moves");
        let Some(i) = self.position(field) else {
            log::error!("begin_focus: {field:?} is not registered");
            debug_assert!(false, "begin_focus on unregistered field {field:?}");
            return;
        };
        self.selectors[i]
            .1
            .widget_mut()
            .begin_focus(&mut self.fields_batch, x, y);
        self.focused = Some(field);
        log::debug!("focus: begin {}", field.key());
    }

    /// End the current focus, if any, at pointer position `(x, y)`.
    fn end_focus(&mut self, x: i32, y: i32) {
        let Some(field) = self.focused.take() else {
            return;
        };
        let Some(i) = self.position(field) else {
            log::error!("end_focus: {field:?} is not registered");
            debug_assert!(false, "focused field {field:?} is not registered");
            return;
        };
        self.selectors[i]
            .1
            .widget_mut()
            .end_focus(&mut self.fields_batch, x, y);
        log::debug!("focus: end {}", field.key());
    }

    /// End focus at the focused widget's own origin, which never lands on
    /// a dropdown option row.
    fn release_focus(&mut self) {
        let origin = self
            .focused
            .and_then(|f| self.selector(f))
            .map(|s| (s.x(), s.y()));
        if let Some((x, y)) = origin {
            self.end_focus(x, y);
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let n = self.selectors.len();
        if n == 0 {
            return;
        }
        let next = match self.focused.and_then(|f| self.position(f)) {
            Some(i) if forward => (i + 1) % n,
            Some(i) => (i + n - 1) % n,
            None if forward => 0,
            None => n - 1,
        };
        self.release_focus();
        let (field, sel) = &self.selectors[next];
        let (field, x, y) = (*field, sel.x(), sel.y());
        self.begin_focus(field, x, y);
    }

    // ------------------------------------------------------------------
    // Input dispatch
    // ------------------------------------------------------------------

    /// Pointer motion. The first selector widget that claims the pointer
    /// stops the scan; the button always sees the motion for its hover
    /// state.
    pub fn on_pointer_move(&mut self, x: i32, y: i32) {
        if self.view != View::Form {
            return;
        }
        let mut style = None;
        for (_, sel) in self.selectors.iter_mut() {
            if let Some(s) = sel
                .widget_mut()
                .on_pointer_motion(&mut self.fields_batch, x, y)
            {
                style = Some(s);
                break;
            }
        }
        let button_style = self.button.on_pointer_motion(&mut self.fields_batch, x, y);
        self.pointer_style = style.or(button_style).unwrap_or_default();
    }

    /// Pointer press. Only primary and secondary buttons are handled.
    pub fn on_pointer_press(&mut self, x: i32, y: i32, button: u8) -> Result<Option<Outcome>> {
        if !matches!(button, mouse_button::LEFT | mouse_button::RIGHT) {
            return Ok(None);
        }
        if self.view != View::Form {
            return Ok(None);
        }

        let hit = self
            .selectors
            .iter()
            .find(|(_, s)| s.widget().hit_test(x, y))
            .map(|(f, s)| (*f, s.widget().releases_focus_on_press()));

        match hit {
            Some((field, releases)) if self.focused == Some(field) => {
                if releases {
                    self.end_focus(x, y);
                } else if let Some(i) = self.position(field) {
                    self.selectors[i]
                        .1
                        .widget_mut()
                        .begin_focus(&mut self.fields_batch, x, y);
                }
            }
            Some((field, _)) => {
                self.end_focus(x, y);
                self.begin_focus(field, x, y);
            }
            None => self.end_focus(x, y),
        }

        match self.button.on_mouse_press(x, y, button) {
            Some(action) => self.perform(action).map(Some),
            None => Ok(None),
        }
    }

    /// Key press. Tab/Shift+Tab move focus and Enter submits; everything
    /// else goes to the focused widget.
    pub fn on_key(&mut self, code: u32, modifiers: u32, character: char) -> Result<Option<Outcome>> {
        // Printable keys carry their character; named keys carry '\0'.
        let named = if character == '\0' { Some(code) } else { None };

        if self.view == View::Result {
            if matches!(named, Some(key::ENTER | key::BACKSPACE)) {
                self.show_form();
            }
            return Ok(None);
        }

        match named {
            Some(key::TAB) => {
                self.move_focus(true);
                return Ok(None);
            }
            Some(key::BACK_TAB) => {
                self.move_focus(false);
                return Ok(None);
            }
            Some(key::ENTER) => return self.perform(Action::Calculate).map(Some),
            _ => {}
        }

        let Some(field) = self.focused else {
            return Ok(None);
        };
        let Some(i) = self.position(field) else {
            log::error!("key routed to unregistered field {field:?}");
            debug_assert!(false, "focused field {field:?} is not registered");
            return Ok(None);
        };
        let batch = &mut self.fields_batch;
        let widget = self.selectors[i].1.widget_mut();

        match named {
            Some(key::BACKSPACE) => widget.delete_backward(batch),
            Some(key::DELETE) => widget.delete_forward(batch),
            Some(key::HOME) => widget.home(batch),
            Some(key::END) => widget.end(batch),
            Some(key::LEFT) => widget.arrow_left(batch),
            Some(key::RIGHT) => widget.arrow_right(batch),
            Some(key::UP) => widget.arrow_up(batch),
            Some(key::DOWN) => widget.arrow_down(batch),
            Some(_) => {}
            None => {
                let chorded = modifiers & (modifier::CTRL | modifier::ALT) != 0;
                if !character.is_control() && !chorded {
                    widget.insert_char(batch, character);
                }
            }
        }
        Ok(None)
    }

    fn perform(&mut self, action: Action) -> Result<Outcome> {
        match action {
            Action::Calculate => self.validate_and_compute(),
        }
    }

    // ------------------------------------------------------------------
    // Validation and calculation
    // ------------------------------------------------------------------

    /// Run one field validator and publish its error, if any.
    fn check<T>(
        &mut self,
        field: Field,
        failed: &mut Vec<Field>,
        validator: impl Fn(Option<&str>) -> std::result::Result<T, FieldError>,
    ) -> Option<T> {
        let Some(i) = self.position(field) else {
            log::error!("validation: {field:?} is not registered");
            failed.push(field);
            return None;
        };
        let sel = &mut self.selectors[i].1;
        match validator(sel.value()) {
            Ok(v) => Some(v),
            Err(e) => {
                sel.set_error(&mut self.fields_batch, &e.to_string());
                failed.push(field);
                None
            }
        }
    }

    /// Clear every error, run all five validators, and compute the rate
    /// only when every field passed.
    pub fn validate_and_compute(&mut self) -> Result<Outcome> {
        for (_, sel) in self.selectors.iter_mut() {
            sel.clear_error(&mut self.fields_batch);
        }

        let mut failed = Vec::new();
        let energy = self.check(Field::Energy, &mut failed, validate_choice);
        let kilometers = self.check(Field::Kilometers, &mut failed, validate_kilometers);
        let car_type = self.check(Field::CarType, &mut failed, validate_choice);
        let year = self.check(Field::Year, &mut failed, validate_year);
        let passenger_count = self.check(Field::PassengerCount, &mut failed, validate_passenger_count);

        let (Some(energy), Some(kilometers), Some(car_type), Some(year), Some(passenger_count)) =
            (energy, kilometers, car_type, year, passenger_count)
        else {
            log::info!(
                "validation failed: {}",
                failed.iter().map(|f| f.key()).collect::<Vec<_>>().join(", ")
            );
            return Ok(Outcome::Invalid(failed));
        };

        let profile = VehicleProfile {
            energy,
            kilometers,
            car_type,
            year,
            passenger_count,
        };
        let rate = self.calculator.borrowing_rate(&profile)?;
        log::info!("computed rate {rate:.2}% for {profile:?}");
        self.show_result(rate);
        Ok(Outcome::Computed(rate))
    }

    fn show_result(&mut self, rate: f64) {
        self.release_focus();
        self.last_rate = Some(rate);
        self.result_batch
            .set_text(self.result_label, &result_message(rate));
        self.view = View::Result;
        log::info!("view: result");
    }

    /// Return to the form. Field values and errors are kept.
    pub fn show_form(&mut self) {
        self.view = View::Form;
        log::info!("view: form");
    }
}
