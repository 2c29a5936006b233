//! Event Module: input capture and dispatch.
//!
//! Responsibilities:
//! - Read terminal input via TerminalBackend
//! - Classify TerminalInputEvent into controller calls
//! - Detect the quit chord (Esc, Ctrl+C) before anything else sees it

use crate::controller::{Controller, Outcome};
use crate::error::Result;
use crate::terminal::TerminalBackend;
use crate::types::{key, modifier, TerminalInputEvent};

/// Summary of one `read_input` pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputOutcome {
    /// Events delivered to the controller.
    pub handled: usize,
    /// A quit key was seen; events after it are dropped.
    pub quit: bool,
    /// Terminal size changed; the next frame repaints everything.
    pub resized: bool,
    /// Latest validate-and-compute result, if a submit happened.
    pub submitted: Option<Outcome>,
}

pub fn is_quit_key(code: u32, modifiers: u32, character: char) -> bool {
    if character == '\0' {
        return code == key::ESCAPE;
    }
    modifiers & modifier::CTRL != 0 && character.eq_ignore_ascii_case(&'c')
}

/// Read pending terminal input and dispatch it to `controller`.
pub fn read_input(
    controller: &mut Controller,
    backend: &mut dyn TerminalBackend,
    timeout_ms: u32,
) -> Result<InputOutcome> {
    let mut outcome = InputOutcome::default();

    for raw in backend.read_events(timeout_ms) {
        match raw {
            TerminalInputEvent::Key {
                code,
                modifiers,
                character,
            } => {
                if is_quit_key(code, modifiers, character) {
                    log::info!("quit requested");
                    outcome.quit = true;
                    break;
                }
                if let Some(result) = controller.on_key(code, modifiers, character)? {
                    outcome.submitted = Some(result);
                }
            }
            TerminalInputEvent::MouseMove { x, y } => {
                controller.on_pointer_move(x as i32, y as i32);
            }
            TerminalInputEvent::MouseDown { x, y, button, .. } => {
                if let Some(result) = controller.on_pointer_press(x as i32, y as i32, button)? {
                    outcome.submitted = Some(result);
                }
            }
            TerminalInputEvent::Resize { width, height } => {
                log::debug!("terminal resized to {width}x{height}");
                outcome.resized = true;
            }
            TerminalInputEvent::FocusGained | TerminalInputEvent::FocusLost => {
                // Terminal focus events: no form-level action needed
                continue;
            }
        }
        outcome.handled += 1;
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::View;
    use crate::rates::RateTables;
    use crate::terminal::MockBackend;
    use crate::types::mouse_button;
    use crate::validate::Field;

    fn test_ctrl() -> Controller {
        Controller::new(Box::new(RateTables::embedded().unwrap()))
    }

    fn press(x: i32, y: i32) -> TerminalInputEvent {
        TerminalInputEvent::MouseDown {
            x: x as u16,
            y: y as u16,
            button: mouse_button::LEFT,
            modifiers: 0,
        }
    }

    fn chars(s: &str) -> impl Iterator<Item = TerminalInputEvent> + '_ {
        s.chars().map(|c| TerminalInputEvent::Key {
            code: c as u32,
            modifiers: 0,
            character: c,
        })
    }

    fn named(code: u32) -> TerminalInputEvent {
        TerminalInputEvent::Key {
            code,
            modifiers: 0,
            character: '\0',
        }
    }

    fn origin(ctrl: &Controller, field: Field) -> (i32, i32) {
        let sel = ctrl.selector(field).unwrap();
        (sel.x(), sel.y())
    }

    #[test]
    fn test_click_and_type() {
        let mut ctrl = test_ctrl();
        let mut backend = MockBackend::new(80, 24);
        let (x, y) = origin(&ctrl, Field::Year);

        backend.injected_events.push(press(x + 3, y));
        backend.injected_events.extend(chars("2019"));
        let outcome = read_input(&mut ctrl, &mut backend, 0).unwrap();

        assert_eq!(outcome.handled, 5);
        assert!(!outcome.quit);
        assert_eq!(ctrl.focused(), Some(Field::Year));
        assert_eq!(ctrl.selector(Field::Year).unwrap().value(), Some("2019"));
        assert!(backend.injected_events.is_empty());
    }

    #[test]
    fn test_dropdown_pick_through_backend() {
        let mut ctrl = test_ctrl();
        let mut backend = MockBackend::new(80, 24);
        let (x, y) = origin(&ctrl, Field::CarType);

        backend.injected_events.push(press(x, y));
        backend.injected_events.push(TerminalInputEvent::MouseMove {
            x: (x + 1) as u16,
            y: (y + 4) as u16,
        });
        backend.injected_events.push(press(x + 1, y + 4));
        read_input(&mut ctrl, &mut backend, 0).unwrap();

        assert_eq!(
            ctrl.selector(Field::CarType).unwrap().value(),
            Some("SUV / 4x4")
        );
        assert_eq!(ctrl.focused(), None);
    }

    #[test]
    fn test_quit_keys_stop_dispatch() {
        let mut ctrl = test_ctrl();
        let mut backend = MockBackend::new(80, 24);
        backend.injected_events.push(named(key::TAB));
        backend.injected_events.push(named(key::ESCAPE));
        backend.injected_events.push(named(key::TAB));

        let outcome = read_input(&mut ctrl, &mut backend, 0).unwrap();
        assert!(outcome.quit);
        assert_eq!(outcome.handled, 1);
        assert_eq!(ctrl.focused(), Some(Field::Energy));

        assert!(is_quit_key('c' as u32, modifier::CTRL, 'c'));
        assert!(!is_quit_key('c' as u32, 0, 'c'));
    }

    #[test]
    fn test_submit_via_enter() {
        let mut ctrl = test_ctrl();
        let mut backend = MockBackend::new(80, 24);

        backend.injected_events.push(named(key::ENTER));
        let outcome = read_input(&mut ctrl, &mut backend, 0).unwrap();
        assert_eq!(outcome.submitted, Some(Outcome::Invalid(Field::ALL.to_vec())));
        assert_eq!(ctrl.view(), View::Form);
    }

    #[test]
    fn test_full_session() {
        let mut ctrl = test_ctrl();
        let mut backend = MockBackend::new(80, 24);

        let energy = origin(&ctrl, Field::Energy);
        let car = origin(&ctrl, Field::CarType);
        let km = origin(&ctrl, Field::Kilometers);
        let year = origin(&ctrl, Field::Year);
        let passengers = origin(&ctrl, Field::PassengerCount);

        let events = &mut backend.injected_events;
        // Diesel is the fourth energy option.
        events.push(press(energy.0, energy.1));
        events.push(press(energy.0, energy.1 + 4));
        events.push(press(km.0, km.1));
        events.extend(chars("12 000"));
        // Berline is the third car type.
        events.push(press(car.0, car.1));
        events.push(press(car.0, car.1 + 3));
        events.push(press(year.0, year.1));
        events.extend(chars("2015"));
        events.push(press(passengers.0, passengers.1));
        events.extend(chars("2"));
        events.push(named(key::ENTER));

        let outcome = read_input(&mut ctrl, &mut backend, 0).unwrap();
        match outcome.submitted {
            Some(Outcome::Computed(rate)) => assert!((rate - 2.69).abs() < 1e-9),
            other => panic!("expected a rate, got {other:?}"),
        }
        assert_eq!(ctrl.view(), View::Result);
        assert_eq!(
            ctrl.result_message(),
            Some("Votre taux d'emprunt est de 2.69%.")
        );

        backend.injected_events.push(named(key::ENTER));
        read_input(&mut ctrl, &mut backend, 0).unwrap();
        assert_eq!(ctrl.view(), View::Form);
    }

    #[test]
    fn test_far_future_year_still_computes() {
        for year in ["10000", "2147483647"] {
            let mut ctrl = test_ctrl();
            let mut backend = MockBackend::new(80, 24);
            let energy = origin(&ctrl, Field::Energy);
            let car = origin(&ctrl, Field::CarType);
            let km = origin(&ctrl, Field::Kilometers);
            let year_at = origin(&ctrl, Field::Year);
            let passengers = origin(&ctrl, Field::PassengerCount);

            let events = &mut backend.injected_events;
            events.push(press(energy.0, energy.1));
            events.push(press(energy.0, energy.1 + 4));
            events.push(press(km.0, km.1));
            events.extend(chars("12000"));
            events.push(press(car.0, car.1));
            events.push(press(car.0, car.1 + 3));
            events.push(press(year_at.0, year_at.1));
            events.extend(chars(year));
            events.push(press(passengers.0, passengers.1));
            events.extend(chars("2"));
            events.push(named(key::ENTER));

            let outcome = read_input(&mut ctrl, &mut backend, 0).unwrap();
            assert!(
                matches!(outcome.submitted, Some(Outcome::Computed(_))),
                "year {year}: {:?}",
                outcome.submitted
            );
            assert_eq!(ctrl.view(), View::Result);
        }
    }

    #[test]
    fn test_resize_and_terminal_focus() {
        let mut ctrl = test_ctrl();
        let mut backend = MockBackend::new(80, 24);
        backend.injected_events.push(TerminalInputEvent::FocusLost);
        backend.injected_events.push(TerminalInputEvent::Resize {
            width: 100,
            height: 30,
        });
        let outcome = read_input(&mut ctrl, &mut backend, 0).unwrap();
        assert!(outcome.resized);
        assert_eq!(outcome.handled, 1);
    }
}
