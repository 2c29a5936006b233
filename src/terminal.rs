//! TerminalBackend trait + CrosstermBackend implementation.
//!
//! The renderer and the event loop depend on this trait, not on crossterm
//! directly, so tests can drive the whole form through a mock backend.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::{cursor, execute, queue, terminal};

use crate::types::{
    key, modifier, mouse_button, rgb_components, CellAttrs, CellUpdate, TerminalInputEvent,
};

// ============================================================================
// TerminalBackend Trait
// ============================================================================

pub trait TerminalBackend {
    fn init(&mut self) -> Result<(), String>;
    fn shutdown(&mut self) -> Result<(), String>;
    fn size(&self) -> (u16, u16);
    fn write_diff(&mut self, diff: &[CellUpdate]) -> Result<(), String>;
    fn flush(&mut self) -> Result<(), String>;
    /// Wait up to `timeout_ms` for input, then drain everything pending.
    fn read_events(&mut self, timeout_ms: u32) -> Vec<TerminalInputEvent>;
}

// ============================================================================
// CrosstermBackend
// ============================================================================

/// Style last sent to the terminal, so runs of equal cells skip the escape
/// sequences.
#[derive(Clone, Copy, PartialEq)]
struct Pen {
    fg: u32,
    bg: u32,
    attrs: CellAttrs,
}

pub struct CrosstermBackend {
    out: Stdout,
    width: u16,
    height: u16,
    active: bool,
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermBackend {
    pub fn new() -> Self {
        let (width, height) = terminal::size().unwrap_or((80, 24));
        Self {
            out: io::stdout(),
            width,
            height,
            active: false,
        }
    }
}

fn to_color(color: u32) -> Color {
    match rgb_components(color) {
        Some((r, g, b)) => Color::Rgb { r, g, b },
        None => Color::Reset,
    }
}

fn io_err(what: &'static str) -> impl Fn(io::Error) -> String {
    move |e| format!("{what}: {e}")
}

impl TerminalBackend for CrosstermBackend {
    fn init(&mut self) -> Result<(), String> {
        terminal::enable_raw_mode().map_err(io_err("raw mode"))?;
        // Carets are drawn as inverted cells, so the hardware cursor stays hidden.
        execute!(
            self.out,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide
        )
        .map_err(io_err("terminal setup"))?;
        self.active = true;

        let (w, h) = terminal::size().unwrap_or((self.width, self.height));
        self.width = w;
        self.height = h;
        log::debug!("terminal initialized at {w}x{h}");
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), String> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(
            self.out,
            SetAttribute(Attribute::Reset),
            cursor::Show,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen
        )
        .map_err(io_err("terminal restore"))?;
        terminal::disable_raw_mode().map_err(io_err("disable raw mode"))
    }

    fn size(&self) -> (u16, u16) {
        terminal::size().unwrap_or((self.width, self.height))
    }

    fn write_diff(&mut self, diff: &[CellUpdate]) -> Result<(), String> {
        let mut pen: Option<Pen> = None;
        let mut next_pos: Option<(u16, u16)> = None;

        for update in diff {
            let cell = &update.cell;
            if next_pos != Some((update.x, update.y)) {
                queue!(self.out, cursor::MoveTo(update.x, update.y)).map_err(io_err("move"))?;
            }

            let wanted = Pen {
                fg: cell.fg,
                bg: cell.bg,
                attrs: cell.attrs,
            };
            if pen != Some(wanted) {
                queue!(
                    self.out,
                    SetAttribute(Attribute::Reset),
                    SetForegroundColor(to_color(cell.fg)),
                    SetBackgroundColor(to_color(cell.bg))
                )
                .map_err(io_err("style"))?;
                if cell.attrs.contains(CellAttrs::BOLD) {
                    queue!(self.out, SetAttribute(Attribute::Bold)).map_err(io_err("bold"))?;
                }
                if cell.attrs.contains(CellAttrs::DIM) {
                    queue!(self.out, SetAttribute(Attribute::Dim)).map_err(io_err("dim"))?;
                }
                pen = Some(wanted);
            }

            queue!(self.out, Print(cell.ch)).map_err(io_err("print"))?;
            next_pos = Some((update.x.saturating_add(1), update.y));
        }

        if pen.is_some() {
            queue!(self.out, SetAttribute(Attribute::Reset)).map_err(io_err("reset"))?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), String> {
        self.out.flush().map_err(io_err("flush"))
    }

    fn read_events(&mut self, timeout_ms: u32) -> Vec<TerminalInputEvent> {
        let mut events = Vec::new();
        let mut wait = Duration::from_millis(u64::from(timeout_ms));

        while event::poll(wait).unwrap_or(false) {
            wait = Duration::ZERO;
            let raw = match event::read() {
                Ok(raw) => raw,
                Err(e) => {
                    log::warn!("terminal read failed: {e}");
                    break;
                }
            };
            if let Event::Resize(w, h) = raw {
                self.width = w;
                self.height = h;
            }
            events.extend(translate(raw));
        }
        events
    }
}

impl Drop for CrosstermBackend {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("terminal restore on drop failed: {e}");
        }
    }
}

// ============================================================================
// Event translation
// ============================================================================

fn translate(raw: Event) -> Option<TerminalInputEvent> {
    match raw {
        Event::Key(k) => translate_key(k),
        Event::Mouse(m) => translate_mouse(m),
        Event::Resize(width, height) => Some(TerminalInputEvent::Resize { width, height }),
        Event::FocusGained => Some(TerminalInputEvent::FocusGained),
        Event::FocusLost => Some(TerminalInputEvent::FocusLost),
        _ => None,
    }
}

fn translate_key(k: KeyEvent) -> Option<TerminalInputEvent> {
    if k.kind != KeyEventKind::Press {
        return None;
    }
    let named = |code| Some((code, '\0'));
    let (code, character) = match k.code {
        KeyCode::Char(c) => Some((c as u32, c)),
        KeyCode::Backspace => named(key::BACKSPACE),
        KeyCode::Enter => named(key::ENTER),
        KeyCode::Left => named(key::LEFT),
        KeyCode::Right => named(key::RIGHT),
        KeyCode::Up => named(key::UP),
        KeyCode::Down => named(key::DOWN),
        KeyCode::Home => named(key::HOME),
        KeyCode::End => named(key::END),
        KeyCode::Tab => named(key::TAB),
        KeyCode::BackTab => named(key::BACK_TAB),
        KeyCode::Delete => named(key::DELETE),
        KeyCode::Esc => named(key::ESCAPE),
        _ => None,
    }?;
    Some(TerminalInputEvent::Key {
        code,
        modifiers: modifier_bits(k.modifiers),
        character,
    })
}

fn translate_mouse(m: MouseEvent) -> Option<TerminalInputEvent> {
    let (x, y) = (m.column, m.row);
    let button = match m.kind {
        MouseEventKind::Moved | MouseEventKind::Drag(_) => {
            return Some(TerminalInputEvent::MouseMove { x, y });
        }
        MouseEventKind::Down(MouseButton::Left) => mouse_button::LEFT,
        MouseEventKind::Down(MouseButton::Middle) => mouse_button::MIDDLE,
        MouseEventKind::Down(MouseButton::Right) => mouse_button::RIGHT,
        MouseEventKind::ScrollUp => mouse_button::SCROLL_UP,
        MouseEventKind::ScrollDown => mouse_button::SCROLL_DOWN,
        _ => return None,
    };
    Some(TerminalInputEvent::MouseDown {
        x,
        y,
        button,
        modifiers: modifier_bits(m.modifiers),
    })
}

fn modifier_bits(modifiers: KeyModifiers) -> u32 {
    [
        (KeyModifiers::SHIFT, modifier::SHIFT),
        (KeyModifiers::CONTROL, modifier::CTRL),
        (KeyModifiers::ALT, modifier::ALT),
    ]
    .into_iter()
    .filter(|(flag, _)| modifiers.contains(*flag))
    .fold(0, |bits, (_, bit)| bits | bit)
}

// ============================================================================
// HeadlessBackend (smoke runs and CI)
// ============================================================================

/// Fixed-size backend that discards output and never produces input.
pub struct HeadlessBackend {
    pub width: u16,
    pub height: u16,
}

impl HeadlessBackend {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

impl TerminalBackend for HeadlessBackend {
    fn init(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn write_diff(&mut self, _diff: &[CellUpdate]) -> Result<(), String> {
        Ok(())
    }

    fn flush(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn read_events(&mut self, _timeout_ms: u32) -> Vec<TerminalInputEvent> {
        Vec::new()
    }
}

// ============================================================================
// MockBackend (unit tests only)
// ============================================================================

/// Records every diff it is sent and replays injected events once.
#[cfg(test)]
pub struct MockBackend {
    pub width: u16,
    pub height: u16,
    pub diff_log: Vec<CellUpdate>,
    pub injected_events: Vec<TerminalInputEvent>,
    pub flushes: usize,
}

#[cfg(test)]
impl MockBackend {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            diff_log: Vec::new(),
            injected_events: Vec::new(),
            flushes: 0,
        }
    }
}

#[cfg(test)]
impl TerminalBackend for MockBackend {
    fn init(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn write_diff(&mut self, diff: &[CellUpdate]) -> Result<(), String> {
        self.diff_log.extend_from_slice(diff);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), String> {
        self.flushes += 1;
        Ok(())
    }

    fn read_events(&mut self, _timeout_ms: u32) -> Vec<TerminalInputEvent> {
        std::mem::take(&mut self.injected_events)
    }
}
