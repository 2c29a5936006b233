//! Application shell: logging setup, rate-table loading, and the frame loop.
//!
//! Responsibilities:
//! - Route `log` output to a file (a terminal UI cannot share stderr)
//! - Choose embedded or on-disk rate tables
//! - Render, read input, repeat; always shut the backend down on exit

use std::fs::File;

use crate::config::Config;
use crate::controller::Controller;
use crate::error::{AppError, Result};
use crate::event;
use crate::rates::RateTables;
use crate::render::Renderer;
use crate::terminal::TerminalBackend;
use crate::widget::PointerStyle;

/// Install the global logger when `config.log_file` is set. Returns whether
/// a logger was installed.
pub fn init_logging(config: &Config) -> Result<bool> {
    let Some(path) = config.log_file.as_ref() else {
        return Ok(false);
    };
    let file = File::create(path)
        .map_err(|e| AppError::Config(format!("cannot open log file {}: {e}", path.display())))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .map_err(|e| AppError::Config(format!("logger already installed: {e}")))?;
    Ok(true)
}

pub fn load_tables(config: &Config) -> Result<RateTables> {
    let tables = match config.data_dir.as_deref() {
        Some(dir) => RateTables::load_dir(dir)?,
        None => RateTables::embedded()?,
    };
    Ok(tables)
}

pub struct App<B: TerminalBackend> {
    controller: Controller,
    renderer: Renderer,
    backend: B,
    poll_timeout_ms: u32,
    /// Stop after this many frames; `None` runs until a quit key.
    max_frames: Option<usize>,
    pointer_style: PointerStyle,
}

impl<B: TerminalBackend> App<B> {
    pub fn new(controller: Controller, backend: B, config: &Config) -> Self {
        let (w, h) = backend.size();
        Self {
            controller,
            renderer: Renderer::new(w, h),
            backend,
            poll_timeout_ms: config.poll_timeout_ms,
            max_frames: config.headless.then_some(1),
            pointer_style: PointerStyle::Default,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn set_max_frames(&mut self, frames: Option<usize>) {
        self.max_frames = frames;
    }

    /// Initialize the backend, run the frame loop, and shut the backend
    /// down even when the loop fails.
    pub fn run(&mut self) -> Result<()> {
        self.backend.init().map_err(AppError::Terminal)?;
        log::info!("session started");

        let result = self.run_loop();
        let shutdown = self.backend.shutdown().map_err(AppError::Terminal);

        match &result {
            Ok(()) => log::info!("session ended"),
            Err(e) => log::error!("session aborted: {e}"),
        }
        result.and(shutdown)
    }

    fn run_loop(&mut self) -> Result<()> {
        let mut frames = 0usize;
        loop {
            self.frame()?;
            frames += 1;
            if self.max_frames.is_some_and(|max| frames >= max) {
                return Ok(());
            }

            let outcome = event::read_input(
                &mut self.controller,
                &mut self.backend,
                self.poll_timeout_ms,
            )?;
            if outcome.quit {
                return Ok(());
            }
        }
    }

    /// Draw the active view once.
    pub fn frame(&mut self) -> Result<()> {
        let style = self.controller.pointer_style();
        if style != self.pointer_style {
            log::debug!("pointer style: {style:?}");
            self.pointer_style = style;
        }
        self.renderer
            .render(self.controller.active_batch(), &mut self.backend)
            .map_err(AppError::Terminal)
    }
}
