use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::export::CsvExporter;
use crate::grid::Direction;
use crate::render::GlyphBuffer;
use crate::session::{Phase, SessionConfig, SessionController};

/// Logical canvas the session draws on; the TUI scales it to the terminal.
pub const CANVAS_WIDTH: u32 = 1000;
pub const CANVAS_HEIGHT: u32 = 800;

/// Top-level application state: the session controller plus the surfaces it
/// draws to and exports through. Key handling in main maps terminal input
/// onto these methods; tests drive them directly.
pub struct App {
    config: SessionConfig,
    controller: SessionController,
    surface: GlyphBuffer,
    exporter: CsvExporter,
    export_error: Option<String>,
}

impl App {
    pub fn new<P: AsRef<Path>>(config: SessionConfig, export_dir: P) -> Self {
        Self {
            config,
            controller: SessionController::new(),
            surface: GlyphBuffer::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            exporter: CsvExporter::new(export_dir),
            export_error: None,
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn surface(&self) -> &GlyphBuffer {
        &self.surface
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    /// Path of the last score file, once a session has been stopped.
    pub fn export_path(&self) -> Option<PathBuf> {
        self.exporter.last_path().map(Path::to_path_buf)
    }

    pub fn export_error(&self) -> Option<&str> {
        self.export_error.as_deref()
    }

    pub fn start(&mut self, now: Instant) {
        self.export_error = None;
        self.controller.start(self.config, now, &mut self.surface);
    }

    /// Pauses a running session or resumes a paused one.
    pub fn toggle_pause(&mut self, now: Instant) {
        match self.controller.phase() {
            Phase::Running => self.controller.pause(&mut self.surface),
            Phase::Paused => self.controller.resume(now),
            Phase::Idle | Phase::Finished => {}
        }
    }

    /// Stops the session and writes the score file. A failed export is
    /// remembered for the results panel instead of aborting the app.
    pub fn stop(&mut self) {
        if let Err(err) = self.controller.stop(&mut self.surface, &mut self.exporter) {
            log::error!("score export failed: {err}");
            self.export_error = Some(err.to_string());
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.controller.on_tick(now, &mut self.surface);
    }

    /// Deadline the event loop should wake at, if a switch tick is armed.
    pub fn next_switch_due(&self) -> Option<Instant> {
        self.controller.next_switch_due()
    }

    pub fn navigate(&mut self, direction: Direction) {
        self.controller.navigate(direction, &mut self.surface);
    }

    pub fn record_and_advance(&mut self) {
        self.controller.record_and_advance(&mut self.surface);
    }

    pub fn increase_size(&mut self) {
        self.controller.increase_size(&mut self.surface);
    }

    pub fn decrease_size(&mut self) {
        self.controller.decrease_size(&mut self.surface);
    }
}
