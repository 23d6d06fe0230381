use std::io;
use std::time::{Duration, Instant};

use crate::export::ExportSink;
use crate::grid::{Direction, GridNavigator, GridPos, ScoreMatrix};
use crate::render::{Canvas, GlyphId, RenderSink};
use crate::scheduler::{SwitchScheduler, TickHandle};
use crate::stimulus::Stimulus;

/// Operator settings captured once at session start; immutable for the
/// whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub thickness: u32,
    pub speed_ms: u64,
    pub grid_width: u32,
    pub grid_height: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            thickness: 3,
            speed_ms: 500,
            grid_width: 5,
            grid_height: 3,
        }
    }
}

impl SessionConfig {
    /// Orientation switch period.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.speed_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Paused,
    Finished,
}

/// Everything owned for the lifetime of one session; recreated on every
/// start, never mutated across sessions.
#[derive(Debug)]
struct ActiveSession {
    config: SessionConfig,
    navigator: GridNavigator,
    stimulus: Stimulus,
    scheduler: SwitchScheduler,
    pending: Option<TickHandle>,
    /// The single current stimulus glyph; cleared and reassigned on every
    /// redraw so at most one cross is ever visible.
    glyph: Option<GlyphId>,
    /// Score label shown over each cell, if any; row-major like the matrix.
    labels: Vec<Option<GlyphId>>,
}

/// The session state machine. Maps operator commands onto the navigator and
/// the stimulus, owns the switch scheduler, and emits the score export when
/// the session stops. Commands issued outside their applicable phase are
/// silently ignored.
#[derive(Debug, Default)]
pub struct SessionController {
    phase: Phase,
    session: Option<ActiveSession>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn config(&self) -> Option<SessionConfig> {
        self.session.as_ref().map(|s| s.config)
    }

    pub fn stimulus_size(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.stimulus.size())
    }

    pub fn position(&self) -> Option<GridPos> {
        self.session.as_ref().map(|s| s.navigator.position())
    }

    pub fn remaining(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.navigator.remaining())
    }

    pub fn scores(&self) -> Option<&ScoreMatrix> {
        self.session.as_ref().map(|s| s.navigator.scores())
    }

    /// Deadline of the armed switch tick. None whenever no tick can fire,
    /// in particular while paused.
    pub fn next_switch_due(&self) -> Option<Instant> {
        if self.phase != Phase::Running {
            return None;
        }
        self.session.as_ref().and_then(|s| s.scheduler.next_due())
    }

    /// Starts a fresh session from Idle or Finished: drops any previous
    /// session state (and with it any stray scheduler handle), wipes the
    /// surface, places the stimulus on cell (1,1) and arms the first switch
    /// tick.
    pub fn start<S: RenderSink + Canvas>(
        &mut self,
        config: SessionConfig,
        now: Instant,
        surface: &mut S,
    ) {
        if !matches!(self.phase, Phase::Idle | Phase::Finished) {
            return;
        }
        self.session = None;
        surface.clear_all();

        let navigator = GridNavigator::new(config.grid_width, config.grid_height);
        let (x, y) = navigator.screen_position(surface.width(), surface.height());
        let stimulus = Stimulus::new(x, y, config.thickness);
        let mut scheduler = SwitchScheduler::new();
        let pending = scheduler.schedule(now, config.period());
        let cells = (config.grid_width * config.grid_height) as usize;

        let mut session = ActiveSession {
            config,
            navigator,
            stimulus,
            scheduler,
            pending: Some(pending),
            glyph: None,
            labels: vec![None; cells],
        };
        session.redraw(surface);
        self.session = Some(session);
        self.phase = Phase::Running;
        log::info!("session started: {:?}", config);
    }

    /// Running -> Paused: cancels the pending tick and hides the stimulus.
    /// No tick can fire until resume.
    pub fn pause<S: RenderSink>(&mut self, surface: &mut S) {
        if self.phase != Phase::Running {
            return;
        }
        if let Some(session) = &mut self.session {
            session.cancel_pending();
            session.clear_glyph(surface);
        }
        self.phase = Phase::Paused;
        log::info!("session paused");
    }

    /// Paused -> Running: arms one tick with the session's period. The
    /// stimulus reappears on that tick's redraw.
    pub fn resume(&mut self, now: Instant) {
        if self.phase != Phase::Paused {
            return;
        }
        if let Some(session) = &mut self.session {
            let period = session.config.period();
            session.pending = Some(session.scheduler.schedule(now, period));
        }
        self.phase = Phase::Running;
        log::info!("session resumed");
    }

    /// Running/Paused -> Finished: cancels the pending tick, hides the
    /// stimulus and emits the score matrix to the export sink. An export
    /// failure is returned to the caller; the session still finishes and
    /// its scores stay readable in memory.
    pub fn stop<S: RenderSink>(
        &mut self,
        surface: &mut S,
        export: &mut dyn ExportSink,
    ) -> io::Result<()> {
        if !matches!(self.phase, Phase::Running | Phase::Paused) {
            return Ok(());
        }
        self.phase = Phase::Finished;
        let Some(session) = &mut self.session else {
            return Ok(());
        };
        session.cancel_pending();
        session.clear_glyph(surface);
        log::info!(
            "session finished, {} cells left unscored",
            session.navigator.remaining()
        );
        export.export(session.navigator.scores())
    }

    /// Drives the switch scheduler; the event loop calls this on every
    /// runtime tick. On a due tick the orientation toggles, the stimulus is
    /// redrawn and the next tick is armed.
    pub fn on_tick<S: RenderSink>(&mut self, now: Instant, surface: &mut S) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(session) = &mut self.session else {
            return;
        };
        if let Some(handle) = session.scheduler.fire_due(now) {
            debug_assert_eq!(session.pending, Some(handle));
            session.pending = None;
            session.stimulus.toggle_orientation();
            session.redraw(surface);
            let period = session.config.period();
            session.pending = Some(session.scheduler.schedule(now, period));
        }
    }

    /// Records the stimulus size at the current cell, shows it as a label
    /// and advances forward. At the last cell the move fails and the
    /// stimulus stays put; the recorded score is kept either way.
    pub fn record_and_advance<S: RenderSink + Canvas>(&mut self, surface: &mut S) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(session) = &mut self.session else {
            return;
        };
        session.navigator.record(session.stimulus.size());
        session.refresh_label(surface);
        if session.navigator.step(Direction::Forward) {
            session.enter_cell(surface);
        }
    }

    /// Moves the cursor one cell. Before leaving, a recorded score at the
    /// current cell is re-shown; after arriving, any label sitting under
    /// the stimulus is cleared. A rejected boundary move leaves everything
    /// in place.
    pub fn navigate<S: RenderSink + Canvas>(&mut self, direction: Direction, surface: &mut S) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(session) = &mut self.session else {
            return;
        };
        session.restore_label(surface);
        if session.navigator.step(direction) {
            session.enter_cell(surface);
        }
    }

    /// Grows the stimulus by one (clamped) and redraws it. Returns the
    /// resulting size, or None outside Running.
    pub fn increase_size<S: RenderSink>(&mut self, surface: &mut S) -> Option<u32> {
        if self.phase != Phase::Running {
            return None;
        }
        let session = self.session.as_mut()?;
        let size = session.stimulus.increase_size();
        session.redraw(surface);
        Some(size)
    }

    /// Shrinks the stimulus by one (clamped) and redraws it. Returns the
    /// resulting size, or None outside Running.
    pub fn decrease_size<S: RenderSink>(&mut self, surface: &mut S) -> Option<u32> {
        if self.phase != Phase::Running {
            return None;
        }
        let session = self.session.as_mut()?;
        let size = session.stimulus.decrease_size();
        session.redraw(surface);
        Some(size)
    }

    #[cfg(test)]
    pub(crate) fn pending_ticks(&self) -> usize {
        self.session
            .as_ref()
            .map_or(0, |s| usize::from(s.scheduler.has_pending()))
    }
}

impl ActiveSession {
    fn label_slot(&mut self, pos: GridPos) -> &mut Option<GlyphId> {
        let idx = ((pos.y - 1) * self.config.grid_width + (pos.x - 1)) as usize;
        &mut self.labels[idx]
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
    }

    /// Clears the previous stimulus glyph and draws the current one.
    fn redraw<S: RenderSink>(&mut self, surface: &mut S) {
        if let Some(id) = self.glyph.take() {
            surface.clear(id);
        }
        let seg = self.stimulus.segment();
        self.glyph = Some(surface.draw_line(seg.x1, seg.y1, seg.x2, seg.y2, seg.thickness));
    }

    fn clear_glyph<S: RenderSink>(&mut self, surface: &mut S) {
        if let Some(id) = self.glyph.take() {
            surface.clear(id);
        }
    }

    /// Re-shows the recorded score of the current cell before the cursor
    /// leaves it, unless a label is already visible there.
    fn restore_label<S: RenderSink>(&mut self, surface: &mut S) {
        let pos = self.navigator.position();
        let Some(score) = self.navigator.score() else {
            return;
        };
        if self.label_slot(pos).is_none() {
            let (x, y) = self.stimulus.position();
            let id = surface.draw_text(x, y, score.to_string());
            *self.label_slot(pos) = Some(id);
        }
    }

    /// Replaces the current cell's label with the just-recorded size, so a
    /// re-record never stacks labels.
    fn refresh_label<S: RenderSink>(&mut self, surface: &mut S) {
        let pos = self.navigator.position();
        if let Some(id) = self.label_slot(pos).take() {
            surface.clear(id);
        }
        let (x, y) = self.stimulus.position();
        let id = surface.draw_text(x, y, self.stimulus.size().to_string());
        *self.label_slot(pos) = Some(id);
    }

    /// Repositions the stimulus onto the cursor's cell, redraws it and
    /// removes any score label that would sit under it.
    fn enter_cell<S: RenderSink + Canvas>(&mut self, surface: &mut S) {
        let (x, y) = self
            .navigator
            .screen_position(surface.width(), surface.height());
        self.stimulus.move_to(x, y);
        self.redraw(surface);
        let pos = self.navigator.position();
        if let Some(id) = self.label_slot(pos).take() {
            surface.clear(id);
        }
    }
}
