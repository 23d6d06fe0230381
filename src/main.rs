use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use knipper::{
    app::App,
    config::{Config, ConfigStore, FileConfigStore},
    grid::Direction,
    runtime::{AppEvent, CrosstermEventSource, Runner},
    session::{Phase, SessionConfig},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::{Duration, Instant},
};

/// Upper bound on one event-loop wait while no switch tick is armed. With
/// a session running the loop wakes exactly at the switch deadline instead.
const IDLE_WAIT_MS: u64 = 250;

/// terminal eye test with a blinking stimulus and grid-based scoring
#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct Cli {
    /// base line thickness of the stimulus
    #[clap(short = 't', long, value_parser = clap::value_parser!(u32).range(1..))]
    thickness: Option<u32>,

    /// orientation switch period in milliseconds
    #[clap(short = 's', long, value_parser = clap::value_parser!(u64).range(1..))]
    speed_ms: Option<u64>,

    /// number of grid columns
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
    grid_width: Option<u32>,

    /// number of grid rows
    #[clap(long, value_parser = clap::value_parser!(u32).range(1..))]
    grid_height: Option<u32>,

    /// directory the score files are written to
    #[clap(short = 'o', long)]
    export_dir: Option<PathBuf>,
}

impl Cli {
    /// Persisted config with the flags given on this invocation laid over it.
    fn merge_into(&self, cfg: Config) -> Config {
        Config {
            thickness: self.thickness.unwrap_or(cfg.thickness),
            speed_ms: self.speed_ms.unwrap_or(cfg.speed_ms),
            grid_width: self.grid_width.unwrap_or(cfg.grid_width),
            grid_height: self.grid_height.unwrap_or(cfg.grid_height),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let config = cli.merge_into(store.load());
    if let Err(err) = store.save(&config) {
        log::warn!("could not persist config: {err}");
    }

    let export_dir = cli
        .export_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let mut app = App::new(SessionConfig::from(&config), export_dir);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(IDLE_WAIT_MS),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step(Instant::now(), app.next_switch_due()) {
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c')
                {
                    break;
                }
                match key.code {
                    KeyCode::Char('q') => break,
                    KeyCode::Char('s') => app.start(Instant::now()),
                    KeyCode::Char('p') => app.toggle_pause(Instant::now()),
                    KeyCode::Esc => match app.phase() {
                        Phase::Running | Phase::Paused => app.stop(),
                        Phase::Idle | Phase::Finished => break,
                    },
                    KeyCode::Char(' ') => app.record_and_advance(),
                    KeyCode::Right => app.navigate(Direction::Forward),
                    KeyCode::Left => app.navigate(Direction::Backward),
                    KeyCode::Up => app.navigate(Direction::Up),
                    KeyCode::Down => app.navigate(Direction::Down),
                    KeyCode::Char('+') | KeyCode::Char('=') => app.increase_size(),
                    KeyCode::Char('-') | KeyCode::Char('_') => app.decrease_size(),
                    _ => {}
                }
            }
        }
    }

    Ok(())
}
