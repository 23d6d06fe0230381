use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use knipper::app::App;
use knipper::grid::Direction;
use knipper::runtime::{AppEvent, Runner, TestEventSource};
use knipper::session::{Phase, SessionConfig};
use tempfile::tempdir;

fn key(c: char) -> AppEvent {
    AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Headless integration using the internal runtime + App without a TTY.
// Drives a minimal session through Runner/TestEventSource the way main does.
#[test]
fn headless_session_scores_and_exports() {
    let dir = tempdir().unwrap();
    let config = SessionConfig {
        grid_width: 2,
        grid_height: 2,
        ..Default::default()
    };
    let mut app = App::new(config, dir.path());

    let (tx, rx) = mpsc::channel();
    let es = TestEventSource::new(rx);
    let runner = Runner::new(es, Duration::from_millis(5));

    // start, score all four cells, stop
    tx.send(key('s')).unwrap();
    for _ in 0..4 {
        tx.send(key(' ')).unwrap();
    }
    tx.send(AppEvent::Key(KeyEvent::new(
        KeyCode::Esc,
        KeyModifiers::NONE,
    )))
    .unwrap();

    for _ in 0..100u32 {
        match runner.step(Instant::now(), app.next_switch_due()) {
            AppEvent::Tick => app.on_tick(Instant::now()),
            AppEvent::Resize => {}
            AppEvent::Key(ev) => match ev.code {
                KeyCode::Char('s') => app.start(Instant::now()),
                KeyCode::Char(' ') => app.record_and_advance(),
                KeyCode::Esc => app.stop(),
                _ => {}
            },
        }
        if app.phase() == Phase::Finished {
            break;
        }
    }

    assert_eq!(app.phase(), Phase::Finished);
    assert_eq!(app.export_error(), None);

    let path = app.export_path().expect("score file should exist");
    let contents = std::fs::read_to_string(path).unwrap();
    assert_eq!(contents, "10;10\n10;10\n");
}

#[test]
fn navigation_and_resizing_shape_the_exported_matrix() {
    let dir = tempdir().unwrap();
    let config = SessionConfig {
        grid_width: 3,
        grid_height: 2,
        ..Default::default()
    };
    let mut app = App::new(config, dir.path());
    let t0 = Instant::now();
    app.start(t0);

    // shrink twice at (1,1), record, jump down and record a grown size
    app.decrease_size();
    app.decrease_size();
    app.record_and_advance(); // 8 at (1,1), now at (2,1)
    app.navigate(Direction::Down); // (2,2)
    for _ in 0..3 {
        app.increase_size();
    }
    app.record_and_advance(); // 11 at (2,2), now at (3,2)
    app.stop();

    let contents = std::fs::read_to_string(app.export_path().unwrap()).unwrap();
    assert_eq!(contents, "8;;\n;11;\n");
}

#[test]
fn pause_freezes_blinking_until_resume() {
    let dir = tempdir().unwrap();
    let mut app = App::new(SessionConfig::default(), dir.path());
    let t0 = Instant::now();
    app.start(t0);
    let period = Duration::from_millis(app.config().speed_ms);

    app.toggle_pause(t0);
    assert_eq!(app.phase(), Phase::Paused);
    // keys that only apply while running must be ignored
    app.record_and_advance();
    app.navigate(Direction::Forward);
    assert_eq!(app.controller().remaining(), Some(15));

    let t1 = t0 + Duration::from_secs(3);
    app.toggle_pause(t1);
    assert_eq!(app.phase(), Phase::Running);

    // the stimulus reappears one period after the resume, not before
    app.on_tick(t1 + period - Duration::from_millis(1));
    assert!(app.surface().is_empty());
    app.on_tick(t1 + period);
    assert_eq!(app.surface().len(), 1);
}

#[test]
fn second_session_starts_clean_after_finish() {
    let dir = tempdir().unwrap();
    let mut app = App::new(SessionConfig::default(), dir.path());
    let t0 = Instant::now();

    app.start(t0);
    app.record_and_advance();
    app.stop();
    let first = app.export_path().unwrap();

    app.start(t0 + Duration::from_secs(1));
    assert_eq!(app.phase(), Phase::Running);
    assert_eq!(app.controller().remaining(), Some(15));
    assert_eq!(app.surface().len(), 1);

    app.stop();
    assert_eq!(app.phase(), Phase::Finished);
    // both runs produced a file
    assert!(first.exists());
    assert!(app.export_path().unwrap().exists());
}
