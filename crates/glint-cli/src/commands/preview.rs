use std::io;
use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};
use tracing::info;

use glint_core::GlintConfig;
use glint_tui::{
    app::{App, Mode},
    event::{AppEvent, EventHandler},
    input::{handle_key_event, Action},
    widgets::{HelpPopup, MutationLogWidget, PageViewWidget, StatusBarWidget},
};

use super::load_page;

/// Idle poll interval; the engine's frame rate takes over while animating
const TICK_RATE_MS: u64 = 100;

/// Rows taken by the page view's borders and the status bar
const CHROME_ROWS: u16 = 3;

pub async fn run(config: GlintConfig, page: Option<&Path>) -> Result<()> {
    let page = load_page(page)?;
    let mut app = App::new(config, page)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, SetTitle("Glint"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let stats = app.engine.stats();
    info!(
        events = stats.events,
        passes = stats.passes,
        jobs = stats.jobs_run,
        faults = stats.handler_faults,
        "Preview closed"
    );
    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let clock = Instant::now();
    let now = || clock.elapsed().as_secs_f64() * 1000.0;

    let event_handler = EventHandler::new(TICK_RATE_MS, app.config.preview.frame_ms);

    let size = terminal.size()?;
    app.fit_viewport(0.0, size.height.saturating_sub(CHROME_ROWS));
    app.mount(now());

    // Main loop
    loop {
        app.tick(now());

        terminal.draw(|frame| {
            let size = frame.area();

            // Main layout: content + status bar
            let main_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(1), Constraint::Length(1)])
                .split(size);

            // Page view and mutation log side by side
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(3, 5), Constraint::Ratio(2, 5)])
                .split(main_layout[0]);

            PageViewWidget::render(frame, columns[0], app);
            MutationLogWidget::render(frame, columns[1], app);
            StatusBarWidget::render(frame, main_layout[1], app);

            if app.mode == Mode::Help {
                HelpPopup::render(frame, &app.theme);
            }
        })?;

        let animating = app.engine.needs_frame()
            || app
                .engine
                .next_deadline()
                .map(|due| due - now() < TICK_RATE_MS as f64)
                .unwrap_or(false);

        if let Some(event) = event_handler.next(animating)? {
            match event {
                AppEvent::Key(key) => {
                    let action = handle_key_event(key, app);
                    if action != Action::None {
                        app.clear_status();
                    }
                    app.apply(action, now());
                }
                AppEvent::Resize(_, height) => {
                    app.fit_viewport(now(), height.saturating_sub(CHROME_ROWS));
                }
                AppEvent::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
