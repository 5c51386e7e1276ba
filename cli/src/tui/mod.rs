pub mod app;
pub mod timetable;
pub mod ui;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use timetable_core::{ClassGateway, Config, DocumentStore};
use tracing::{error, info};

use crate::tui::app::App;

const TICK: Duration = Duration::from_millis(250);

pub fn run<S>(gateway: ClassGateway<S>, config: Config) -> Result<()>
where
    S: DocumentStore + Clone + Send + Sync + 'static,
{
    let mut app = App::new(gateway, config)?;
    info!("terminal UI started");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    app.close();
    info!("terminal UI stopped");

    if let Err(err) = res {
        error!(error = %err, "terminal UI failed");
        println!("{:?}", err);
    }

    Ok(())
}

fn run_app<B, S>(terminal: &mut Terminal<B>, app: &mut App<S>) -> io::Result<()>
where
    B: Backend,
    S: DocumentStore + Clone + Send + Sync + 'static,
{
    loop {
        app.poll_snapshots();

        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key.code);
                }
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
