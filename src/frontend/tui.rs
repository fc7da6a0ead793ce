use crate::config::Config;
use crate::error::{AfaireError, Result, UiError};
use crate::logging::DebugLogger;
use crate::session::EditorSession;
use crate::shell::Shell;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::stdout;
use std::time::Duration;

pub struct TuiApplication {
    shell: Shell,
}

impl TuiApplication {
    pub fn new(config: Config) -> Result<Self> {
        let debug_log = config.log.debug_log_path.clone();
        let session = EditorSession::new(config)?;
        let mut shell = Shell::new(session);

        if let Some(path) = debug_log {
            match DebugLogger::new(path) {
                Ok(logger) => shell = shell.with_debug_log(logger),
                Err(err) => log::warn!("debug log disabled: {}", err),
            }
        }
        Ok(Self { shell })
    }

    pub fn run(&mut self) -> Result<()> {
        enter_terminal()?;

        let backend = CrosstermBackend::new(stdout());
        let mut terminal = Terminal::new(backend).map_err(|err| terminal_error("terminal init", err))?;

        let loop_result = self.event_loop(&mut terminal);
        let show_cursor_result = terminal.show_cursor().map_err(|err| terminal_error("show cursor", err));
        drop(terminal);
        let cleanup_result = leave_terminal();

        loop_result.and(show_cursor_result).and(cleanup_result)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while self.shell.is_running() {
            self.shell.frame();
            terminal
                .draw(|frame| crate::ui::render(frame, &self.shell))
                .map_err(|err| terminal_error("render", err))?;

            if event::poll(Duration::from_millis(16)).map_err(|err| terminal_error("event poll", err))? {
                match event::read().map_err(|err| terminal_error("event read", err))? {
                    Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                        self.shell.handle_key(key_event.into());
                    }
                    Event::Key(_) | Event::Resize(_, _) => {}
                    Event::Mouse(_) | Event::FocusGained | Event::FocusLost | Event::Paste(_) => {}
                }
            }
        }

        Ok(())
    }
}

fn enter_terminal() -> Result<()> {
    enable_raw_mode().map_err(|_| AfaireError::Ui(UiError::TerminalInit))?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen).map_err(|err| terminal_error("enter alternate screen", err))?;
    Ok(())
}

fn leave_terminal() -> Result<()> {
    let mut out = stdout();
    execute!(out, LeaveAlternateScreen).map_err(|err| terminal_error("leave alternate screen", err))?;
    disable_raw_mode().map_err(|err| terminal_error("disable raw mode", err))?;
    Ok(())
}

fn terminal_error(context: &str, err: impl std::fmt::Display) -> AfaireError {
    AfaireError::Ui(UiError::RenderingFailed {
        component: format!("{}: {}", context, err),
    })
}
