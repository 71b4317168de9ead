mod app_logic;
mod app_state;
mod event_handler;
mod ui_renderer;

pub use app_logic::TuiApp;

pub use self::run_shell::run_shell;

// Main loop plus terminal setup/teardown.
mod run_shell {
    use super::app_logic::TuiApp;
    use super::event_handler::handle_events;
    use super::ui_renderer::ui_frame;
    use anyhow::Result;
    use crossterm::{
        event::{DisableMouseCapture, EnableMouseCapture},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };
    use ratatui::prelude::{CrosstermBackend, Terminal};
    use std::io::{self, Stdout};

    /// Run the interactive shell until the user quits. Settings are
    /// saved on the way out, matching the original on-close behavior.
    pub fn run_shell(mut app: TuiApp) -> Result<()> {
        let mut terminal = init_terminal()?;

        while !app.quit {
            terminal.draw(|frame| ui_frame(frame, &mut app))?;
            handle_events(&mut app)?;
            app.poll_batch();
        }

        restore_terminal(terminal)?;
        app.settings.save();
        Ok(())
    }

    fn init_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).map_err(Into::into)
    }

    fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor().map_err(Into::into)
    }
}
