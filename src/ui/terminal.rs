//! Renderer backed by a ratatui terminal on stdout.
//!
//! Raw mode is never enabled so Ctrl+C keeps reaching the process as SIGINT.

use std::io::{self, Stdout};

use color_eyre::{Result, eyre::eyre};
use crossterm::{
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use log::*;
use ratatui::{
    Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Layout},
    prelude::*,
    widgets::*,
};
use tui_logger::*;

use crate::{
    config::MonitorConfig,
    ui::{Renderer, theme::Theme},
};

pub struct FrameRenderer<B: Backend> {
    terminal: Terminal<B>,
    lines: Vec<Line<'static>>,
    log_lines: u16,
    theme: Theme,
    logger_state: TuiWidgetState,
}

pub type TerminalRenderer = FrameRenderer<CrosstermBackend<Stdout>>;

impl TerminalRenderer {
    /// Take over stdout, entering the alternate screen if configured.
    pub fn stdout(config: &MonitorConfig) -> Result<Self> {
        let alternate = config.alternate_screen;
        if alternate {
            execute!(io::stdout(), EnterAlternateScreen)?;
        }
        let hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = restore_stdout(alternate);
            hook(info);
        }));
        let mut renderer = Self::new(CrosstermBackend::new(io::stdout()), config.log_lines)?;
        renderer.terminal.clear()?;
        Ok(renderer)
    }

    /// Show the cursor and leave the alternate screen.
    pub fn restore(&mut self, config: &MonitorConfig) -> Result<()> {
        self.set_cursor_visible(true);
        Ok(restore_stdout(config.alternate_screen)?)
    }
}

fn restore_stdout(alternate: bool) -> io::Result<()> {
    let mut stdout = io::stdout();
    if alternate {
        execute!(stdout, LeaveAlternateScreen)?;
    }
    execute!(stdout, cursor::Show)
}

impl<B: Backend> FrameRenderer<B> {
    pub fn new(backend: B, log_lines: u16) -> Result<Self> {
        Ok(Self {
            terminal: Terminal::new(backend).map_err(|e| eyre!("Cannot open terminal: {e}"))?,
            lines: Vec::new(),
            log_lines,
            theme: Theme::dark(),
            logger_state: TuiWidgetState::new(),
        })
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    fn draw(&mut self) -> Result<()> {
        let lines = std::mem::take(&mut self.lines);
        let log_lines = self.log_lines;
        let theme = self.theme;
        let logger_state = &self.logger_state;
        let result = self.terminal.draw(|frame| {
            let [main, log] = Layout::vertical([Constraint::Fill(1), Constraint::Length(log_lines)])
                .areas(frame.area());
            let style = Style::default().bg(theme.background).fg(theme.foreground);
            frame.render_widget(Paragraph::new(lines).style(style), main);
            if log_lines > 0 {
                let panel_style = Style::default().bg(theme.surface).fg(theme.foreground);
                let widget = TuiLoggerWidget::default()
                    .style_error(panel_style.fg(theme.error))
                    .style_warn(panel_style.fg(theme.warning))
                    .style_info(panel_style)
                    .style_debug(panel_style)
                    .style_trace(panel_style)
                    .style(panel_style)
                    .output_separator(':')
                    .output_timestamp(Some("%H:%M:%S".to_string()))
                    .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
                    .output_target(true)
                    .output_file(false)
                    .output_line(false)
                    .block(Block::bordered().title("Log").border_type(BorderType::Rounded))
                    .state(logger_state);
                frame.render_widget(widget, log);
            }
        });
        result.map(|_| ()).map_err(|e| eyre!("{e}"))
    }
}

impl<B: Backend> Renderer for FrameRenderer<B> {
    /// Start a new frame; the next `present` replaces the whole screen.
    fn clear_screen(&mut self) {
        self.lines.clear();
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        let result = if visible {
            self.terminal.show_cursor()
        } else {
            self.terminal.hide_cursor()
        };
        if let Err(err) = result {
            warn!(target: "Renderer", "Cursor change failed: {:?}", err);
        }
    }

    fn write_line(&mut self, line: Line<'static>) {
        self.lines.push(line);
    }

    fn present(&mut self) {
        if let Err(err) = self.draw() {
            warn!(target: "Renderer", "Draw failed: {}", err);
        }
    }
}
