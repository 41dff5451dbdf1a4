//! TUI module - terminal playback view with ratatui

use std::io::{Stdout, stdout};
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph, Wrap},
};

use crate::exercises::Exercise;
use crate::playback::{Phase, PlaybackController, PlaybackEvent, PlaybackState, Session};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// How the playback view was left
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Completed,
    /// Quit mid-session; nothing is recorded
    Abandoned,
}

/// App state for the playback view
pub struct PlayerApp {
    exercise: Exercise,
    controller: PlaybackController,
    should_quit: bool,
}

impl PlayerApp {
    pub fn new(exercise: Exercise, session: Session) -> Self {
        Self {
            exercise,
            controller: PlaybackController::new(session),
            should_quit: false,
        }
    }

    /// Run the playback view until completion or quit.
    ///
    /// Needs a tokio runtime for the tick timer.
    pub fn run(&mut self) -> Result<PlayOutcome> {
        let mut terminal = init_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal()?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> Result<PlayOutcome> {
        while !self.should_quit {
            self.controller.pump_ticks();
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }

        Ok(if self.controller.session().is_completed() {
            PlayOutcome::Completed
        } else {
            PlayOutcome::Abandoned
        })
    }

    fn render(&self, frame: &mut Frame) {
        let session = self.controller.session();
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let header = Paragraph::new(format!("dogfit - {}", self.exercise.name))
            .style(Style::default().fg(Color::Cyan).bold())
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, chunks[0]);

        // Progress
        let progress = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(session.progress_fraction());
        frame.render_widget(progress, chunks[1]);

        if session.is_completed() {
            let done = Paragraph::new("All steps done. Great job!\n\nPress q to collect your stamp.")
                .style(Style::default().fg(Color::Green).bold())
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).title("Completed"));
            frame.render_widget(done, chunks[2]);
        } else {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[2]);
            frame.render_widget(self.current_step_widget(session), body[0]);
            frame.render_widget(steps_list(session), body[1]);
        }

        // Footer
        let footer = Paragraph::new("space: start/pause | n: next | p: prev | r: reset timer | q: quit")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[3]);
    }

    fn current_step_widget(&self, session: &Session) -> Paragraph<'static> {
        let step = session.current_step();
        let state = match session.state() {
            PlaybackState::Idle => "ready",
            PlaybackState::Running => "running",
            PlaybackState::Paused => "paused",
            PlaybackState::Completed => "done",
        };
        let remaining = session.remaining_seconds();
        let timer_style = if remaining == 0 {
            Style::default().fg(Color::Red).bold()
        } else {
            Style::default().bold()
        };

        let lines = vec![
            Line::from(format!(
                "Step {}/{} - {}",
                session.current_index() + 1,
                session.len(),
                session.current_phase().label()
            )),
            Line::from(""),
            Line::from(step.text.clone()),
            Line::from(""),
            Line::styled(format!("{:02}:{:02} ({})", remaining / 60, remaining % 60, state), timer_style),
        ];

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Now"))
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
                KeyCode::Char(' ') => self.controller.toggle(),
                KeyCode::Char('n') | KeyCode::Right => {
                    if let Some(PlaybackEvent::Completed) = self.controller.advance() {
                        tracing::debug!("{} finished", self.exercise.id);
                    }
                }
                KeyCode::Char('p') | KeyCode::Left => {
                    self.controller.retreat();
                }
                KeyCode::Char('r') => self.controller.reset_timer(),
                _ => {}
            }
        }
        Ok(())
    }
}

fn phase_color(phase: Phase) -> Color {
    match phase {
        Phase::Warmup => Color::Yellow,
        Phase::Main => Color::Cyan,
        Phase::Cooldown => Color::Blue,
    }
}

fn steps_list(session: &Session) -> List<'static> {
    let items: Vec<ListItem> = session
        .sequence()
        .iter()
        .enumerate()
        .map(|(i, step)| {
            let marker = if i == session.current_index() { ">" } else { " " };
            let mut style = Style::default().fg(phase_color(step.phase));
            if i < session.current_index() {
                style = style.fg(Color::DarkGray);
            }
            ListItem::new(format!("{} {:>2}. {} ({}s)", marker, i + 1, step.text, step.duration_seconds))
                .style(style)
        })
        .collect();

    List::new(items).block(Block::default().borders(Borders::ALL).title("Steps"))
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
