//! TUI (Terminal User Interface) module for the Chessle solver
//!
//! This module provides an interactive terminal interface using Ratatui.
//!
//! # State Machine
//! The UI follows these state transitions:
//! - `EnteringGuess` → `MarkingFeedback` → `ConfirmingFeedback` → `WaitingForNext` → back to `EnteringGuess`
//! - Terminal state: `GameOver`

use crate::feedback::Feedback;
use crate::game_state::{FeedbackInput, GameInterface, StartingGuessesInfo, UserAction};
use crate::opening::Opening;
use crate::selector::Recommendation;
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;

const MAX_CANDIDATES_DISPLAY: usize = 8;
const MAX_INPUT_LEN: usize = 120;
const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const ROW_SPACING: u16 = 2;
const CELL_WIDTH: usize = 7;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const INFO_STYLE: Style = Style::new().fg(Color::Yellow).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);

#[derive(Clone, Copy, PartialEq, Debug)]
enum MoveState {
    Entered,
    Correct, // Green
    Present, // Yellow
    Absent,  // Gray
}

impl MoveState {
    fn colors(self) -> (Color, Color) {
        match self {
            Self::Entered => (Color::DarkGray, Color::White),
            Self::Correct => (Color::Green, Color::Black),
            Self::Present => (Color::Yellow, Color::Black),
            Self::Absent => (Color::Gray, Color::White),
        }
    }

    fn to_feedback(self) -> Option<Feedback> {
        match self {
            Self::Correct => Some(Feedback::Correct),
            Self::Present => Some(Feedback::Present),
            Self::Absent => Some(Feedback::Absent),
            Self::Entered => None,
        }
    }
}

/// What a key press means while a guess row is being marked.
#[derive(Clone, Copy, PartialEq, Debug)]
enum MarkingKey {
    Mark(MoveState),
    Back,
    Quit,
    Unknown(char),
}

impl MarkingKey {
    fn from_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Esc => Some(Self::Quit),
            KeyCode::Char('c' | 'C') => Some(Self::Mark(MoveState::Correct)),
            KeyCode::Char('m' | 'M') => Some(Self::Mark(MoveState::Present)),
            KeyCode::Char('i' | 'I') => Some(Self::Mark(MoveState::Absent)),
            KeyCode::Backspace => Some(Self::Back),
            KeyCode::Char(c) => Some(Self::Unknown(c)),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct GuessRow {
    moves: Vec<String>,
    states: Vec<MoveState>,
}

impl GuessRow {
    fn from_guess(guess: &Opening) -> Self {
        Self {
            moves: guess.iter().map(ToString::to_string).collect(),
            states: vec![MoveState::Entered; guess.len()],
        }
    }

    fn feedback(&self) -> Option<Vec<Feedback>> {
        self.states.iter().map(|s| s.to_feedback()).collect()
    }
}

#[derive(Debug)]
enum TuiState {
    EnteringGuess,
    MarkingFeedback { marking_index: usize },
    ConfirmingFeedback,
    WaitingForNext,
    /// Game has ended (solution found or no candidates) - message stored in interface.message
    GameOver,
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    guesses: &'a [GuessRow],
    current_input: &'a str,
    state: &'a TuiState,
    candidates_display: &'a [String],
    candidate_count: usize,
    recommendation: Option<&'a Recommendation>,
    starting_guesses: &'a [Opening],
    message: &'a str,
    error_message: &'a str,
    status: &'a str,
}

/// Main TUI interface component.
///
/// Manages terminal rendering, input handling, and game state display.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    length: usize,
    guesses: Vec<GuessRow>,
    current_input: String,
    state: TuiState,
    candidates_display: Vec<String>,
    candidate_count: usize,
    recommendation: Option<Recommendation>,
    starting_guesses: Vec<Opening>,
    message: String,
    error_message: String,
    status: String,
}

impl TuiInterface {
    pub fn new(length: usize) -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal backend created");

        Ok(Self {
            terminal,
            length,
            guesses: Vec::new(),
            current_input: String::new(),
            state: TuiState::EnteringGuess,
            candidates_display: Vec::new(),
            candidate_count: 0,
            recommendation: None,
            starting_guesses: Vec::new(),
            message: String::new(),
            error_message: String::new(),
            status: "Ready to start".to_string(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    /// Draw the current UI state to the terminal.
    fn draw(&mut self) -> Result<(), io::Error> {
        let ctx = RenderContext {
            guesses: &self.guesses,
            current_input: &self.current_input,
            state: &self.state,
            candidates_display: &self.candidates_display,
            candidate_count: self.candidate_count,
            recommendation: self.recommendation.as_ref(),
            starting_guesses: &self.starting_guesses,
            message: &self.message,
            error_message: &self.error_message,
            status: &self.status,
        };

        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Title
                Constraint::Length(14), // Game board
                Constraint::Min(8),     // Info panel
                Constraint::Length(3),  // Status line
                Constraint::Length(3),  // Instructions
            ])
            .split(f.area());

        Self::render_title(f, chunks[0]);
        Self::render_board(f, chunks[1], ctx);
        Self::render_info(f, chunks[2], ctx);
        Self::render_status(f, chunks[3], ctx.status);
        Self::render_instructions(f, chunks[4], ctx.state);
    }

    fn render_title(f: &mut Frame, area: Rect) {
        let title = Paragraph::new("CHESSLE SOLVER")
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_board(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let block = Block::default()
            .title("Guesses")
            .borders(Borders::ALL)
            .style(Style::default());

        let inner = block.inner(area);
        f.render_widget(block, area);

        let available_rows = (inner.height / ROW_SPACING) as usize;
        let showing_current_input = matches!(ctx.state, TuiState::EnteringGuess);
        let rows_needed = ctx.guesses.len() + usize::from(showing_current_input);

        // Show the most recent guesses when they do not all fit
        let skip_count = rows_needed.saturating_sub(available_rows);
        let visible = ctx.guesses.len() - skip_count.min(ctx.guesses.len());

        for (display_index, guess) in ctx.guesses.iter().skip(skip_count).enumerate() {
            let marking = match ctx.state {
                TuiState::MarkingFeedback { marking_index } if display_index + 1 == visible => {
                    Some(*marking_index)
                }
                _ => None,
            };
            Self::render_guess_row(f, guess, display_index, inner, marking);
        }

        if showing_current_input {
            Self::render_current_input(f, visible, inner, ctx.current_input);
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_guess_row(
        f: &mut Frame,
        guess: &GuessRow,
        row_index: usize,
        area: Rect,
        marking: Option<usize>,
    ) {
        let y = area.y + (row_index as u16 * ROW_SPACING);
        if y >= area.y + area.height {
            return;
        }

        let mut spans = vec![Span::raw("  ")];
        for (i, (mv, state)) in guess.moves.iter().zip(&guess.states).enumerate() {
            let (bg_color, fg_color) = state.colors();
            let mut style = Style::default().fg(fg_color).bg(bg_color);
            if marking == Some(i) {
                style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
            }
            spans.push(Span::styled(format!("{mv:^CELL_WIDTH$}"), style));
            spans.push(Span::raw(" "));
        }

        if let Some(index) = marking {
            spans.push(Span::raw(format!(" <- Marking move {} (C/M/I)", index + 1)));
        }

        Self::render_line(f, area, y, spans);
    }

    fn render_line(f: &mut Frame, area: Rect, y: u16, spans: Vec<Span>) {
        let line = Line::from(spans);
        let paragraph = Paragraph::new(line);
        f.render_widget(
            paragraph,
            Rect {
                x: area.x,
                y,
                width: area.width,
                height: 1,
            },
        );
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_current_input(f: &mut Frame, row_index: usize, area: Rect, current_input: &str) {
        let y = area.y + (row_index as u16 * ROW_SPACING);
        if y >= area.y + area.height {
            return;
        }

        let spans = vec![
            Span::raw("  > "),
            Span::styled(
                format!("{current_input}_"),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            ),
        ];
        Self::render_line(f, area, y, spans);
    }

    fn render_info(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let mut lines = Vec::new();

        if !ctx.starting_guesses.is_empty() {
            lines.push(Line::from(vec![Span::styled(
                "Strong First Guesses:",
                HEADER_STYLE,
            )]));
            for (i, guess) in ctx.starting_guesses.iter().take(3).enumerate() {
                let num = i + 1;
                lines.push(Line::from(format!("  {num}. {guess}")));
            }
            lines.push(Line::from(""));
        }

        if let Some(rec) = ctx.recommendation {
            lines.push(Line::from(vec![Span::styled(
                format!(
                    "Recommended: {} (score: {}, {} left)",
                    rec.guess, rec.score, rec.remaining
                ),
                SUCCESS_STYLE,
            )]));
            lines.push(Line::from(""));
        }

        if !ctx.candidates_display.is_empty() {
            lines.push(Line::from(vec![Span::styled(
                format!("Possible openings ({}):", ctx.candidate_count),
                INFO_STYLE,
            )]));
            for opening in ctx.candidates_display {
                lines.push(Line::from(format!("  {opening}")));
            }
            if ctx.candidate_count > ctx.candidates_display.len() {
                lines.push(Line::from(format!(
                    "  ... and {} more",
                    ctx.candidate_count - ctx.candidates_display.len()
                )));
            }
            lines.push(Line::from(""));
        }

        if !ctx.message.is_empty() {
            lines.push(Line::from(vec![Span::styled(ctx.message, MESSAGE_STYLE)]));
        }

        if !ctx.error_message.is_empty() {
            lines.push(Line::from(vec![Span::styled(
                ctx.error_message,
                ERROR_STYLE,
            )]));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().title("Information").borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, state: &TuiState) {
        let text = match state {
            TuiState::EnteringGuess => {
                "Type moves separated by spaces | ENTER: Submit (empty = play recommendation) | ESC: Quit"
            }
            TuiState::MarkingFeedback { .. } => {
                "C: Correct | M: Misplaced | I: Incorrect | BACKSPACE: Go back | ESC: Quit"
            }
            TuiState::ConfirmingFeedback => "ENTER: Confirm feedback | BACKSPACE: Go back and edit",
            TuiState::WaitingForNext => "Press any key to continue | ESC: Quit",
            TuiState::GameOver => "N: New Game | ESC: Quit",
        };

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let status_text = if status.is_empty() { "Ready" } else { status };
        let paragraph = Paragraph::new(status_text)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    /// Waits briefly for a key press, ignoring every other event.
    fn poll_key() -> Result<Option<KeyEvent>, io::Error> {
        if !event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                if let KeyCode::Char(c) = key.code
                    && (c == '\u{FFFD}' || c.is_control())
                {
                    debug_log!("poll_key() - Ignoring control character {:?}", c);
                    return Ok(None);
                }
                Ok(Some(key))
            }
            other => {
                debug_log!("poll_key() - Ignoring event {:?}", other);
                Ok(None)
            }
        }
    }

    fn has_modifier_keys(key: &KeyEvent) -> bool {
        key.modifiers.contains(event::KeyModifiers::ALT)
            || key.modifiers.contains(event::KeyModifiers::CONTROL)
    }

    fn handle_guess_input(&mut self, key: KeyEvent) -> Option<UserAction> {
        self.error_message.clear();

        match key.code {
            KeyCode::Esc => {
                info_log!("handle_guess_input() - ESC pressed, returning Exit");
                return Some(UserAction::Exit);
            }
            KeyCode::Char(_) if Self::has_modifier_keys(&key) => {
                debug_log!(
                    "handle_guess_input() - Ignoring key with modifier: {:?}",
                    key.modifiers
                );
            }
            KeyCode::Char(c) if self.current_input.len() < MAX_INPUT_LEN => {
                self.current_input.push(c);
            }
            KeyCode::Backspace => {
                self.current_input.pop();
            }
            KeyCode::Enter if self.current_input.trim().is_empty() => {
                self.current_input.clear();
                return Some(UserAction::AcceptRecommendation);
            }
            KeyCode::Enter => {
                let guess = Opening::parse(&self.current_input);
                if guess.len() == self.length {
                    self.current_input.clear();
                    info_log!("handle_guess_input() - Submitting guess {}", guess);
                    return Some(UserAction::Guess(guess));
                }
                self.error_message = format!(
                    "A guess needs exactly {} moves ({} entered)!",
                    self.length,
                    guess.len()
                );
            }
            _ => {
                debug_log!("handle_guess_input() - Ignoring key: {:?}", key.code);
            }
        }
        None
    }

    fn handle_feedback_input(&mut self, key: KeyEvent) -> Option<UserAction> {
        let TuiState::MarkingFeedback { marking_index } = self.state else {
            return None;
        };
        if Self::has_modifier_keys(&key) {
            return None;
        }

        let mark = match MarkingKey::from_code(key.code) {
            Some(MarkingKey::Quit) => return Some(UserAction::Exit),
            Some(MarkingKey::Mark(state)) => Some(state),
            Some(MarkingKey::Back) if marking_index > 0 => {
                if let Some(row) = self.guesses.last_mut() {
                    row.states[marking_index - 1] = MoveState::Entered;
                }
                self.state = TuiState::MarkingFeedback {
                    marking_index: marking_index - 1,
                };
                None
            }
            Some(MarkingKey::Unknown(c)) => {
                self.error_message = format!(
                    "Use C (correct), M (misplaced) or I (incorrect). ('{c}' is not valid)"
                );
                None
            }
            Some(MarkingKey::Back) | None => None,
        };

        if let Some(state) = mark
            && let Some(row) = self.guesses.last_mut()
        {
            row.states[marking_index] = state;
            self.error_message.clear();
            self.state = if marking_index + 1 < row.states.len() {
                TuiState::MarkingFeedback {
                    marking_index: marking_index + 1,
                }
            } else {
                TuiState::ConfirmingFeedback
            };
        }
        None
    }

    fn handle_confirming_feedback_input(&mut self, key: KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Esc => Some(UserAction::Exit),
            KeyCode::Enter => {
                self.state = TuiState::WaitingForNext;
                None
            }
            KeyCode::Backspace => {
                if let Some(row) = self.guesses.last_mut()
                    && let Some(last) = row.states.last_mut()
                {
                    *last = MoveState::Entered;
                    self.state = TuiState::MarkingFeedback {
                        marking_index: row.states.len() - 1,
                    };
                }
                None
            }
            _ => None,
        }
    }

    fn handle_game_over_input(key: KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Char('n' | 'N') => Some(UserAction::NewGame),
            KeyCode::Esc => Some(UserAction::Exit),
            _ => None,
        }
    }

    fn reset_board(&mut self) {
        self.guesses.clear();
        self.current_input.clear();
        self.candidates_display.clear();
        self.candidate_count = 0;
        self.error_message.clear();
    }
}

impl GameInterface for TuiInterface {
    fn display_starting_guesses(&mut self, info: &StartingGuessesInfo) {
        self.starting_guesses.clone_from(&info.guesses);
        if let Some(first) = info.guesses.first() {
            self.message = format!("Suggested first guess: {first}");
        }
        self.status = format!("Ready - Enter your first {}-move guess", self.length);
        self.draw_or_log();
    }

    fn read_guess(&mut self, recommendation: Option<&Recommendation>) -> Option<UserAction> {
        self.recommendation = recommendation.cloned();
        if !matches!(self.state, TuiState::GameOver) {
            self.state = TuiState::EnteringGuess;
        }
        loop {
            if self.draw().is_err() {
                return Some(UserAction::Exit);
            }
            let key = match Self::poll_key() {
                Ok(Some(key)) => key,
                Ok(None) => continue,
                Err(_) => return Some(UserAction::Exit),
            };
            let action = match self.state {
                TuiState::GameOver => Self::handle_game_over_input(key),
                _ => self.handle_guess_input(key),
            };
            if let Some(action) = action {
                info_log!("read_guess() - Action received: {:?}", action);
                return Some(action);
            }
        }
    }

    fn read_feedback(&mut self, guess: &Opening) -> FeedbackInput {
        self.guesses.push(GuessRow::from_guess(guess));
        self.state = TuiState::MarkingFeedback { marking_index: 0 };
        self.error_message.clear();
        self.status = format!("Guess entered: {guess} - Now mark feedback");

        loop {
            if self.draw().is_err() {
                return FeedbackInput::Exit;
            }
            let key = match Self::poll_key() {
                Ok(Some(key)) => key,
                Ok(None) => continue,
                Err(e) => {
                    debug_log!("read_feedback() - Input error: {}", e);
                    return FeedbackInput::Exit;
                }
            };
            let action = match self.state {
                TuiState::MarkingFeedback { .. } => self.handle_feedback_input(key),
                TuiState::ConfirmingFeedback => self.handle_confirming_feedback_input(key),
                _ => None,
            };
            if let Some(UserAction::Exit) = action {
                info_log!("read_feedback() - ESC pressed, returning Exit");
                self.guesses.pop();
                return FeedbackInput::Exit;
            }
            if matches!(self.state, TuiState::ConfirmingFeedback) {
                self.status = "Press ENTER to confirm feedback".to_string();
            }
            if matches!(self.state, TuiState::WaitingForNext) {
                self.status = "Feedback recorded".to_string();
                return self
                    .guesses
                    .last()
                    .and_then(GuessRow::feedback)
                    .map_or(FeedbackInput::Invalid, FeedbackInput::Marked);
            }
        }
    }

    fn display_feedback(&mut self, _guess: &Opening, _feedback: &[Feedback]) {
        // The marked row already shows it.
        self.draw_or_log();
    }

    fn display_candidates(&mut self, candidates: &[&Opening]) {
        self.candidate_count = candidates.len();
        self.candidates_display = candidates
            .iter()
            .take(MAX_CANDIDATES_DISPLAY)
            .map(ToString::to_string)
            .collect();
        self.status = format!("{} openings remaining", candidates.len());
        self.draw_or_log();
    }

    fn display_recommendation(&mut self, recommendation: &Recommendation) {
        self.recommendation = Some(recommendation.clone());
        self.starting_guesses.clear();
        self.state = TuiState::EnteringGuess;
        self.status = format!("Recommendation ready: {}", recommendation.guess);
        self.draw_or_log();
    }

    fn display_no_candidates_message(&mut self) {
        self.state = TuiState::GameOver;
        self.recommendation = None;
        self.message = "No openings match that feedback. Check your inputs.".to_string();
        self.status = "Error: No valid candidates found".to_string();
        self.draw_or_log();
    }

    fn display_solution_found(&mut self, solution: &Opening, guesses: usize) {
        self.state = TuiState::GameOver;
        self.recommendation = None;
        self.message = format!("✓ Solved in {guesses} guesses: {solution}");
        self.status = "Game Over".to_string();
        self.draw_or_log();
    }

    fn display_error(&mut self, message: &str) {
        self.error_message = message.to_string();
        self.draw_or_log();
    }

    fn display_exit_message(&mut self) {
        self.message = "Exiting...".to_string();
        self.status = "Exiting application...".to_string();
        self.draw_or_log();
    }

    fn display_new_game_message(&mut self, opening_count: usize) {
        self.reset_board();
        self.state = TuiState::EnteringGuess;
        self.message = format!("New game started. Loaded {opening_count} openings.");
        self.status = "New game - Enter your first guess".to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
