//! TUI application state and event handling.
//!
//! [`App`] wraps a [`LogViewer`] session and turns key presses into session
//! calls. The session reports back through queued [`ViewEvent`]s, which the app
//! drains into the display state that [`render_ui`] draws.
//!
//! # Searching
//!
//! A search runs on the UI thread. Each loop iteration advances it by one log
//! and then polls for input without blocking, so the interface stays responsive
//! and Esc can stop a long scan at any point.
//!
//! # Example
//!
//! ```rust,ignore
//! let viewer = LogViewer::open(source, roster, config);
//! let mut app = App::new(viewer);
//! app.run(&mut terminal)?;
//! ```

use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use ratatui::Terminal;
use ratatui::backend::Backend;

use super::events::{Action, poll_event};
use super::rendering::{RenderState, SearchRow, SearchStatus, Tab, TranscriptChunk, render_ui};
use crate::indexer::CalendarMonthSummary;
use crate::source::LogSource;
use crate::viewer::{LogViewer, ViewEvent};

/// Longest filter or search term accepted from the keyboard
const MAX_INPUT_CHARS: usize = 256;

pub struct App<S: LogSource> {
    viewer: LogViewer<S>,
    tab: Tab,
    contact_input: String,
    search_input: String,
    contact_idx: usize,
    result_idx: usize,
    // Display state fed by the session's events
    summary: Option<CalendarMonthSummary>,
    selected_day: Option<NaiveDate>,
    transcript: Vec<TranscriptChunk>,
    results: Vec<SearchRow>,
    search_text: Option<TranscriptChunk>,
    search_status: SearchStatus,
    should_quit: bool,
    // Dirty state tracking for efficient rendering
    needs_redraw: bool,
    last_draw_time: Instant,
    tick: Duration,
}

impl<S: LogSource> App<S> {
    /// Take over a freshly opened session and select its first contact
    pub fn new(viewer: LogViewer<S>) -> Self {
        let tick = Duration::from_millis(viewer.config().tick_interval_ms);
        let mut app = Self {
            viewer,
            tab: Tab::Browse,
            contact_input: String::new(),
            search_input: String::new(),
            contact_idx: 0,
            result_idx: 0,
            summary: None,
            selected_day: None,
            transcript: Vec::new(),
            results: Vec::new(),
            search_text: None,
            search_status: SearchStatus::Idle,
            should_quit: false,
            needs_redraw: true,
            last_draw_time: Instant::now(),
            tick,
        };
        app.apply_events();
        app.sync_selection();
        app
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            let searching = self.viewer.pump_search();
            self.apply_events();

            // Draw if dirty, or once per tick for resizes and search progress
            let now = Instant::now();
            if self.needs_redraw || now.duration_since(self.last_draw_time) >= self.tick {
                self.draw(terminal)?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let timeout = if searching { Duration::ZERO } else { self.tick };
            let action = poll_event(timeout)?;
            self.handle_action(action);
        }

        Ok(())
    }

    fn draw<B: Backend>(&self, terminal: &mut Terminal<B>) -> Result<()> {
        let contacts = self.viewer.visible_contacts();
        let state = RenderState {
            tab: self.tab,
            contact_input: &self.contact_input,
            contacts: &contacts,
            contact_idx: self.contact_idx,
            summary: self.summary.as_ref(),
            selected_day: self.selected_day,
            transcript: &self.transcript,
            search_input: &self.search_input,
            results: &self.results,
            result_idx: self.result_idx,
            search_text: self.search_text.as_ref(),
            status: &self.search_status,
            progress: self.viewer.search_progress(),
        };
        terminal.draw(|f| render_ui(f, &state))?;
        Ok(())
    }

    /// Drain the session's events into display state
    fn apply_events(&mut self) {
        loop {
            let events = self.viewer.drain_events();
            if events.is_empty() {
                return;
            }
            self.needs_redraw = true;

            for event in events {
                match event {
                    // The list itself is read from the session when drawing
                    ViewEvent::ContactListed { .. } => {}
                    ViewEvent::CalendarMarked(summary) => self.summary = Some(summary),
                    ViewEvent::DaySelected(day) => self.selected_day = Some(day),
                    ViewEvent::TranscriptCleared => self.transcript.clear(),
                    ViewEvent::TranscriptAppended { text, flags } => {
                        self.transcript.push(TranscriptChunk { text, flags });
                    }
                    ViewEvent::SearchStarted { term } => {
                        self.search_status = SearchStatus::Running { term };
                    }
                    ViewEvent::SearchResultsCleared => {
                        self.results.clear();
                        self.result_idx = 0;
                        self.search_text = None;
                        self.search_status = SearchStatus::Idle;
                    }
                    ViewEvent::SearchResultInserted { index, alias, date } => {
                        let first = self.results.is_empty();
                        let index = index.min(self.results.len());
                        self.results.insert(index, SearchRow { alias, date });
                        if first {
                            self.result_idx = 0;
                            self.viewer.open_search_result(0);
                        } else if index <= self.result_idx {
                            // Stay on the row whose log is open
                            self.result_idx += 1;
                        }
                    }
                    ViewEvent::SearchFinished { outcome, matches, inspected } => {
                        let term = match &self.search_status {
                            SearchStatus::Running { term } => term.clone(),
                            _ => String::new(),
                        };
                        self.search_status =
                            SearchStatus::Finished { term, outcome, matches, inspected };
                    }
                    ViewEvent::SearchTranscript { text, flags } => {
                        self.search_text = Some(TranscriptChunk { text, flags });
                    }
                }
            }
        }
    }

    /// Make the session's selected contact follow the highlighted list row
    fn sync_selection(&mut self) {
        let visible = self.viewer.visible_contacts();
        self.contact_idx = self.contact_idx.min(visible.len().saturating_sub(1));
        let target = visible.get(self.contact_idx).map(|entry| entry.id);

        if target == self.viewer.selected_contact() {
            return;
        }
        self.viewer.select_contact(target);
        if target.is_none() {
            self.summary = None;
            self.selected_day = None;
            self.transcript.clear();
        }
        self.apply_events();
        self.needs_redraw = true;
    }

    /// Handle a user action (extracted for testing)
    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::Escape => self.escape(),
            Action::ToggleTab => {
                self.tab = match self.tab {
                    Tab::Browse => Tab::Search,
                    Tab::Search => Tab::Browse,
                };
                self.needs_redraw = true;
            }
            Action::MoveUp => self.move_selection(-1),
            Action::MoveDown => self.move_selection(1),
            Action::PrevDay => self.move_day(-1),
            Action::NextDay => self.move_day(1),
            Action::PrevMonth => self.navigate(LogViewer::prev_month),
            Action::NextMonth => self.navigate(LogViewer::next_month),
            Action::PrevYear => self.navigate(LogViewer::prev_year),
            Action::NextYear => self.navigate(LogViewer::next_year),
            Action::Submit => {
                if self.tab == Tab::Search {
                    self.viewer.start_search(&self.search_input);
                    self.apply_events();
                }
            }
            Action::Input(c) => self.update_input(c),
            Action::DeleteChar => self.delete_char(),
            Action::None => {}
        }
    }

    // Stop a running search first, then clear the input, then quit
    fn escape(&mut self) {
        if self.tab == Tab::Search && self.viewer.is_searching() {
            self.viewer.cancel_search();
            return;
        }

        let input = match self.tab {
            Tab::Browse => &mut self.contact_input,
            Tab::Search => &mut self.search_input,
        };
        if input.is_empty() {
            self.should_quit = true;
            return;
        }
        input.clear();
        self.input_changed();
    }

    fn move_selection(&mut self, delta: isize) {
        let (idx, total) = match self.tab {
            Tab::Browse => (&mut self.contact_idx, self.viewer.visible_contacts().len()),
            Tab::Search => (&mut self.result_idx, self.results.len()),
        };
        if total == 0 {
            *idx = 0;
            return;
        }

        let old_idx = *idx;
        let new_idx = (*idx as isize + delta).max(0) as usize;
        *idx = new_idx.min(total - 1);
        if *idx == old_idx {
            return;
        }

        self.needs_redraw = true;
        match self.tab {
            Tab::Browse => self.sync_selection(),
            Tab::Search => {
                self.viewer.open_search_result(self.result_idx);
                self.apply_events();
            }
        }
    }

    // Days move within the displayed month; months change with PgUp/PgDn
    fn move_day(&mut self, delta: i32) {
        if self.tab != Tab::Browse {
            return;
        }
        let Some(day) = self.selected_day else {
            return;
        };
        let Some(target) = day.day().checked_add_signed(delta) else {
            return;
        };
        if target == 0 || target > self.viewer.cursor().days_in_month() {
            return;
        }
        self.viewer.select_day(target);
        self.apply_events();
    }

    fn navigate(&mut self, step: fn(&mut LogViewer<S>)) {
        if self.tab != Tab::Browse {
            return;
        }
        step(&mut self.viewer);
        self.apply_events();
    }

    fn update_input(&mut self, c: char) {
        let input = match self.tab {
            Tab::Browse => &mut self.contact_input,
            Tab::Search => &mut self.search_input,
        };
        // Limit input to 256 characters to prevent DoS
        if input.chars().count() < MAX_INPUT_CHARS {
            input.push(c);
            self.input_changed();
        }
    }

    fn delete_char(&mut self) {
        let input = match self.tab {
            Tab::Browse => &mut self.contact_input,
            Tab::Search => &mut self.search_input,
        };
        if input.pop().is_some() {
            self.input_changed();
        }
    }

    fn input_changed(&mut self) {
        self.needs_redraw = true;
        match self.tab {
            Tab::Browse => {
                self.viewer.set_contact_filter(&self.contact_input);
                self.contact_idx = 0;
                self.sync_selection();
            }
            // An emptied search box stops the scan and drops its results
            Tab::Search if self.search_input.is_empty() => {
                self.viewer.start_search("");
                self.apply_events();
            }
            Tab::Search => {}
        }
    }
}
