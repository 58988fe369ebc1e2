use chrono::{Datelike, NaiveDate};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap};

use super::layout::AppLayout;
use crate::indexer::{CalendarCursor, CalendarMonthSummary, ContactEntry, RULE};
use crate::models::ReadFlags;
use crate::parsers::to_plain_text;
use crate::search::SearchOutcome;
use crate::utils::sanitize_for_terminal;

const ACCENT: Color = Color::Rgb(16, 185, 129);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const MUTED: Color = Color::Rgb(113, 113, 122);
const BACKGROUND: Color = Color::Rgb(24, 24, 27);

// Longest rule drawn between logs
const MAX_RULE_WIDTH: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Browse,
    Search,
}

/// One log (or opened search result) as the session delivered it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptChunk {
    pub text: String,
    pub flags: ReadFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRow {
    pub alias: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Running { term: String },
    Finished { term: String, outcome: SearchOutcome, matches: usize, inspected: usize },
}

/// Everything one frame needs
pub struct RenderState<'a> {
    pub tab: Tab,
    pub contact_input: &'a str,
    pub contacts: &'a [&'a ContactEntry],
    pub contact_idx: usize,
    pub summary: Option<&'a CalendarMonthSummary>,
    pub selected_day: Option<NaiveDate>,
    pub transcript: &'a [TranscriptChunk],
    pub search_input: &'a str,
    pub results: &'a [SearchRow],
    pub result_idx: usize,
    pub search_text: Option<&'a TranscriptChunk>,
    pub status: &'a SearchStatus,
    /// (logs inspected, matches) while a search runs
    pub progress: Option<(usize, usize)>,
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let layout = AppLayout::new(frame.area(), state.tab == Tab::Browse);

    render_tabs(frame, layout.tabs_area, state.tab);
    match state.tab {
        Tab::Browse => {
            render_input(frame, layout.input_area, " Filter contacts ", state.contact_input);
            render_contacts(frame, layout.list_area, state.contacts, state.contact_idx);
            if let Some(area) = layout.calendar_area {
                render_calendar(frame, area, state.summary, state.selected_day);
            }
            let title = match state.selected_day {
                Some(day) => format!(" {} ", day.format("%A %d %B %Y")),
                None => " Conversation ".to_string(),
            };
            render_transcript(frame, layout.detail_area, &title, state.transcript);
        }
        Tab::Search => {
            render_input(frame, layout.input_area, " Search all logs ", state.search_input);
            render_results(frame, layout.list_area, state.results, state.result_idx);
            let chunk: &[TranscriptChunk] = match state.search_text {
                Some(chunk) => std::slice::from_ref(chunk),
                None => &[],
            };
            render_transcript(frame, layout.detail_area, " Log ", chunk);
        }
    }
    render_status_bar(frame, layout.status_area, state);
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(MUTED))
        .title(title)
}

fn selected_style() -> Style {
    Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD)
}

fn render_tabs(frame: &mut Frame, area: Rect, tab: Tab) {
    let tabs = Tabs::new(vec![" Browse ", " Search "])
        .select(match tab {
            Tab::Browse => 0,
            Tab::Search => 1,
        })
        .style(Style::default().fg(MUTED))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, area);
}

fn render_input(frame: &mut Frame, area: Rect, title: &str, input: &str) {
    let line = Line::from(vec![
        Span::styled("> ", Style::default().fg(ACCENT)),
        Span::raw(sanitize_for_terminal(input)),
    ]);
    frame.render_widget(Paragraph::new(line).block(bordered(title)), area);
}

fn render_contacts(frame: &mut Frame, area: Rect, contacts: &[&ContactEntry], selected_idx: usize) {
    let items: Vec<ListItem> = contacts
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let style =
                if idx == selected_idx { selected_style() } else { Style::default().fg(MUTED) };
            ListItem::new(sanitize_for_terminal(&entry.alias)).style(style)
        })
        .collect();

    let title = format!(" Contacts ({}) ", contacts.len());
    frame.render_widget(List::new(items).block(bordered(&title)), area);
}

fn render_results(frame: &mut Frame, area: Rect, results: &[SearchRow], selected_idx: usize) {
    let items: Vec<ListItem> = results
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let style =
                if idx == selected_idx { selected_style() } else { Style::default().fg(MUTED) };
            let lines = vec![
                Line::from(sanitize_for_terminal(&row.alias)),
                Line::from(Span::styled(format!("  {}", row.date), Style::default())),
            ];
            ListItem::new(lines).style(style)
        })
        .collect();

    let title = format!(" Results ({}) ", results.len());
    frame.render_widget(List::new(items).block(bordered(&title)), area);
}

/// Month grid, weeks starting on Monday
fn calendar_lines(summary: &CalendarMonthSummary, selected_day: Option<NaiveDate>) -> Vec<Line<'static>> {
    let cursor = CalendarCursor::new(summary.year, summary.month);
    let first = cursor.first_day();
    let selected = selected_day
        .filter(|day| day.year() == summary.year && day.month() == summary.month)
        .map(|day| day.day());

    let mut lines =
        vec![Line::styled("Mo Tu We Th Fr Sa Su", Style::default().fg(MUTED))];
    let mut week: Vec<Span<'static>> = Vec::new();
    for _ in 0..first.weekday().num_days_from_monday() {
        week.push(Span::raw("  "));
        week.push(Span::raw(" "));
    }

    for day in 1..=cursor.days_in_month() {
        let mut style = Style::default();
        if summary.is_marked(day) {
            style = style.fg(ACCENT).add_modifier(Modifier::BOLD);
        }
        if selected == Some(day) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        week.push(Span::styled(format!("{:>2}", day), style));
        week.push(Span::raw(" "));
        if week.len() == 14 {
            lines.push(Line::from(std::mem::take(&mut week)));
        }
    }
    if !week.is_empty() {
        lines.push(Line::from(week));
    }
    lines
}

fn render_calendar(
    frame: &mut Frame,
    area: Rect,
    summary: Option<&CalendarMonthSummary>,
    selected_day: Option<NaiveDate>,
) {
    let Some(summary) = summary else {
        frame.render_widget(Paragraph::new("No contact selected").block(bordered(" Calendar ")), area);
        return;
    };

    let title = format!(" {} ", CalendarCursor::new(summary.year, summary.month).first_day().format("%B %Y"));
    let paragraph = Paragraph::new(Text::from(calendar_lines(summary, selected_day)))
        .block(bordered(&title));
    frame.render_widget(paragraph, area);
}

/// Plain-text lines of a transcript, with a rule wherever a log ends in one
fn transcript_lines(chunks: &[TranscriptChunk], rule_width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for chunk in chunks {
        let (body, ruled) = match chunk.text.strip_suffix(RULE) {
            Some(body) => (body, true),
            None => (chunk.text.as_str(), false),
        };
        // Raw escapes are removed before rendering, decoded ones after
        let markup = sanitize_for_terminal(body);
        let plain = sanitize_for_terminal(&to_plain_text(&markup, chunk.flags));
        lines.extend(plain.lines().map(|line| Line::from(line.to_string())));
        if ruled {
            lines.push(Line::styled("─".repeat(rule_width), Style::default().fg(MUTED)));
        }
    }
    lines
}

fn render_transcript(frame: &mut Frame, area: Rect, title: &str, chunks: &[TranscriptChunk]) {
    let rule_width = usize::from(area.width.saturating_sub(2)).min(MAX_RULE_WIDTH);
    let content = if chunks.is_empty() {
        Text::from(Span::styled("No logs", Style::default().fg(MUTED)))
    } else {
        Text::from(transcript_lines(chunks, rule_width))
    };

    let paragraph = Paragraph::new(content).block(bordered(title)).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let text = match state.tab {
        Tab::Browse => format!(
            " {} contacts | ←/→: day | PgUp/PgDn: month | Shift+PgUp/PgDn: year | Tab: search | Ctrl+C: quit ",
            state.contacts.len()
        ),
        Tab::Search => match (state.status, state.progress) {
            (SearchStatus::Running { term }, Some((inspected, matches))) => format!(
                " Searching \"{}\": {} logs, {} matches | Esc: stop ",
                sanitize_for_terminal(term),
                inspected,
                matches
            ),
            (SearchStatus::Running { term }, None) => {
                format!(" Searching \"{}\" | Esc: stop ", sanitize_for_terminal(term))
            }
            (SearchStatus::Finished { term, outcome, matches, inspected }, _) => {
                let verb = match outcome {
                    SearchOutcome::Completed => "Found",
                    SearchOutcome::Cancelled => "Stopped with",
                };
                format!(
                    " {} {} matches for \"{}\" in {} logs | Enter: search again | Tab: browse ",
                    verb,
                    matches,
                    sanitize_for_terminal(term),
                    inspected
                )
            }
            (SearchStatus::Idle, _) => {
                " Type a term | Enter: search | Esc: clear | Tab: browse | Ctrl+C: quit ".to_string()
            }
        },
    };

    let paragraph = Paragraph::new(text).style(Style::default().fg(BRIGHT).bg(BACKGROUND));
    frame.render_widget(paragraph, area);
}
