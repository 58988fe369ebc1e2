use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Width of the left column: input, list and calendar
const SIDEBAR_WIDTH: u16 = 30;
/// Month grid: title row, weekday row, six weeks, borders
const CALENDAR_HEIGHT: u16 = 10;

/// Pane layout shared by both tabs
pub struct AppLayout {
    pub tabs_area: Rect,
    pub input_area: Rect,
    pub list_area: Rect,
    /// Only the browse tab shows a calendar
    pub calendar_area: Option<Rect>,
    pub detail_area: Rect,
    pub status_area: Rect,
}

impl AppLayout {
    /// Tab bar on top, status bar at the bottom, a fixed-width sidebar on the
    /// left and the transcript filling the rest.
    pub fn new(area: Rect, with_calendar: bool) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(10)])
            .split(rows[1]);

        let calendar_height = if with_calendar { CALENDAR_HEIGHT } else { 0 };
        let sidebar = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(calendar_height),
            ])
            .split(columns[0]);

        Self {
            tabs_area: rows[0],
            input_area: sidebar[0],
            list_area: sidebar[1],
            calendar_area: with_calendar.then_some(sidebar[2]),
            detail_area: columns[1],
            status_area: rows[2],
        }
    }
}
