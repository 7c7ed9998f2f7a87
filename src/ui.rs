use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};

use crate::app::App;
use crate::model::{PanelState, PanelStatus, ParentKey};
use crate::panel::ListPanel;

const BG: Color = Color::Rgb(9, 15, 25);
const PANEL: Color = Color::Rgb(16, 27, 44);
const ACCENT: Color = Color::Rgb(52, 211, 153);
const MUTED: Color = Color::Rgb(140, 156, 178);
const WARN: Color = Color::Rgb(251, 191, 36);
const ERROR: Color = Color::Rgb(248, 113, 113);
const PL_A: Color = Color::Rgb(17, 94, 89);
const PL_B: Color = Color::Rgb(30, 64, 175);

pub fn render(frame: &mut Frame, app: &mut App) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0], app);
    render_panels(frame, root[1], app);
    render_footer(frame, root[2], app);

    if app.show_help() {
        render_help_modal(frame, app);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let line = Line::from(vec![
        Span::styled(
            " kubelane ",
            Style::default()
                .fg(Color::White)
                .bg(PL_A)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ctx:{} ", app.context()),
            Style::default().fg(Color::White).bg(PL_B),
        ),
        Span::styled(
            format!(" {} ", display_cluster_endpoint(app.cluster())),
            Style::default().fg(MUTED).bg(BG),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(BG)), area);
}

fn render_panels(frame: &mut Frame, area: Rect, app: &mut App) {
    let count = app.panel_count().max(1) as u32;
    let constraints = (0..count)
        .map(|_| Constraint::Ratio(1, count))
        .collect::<Vec<_>>();
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area)
        .to_vec();
    app.set_panel_areas(areas.clone());

    let focused = app.focused();
    for (index, panel_area) in areas.into_iter().enumerate() {
        if let Some((panel, state)) = app.panel_view_mut(index) {
            render_panel(frame, panel_area, panel, state, index == focused);
        }
    }
}

fn render_panel(
    frame: &mut Frame,
    area: Rect,
    panel: &mut ListPanel,
    state: &PanelState,
    focused: bool,
) {
    let border = match (state.status(), focused) {
        (PanelStatus::Failed(_), true) => ERROR,
        (_, true) => ACCENT,
        _ => MUTED,
    };
    let block = Block::default()
        .title(panel_title(panel.title(), state))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .style(Style::default().bg(PANEL));

    if panel.entries().is_empty() {
        let (text, style) = placeholder_for(panel, state);
        let paragraph = Paragraph::new(text)
            .wrap(Wrap { trim: false })
            .block(block)
            .style(style);
        frame.render_widget(paragraph, area);
        return;
    }

    let items = panel
        .entries()
        .iter()
        .map(|entry| ListItem::new(entry.name().to_string()))
        .collect::<Vec<_>>();
    let list = List::new(items)
        .block(block)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .bg(Color::Rgb(24, 36, 58))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("󰜴 ");
    frame.render_stateful_widget(list, area, panel.list_state_mut());
}

fn panel_title(title: &str, state: &PanelState) -> String {
    match state.status() {
        PanelStatus::Populated(count) => match state.fetched_at() {
            Some(at) => format!("{title} ({count}) {}", at.format("%H:%M:%S")),
            None => format!("{title} ({count})"),
        },
        PanelStatus::Loading => match state.loading_parent() {
            Some(ParentKey::Resource(parent)) => format!("{title} [{parent}] …"),
            _ => format!("{title} …"),
        },
        PanelStatus::Failed(_) => format!("{title} !"),
        PanelStatus::Empty => title.to_string(),
    }
}

/// Placeholder text for a panel with nothing to list. `Empty` (nothing
/// selected upstream yet) is rendered dim and italic so it never reads like a
/// populated-but-empty result.
fn placeholder_for(panel: &ListPanel, state: &PanelState) -> (String, Style) {
    let message = panel.placeholder().unwrap_or_default().to_string();
    match state.status() {
        PanelStatus::Failed(_) => (message, Style::default().fg(ERROR)),
        PanelStatus::Populated(_) => (message, Style::default().fg(WARN)),
        PanelStatus::Loading => (message, Style::default().fg(MUTED)),
        PanelStatus::Empty => (
            "select an entry on the left".to_string(),
            Style::default()
                .fg(MUTED)
                .add_modifier(Modifier::DIM | Modifier::ITALIC),
        ),
    }
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let hints = " ↑↓ move  ⏎ reload  ⇥ focus  r refresh  ? help  q quit ";
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(hints.chars().count() as u16),
        ])
        .split(area);

    let status_style = if app.status().starts_with("Failed") {
        Style::default().fg(Color::Black).bg(ERROR)
    } else {
        Style::default().fg(Color::White).bg(PL_B)
    };
    frame.render_widget(
        Paragraph::new(format!(" {} ", app.status())).style(status_style),
        chunks[0],
    );
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(MUTED).bg(BG)),
        chunks[1],
    );
}

fn render_help_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let focus_policy = if app.follow_selection() {
        "focus follows selection"
    } else {
        "focus stays put"
    };
    let lines = vec![
        Line::from(format!("kubelane help  ctx:{}  {focus_policy}", app.context())),
        Line::from(""),
        Line::from("j / ↓        next entry (loads its children)"),
        Line::from("k / ↑        previous entry"),
        Line::from("g / G        first / last entry"),
        Line::from("PgDn / PgUp  page down / up"),
        Line::from("Tab / l / →  focus next panel"),
        Line::from("S-Tab / h / ← focus previous panel"),
        Line::from("Enter        reload children of current entry"),
        Line::from("r / F5       reload the leftmost panel"),
        Line::from("mouse        click to focus and select, wheel to move"),
        Line::from("? / Esc      toggle / close help"),
        Line::from("q / Ctrl-C   quit"),
    ];

    let modal = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .style(Style::default().bg(PANEL)),
        )
        .style(Style::default().fg(Color::White));

    frame.render_widget(modal, area);
}

fn display_cluster_endpoint(cluster: &str) -> String {
    let trimmed = cluster
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/');
    if trimmed.is_empty() {
        "-".to_string()
    } else {
        trimmed.to_string()
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
