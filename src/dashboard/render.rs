use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::dashboard::state::{DashboardState, EnvVarModal, InputMode, ServiceEntry};
use crate::models::ServiceStatus;
use crate::utils;

fn status_color(status: ServiceStatus) -> Color {
    match status {
        ServiceStatus::Available => Color::Green,
        ServiceStatus::Deploying => Color::Yellow,
        ServiceStatus::Failed => Color::Red,
        ServiceStatus::Suspended => Color::DarkGray,
        ServiceStatus::Unknown => Color::White,
    }
}

fn status_dot(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Suspended => "○",
        ServiceStatus::Unknown => "?",
        _ => "●",
    }
}

pub fn draw(frame: &mut Frame, state: &DashboardState) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.size());

    frame.render_widget(header(state), layout[0]);
    render_services(frame, state, layout[1]);
    frame.render_widget(footer(state), layout[2]);

    if let Some(modal) = &state.modal {
        render_env_modal(frame, modal);
    }
}

fn header(state: &DashboardState) -> Paragraph<'static> {
    let refreshed = match state.last_refreshed {
        Some(at) => format!("Updated {}", utils::time_ago(at)),
        None => "Loading...".to_string(),
    };
    let mut spans = vec![Span::styled(
        refreshed,
        Style::default().fg(Color::Gray),
    )];
    if !state.failures.is_empty() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("{} service(s) failed to fetch", state.failures.len()),
            Style::default().fg(Color::Red),
        ));
    }

    Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                "Render Services",
                Style::default().add_modifier(Modifier::BOLD),
            )),
    )
}

fn render_services(frame: &mut Frame, state: &DashboardState, area: Rect) {
    let visible = state.visible();

    if visible.is_empty() {
        let message = if state.filter.is_empty() {
            "No services to show yet"
        } else {
            "No services match the filter"
        };
        let empty = Paragraph::new(Span::styled(message, Style::default().fg(Color::DarkGray)))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = visible.iter().map(|entry| card(entry)).collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_symbol("▶ ")
        .highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let mut list_state = ListState::default();
    list_state.select(state.selected_index());
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn card(entry: &ServiceEntry) -> ListItem<'static> {
    let service = &entry.service;
    let color = status_color(service.status);

    let title = Line::from(vec![
        Span::styled(
            format!("{} {}", status_dot(service.status), entry.config.name),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(service.status.to_string(), Style::default().fg(color)),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", service.id),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let deploy_line = match &service.latest_deploy {
        None => Line::from(Span::styled(
            "  └─ No deployments",
            Style::default().fg(Color::DarkGray),
        )),
        Some(deploy) => {
            let age = utils::time_ago(deploy.created_at);
            let mut text = if deploy.is_in_progress() {
                format!("  └─ Deploy started {}", age)
            } else {
                format!("  └─ Last deploy {} ({})", age, deploy.status)
            };
            if let Some(sha) = &deploy.commit_sha {
                text.push_str(&format!(" @ {}", utils::short_sha(sha)));
            }
            Line::from(Span::styled(text, Style::default().fg(Color::Gray)))
        }
    };

    let mut lines = vec![title, deploy_line];
    if let Some(url) = service.display_url() {
        lines.push(Line::from(Span::styled(
            format!("     {}", url),
            Style::default().fg(Color::Cyan),
        )));
    }

    ListItem::new(lines)
}

fn footer(state: &DashboardState) -> Paragraph<'static> {
    let line = match state.input_mode {
        InputMode::Search => Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Yellow)),
            Span::raw(state.filter.clone()),
            Span::styled("▌", Style::default().fg(Color::Yellow)),
        ]),
        InputMode::Normal => {
            let mut hints =
                "r Refresh | / Search | l Logs | e Events | m Metrics | s Settings | d Deploys | v Env | q Quit"
                    .to_string();
            if !state.filter.is_empty() {
                hints = format!("filter: '{}' (Esc clears) | {}", state.filter, hints);
            }
            Line::from(Span::styled(hints, Style::default().fg(Color::Gray)))
        }
    };

    Paragraph::new(line).block(Block::default().borders(Borders::ALL))
}

fn render_env_modal(frame: &mut Frame, modal: &EnvVarModal) {
    let area = centered_rect(70, 60, frame.size());

    let lines: Vec<Line> = if let Some(error) = &modal.error {
        vec![Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        ))]
    } else {
        match &modal.vars {
            None => vec![Line::from(Span::styled(
                "Loading...",
                Style::default().fg(Color::Yellow),
            ))],
            Some(vars) if vars.is_empty() => vec![Line::from(Span::styled(
                "No environment variables",
                Style::default().fg(Color::DarkGray),
            ))],
            Some(vars) => vars
                .iter()
                .map(|var| {
                    Line::from(vec![
                        Span::styled(var.key.clone(), Style::default().fg(Color::Cyan)),
                        Span::raw(" = "),
                        Span::raw(var.value.clone()),
                    ])
                })
                .collect(),
        }
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Env vars: {} (Esc to close)", modal.service_name));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);
    horizontal[1]
}
