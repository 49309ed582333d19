use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem as ListRow, ListState, Paragraph, Row, Table,
    Wrap,
};

use crate::app::App;
use crate::model::{DeleteChoice, ListData, MenuEntry, StatusKind, View};

const BG: Color = Color::Rgb(9, 15, 25);
const PANEL: Color = Color::Rgb(16, 27, 44);
const ACCENT: Color = Color::Rgb(52, 211, 153);
const MUTED: Color = Color::Rgb(140, 156, 178);
const WARN: Color = Color::Rgb(251, 191, 36);
const ERROR: Color = Color::Rgb(248, 113, 113);
const PL_A: Color = Color::Rgb(17, 94, 89);
const PL_B: Color = Color::Rgb(30, 64, 175);
const PL_C: Color = Color::Rgb(55, 48, 163);
const MAX_STATUS_LINES: usize = 4;

pub fn render(frame: &mut Frame, app: &App) {
    let status_height = app
        .status()
        .map(|status| status_lines(&status.text).len())
        .unwrap_or(1)
        .max(1) as u16;
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(status_height),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, root[0], app);
    render_body(frame, root[1], app);
    render_status(frame, root[2], app);
    render_footer(frame, root[3], app);

    if app.show_help() {
        render_help_modal(frame, app);
    }
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    push_powerline_segment(&mut spans, " KIND Interactive ", Color::Black, ACCENT, PL_A);
    push_powerline_segment(
        &mut spans,
        format!(" 󰠳 {} ", compact_text(app.view().title(), 20)),
        Color::White,
        PL_A,
        PL_B,
    );
    push_powerline_segment(
        &mut spans,
        format!(" clusters {} ", app.clusters().len()),
        Color::White,
        PL_B,
        BG,
    );

    if app.in_flight() > 0 && area.width > 48 {
        let right = Line::from(vec![Span::styled(
            format!(" 󰔟 running {} ", app.in_flight()),
            Style::default().fg(Color::Black).bg(WARN),
        )]);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(14)])
            .split(area);
        frame.render_widget(
            Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
            chunks[0],
        );
        frame.render_widget(
            Paragraph::new(right)
                .alignment(Alignment::Right)
                .style(Style::default().bg(BG)),
            chunks[1],
        );
        return;
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );
}

fn render_body(frame: &mut Frame, area: Rect, app: &App) {
    match app.view() {
        View::MainMenu => render_main_menu(frame, area, app),
        View::ClusterList => {
            let title = match app.cluster_list().last_refreshed {
                Some(at) => format!(
                    "{} ({})  {}",
                    View::ClusterList.title(),
                    app.cluster_list().items.len(),
                    at.format("%H:%M:%S")
                ),
                None => View::ClusterList.title().to_string(),
            };
            render_list(frame, area, &title, app.cluster_list(), "No clusters found");
        }
        View::NodeList => {
            let title = match app.nodes().len() {
                0 => app.node_list_title().to_string(),
                count => format!("{} ({count})", app.node_list_title()),
            };
            let empty = if app.nodes_pending() {
                "Loading nodes..."
            } else {
                "No nodes found"
            };
            render_list(frame, area, &title, app.node_list(), empty)
        }
        View::ClusterDetail => render_cluster_detail(frame, area, app),
        View::DeleteConfirm => render_delete_confirm(frame, area, app),
        View::CreateCluster | View::LoadImage | View::BuildImage | View::ExportLogs => {
            render_text_entry(frame, area, app)
        }
    }
}

fn panel_block(title: impl Into<String>) -> Block<'static> {
    Block::default()
        .title(title.into())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .style(Style::default().bg(PANEL))
}

fn render_main_menu(frame: &mut Frame, area: Rect, app: &App) {
    let rows = MenuEntry::ALL
        .iter()
        .map(|entry| two_line_row(entry.title(), entry.description()))
        .collect::<Vec<_>>();
    let mut state = ListState::default();
    state.select(Some(app.menu_selected()));
    frame.render_stateful_widget(selectable_list(rows, View::MainMenu.title()), area, &mut state);
}

fn render_list(frame: &mut Frame, area: Rect, title: &str, data: &ListData, empty: &str) {
    if data.items.is_empty() {
        let panel = Paragraph::new(Text::from(empty.to_string()))
            .block(panel_block(title.to_string()))
            .style(Style::default().fg(MUTED));
        frame.render_widget(panel, area);
        return;
    }

    let rows = data
        .items
        .iter()
        .map(|item| two_line_row(&item.title, &item.description))
        .collect::<Vec<_>>();
    let mut state = ListState::default();
    state.select(Some(data.selected));
    frame.render_stateful_widget(selectable_list(rows, title), area, &mut state);
}

fn two_line_row(title: &str, description: &str) -> ListRow<'static> {
    ListRow::new(Text::from(vec![
        Line::from(Span::styled(
            title.to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            description.to_string(),
            Style::default().fg(MUTED),
        )),
    ]))
}

fn selectable_list(rows: Vec<ListRow<'static>>, title: &str) -> List<'static> {
    List::new(rows)
        .block(panel_block(title.to_string()))
        .highlight_style(
            Style::default()
                .bg(Color::Rgb(24, 36, 58))
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("󰜴 ")
}

fn render_cluster_detail(frame: &mut Frame, area: Rect, app: &App) {
    let Some(cluster) = app.current_cluster() else {
        let panel = Paragraph::new("Loading cluster details...")
            .block(panel_block(View::ClusterDetail.title()))
            .style(Style::default().fg(MUTED));
        frame.render_widget(panel, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            "Basic Information:",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("• Name: {}", cluster.name)),
        Line::from(format!("• Status: {}", cluster.status)),
    ];
    if let Some(version) = cluster.kube_version.as_deref() {
        lines.push(Line::from(format!("• Kubernetes Version: {version}")));
    }
    lines.push(Line::from(format!("• Node Count: {}", cluster.nodes.len())));

    let info_height = lines.len() as u16 + 2;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(info_height), Constraint::Min(3)])
        .split(area);

    frame.render_widget(
        Paragraph::new(lines)
            .block(panel_block(format!("Cluster: {}", cluster.name)))
            .style(Style::default().fg(Color::White)),
        chunks[0],
    );

    if cluster.nodes.is_empty() {
        return;
    }

    let headers = ["NAME", "ROLE", "STATUS", "AGE", "INTERNAL-IP"];
    let header_row = Row::new(headers.iter().map(|header| {
        Cell::from(*header).style(Style::default().add_modifier(Modifier::BOLD))
    }))
    .style(Style::default().fg(ACCENT));
    let rows = cluster.nodes.iter().map(|node| {
        Row::new(vec![
            Cell::from(node.name.clone()),
            Cell::from(node.role.to_string()),
            Cell::from(node.status.clone()),
            Cell::from(node.age.clone()),
            Cell::from(node.internal_ip.clone()),
        ])
        .style(Style::default().fg(Color::White))
    });
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(32),
            Constraint::Percentage(18),
            Constraint::Percentage(14),
            Constraint::Percentage(12),
            Constraint::Percentage(24),
        ],
    )
    .header(header_row)
    .block(panel_block("Nodes"))
    .column_spacing(1);
    frame.render_widget(table, chunks[1]);
}

fn render_delete_confirm(frame: &mut Frame, area: Rect, app: &App) {
    let context = app.input_context();
    let (yes_style, no_style) = match context.delete_choice {
        DeleteChoice::Yes => (focused_button(), blurred_button()),
        DeleteChoice::No => (blurred_button(), focused_button()),
    };

    let lines = vec![
        Line::from(Span::styled(
            "⚠️  DELETE CLUSTER CONFIRMATION",
            Style::default().fg(ERROR).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("You are about to delete the following cluster:"),
        Line::from(""),
        Line::from(Span::styled(
            format!("Cluster Name: {}", context.cluster_pending_deletion),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "⚠️  WARNING: This action cannot be undone!",
            Style::default().fg(ERROR),
        )),
        Line::from("All pods, services, and data in this cluster will be permanently lost."),
        Line::from(""),
        Line::from("Are you sure you want to delete this cluster?"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [Y] Yes, delete the cluster  ", yes_style),
            Span::raw("  "),
            Span::styled("  [N] No, cancel  ", no_style),
        ]),
    ];

    let dialog = centered_rect(70, 70, area);
    frame.render_widget(Clear, dialog);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(View::DeleteConfirm.title())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(ERROR))
                    .style(Style::default().bg(PANEL)),
            )
            .style(Style::default().fg(Color::White)),
        dialog,
    );
}

fn focused_button() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

fn blurred_button() -> Style {
    Style::default().fg(MUTED).bg(Color::Rgb(24, 36, 58))
}

fn render_text_entry(frame: &mut Frame, area: Rect, app: &App) {
    let context = app.input_context();
    let placeholder = context
        .action
        .map(|action| action.placeholder())
        .unwrap_or("Enter value...");
    let input_line = if app.input().is_empty() {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(ACCENT)),
            Span::styled(placeholder.to_string(), Style::default().fg(MUTED)),
        ])
    } else {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(ACCENT)),
            Span::styled(app.input().to_string(), Style::default().fg(Color::White)),
            Span::styled("▏", Style::default().fg(ACCENT)),
        ])
    };

    let lines = vec![
        Line::from(context.prompt.clone()),
        Line::from(""),
        input_line,
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter to confirm, Esc to cancel",
            Style::default().fg(MUTED),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(panel_block(app.view().title()))
            .style(Style::default().fg(Color::White)),
        area,
    );
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let Some(status) = app.status() else {
        frame.render_widget(Paragraph::new("").style(Style::default().bg(BG)), area);
        return;
    };

    let (icon, style) = match status.kind {
        StatusKind::Success => ("✓ ", Style::default().fg(ACCENT)),
        StatusKind::Error => ("✗ ", Style::default().fg(ERROR)),
        StatusKind::Info => ("", Style::default().fg(Color::White)),
    };
    let width = area.width.saturating_sub(4) as usize;
    let lines = status_lines(&status.text)
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            let prefix = if index == 0 { icon } else { "  " };
            Line::from(Span::styled(
                format!("{prefix}{}", compact_text(&line, width)),
                style,
            ))
        })
        .collect::<Vec<_>>();
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(BG)),
        area,
    );
}

/// Non-empty lines of a status message, overflow folded into the last line.
fn status_lines(text: &str) -> Vec<String> {
    let mut lines = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();
    if lines.len() > MAX_STATUS_LINES {
        let overflow = lines.split_off(MAX_STATUS_LINES - 1).join(" | ");
        lines.push(overflow);
    }
    lines
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    push_powerline_segment(&mut spans, " keys ", Color::White, PL_C, BG);
    spans.push(Span::styled(
        format!(" {}", footer_hints(app.view())),
        Style::default().fg(MUTED),
    ));
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(BG)),
        area,
    );
}

fn footer_hints(view: View) -> &'static str {
    match view {
        View::MainMenu => "enter select • c create • b build • r refresh • ? help • q quit",
        View::ClusterList => {
            "enter/i info • n nodes • d delete • c create • l load • L logs • r refresh • esc back • ? help • q quit"
        }
        View::ClusterDetail | View::NodeList => "esc back • ? help • q quit",
        View::DeleteConfirm => {
            "←/→/tab select • enter confirm • y yes • n no • esc cancel • q quit"
        }
        View::CreateCluster | View::LoadImage | View::BuildImage | View::ExportLogs => {
            "enter confirm • esc cancel • ctrl+c quit"
        }
    }
}

fn render_help_modal(frame: &mut Frame, app: &App) {
    let area = centered_rect(70, 60, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(format!("ki help  view:{}", app.view().title())),
        Line::from(""),
    ];
    for line in help_lines() {
        lines.push(Line::from(line));
    }

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

fn help_lines() -> [&'static str; 8] {
    [
        "↑/k  ↓/j      move",
        "enter         select / confirm",
        "esc           back",
        "c  d  r       create  delete  refresh",
        "l  b  L       load image  build image  export logs",
        "n  i          show nodes  cluster info",
        "y  n  tab     delete dialog: yes  no  switch",
        "?  q          toggle help  quit",
    ]
}

fn push_powerline_segment(
    spans: &mut Vec<Span<'static>>,
    content: impl Into<String>,
    fg: Color,
    bg: Color,
    next_bg: Color,
) {
    spans.push(Span::styled(
        content.into(),
        Style::default().fg(fg).bg(bg).add_modifier(Modifier::BOLD),
    ));
    spans.push(Span::styled("", Style::default().fg(bg).bg(next_bg)));
}

fn compact_text(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }

    if max_chars <= 1 {
        return "…".to_string();
    }

    let mut out = value
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    out.push('…');
    out
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

#[cfg(test)]
mod tests {
    use super::{compact_text, render, status_lines};
    use crate::app::{App, ResultMessage};
    use crate::input::Action;
    use crate::model::{Cluster, StatusMessage};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect::<String>()
    }

    #[test]
    fn compact_text_truncates_with_ellipsis() {
        assert_eq!(compact_text("abcdef", 4), "abc…");
        assert_eq!(compact_text("abc", 4), "abc");
    }

    #[test]
    fn process_output_is_shown_below_the_error() {
        let mut app = App::new();
        app.apply_result(ResultMessage::Status(StatusMessage::error(
            "failed to delete cluster: exit status: 1\nERROR: unknown cluster \"alpha\"",
        )));
        let screen = rendered(&app);
        assert!(screen.contains("✗ failed to delete cluster: exit status: 1"));
        assert!(screen.contains("ERROR: unknown cluster \"alpha\""));
    }

    #[test]
    fn long_status_folds_overflow_into_last_line() {
        let lines = status_lines("one\ntwo\n\nthree\nfour\nfive");
        assert_eq!(lines, vec!["one", "two", "three", "four | five"]);
    }

    #[test]
    fn node_view_reports_empty_result() {
        let mut app = App::new();
        app.apply_result(ResultMessage::ClusterList(vec![Cluster::running("alpha")]));
        app.apply_action(Action::Select);
        app.apply_action(Action::Nodes);
        assert!(rendered(&app).contains("Loading nodes..."));

        app.apply_result(ResultMessage::NodeList(Vec::new()));
        let screen = rendered(&app);
        assert!(screen.contains("No nodes found"));
        assert!(!screen.contains("Loading nodes..."));
    }

    #[test]
    fn node_view_stops_loading_after_failure() {
        let mut app = App::new();
        app.apply_result(ResultMessage::ClusterList(vec![Cluster::running("alpha")]));
        app.apply_action(Action::Select);
        app.apply_action(Action::Nodes);
        app.apply_result(ResultMessage::Status(StatusMessage::error(
            "failed to get nodes: exit status: 1",
        )));
        assert!(rendered(&app).contains("No nodes found"));
    }

    #[test]
    fn main_menu_lists_entries() {
        let screen = rendered(&App::new());
        assert!(screen.contains("List Clusters"));
        assert!(screen.contains("Export Logs"));
    }

    #[test]
    fn detail_view_shows_loading_until_result() {
        let mut app = App::new();
        app.apply_result(ResultMessage::ClusterList(vec![Cluster::running("alpha")]));
        app.apply_action(Action::Select);
        app.apply_action(Action::Detail);
        assert!(rendered(&app).contains("Loading cluster details..."));

        app.apply_result(ResultMessage::ClusterDetail(Cluster::running("alpha")));
        assert!(rendered(&app).contains("Cluster: alpha"));
    }

    #[test]
    fn delete_dialog_names_the_cluster() {
        let mut app = App::new();
        app.apply_result(ResultMessage::ClusterList(vec![Cluster::running("alpha")]));
        app.apply_action(Action::Select);
        app.apply_action(Action::Delete);
        assert!(rendered(&app).contains("Cluster Name: alpha"));
    }

    #[test]
    fn status_line_shows_error_marker() {
        let mut app = App::new();
        app.apply_result(ResultMessage::Status(StatusMessage::error("boom")));
        assert!(rendered(&app).contains("✗ boom"));
    }
}
