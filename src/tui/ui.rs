use crate::tui::app::{Action, App, AppState, HOME_OPTIONS};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};

pub fn draw(f: &mut Frame, app: &mut App) {
    match app.state.clone() {
        AppState::Home => draw_home(f, app),
        AppState::Form(action) => draw_form(f, app, action),
        AppState::Processing { action, video_id } => {
            let subject = match action {
                Action::Summarize => format!("Summarizing video {video_id}"),
                Action::Ask => format!("Answering a question about video {video_id}"),
            };
            draw_processing(f, app, &subject);
        }
        AppState::Viewer { .. } => draw_viewer(f, app),
        AppState::Cached => draw_cached(f, app),
    }
}

fn title_bar(f: &mut Frame, area: Rect, title: &str) {
    let title = Paragraph::new(title.to_string())
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn help_bar(f: &mut Frame, area: Rect, help: &str) {
    let help = Paragraph::new(help.to_string())
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}

fn draw_home(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(1),    // Menu
            Constraint::Length(1), // Settings summary
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    title_bar(f, chunks[0], "YouTube Video Summarizer & Q&A");

    let menu_items: Vec<ListItem> = HOME_OPTIONS
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let (bullet, style) = if i == app.selected_option {
                (
                    "●",
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ("○", Style::default().fg(Color::White))
            };

            ListItem::new(Line::from(Span::styled(format!("{bullet} {option}"), style)))
        })
        .collect();

    let menu = List::new(menu_items).block(Block::default().borders(Borders::ALL).title("Mode"));
    f.render_widget(menu, chunks[1]);

    let cached = if app.cache().is_empty() {
        "nothing cached yet".to_string()
    } else {
        format!("{} cached", app.cache().len())
    };
    let summary = Paragraph::new(format!("{} · {cached}", app.status_line))
    .style(Style::default().fg(Color::DarkGray))
    .alignment(Alignment::Center);
    f.render_widget(summary, chunks[2]);

    help_bar(f, chunks[3], "[↑↓] Navigate  [Enter] Select  [q] Exit");
}

fn draw_form(f: &mut Frame, app: &mut App, action: Action) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // URL input
            Constraint::Length(3), // Question input or options
            Constraint::Min(0),
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    match action {
        Action::Summarize => {
            title_bar(f, chunks[0], "Summarize a Video");
            app.url_input.render(f, chunks[1]);

            let style = if app.input_focus == 1 {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            let checkbox = if app.translate { "☑" } else { "☐" };
            let options = Paragraph::new(format!("{checkbox} Translate summary to English"))
                .style(style)
                .block(Block::default().borders(Borders::ALL).title("Options"));
            f.render_widget(options, chunks[2]);

            help_bar(
                f,
                chunks[4],
                "[Enter] Summarize  [Tab] Next  [Space] Toggle  [Esc] Back",
            );
        }
        Action::Ask => {
            title_bar(f, chunks[0], "Ask a Question");
            app.url_input.render(f, chunks[1]);
            app.question_input.render(f, chunks[2]);
            help_bar(f, chunks[4], "[Enter] Next / Ask  [Tab] Next  [Esc] Back");
        }
    }
}

fn draw_processing(f: &mut Frame, app: &App, subject: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(1),    // Progress area
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    title_bar(f, chunks[0], "Processing...");
    app.progress_bar.render(f, chunks[1], subject);
    help_bar(f, chunks[2], "[Esc] Cancel");
}

fn draw_viewer(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(f.area());

    if let Some(viewer) = &mut app.viewer {
        viewer.render(f, chunks[0]);
    }

    help_bar(
        f,
        chunks[1],
        "[↑↓] Scroll  [PgUp/PgDn] Page  [Home/End] Top/Bottom  [Esc] Back",
    );
}

fn draw_cached(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(f.area());

    if app.cached_list.items.is_empty() {
        let empty = Paragraph::new("No transcripts fetched in this session yet.")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Cached Transcripts"),
            );
        f.render_widget(empty, chunks[0]);
    } else {
        app.cached_list.render(f, chunks[0], "Cached Transcripts");
    }

    help_bar(f, chunks[1], "[Enter] Open  [d/Del] Forget  [↑↓] Navigate  [Esc] Back");
}
