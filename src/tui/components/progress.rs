use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};
use std::collections::VecDeque;

const MAX_LOGS: usize = 10;

/// Gauge, status line and a short timestamped log for a running action.
#[derive(Debug, Default)]
pub struct ProgressBar {
    pub progress: f64,
    pub message: String,
    pub logs: VecDeque<String>,
}

impl ProgressBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_progress(&mut self, progress: f64) {
        self.progress = progress.clamp(0.0, 1.0);
    }

    pub fn set_message(&mut self, message: String) {
        self.message = message;
    }

    pub fn add_log(&mut self, log: String) {
        let timestamp = chrono::Local::now().format("%H:%M:%S");
        self.logs.push_back(format!("[{timestamp}] {log}"));

        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, subject: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Subject
                Constraint::Length(3), // Gauge
                Constraint::Length(2), // Status
                Constraint::Min(1),    // Logs
            ])
            .split(area);

        let subject = Paragraph::new(subject.to_string()).style(Style::default().fg(Color::White));
        f.render_widget(subject, chunks[0]);

        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(Color::Green))
            .percent((self.progress * 100.0) as u16);
        f.render_widget(gauge, chunks[1]);

        let status = Paragraph::new(format!("Status: {}", self.message))
            .style(Style::default().fg(Color::Yellow));
        f.render_widget(status, chunks[2]);

        let log_lines: Vec<Line> = self
            .logs
            .iter()
            .map(|log| Line::from(Span::raw(log.as_str())))
            .collect();
        let logs =
            Paragraph::new(log_lines).block(Block::default().borders(Borders::ALL).title("Log"));
        f.render_widget(logs, chunks[3]);
    }

    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.message.clear();
        self.logs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_clamped() {
        let mut bar = ProgressBar::new();
        bar.set_progress(1.7);
        assert_eq!(bar.progress, 1.0);
        bar.set_progress(-0.3);
        assert_eq!(bar.progress, 0.0);
    }

    #[test]
    fn keeps_only_recent_logs() {
        let mut bar = ProgressBar::new();
        for i in 0..(MAX_LOGS + 3) {
            bar.add_log(format!("step {i}"));
        }
        assert_eq!(bar.logs.len(), MAX_LOGS);
        assert!(bar.logs.front().unwrap().ends_with("step 3"));
        assert!(bar.logs.back().unwrap().starts_with('['));
    }
}
