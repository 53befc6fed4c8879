use crate::core::{Assistant, Reply, TranscriptCache, TranscriptResult, VideoId, extract_video_id};
use crate::error::Result;
use crate::tui::components::{CachedEntry, CachedList, InputField, ProgressBar, ResultViewer};
use crate::tui::events::AppEvent;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub const HOME_OPTIONS: [&str; 3] = ["Summarize a Video", "Ask a Question", "Cached Transcripts"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Summarize,
    Ask,
}

/// Where the result viewer returns to on Esc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Form(Action),
    Cached,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Home,
    Form(Action),
    Processing { action: Action, video_id: VideoId },
    Viewer { origin: Origin },
    Cached,
}

/// Progress reported by a background job.
#[derive(Debug)]
pub enum ProcessingEvent {
    Progress(f64),
    Status(String),
    Log(String),
    /// A freshly fetched transcript, for the session cache.
    Transcript {
        video_id: VideoId,
        result: TranscriptResult,
    },
    Finished(Reply),
}

struct Job {
    id: u64,
    action: Action,
    video_id: VideoId,
    cached: Option<TranscriptResult>,
    translate: bool,
    question: String,
}

pub struct App {
    pub state: AppState,
    pub should_quit: bool,
    pub status_line: String,

    // Home screen
    pub selected_option: usize,

    // Forms
    pub url_input: InputField,
    pub question_input: InputField,
    pub translate: bool,
    pub input_focus: usize,

    // Cached transcripts screen
    pub cached_list: CachedList,

    // Viewer screen
    pub viewer: Option<ResultViewer>,

    // Processing screen
    pub progress_bar: ProgressBar,

    assistant: Assistant,
    cache: TranscriptCache,

    // Async communication
    processing_tx: mpsc::UnboundedSender<(u64, ProcessingEvent)>,
    processing_rx: mpsc::UnboundedReceiver<(u64, ProcessingEvent)>,
    task: Option<JoinHandle<()>>,
    current_job: u64,
}

impl App {
    pub fn new(assistant: Assistant, status_line: String) -> Self {
        let (processing_tx, processing_rx) = mpsc::unbounded_channel();

        Self {
            state: AppState::Home,
            should_quit: false,
            status_line,

            selected_option: 0,

            url_input: InputField::new("Video URL", "https://www.youtube.com/watch?v=..."),
            question_input: InputField::new("Question", "What is this video about?"),
            translate: true,
            input_focus: 0,

            cached_list: CachedList::new(Vec::new()),
            viewer: None,
            progress_bar: ProgressBar::new(),

            assistant,
            cache: TranscriptCache::new(),

            processing_tx,
            processing_rx,
            task: None,
            current_job: 0,
        }
    }

    pub fn cache(&self) -> &TranscriptCache {
        &self.cache
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::Quit => self.quit(),
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Mouse(mouse) => self.handle_mouse(mouse),
            AppEvent::Tick => self.handle_tick(),
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match self.state.clone() {
            AppState::Home => self.handle_home_key(key),
            AppState::Form(action) => self.handle_form_key(action, key),
            AppState::Processing { action, .. } => self.handle_processing_key(action, key),
            AppState::Viewer { origin } => self.handle_viewer_key(origin, key),
            AppState::Cached => self.handle_cached_key(key),
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match self.state {
            AppState::Viewer { .. } => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.handle_mouse(mouse);
                }
            }
            AppState::Cached => {
                self.cached_list.handle_mouse(mouse);
            }
            _ => {}
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.selected_option = self.selected_option.saturating_sub(1),
            KeyCode::Down => {
                self.selected_option = (self.selected_option + 1).min(HOME_OPTIONS.len() - 1);
            }
            KeyCode::Char('1') => self.selected_option = 0,
            KeyCode::Char('2') => self.selected_option = 1,
            KeyCode::Char('3') => self.selected_option = 2,
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Enter => match self.selected_option {
                0 => self.open_form(Action::Summarize),
                1 => self.open_form(Action::Ask),
                _ => self.open_cached(),
            },
            _ => {}
        }
    }

    fn handle_form_key(&mut self, action: Action, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.set_focus(None);
                self.state = AppState::Home;
            }
            KeyCode::Tab => self.set_focus(Some((self.input_focus + 1) % 2)),
            KeyCode::Enter if action == Action::Ask && self.input_focus == 0 => {
                self.set_focus(Some(1));
            }
            KeyCode::Enter => self.start_processing(action),
            KeyCode::Char(' ') if action == Action::Summarize && self.input_focus == 1 => {
                self.translate = !self.translate;
            }
            _ => match (action, self.input_focus) {
                (_, 0) => {
                    self.url_input.handle_key(key);
                }
                (Action::Ask, _) => {
                    self.question_input.handle_key(key);
                }
                _ => {}
            },
        }
    }

    fn handle_processing_key(&mut self, action: Action, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            if let Some(task) = self.task.take() {
                task.abort();
            }
            // Anything the aborted job already queued is now stale.
            self.current_job += 1;
            info!("processing cancelled");
            self.progress_bar.reset();
            self.state = AppState::Form(action);
        }
    }

    fn handle_viewer_key(&mut self, origin: Origin, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => match origin {
                Origin::Form(action) => self.state = AppState::Form(action),
                Origin::Cached => self.open_cached(),
            },
            _ => {
                if let Some(viewer) = &mut self.viewer {
                    viewer.handle_key(key);
                }
            }
        }
    }

    fn handle_cached_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state = AppState::Home,
            KeyCode::Enter => {
                let reply = self.cached_list.get_selected().and_then(|entry| {
                    let result = self.cache.get(&entry.video_id)?;
                    Some(Reply::transcript(&entry.video_id, result))
                });
                if let Some(reply) = reply {
                    self.show_reply(&reply, Origin::Cached);
                }
            }
            KeyCode::Delete | KeyCode::Char('d') => {
                if let Some(entry) = self.cached_list.get_selected() {
                    let video_id = entry.video_id.clone();
                    self.cache.remove(&video_id);
                    info!("forgot cached transcript for {video_id}");
                    self.refresh_cached_list();
                }
            }
            _ => {
                self.cached_list.handle_key(key);
            }
        }
    }

    fn handle_tick(&mut self) {
        let mut events = Vec::new();
        while let Ok(event) = self.processing_rx.try_recv() {
            events.push(event);
        }

        for (job, event) in events {
            match event {
                // Transcripts are kept even from cancelled jobs.
                ProcessingEvent::Transcript { video_id, result } => {
                    if !self.cache.insert(video_id.clone(), result) {
                        debug!("not caching exhausted fetch for {video_id}");
                    }
                }
                _ if job != self.current_job => {}
                ProcessingEvent::Progress(progress) => self.progress_bar.set_progress(progress),
                ProcessingEvent::Status(status) => self.progress_bar.set_message(status),
                ProcessingEvent::Log(log) => self.progress_bar.add_log(log),
                ProcessingEvent::Finished(reply) => {
                    self.task = None;
                    if let AppState::Processing { action, .. } = self.state {
                        self.show_reply(&reply, Origin::Form(action));
                    }
                }
            }
        }
    }

    fn open_form(&mut self, action: Action) {
        self.state = AppState::Form(action);
        self.set_focus(Some(0));
    }

    fn open_cached(&mut self) {
        self.refresh_cached_list();
        self.state = AppState::Cached;
    }

    fn refresh_cached_list(&mut self) {
        self.cached_list
            .update_items(CachedEntry::from_cache(&self.cache));
    }

    fn set_focus(&mut self, focus: Option<usize>) {
        self.input_focus = focus.unwrap_or(0);
        self.url_input.focused = focus == Some(0);
        self.question_input.focused = focus == Some(1);
    }

    fn show_reply(&mut self, reply: &Reply, origin: Origin) {
        self.viewer = Some(ResultViewer::from_reply(reply));
        self.state = AppState::Viewer { origin };
    }

    fn start_processing(&mut self, action: Action) {
        let Some(video_id) = extract_video_id(&self.url_input.value) else {
            self.show_reply(&Reply::invalid_url(), Origin::Form(action));
            return;
        };

        if action == Action::Ask && !self.question_input.is_valid() {
            self.show_reply(&Reply::failure("Please enter a question."), Origin::Form(action));
            return;
        }

        self.current_job += 1;
        let job = Job {
            id: self.current_job,
            action,
            video_id: video_id.clone(),
            cached: self.cache.get(&video_id).cloned(),
            translate: self.translate,
            question: self.question_input.value.trim().to_string(),
        };

        self.progress_bar.reset();
        self.progress_bar.set_message("Starting...".to_string());
        self.state = AppState::Processing { action, video_id };

        let assistant = self.assistant.clone();
        let tx = self.processing_tx.clone();
        self.task = Some(tokio::spawn(run_job(assistant, job, tx)));
    }

    fn quit(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.should_quit = true;
    }
}

async fn run_job(
    assistant: Assistant,
    job: Job,
    tx: mpsc::UnboundedSender<(u64, ProcessingEvent)>,
) {
    let send = |event: ProcessingEvent| {
        let _ = tx.send((job.id, event));
    };

    send(ProcessingEvent::Status("Fetching transcript...".to_string()));
    send(ProcessingEvent::Progress(0.1));

    let transcript = match job.cached {
        Some(result) => {
            send(ProcessingEvent::Log("Using transcript from this session".to_string()));
            result
        }
        None => {
            send(ProcessingEvent::Log(format!("Fetching transcript for {}", job.video_id)));
            let result = assistant.fetch_transcript(&job.video_id).await;
            send(ProcessingEvent::Transcript {
                video_id: job.video_id.clone(),
                result: result.clone(),
            });
            result
        }
    };

    let transcript = match transcript {
        Ok(transcript) => transcript,
        Err(err) => {
            send(ProcessingEvent::Log(format!("Transcript unavailable: {err}")));
            send(ProcessingEvent::Finished(Reply::failure(err)));
            return;
        }
    };

    send(ProcessingEvent::Progress(0.5));
    send(ProcessingEvent::Log(format!(
        "Transcript ready ({} words)",
        transcript.split_whitespace().count()
    )));

    let reply = match job.action {
        Action::Summarize => {
            send(ProcessingEvent::Status("Summarizing...".to_string()));
            assistant
                .summarize_transcript(&transcript, job.translate)
                .await
        }
        Action::Ask => {
            send(ProcessingEvent::Status("Answering...".to_string()));
            assistant.answer(&transcript, &job.question).await
        }
    };

    send(ProcessingEvent::Progress(1.0));
    send(ProcessingEvent::Status("Completed".to_string()));
    send(ProcessingEvent::Finished(reply));
}
