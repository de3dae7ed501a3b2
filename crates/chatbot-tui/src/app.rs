use std::sync::Arc;
use chatbot_core::{BackendError, ChatBackend, ChatSession, InputKey, Submission};
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use crate::tui::{self, AppEvent};

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub session: ChatSession,
    pub endpoint: String,

    // Input state (cursor is a char index into the session's input buffer)
    pub cursor: usize,

    // Transcript viewport
    pub transcript_scroll: u16,
    pub transcript_height: u16,
    pub transcript_lines: u16,
    drawn_revision: u64,

    // Animated ellipsis on the pending answer
    pub animation_frame: u8,

    // Areas for mouse hit-testing, filled in by the renderer
    pub transcript_area: Option<Rect>,
    pub submit_area: Option<Rect>,

    backend: Arc<dyn ChatBackend>,
    events: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        backend: Arc<dyn ChatBackend>,
        endpoint: &str,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            should_quit: false,
            session: ChatSession::new(),
            endpoint: endpoint.to_string(),

            cursor: 0,

            transcript_scroll: 0,
            transcript_height: 0,
            transcript_lines: 0,
            drawn_revision: 0,

            animation_frame: 0,

            transcript_area: None,
            submit_area: None,

            backend,
            events,
        }
    }

    /// The input box is disabled while a request is in flight
    pub fn input_enabled(&self) -> bool {
        !self.session.is_submitting()
    }

    /// Submit the input buffer, as if Enter was pressed
    pub fn commit(&mut self) {
        if let Some(submission) = self.session.on_key_commit(InputKey::Enter) {
            self.animation_frame = 0;
            self.dispatch(submission);
        }
    }

    /// Run the backend call off the event loop and report the outcome back as
    /// `AppEvent::Reply`. A request task that panics still produces a reply,
    /// so the session is never left busy.
    fn dispatch(&self, submission: Submission) {
        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();

        tokio::spawn(async move {
            let request = tokio::spawn(tui::isolate_request(async move {
                submission.send(backend.as_ref()).await
            }));
            let outcome = match request.await {
                Ok(outcome) => outcome,
                Err(err) => Err(BackendError::TaskFailed(err.to_string())),
            };
            if events.send(AppEvent::Reply(outcome)).is_err() {
                tracing::debug!("event loop closed before the reply arrived");
            }
        });
    }

    pub fn on_reply(&mut self, outcome: Result<String, BackendError>) {
        self.session.resolve(outcome);
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_submitting() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Input editing
    pub fn insert_char(&mut self, c: char) {
        let mut text = self.session.input().to_string();
        let byte_pos = char_to_byte_index(&text, self.cursor);
        text.insert(byte_pos, c);
        self.session.update_input(text);
        self.cursor += 1;
    }

    pub fn delete_before_cursor(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.delete_at_cursor();
        }
    }

    pub fn delete_at_cursor(&mut self) {
        let mut text = self.session.input().to_string();
        if self.cursor < text.chars().count() {
            let byte_pos = char_to_byte_index(&text, self.cursor);
            text.remove(byte_pos);
            self.session.update_input(text);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.session.input().chars().count();
        self.cursor = (self.cursor + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.session.input().chars().count();
    }

    /// Record the transcript's rendered size. Jumps to the newest entry when
    /// the transcript changed since the last draw, otherwise keeps the user's
    /// scroll position within bounds.
    pub fn sync_transcript_viewport(&mut self, total_lines: u16, visible_height: u16) {
        self.transcript_lines = total_lines;
        self.transcript_height = visible_height;

        let revision = self.session.revision();
        if revision != self.drawn_revision {
            self.drawn_revision = revision;
            self.transcript_scroll = self.max_transcript_scroll();
        } else {
            self.transcript_scroll = self.transcript_scroll.min(self.max_transcript_scroll());
        }
    }

    fn max_transcript_scroll(&self) -> u16 {
        self.transcript_lines.saturating_sub(self.transcript_height)
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.transcript_scroll = self
            .transcript_scroll
            .saturating_add(lines)
            .min(self.max_transcript_scroll());
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.transcript_height / 2).max(1));
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.transcript_height / 2).max(1));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;

    pub(crate) struct EchoBackend;

    #[async_trait]
    impl ChatBackend for EchoBackend {
        async fn ask(&self, query: &str) -> Result<String, BackendError> {
            Ok(format!("echo: {query}"))
        }
    }

    pub(crate) fn test_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(Arc::new(EchoBackend), "http://localhost:8000/chat", tx);
        (app, rx)
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        assert_eq!(char_to_byte_index("héllo", 0), 0);
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("héllo", 10), 6);
    }

    #[test]
    fn test_insert_and_delete_around_cursor() {
        let (mut app, _rx) = test_app();
        for c in "hllo".chars() {
            app.insert_char(c);
        }
        app.cursor_home();
        app.cursor_right();
        app.insert_char('é');
        assert_eq!(app.session.input(), "héllo");
        assert_eq!(app.cursor, 2);

        app.delete_before_cursor();
        assert_eq!(app.session.input(), "hllo");
        assert_eq!(app.cursor, 1);

        app.delete_at_cursor();
        assert_eq!(app.session.input(), "hlo");

        app.cursor_end();
        app.delete_at_cursor();
        assert_eq!(app.session.input(), "hlo");
        assert_eq!(app.cursor, 3);
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let (mut app, _rx) = test_app();
        app.cursor_left();
        assert_eq!(app.cursor, 0);
        app.insert_char('a');
        app.cursor_right();
        app.cursor_right();
        assert_eq!(app.cursor, 1);
    }

    #[tokio::test]
    async fn test_commit_round_trip_through_event_channel() {
        let (mut app, mut rx) = test_app();
        app.session.update_input("hello");

        app.commit();
        assert!(app.session.is_submitting());
        assert!(!app.input_enabled());
        assert_eq!(app.session.transcript().len(), 1);

        match rx.recv().await {
            Some(AppEvent::Reply(outcome)) => app.on_reply(outcome),
            other => panic!("expected reply, got {:?}", other),
        }

        assert!(app.input_enabled());
        assert_eq!(app.session.transcript()[0].response(), "echo: hello");
    }

    #[tokio::test]
    async fn test_commit_with_blank_input_sends_nothing() {
        let (mut app, mut rx) = test_app();
        app.session.update_input("   ");
        app.commit();

        assert!(app.session.transcript().is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_viewport_follows_new_entries() {
        let (mut app, _rx) = test_app();
        app.sync_transcript_viewport(5, 10);
        assert_eq!(app.transcript_scroll, 0);

        let _submission = app.session.begin("q").unwrap();
        app.sync_transcript_viewport(30, 10);
        assert_eq!(app.transcript_scroll, 20);

        // Manual scroll holds until the transcript changes again
        app.scroll_up(5);
        app.sync_transcript_viewport(30, 10);
        assert_eq!(app.transcript_scroll, 15);

        app.on_reply(Ok("answer".to_string()));
        app.sync_transcript_viewport(32, 10);
        assert_eq!(app.transcript_scroll, 22);
    }

    #[test]
    fn test_scroll_down_is_clamped() {
        let (mut app, _rx) = test_app();
        app.sync_transcript_viewport(12, 10);
        app.scroll_down(50);
        assert_eq!(app.transcript_scroll, 2);
        app.scroll_half_page_up();
        assert_eq!(app.transcript_scroll, 0);
    }

    #[test]
    fn test_tick_only_animates_while_submitting() {
        let (mut app, _rx) = test_app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);

        let _submission = app.session.begin("q").unwrap();
        app.tick_animation();
        app.tick_animation();
        assert_eq!(app.animation_frame, 2);
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
    }
}
