use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use chatbot_core::{ChatSession, ExchangeState};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};
use crate::app::App;

const QUERY_PREFIX: &str = "Q: ";
const ANSWER_PREFIX: &str = "Ans: ";
const SUBMIT_LABEL: &str = "Submit";
const PROCESSING_LABEL: &str = "Processing...";

/// Split text into alternating runs of whitespace and non-whitespace
fn split_runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (i, c) in text.char_indices() {
        let space = c.is_whitespace();
        if in_space.is_some_and(|prev| prev != space) {
            runs.push(&text[start..i]);
            start = i;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        runs.push(&text[start..]);
    }
    runs
}

/// Wrap text to fit within a given display width, returning multiple lines.
/// Breaks on word boundaries and keeps spacing between words as typed; a word
/// wider than the line is split across lines. Width is measured in terminal
/// columns, so wide characters count double.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for run in split_runs(text) {
        let run_width = run.width();

        if current_width + run_width <= width {
            current_line.push_str(run);
            current_width += run_width;
            continue;
        }

        if run.starts_with(char::is_whitespace) {
            // Whitespace at a line break is dropped
            if current_width > 0 {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            continue;
        }

        // Word doesn't fit, start new line
        if current_width > 0 {
            lines.push(std::mem::take(&mut current_line).trim_end().to_string());
            current_width = 0;
        }

        if run_width <= width {
            current_line.push_str(run);
            current_width = run_width;
            continue;
        }

        // Hard-split words that can never fit
        for c in run.chars() {
            let char_width = c.width().unwrap_or(0);
            if current_width > 0 && current_width + char_width > width {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            current_line.push(c);
            current_width += char_width;
        }
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Lay out the transcript as display lines for a viewport `width` columns wide.
/// Every exchange becomes a `Q:` block, an `Ans:` block, and a blank separator.
fn transcript_lines(session: &ChatSession, width: usize, animation_frame: u8) -> Vec<Line<'static>> {
    let query_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let mut lines: Vec<Line<'static>> = Vec::new();

    for exchange in session.transcript() {
        for line in wrap_text_to_width(&format!("{}{}", QUERY_PREFIX, exchange.query()), width) {
            lines.push(Line::from(Span::styled(line, query_style)));
        }

        let (response, answer_style) = match exchange.state() {
            // Animated ellipsis: cycles through ".", "..", "..."
            ExchangeState::Pending => (
                ".".repeat(animation_frame as usize + 1),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
            ExchangeState::Answered => (exchange.response().to_string(), Style::default()),
            ExchangeState::Failed => (exchange.response().to_string(), Style::default().fg(Color::Red)),
        };

        // Multi-line answers keep their line breaks; only the first line is prefixed
        for (i, paragraph) in response.lines().enumerate() {
            let text = if i == 0 {
                format!("{}{}", ANSWER_PREFIX, paragraph)
            } else {
                paragraph.to_string()
            };
            for line in wrap_text_to_width(&text, width) {
                lines.push(Line::from(Span::styled(line, answer_style)));
            }
        }
        if response.is_empty() {
            lines.push(Line::from(Span::styled(ANSWER_PREFIX.trim_end().to_string(), answer_style)));
        }

        lines.push(Line::default());
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, input row, footer
    let [header_area, transcript_area, input_row, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    let [input_area, submit_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(PROCESSING_LABEL.len() as u16 + 4),
    ])
    .areas(input_row);

    // Store areas for mouse hit-testing
    app.transcript_area = Some(transcript_area);
    app.submit_area = Some(submit_area);

    render_header(app, frame, header_area);
    render_transcript(app, frame, transcript_area);
    render_input(app, frame, input_area);
    render_submit_button(app, frame, submit_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(" Welcome to the Chatbot ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(format!("[{}]", app.endpoint), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Chat ");

    // Inner size minus borders
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2);

    let text = if app.session.transcript().is_empty() {
        Text::from(Span::styled(
            "Ask a question to get started...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Text::from(transcript_lines(&app.session, inner_width, app.animation_frame))
    };

    let total_lines = u16::try_from(text.lines.len()).unwrap_or(u16::MAX);
    app.sync_transcript_viewport(total_lines, inner_height);

    let transcript = Paragraph::new(text)
        .block(block)
        .scroll((app.transcript_scroll, 0));

    frame.render_widget(transcript, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let enabled = app.input_enabled();
    let border_color = if enabled { Color::Yellow } else { Color::DarkGray };
    let text_color = if enabled { Color::Cyan } else { Color::DarkGray };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Enter your query ");

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.cursor;

    // Scroll offset keeps the cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app.session.input()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(text_color))
        .block(input_block);

    frame.render_widget(input, area);

    if enabled && inner_width > 0 {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_submit_button(app: &App, frame: &mut Frame, area: Rect) {
    let (label, style) = if app.session.is_submitting() {
        (PROCESSING_LABEL, Style::default().fg(Color::DarkGray))
    } else {
        (SUBMIT_LABEL, Style::default().fg(Color::White).bg(Color::Blue).bold())
    };

    let button = Paragraph::new(Line::from(label).centered())
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style));

    frame.render_widget(button, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mode = if app.session.is_submitting() {
        Span::styled(" WAITING ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        Span::styled(" READY ", Style::default().bg(Color::Blue).fg(Color::White))
    };

    let mut spans = vec![mode, Span::raw(" ")];
    for (key, label) in [
        ("Enter", "submit"),
        ("↑/↓", "scroll"),
        ("PgUp/PgDn", "page"),
        ("Esc", "quit"),
    ] {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
