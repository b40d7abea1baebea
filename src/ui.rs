use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use crate::app::{App, Sender};
use crate::markdown;

pub fn render(app: &mut App, frame: &mut Frame) {
    let [chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_transcript(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(frame, footer_area);
}

fn render_transcript(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store inner dimensions for scroll calculations (minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" charla — {} ", app.client.base_url()));

    let mut lines: Vec<Line> = Vec::new();

    for msg in &app.transcript {
        match msg.sender {
            Sender::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in msg.text.lines() {
                    lines.push(Line::from(line.to_string()));
                }
                lines.push(Line::default());
            }
            Sender::Bot => {
                lines.push(Line::from(Span::styled(
                    "Bot:",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )));
                lines.extend(markdown::render_lines(&msg.text));
                lines.push(Line::default());
            }
            Sender::System => {
                lines.push(Line::from(Span::styled(
                    msg.text.clone(),
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                )));
                lines.push(Line::default());
            }
        }
    }

    if app.loading && app.config.show_spinner {
        lines.push(Line::from(Span::styled(
            "Bot:",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.scroll, 0));

    frame.render_widget(chat, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Message (Enter to send) ");

    // Horizontal scroll keeps the cursor visible in a narrow box.
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    let cursor_x = (cursor_pos - scroll_offset) as u16;
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let hints = Line::from(Span::styled(
        " Enter send · Esc stop · Ctrl-R reset · Ctrl-C quit ",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(hints), area);
}
