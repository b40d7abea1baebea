//! Lightweight markdown-to-styled-text conversion for bot replies.
//!
//! Covers the constructs the server emits: headings, bullet points, bold,
//! italic, inline code, and links. Unterminated markers render literally.

use std::iter::Peekable;
use std::str::Chars;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Render a markdown block into one styled line per source line.
pub fn render_lines(text: &str) -> Vec<Line<'static>> {
    text.lines().map(render_line).collect()
}

fn render_line(line: &str) -> Line<'static> {
    // Headings: one to six leading '#' followed by a space
    let hashes = line.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&hashes) {
        if let Some(rest) = line[hashes..].strip_prefix(' ') {
            let style = Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD);
            return Line::from(parse_inline(rest, style));
        }
    }

    // Bullet points: "- item" or "* item"
    if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
        let mut spans = vec![Span::raw("• ")];
        spans.extend(parse_inline(rest, Style::default()));
        return Line::from(spans);
    }

    Line::from(parse_inline(line, Style::default()))
}

/// Parse inline markup into styled spans against a base style.
fn parse_inline(text: &str, base: Style) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    take_run(&mut spans, &mut current, &mut chars, base, Delim::Bold);
                } else {
                    take_run(&mut spans, &mut current, &mut chars, base, Delim::Italic);
                }
            }
            '`' => {
                take_run(&mut spans, &mut current, &mut chars, base, Delim::Code);
            }
            '[' => {
                let mut attempt = chars.clone();
                if let Some((label, url)) = parse_link(&mut attempt) {
                    flush(&mut spans, &mut current, base);
                    spans.push(Span::styled(
                        label,
                        base.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                    ));
                    spans.push(Span::styled(
                        format!(" ({url})"),
                        Style::default().fg(Color::DarkGray),
                    ));
                    chars = attempt;
                } else {
                    current.push('[');
                }
            }
            _ => current.push(c),
        }
    }

    flush(&mut spans, &mut current, base);
    spans
}

#[derive(Clone, Copy)]
enum Delim {
    Bold,
    Italic,
    Code,
}

/// Consume a delimited run. When the closing delimiter is missing the
/// markers are restored as literal text.
fn take_run(
    spans: &mut Vec<Span<'static>>,
    current: &mut String,
    chars: &mut Peekable<Chars<'_>>,
    base: Style,
    delim: Delim,
) {
    let mut inner = String::new();
    let mut closed = false;

    while let Some(c) = chars.next() {
        match delim {
            Delim::Bold => {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    closed = true;
                    break;
                }
            }
            Delim::Italic => {
                if c == '*' {
                    closed = true;
                    break;
                }
            }
            Delim::Code => {
                if c == '`' {
                    closed = true;
                    break;
                }
            }
        }
        inner.push(c);
    }

    if closed && !inner.is_empty() {
        flush(spans, current, base);
        let style = match delim {
            Delim::Bold => base.add_modifier(Modifier::BOLD),
            Delim::Italic => base.add_modifier(Modifier::ITALIC),
            Delim::Code => base.fg(Color::Yellow),
        };
        spans.push(Span::styled(inner, style));
    } else {
        let marker = match delim {
            Delim::Bold => "**",
            Delim::Italic => "*",
            Delim::Code => "`",
        };
        current.push_str(marker);
        current.push_str(&inner);
        if closed {
            // Empty run, e.g. "**" alone: keep the closer literal too
            current.push_str(marker);
        }
    }
}

fn parse_link(chars: &mut Peekable<Chars<'_>>) -> Option<(String, String)> {
    let mut label = String::new();
    loop {
        match chars.next()? {
            ']' => break,
            c => label.push(c),
        }
    }
    if chars.next()? != '(' {
        return None;
    }
    let mut url = String::new();
    loop {
        match chars.next()? {
            ')' => break,
            c => url.push(c),
        }
    }
    if label.is_empty() {
        None
    } else {
        Some((label, url))
    }
}

fn flush(spans: &mut Vec<Span<'static>>, current: &mut String, base: Style) {
    if !current.is_empty() {
        spans.push(Span::styled(std::mem::take(current), base));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_of(line: &str) -> Vec<Span<'static>> {
        render_line(line).spans
    }

    #[test]
    fn test_plain_text_passes_through() {
        let spans = spans_of("just text");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "just text");
        assert_eq!(spans[0].style, Style::default());
    }

    #[test]
    fn test_bold_gets_modifier() {
        let spans = spans_of("**ok**");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "ok");
        assert!(spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_bold_inside_sentence() {
        let spans = spans_of("this is **bold** text");
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].content, "this is ");
        assert_eq!(spans[1].content, "bold");
        assert!(spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(spans[2].content, " text");
    }

    #[test]
    fn test_italic_gets_modifier() {
        let spans = spans_of("an *italic* word");
        assert_eq!(spans[1].content, "italic");
        assert!(spans[1].style.add_modifier.contains(Modifier::ITALIC));
    }

    #[test]
    fn test_unterminated_bold_is_literal() {
        let spans = spans_of("**oops");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "**oops");
    }

    #[test]
    fn test_inline_code() {
        let spans = spans_of("run `cargo` now");
        assert_eq!(spans[1].content, "cargo");
        assert_eq!(spans[1].style.fg, Some(Color::Yellow));
    }

    #[test]
    fn test_heading_is_bold() {
        let line = render_line("## Section");
        assert_eq!(line.spans[0].content, "Section");
        assert!(line.spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_hashes_without_space_are_literal() {
        let spans = spans_of("#hashtag");
        assert_eq!(spans[0].content, "#hashtag");
        assert!(!spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_bullet_prefix() {
        let line = render_line("- first point");
        assert_eq!(line.spans[0].content, "• ");
        assert_eq!(line.spans[1].content, "first point");
    }

    #[test]
    fn test_bullet_with_bold() {
        let line = render_line("* a **strong** point");
        assert_eq!(line.spans[0].content, "• ");
        assert_eq!(line.spans[2].content, "strong");
        assert!(line.spans[2].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_link_renders_label_and_url() {
        let spans = spans_of("see [example](https://example.com) here");
        assert_eq!(spans[1].content, "example");
        assert!(spans[1].style.add_modifier.contains(Modifier::UNDERLINED));
        assert_eq!(spans[2].content, " (https://example.com)");
        assert_eq!(spans[3].content, " here");
    }

    #[test]
    fn test_bracket_without_link_is_literal() {
        let spans = spans_of("a [note to self");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].content, "a [note to self");
    }

    #[test]
    fn test_multiline_block() {
        let lines = render_lines("# Title\n\n- one\n- two");
        assert_eq!(lines.len(), 4);
        assert!(lines[1].spans.is_empty());
        assert_eq!(lines[2].spans[0].content, "• ");
    }
}
