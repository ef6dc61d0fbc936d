use crate::app::App;
use crate::i18n::t;
use crate::select::is_video_link;
use crate::types::{AppMode, ScrollPhase};
use crate::utils::{decode_url, truncate_width};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    if app.mode == AppMode::Bookmarks {
        render_bookmark_list(f, app, chunks[0]);
    } else {
        render_feed(f, app, chunks[0]);
    }
    render_status_bar(f, app, chunks[1]);
    render_hints(f, app, chunks[2]);
}

fn render_feed(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width.max(20) as usize;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        truncate_width(&app.page.title, width),
        Style::default().fg(Color::White).bold(),
    )));
    lines.push(Line::default());

    for item in &app.page.items {
        let caption = if item.caption.is_empty() {
            t!("feed.untitled").to_string()
        } else {
            item.caption.clone()
        };

        let (caption_style, href_style) = if item.marked {
            (
                Style::default().fg(Color::Black).bg(Color::Yellow).bold(),
                Style::default().fg(Color::Yellow),
            )
        } else if is_video_link(&item.href) {
            (
                Style::default().fg(Color::Cyan),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            (
                Style::default().fg(Color::Gray),
                Style::default().fg(Color::DarkGray),
            )
        };

        lines.push(Line::from(vec![
            Span::styled(format!("[{}] ", item.hint), Style::default().fg(Color::Green)),
            Span::styled(truncate_width(&caption, width.saturating_sub(5)), caption_style),
        ]));
        lines.push(Line::from(Span::styled(
            format!("     {}", truncate_width(&decode_url(&item.href), width.saturating_sub(5))),
            href_style,
        )));
        lines.push(Line::default());
    }

    let scroll = app.page.scroll_y.min(u16::MAX as u64) as u16;
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);
}

fn render_bookmark_list(f: &mut Frame, app: &App, area: Rect) {
    let width = area.width.max(20) as usize;
    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(
        t!("feed.bookmarks_title", count = app.bookmarks.len()).to_string(),
        Style::default().fg(Color::White).bold(),
    )));
    lines.push(Line::default());

    if app.bookmarks.is_empty() {
        lines.push(Line::from(Span::styled(
            t!("feed.no_bookmarks").to_string(),
            Style::default().fg(Color::Gray),
        )));
    } else {
        for (i, url) in app.bookmarks.items().iter().enumerate() {
            let style = if i == app.bookmark_cursor {
                Style::default().fg(Color::Black).bg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::Cyan)
            };
            lines.push(Line::from(Span::styled(
                truncate_width(&decode_url(url), width.saturating_sub(2)),
                style,
            )));
        }
    }

    // Keep the cursor line (two header lines above it) inside the pane.
    let cursor_line = 2 + app.bookmark_cursor as u16;
    let scroll = cursor_line.saturating_sub(area.height.saturating_sub(1));
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
        .split(area);

    let (bg, txt) = match app.mode {
        AppMode::Normal => {
            if app.hint_mode_active {
                (Color::Magenta, format!(" {} ", t!("status.hint")))
            } else {
                (Color::Blue, format!(" {} ", t!("status.normal")))
            }
        }
        AppMode::Insert => (Color::Yellow, format!(" {} ", t!("status.insert"))),
        AppMode::Select => (Color::Magenta, format!(" {} ", t!("status.select"))),
        AppMode::Bookmarks => (Color::Cyan, format!(" {} ", t!("status.bookmarks"))),
    };

    let mut left_spans = vec![
        Span::styled(txt, Style::default().bg(bg).fg(Color::Black).bold()),
        Span::raw(" "),
    ];

    if app.hint_mode_active {
        left_spans.push(Span::styled(
            t!("status.goto_prefix", hint = app.hint_buffer).to_string(),
            Style::default().fg(Color::Yellow).bold(),
        ));
    } else if let Some(msg) = &app.status_msg {
        left_spans.push(Span::styled(msg.clone(), Style::default().fg(Color::Yellow)));
    } else if app.mode == AppMode::Insert {
        let nice_input = decode_url(&app.url_input);
        let safe_cursor = app.cursor_pos.min(nice_input.len());
        let cursor = if nice_input.is_char_boundary(safe_cursor) {
            safe_cursor
        } else {
            0
        };
        let (l, r) = nice_input.split_at(cursor);
        left_spans.push(Span::raw(l.to_string()));
        left_spans.push(Span::styled("█", Style::default().fg(Color::White)));
        left_spans.push(Span::raw(r.to_string()));
    } else {
        left_spans.push(Span::raw(decode_url(&app.url_input)));
    }

    if app.is_loading || app.loading_more {
        left_spans.push(Span::raw(" "));
        left_spans.push(Span::styled(
            "⏳",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::RAPID_BLINK),
        ));
    }

    match app.scroll.phase() {
        ScrollPhase::Scrolling => left_spans.push(Span::styled(
            format!(" [{} {}s]", t!("status.auto"), app.seconds_remaining),
            Style::default().fg(Color::Green),
        )),
        ScrollPhase::Paused => left_spans.push(Span::styled(
            format!(" [{}]", t!("status.paused")),
            Style::default().fg(Color::Gray),
        )),
        ScrollPhase::Idle => {}
    }

    f.render_widget(
        Paragraph::new(Line::from(left_spans)).bg(Color::DarkGray),
        status_chunks[0],
    );

    let mut right_spans = Vec::new();
    if app.selector.is_on() {
        right_spans.push(Span::styled(
            format!("[{}] ", t!("status.selected", count = app.selector.member_count())),
            Style::default().fg(Color::Yellow),
        ));
    }
    right_spans.push(Span::styled(
        format!("★ {} ", app.bookmarks.len()),
        Style::default().fg(Color::Cyan),
    ));

    f.render_widget(
        Paragraph::new(Line::from(right_spans))
            .alignment(Alignment::Right)
            .bg(Color::DarkGray),
        status_chunks[1],
    );
}

fn render_hints(f: &mut Frame, app: &App, area: Rect) {
    let hints = match app.mode {
        AppMode::Insert => t!("hints.insert"),
        AppMode::Select => t!("hints.select"),
        AppMode::Bookmarks => t!("hints.bookmarks"),
        AppMode::Normal => {
            if app.hint_mode_active {
                t!("hints.hint")
            } else {
                t!("hints.normal")
            }
        }
    };
    f.render_widget(
        Paragraph::new(hints.to_string())
            .bg(Color::Black)
            .fg(Color::Gray),
        area,
    );
}
