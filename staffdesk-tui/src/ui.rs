//! Terminal UI rendering with ratatui

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};
use staffdesk_core::ErrorNotification;

use crate::app::{App, SignInField, StatusLevel};

/// Main draw function
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title bar
            Constraint::Min(1),    // Body
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    draw_title_bar(f, app, chunks[0]);
    if app.on_sign_in() {
        draw_sign_in(f, app, chunks[1]);
    } else {
        draw_main(f, app, chunks[1]);
    }
    draw_status_bar(f, app, chunks[2]);

    let notification = app.ctx.errors.current();
    if notification.visible {
        draw_error_dialog(f, &notification);
    }
}

/// Title, breadcrumb and signed-in user
fn draw_title_bar(f: &mut Frame, app: &App, area: Rect) {
    let title = app.route.map(|r| r.title).unwrap_or("Not Found");
    let crumbs = app
        .route
        .map(|r| {
            r.breadcrumb
                .iter()
                .map(|c| c.text)
                .collect::<Vec<_>>()
                .join(" › ")
        })
        .unwrap_or_default();

    let session = app.ctx.session.session();
    let who = match (&session.token, &session.user) {
        (Some(_), Some(user)) => format!(" [{} <{}>]", user.name, user.email),
        (Some(_), None) => " [Signed in]".to_string(),
        (None, _) => " [Signed out]".to_string(),
    };

    let mut spans = vec![Span::styled(
        format!(" {} ", title),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )];
    if !crumbs.is_empty() {
        spans.push(Span::styled(crumbs, Style::default().fg(Color::Gray)));
    }
    spans.push(Span::styled(
        who,
        Style::default().fg(if session.is_authenticated() {
            Color::Green
        } else {
            Color::Yellow
        }),
    ));

    let title_bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    f.render_widget(title_bar, area);
}

/// Email/password form
fn draw_sign_in(f: &mut Frame, app: &App, area: Rect) {
    let area = centered(area, 50, 9);
    let field_style = |field: SignInField| {
        if app.form.focus == field {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default()
        }
    };

    let masked = "•".repeat(app.form.password.chars().count());
    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::raw(" Email     "),
            Span::styled(format!("{:<30}", app.form.email), field_style(SignInField::Email)),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::raw(" Password  "),
            Span::styled(format!("{:<30}", masked), field_style(SignInField::Password)),
        ]),
        Line::from(""),
    ];
    lines.push(if app.signing_in() {
        Line::from(Span::styled(" Signing in…", Style::default().fg(Color::Yellow)))
    } else {
        Line::from(Span::styled(
            " Tab:switch field  Enter:sign in  Esc:quit",
            Style::default().fg(Color::DarkGray),
        ))
    });

    let form = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Sign In "));
    f.render_widget(form, area);
}

/// Sidebar plus listing
fn draw_main(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(1)])
        .split(area);

    let items: Vec<ListItem> = app
        .menu
        .iter()
        .enumerate()
        .map(|(i, route)| {
            let current = app.route.is_some_and(|r| r.path == route.path);
            let marker = if current { "▸ " } else { "  " };
            let style = if i == app.cursor {
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(format!("{}{}", marker, route.title), style)))
        })
        .collect();

    let menu = List::new(items).block(Block::default().borders(Borders::RIGHT));
    f.render_widget(menu, chunks[0]);

    let visible = chunks[1].height as usize;
    let body: Vec<ListItem> = if app.rows.is_empty() {
        let hint = match app.route.and_then(|r| r.resource) {
            Some(_) => " No records loaded. Press f to reload.",
            None => " Select a section and press Enter.",
        };
        vec![ListItem::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))]
    } else {
        app.rows
            .iter()
            .take(visible)
            .map(|row| ListItem::new(format!(" {}", row)))
            .collect()
    };
    f.render_widget(List::new(body), chunks[1]);
}

/// Draw the status bar
fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = if let Some((ref msg, ref level)) = app.status_message {
        let color = match level {
            StatusLevel::Info => Color::Blue,
            StatusLevel::Success => Color::Green,
            StatusLevel::Warning => Color::Yellow,
            StatusLevel::Error => Color::Red,
        };
        (msg.clone(), Style::default().fg(color))
    } else if app.on_sign_in() {
        (String::new(), Style::default())
    } else {
        (
            "j↓ k↑ │ Enter:open f:reload │ r:refresh R:profile │ o:logout O:all devices │ ?:help q:quit"
                .to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}

/// Modal error popup
fn draw_error_dialog(f: &mut Frame, notification: &ErrorNotification) {
    let area = centered(f.area(), 50, 7);

    let dialog = Paragraph::new(vec![
        Line::from(""),
        Line::from(notification.message.as_str()),
        Line::from(""),
        Line::from(Span::styled(
            format!("[ {} ]", notification.button_text),
            Style::default().fg(Color::Black).bg(Color::Red),
        ))
        .alignment(Alignment::Center),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(format!(" {} ", notification.title)),
    );

    f.render_widget(Clear, area);
    f.render_widget(dialog, area);
}

/// Rectangle of at most `width` x `height`, centered in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_clamps_to_area() {
        let area = Rect::new(0, 0, 30, 5);
        assert_eq!(centered(area, 50, 9), area);

        let inner = centered(Rect::new(10, 2, 100, 40), 50, 10);
        assert_eq!(inner, Rect::new(35, 17, 50, 10));
    }
}
