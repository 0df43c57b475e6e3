//! Keyboard input handling

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppResult, SignInField, StatusLevel};

/// Handle a key event
pub async fn handle_key(app: &mut App, key: KeyEvent) -> AppResult {
    // The error dialog is modal
    if app.ctx.errors.is_visible() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.ctx.errors.hide();
        }
        return AppResult::Continue;
    }

    if app.on_sign_in() {
        handle_sign_in(app, key)
    } else {
        handle_main(app, key).await
    }
}

/// Handle keys on the sign-in form
fn handle_sign_in(app: &mut App, key: KeyEvent) -> AppResult {
    if app.signing_in() {
        return AppResult::Continue;
    }

    match key.code {
        KeyCode::Esc => return AppResult::Quit,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.form.toggle_focus();
        }
        KeyCode::Enter => match app.form.focus {
            SignInField::Email => app.form.focus = SignInField::Password,
            SignInField::Password => app.submit_login(),
        },
        KeyCode::Backspace => {
            app.form.focused_mut().pop();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.form.focused_mut().clear();
        }
        KeyCode::Char(c) => {
            app.form.focused_mut().push(c);
        }
        _ => {}
    }

    AppResult::Continue
}

/// Handle keys on the main screen
async fn handle_main(app: &mut App, key: KeyEvent) -> AppResult {
    match key.code {
        KeyCode::Char('q') => return AppResult::Quit,

        // Sidebar navigation
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(),
        KeyCode::Char('g') => app.cursor = 0,
        KeyCode::Char('G') => app.cursor = app.menu.len().saturating_sub(1),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => app.open_selected().await,

        // Data
        KeyCode::Char('f') => app.reload().await,

        // Session
        KeyCode::Char('r') => app.refresh_token().await,
        KeyCode::Char('R') => app.reload_profile().await,
        KeyCode::Char('o') => app.logout(false).await,
        KeyCode::Char('O') => app.logout(true).await,

        KeyCode::Esc => app.clear_status(),
        KeyCode::Char('?') => {
            app.set_status(
                "j/k:move enter:open f:reload r:refresh token R:profile o:logout O:logout all q:quit",
                StatusLevel::Info,
            );
        }

        _ => {}
    }

    AppResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crossterm::event::KeyEventKind;
    use staffdesk_core::{AppContext, Config, MemoryStore};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press)
    }

    fn app() -> App {
        let ctx = AppContext::with_storage(Config::default(), Arc::new(MemoryStore::new())).unwrap();
        App::new(ctx)
    }

    #[tokio::test]
    async fn test_typing_fills_focused_field() {
        let mut app = app();

        for c in "a@x.com".chars() {
            handle_key(&mut app, press(KeyCode::Char(c))).await;
        }
        handle_key(&mut app, press(KeyCode::Tab)).await;
        for c in "pw".chars() {
            handle_key(&mut app, press(KeyCode::Char(c))).await;
        }
        handle_key(&mut app, press(KeyCode::Backspace)).await;

        assert_eq!(app.form.email, "a@x.com");
        assert_eq!(app.form.password, "p");
        assert_eq!(app.form.focus, SignInField::Password);
    }

    #[tokio::test]
    async fn test_error_dialog_swallows_keys_until_dismissed() {
        let mut app = app();
        app.ctx.errors.show("Network error. Please try again.");

        handle_key(&mut app, press(KeyCode::Char('x'))).await;
        assert!(app.form.email.is_empty());
        assert!(app.ctx.errors.is_visible());

        handle_key(&mut app, press(KeyCode::Enter)).await;
        assert!(!app.ctx.errors.is_visible());
        assert_eq!(app.ctx.errors.current().message, "Network error. Please try again.");
    }

    #[tokio::test]
    async fn test_q_types_on_sign_in_but_quits_on_main() {
        let mut app = app();
        assert!(matches!(
            handle_key(&mut app, press(KeyCode::Char('q'))).await,
            AppResult::Continue
        ));
        assert_eq!(app.form.email, "q");

        app.ctx.session.set_token("T".to_string()).unwrap();
        app.navigate("/");
        assert!(matches!(
            handle_key(&mut app, press(KeyCode::Char('q'))).await,
            AppResult::Quit
        ));
    }
}
