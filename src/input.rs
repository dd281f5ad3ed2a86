use crate::app::FocusApp;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use uuid::Uuid;

/// Key help shown under the focus status line
pub const FOCUS_KEYS: &str = "space pause/resume   r restart   q quit";

/// Handle a key pressed while `id` is in the foreground
///
/// Returns true when the focus session should end.
pub fn handle_focus_key(app: &mut FocusApp, id: Uuid, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
            app.toggle_task(id);
            false
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            app.restart_task(id);
            false
        }
        // Raw mode delivers Ctrl-C as a key instead of SIGINT
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        _ => false,
    }
}
