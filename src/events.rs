use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// File written by the `e` key.
pub const EXPORT_FILE: &str = "nodewatch_export.json";

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Scrolling re-targets the overlay
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::PageUp => app.select_prev_n(10),
            KeyCode::PageDown => app.select_next_n(10),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            KeyCode::Char('r') => app.refresh(),
            KeyCode::Char('t') => app.cycle_range(),
            _ => {}
        }
        return;
    }

    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),

        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        KeyCode::Char('1') => app.set_view(View::Nodes),
        KeyCode::Char('2') => app.set_view(View::Applications),
        KeyCode::Char('3') => app.set_view(View::Insights),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        KeyCode::Enter => app.enter_detail(),
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        KeyCode::Char('r') => {
            app.refresh();
            app.set_status_message("Refreshing...".to_string());
        }
        KeyCode::Char('t') => app.cycle_range(),

        KeyCode::Char('?') => app.toggle_help(),

        KeyCode::Char('s') if app.current_view == View::Nodes => app.cycle_sort(),
        KeyCode::Char('S') if app.current_view == View::Nodes => app.toggle_sort_direction(),
        KeyCode::Char('m') if app.current_view == View::Insights => app.cycle_insight_metric(),

        // Filters
        KeyCode::Char('/') => app.start_filter(),
        KeyCode::Char('f') => app.cycle_status_filter(),
        KeyCode::Char('x') => app.toggle_critical_only(),
        KeyCode::Char('b') => app.toggle_recent_only(),
        KeyCode::Char('c') => {
            if app.filter_is_active() {
                app.clear_filter();
            }
        }

        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_FILE);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.filter_active = false;
        }

        // Keep text but exit input mode
        KeyCode::Esc => {
            app.cancel_filter();
        }

        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.clear_filter();
        }

        KeyCode::Backspace => {
            app.filter_pop();
            if app.dashboard.filter.search.is_empty() {
                app.filter_active = false;
            }
        }

        KeyCode::Char(c) => {
            app.filter_push(c);
        }

        _ => {}
    }
}

/// Handle mouse events
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent, content_start_row: u16) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),

        MouseEventKind::Down(MouseButton::Left) => {
            let clicked_row = mouse.row;

            // Table rows start below the border and the header row
            if clicked_row > content_start_row && !app.show_detail_overlay {
                let item_row = (clicked_row - content_start_row - 1) as usize;
                match app.current_view {
                    View::Nodes => {
                        if item_row < app.visible_nodes().len() {
                            app.selected_node_index = item_row;
                        }
                    }
                    // rows sit below the inventory cards
                    View::Applications => {
                        let row = item_row.checked_sub(CARDS_HEIGHT as usize);
                        if let Some(row) = row.filter(|r| *r < app.visible_applications().len()) {
                            app.selected_app_index = row;
                        }
                    }
                    View::Insights => {}
                }
            }

            // Tab clicks, row 1: " 1:Nodes " | " 2:Applications " | " 3:Insights "
            if clicked_row == 1 {
                let col = mouse.column;
                if col < 10 {
                    app.set_view(View::Nodes);
                } else if col < 28 {
                    app.set_view(View::Applications);
                } else if col < 42 {
                    app.set_view(View::Insights);
                }
            }
        }

        // Right-click goes back
        MouseEventKind::Down(MouseButton::Right) => app.go_back(),

        _ => {}
    }
}

/// Height of the inventory cards above the application table.
const CARDS_HEIGHT: u16 = 4;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::inventory::tests::sample;
    use crate::data::{RangeToken, Thresholds};
    use crate::source::{DataSource, Request, Response};
    use crate::ui::Theme;
    use crossterm::event::{KeyEventKind, KeyEventState};

    #[derive(Debug)]
    struct Silent;

    impl DataSource for Silent {
        fn request(&mut self, _seq: u64, _request: Request) {}
        fn poll(&mut self) -> Option<Response> {
            None
        }
        fn description(&self) -> &str {
            "silent"
        }
    }

    fn app() -> App {
        App::new(
            Box::new(Silent),
            Thresholds::default(),
            RangeToken::OneHour,
            sample(),
            Theme::dark(),
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_view_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('3')));
        assert_eq!(app.current_view, View::Insights);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.current_view, View::Nodes);
        handle_key_event(&mut app, key(KeyCode::BackTab));
        assert_eq!(app.current_view, View::Insights);
    }

    #[test]
    fn test_search_input() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        assert!(app.filter_active);
        for c in "gate".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        // typed while searching, not a quit
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.running);
        assert_eq!(app.dashboard.filter.search, "gateq");

        handle_key_event(&mut app, key(KeyCode::Enter));
        assert!(!app.filter_active);
        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert!(app.dashboard.filter.search.is_empty());
    }

    #[test]
    fn test_backspace_to_empty_leaves_search() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('/')));
        handle_key_event(&mut app, key(KeyCode::Char('a')));
        handle_key_event(&mut app, key(KeyCode::Backspace));
        assert!(!app.filter_active);
    }

    #[test]
    fn test_filter_and_range_keys() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('x')));
        assert!(app.dashboard.filter.critical_only);
        handle_key_event(&mut app, key(KeyCode::Char('b')));
        assert!(app.dashboard.recent_only);
        handle_key_event(&mut app, key(KeyCode::Char('t')));
        assert_eq!(app.dashboard.range_token, RangeToken::SixHours);
        handle_key_event(&mut app, key(KeyCode::Char('c')));
        assert!(!app.filter_is_active());
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert!(app.show_help);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(app.running);
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(!app.running);
    }

    #[test]
    fn test_metric_key_only_on_insights() {
        let mut app = app();
        let initial = app.insight_metric;
        handle_key_event(&mut app, key(KeyCode::Char('m')));
        assert_eq!(app.insight_metric, initial);
        app.set_view(View::Insights);
        handle_key_event(&mut app, key(KeyCode::Char('m')));
        assert_eq!(app.insight_metric, initial.next());
    }
}
