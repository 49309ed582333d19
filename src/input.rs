use crate::model::View;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,
    Back,
    Up,
    Down,
    Select,
    Detail,
    Nodes,
    Create,
    Delete,
    Refresh,
    Load,
    Build,
    Logs,
    Toggle,
    ConfirmYes,
    ConfirmNo,
    Submit,
    Backspace,
    InputChar(char),
}

pub fn map_key(view: View, key: KeyEvent) -> Option<Action> {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }

    if view.is_text_entry() {
        return map_text_entry_key(key);
    }

    match view {
        View::DeleteConfirm => map_delete_confirm_key(key),
        _ => map_browse_key(key),
    }
}

fn map_browse_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::Down),
        KeyCode::Enter => Some(Action::Select),
        KeyCode::Char('i') => Some(Action::Detail),
        KeyCode::Char('n') => Some(Action::Nodes),
        KeyCode::Char('c') => Some(Action::Create),
        KeyCode::Char('d') => Some(Action::Delete),
        KeyCode::Char('r') | KeyCode::F(5) => Some(Action::Refresh),
        KeyCode::Char('l') => Some(Action::Load),
        KeyCode::Char('b') => Some(Action::Build),
        KeyCode::Char('L') => Some(Action::Logs),
        _ => None,
    }
}

fn map_delete_confirm_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Char('?') => Some(Action::ToggleHelp),
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
            Some(Action::Toggle)
        }
        KeyCode::Enter => Some(Action::Select),
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(Action::ConfirmYes),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(Action::ConfirmNo),
        _ => None,
    }
}

fn map_text_entry_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc => Some(Action::Back),
        KeyCode::Enter => Some(Action::Submit),
        KeyCode::Char('m') | KeyCode::Char('j')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            Some(Action::Submit)
        }
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Char(c)
            if !key.modifiers.contains(KeyModifiers::CONTROL)
                && !key.modifiers.contains(KeyModifiers::ALT) =>
        {
            Some(Action::InputChar(c))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, map_key};
    use crate::model::View;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn cluster_list_maps_shortcuts() {
        assert_eq!(
            map_key(View::ClusterList, press(KeyCode::Char('n'))),
            Some(Action::Nodes)
        );
        assert_eq!(
            map_key(View::ClusterList, press(KeyCode::Char('i'))),
            Some(Action::Detail)
        );
        assert_eq!(
            map_key(
                View::ClusterList,
                KeyEvent::new(KeyCode::Char('L'), KeyModifiers::SHIFT)
            ),
            Some(Action::Logs)
        );
    }

    #[test]
    fn delete_confirm_reuses_n_as_no() {
        assert_eq!(
            map_key(View::DeleteConfirm, press(KeyCode::Char('n'))),
            Some(Action::ConfirmNo)
        );
        assert_eq!(
            map_key(View::DeleteConfirm, press(KeyCode::Tab)),
            Some(Action::Toggle)
        );
    }

    #[test]
    fn text_entry_captures_shortcut_letters() {
        assert_eq!(
            map_key(View::CreateCluster, press(KeyCode::Char('q'))),
            Some(Action::InputChar('q'))
        );
        assert_eq!(
            map_key(View::LoadImage, press(KeyCode::Char('?'))),
            Some(Action::InputChar('?'))
        );
        assert_eq!(
            map_key(View::ExportLogs, press(KeyCode::Enter)),
            Some(Action::Submit)
        );
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(View::BuildImage, key), Some(Action::Quit));
        assert_eq!(map_key(View::MainMenu, key), Some(Action::Quit));
    }
}
