//! Key bindings. Each context maps a key press to an `Action`; the reducer
//! decides what the action does.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,
    CloseHelp,
    PlayPause,
    Next,
    Prev,
    Stop,
    SeekForward,
    SeekBack,
    VolumeUp,
    VolumeDown,
    SwitchFocus,

    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,

    // Browsers
    Open,
    Back,
    AddAll,
    AddAndPlay,
    ToggleHidden,

    // Playlist
    PlaySelected,
    Remove,
    Clear,
    MoveUp,
    MoveDown,
    Shuffle,
    CycleLoop,
}

fn ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

/// Keys understood while the help popup is open.
pub fn help_action(key: &KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc => {
            Some(Action::CloseHelp)
        }
        _ => None,
    }
}

pub fn global_action(key: &KeyEvent) -> Option<Action> {
    if ctrl(key, 'c') {
        return Some(Action::Quit);
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }
    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Char(' ') => Action::PlayPause,
        KeyCode::Char('n') => Action::Next,
        KeyCode::Char('N') => Action::Prev,
        KeyCode::Char('s') => Action::Stop,
        KeyCode::Char('f') => Action::SeekForward,
        KeyCode::Char('b') => Action::SeekBack,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::VolumeUp,
        KeyCode::Char('-') => Action::VolumeDown,
        KeyCode::Tab => Action::SwitchFocus,
        _ => return None,
    };
    Some(action)
}

fn navigation(key: &KeyEvent) -> Option<Action> {
    if ctrl(key, 'u') {
        return Some(Action::PageUp);
    }
    if ctrl(key, 'd') {
        return Some(Action::PageDown);
    }
    let action = match key.code {
        KeyCode::Char('k') | KeyCode::Up => Action::Up,
        KeyCode::Char('j') | KeyCode::Down => Action::Down,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Char('g') | KeyCode::Home => Action::Top,
        KeyCode::Char('G') | KeyCode::End => Action::Bottom,
        _ => return None,
    };
    Some(action)
}

pub fn browser_action(key: &KeyEvent) -> Option<Action> {
    navigation(key).or(match key.code {
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => Some(Action::Open),
        KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => Some(Action::Back),
        KeyCode::Char('a') => Some(Action::AddAll),
        KeyCode::Char('p') => Some(Action::AddAndPlay),
        KeyCode::Char('.') => Some(Action::ToggleHidden),
        _ => None,
    })
}

pub fn playlist_action(key: &KeyEvent) -> Option<Action> {
    navigation(key).or(match key.code {
        KeyCode::Enter | KeyCode::Char('l') => Some(Action::PlaySelected),
        KeyCode::Char('d') => Some(Action::Remove),
        KeyCode::Char('D') => Some(Action::Clear),
        KeyCode::Char('K') => Some(Action::MoveUp),
        KeyCode::Char('J') => Some(Action::MoveDown),
        KeyCode::Char('r') => Some(Action::Shuffle),
        KeyCode::Char('m') => Some(Action::CycleLoop),
        _ => None,
    })
}

/// Key hints for the footer, by focused panel.
pub fn hints(browser_focused: bool, library: bool) -> &'static str {
    match (browser_focused, library) {
        (true, true) => "enter:open/add  a:add all  p:play  h:back  tab:playlist  ?:help  q:quit",
        (true, false) => "enter:open/add  p:play  h:parent  .:hidden  tab:playlist  ?:help  q:quit",
        (false, _) => "enter:play  d:remove  D:clear  J/K:move  r:shuffle  m:loop  tab:browser  ?:help",
    }
}

/// Rows of the help popup: (keys, description).
pub const HELP: &[(&str, &str)] = &[
    ("space", "play / pause"),
    ("n / N", "next / previous track"),
    ("s", "stop"),
    ("f / b", "seek forward / back"),
    ("+ / -", "volume up / down"),
    ("tab", "switch panel"),
    ("j / k", "move down / up"),
    ("g / G", "top / bottom"),
    ("pgup / pgdn", "page up / down"),
    ("enter / l", "open, add, or play"),
    ("h / backspace", "collapse / parent"),
    ("a", "add all under node"),
    ("p", "add and play"),
    (".", "show hidden files"),
    ("d / D", "remove / clear playlist"),
    ("K / J", "move track up / down"),
    ("r", "shuffle playlist"),
    ("m", "cycle loop mode"),
    ("?", "toggle help"),
    ("q", "quit"),
];
