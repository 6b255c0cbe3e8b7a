/// Presentation actions reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Retreat,
    Advance,
    ToggleAutoPlay,
}

/// Resolves a key name to its action. Left/Up step backward, Right/Down
/// step forward, Space toggles auto-play. Escape is recognized but reserved
/// and maps to nothing, like every unbound key. Names are matched without
/// case; the DOM-style names a browser host produces are accepted alongside
/// the plain words.
pub fn lookup(key: &str) -> Option<Action> {
    if key == " " {
        return Some(Action::ToggleAutoPlay);
    }
    match key.to_ascii_lowercase().as_str() {
        "left" | "arrowleft" | "up" | "arrowup" => Some(Action::Retreat),
        "right" | "arrowright" | "down" | "arrowdown" => Some(Action::Advance),
        "space" | "spacebar" => Some(Action::ToggleAutoPlay),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_map_to_navigation() {
        assert_eq!(lookup("left"), Some(Action::Retreat));
        assert_eq!(lookup("up"), Some(Action::Retreat));
        assert_eq!(lookup("right"), Some(Action::Advance));
        assert_eq!(lookup("down"), Some(Action::Advance));
    }

    #[test]
    fn dom_names_are_accepted() {
        assert_eq!(lookup("ArrowLeft"), Some(Action::Retreat));
        assert_eq!(lookup("ArrowDown"), Some(Action::Advance));
        assert_eq!(lookup(" "), Some(Action::ToggleAutoPlay));
        assert_eq!(lookup("Escape"), None);
    }

    #[test]
    fn space_toggles_auto_play() {
        assert_eq!(lookup("space"), Some(Action::ToggleAutoPlay));
        assert_eq!(lookup("Spacebar"), Some(Action::ToggleAutoPlay));
    }

    #[test]
    fn escape_and_unknown_keys_are_ignored() {
        assert_eq!(lookup("escape"), None);
        assert_eq!(lookup("enter"), None);
        assert_eq!(lookup("q"), None);
        assert_eq!(lookup(""), None);
    }
}
