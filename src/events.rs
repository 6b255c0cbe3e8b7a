use crate::content::{CollectionInfo, ItemData};

/// Visibility tiers of the on-screen chrome, from nothing to the full
/// control strip. The ordering is meaningful: reveals only ever move up
/// within one episode, and the idle reset drops back to `Hidden`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverlayLevel {
    Hidden,
    Title,
    Status,
    Controls,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Host input feeding the presentation controller.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMoved,
    PointerPressed,
    /// A named key, resolved through the keymap.
    Key(String),
    SetSpeed(f32),
    ToggleDirection,
    ToggleLoop,
    AdvanceCollection,
    RetreatCollection,
}

/// What the host view renders. The controller emits these; it never draws.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    OverlayChanged {
        from: OverlayLevel,
        to: OverlayLevel,
    },
    LoadStarted,
    LoadFailed(String),
    CollectionChanged(CollectionInfo),
    ItemShown(ItemData),
    AutoPlayChanged {
        active: bool,
        speed: f32,
        direction: Direction,
    },
    NoticePosted(String),
    NoticeExpired,
}
