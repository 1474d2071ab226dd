//! Navigation actions, control maps and per-session policy options.

use super::page::Page;

/// An action a navigation control can trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaginatorAction {
    First,
    Previous,
    Next,
    Last,
    Stop,
    /// Ask the user for a page number to jump to.
    Jump,
}

impl PaginatorAction {
    /// Default button label for the action.
    pub fn label(self) -> &'static str {
        match self {
            PaginatorAction::First => "⏮",
            PaginatorAction::Previous => "◀ Prev",
            PaginatorAction::Next => "Next ▶",
            PaginatorAction::Last => "⏭",
            PaginatorAction::Stop => "Stop",
            PaginatorAction::Jump => "*",
        }
    }

    /// Whether the control stays usable on the given page.
    ///
    /// Backward controls are pointless on the first page and forward controls
    /// on the last one; unbounded sources never disable forward controls.
    pub fn enabled_at(self, index: usize, max_page_index: Option<usize>) -> bool {
        match self {
            PaginatorAction::First | PaginatorAction::Previous => index > 0,
            PaginatorAction::Next => max_page_index.is_none_or(|max| index < max),
            PaginatorAction::Last => max_page_index.is_some_and(|max| index < max),
            PaginatorAction::Stop | PaginatorAction::Jump => true,
        }
    }
}

/// One navigation control: its identifier and the action it triggers.
///
/// The identifier is the button custom-ID suffix for button input and the
/// unicode emoji for reaction input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Control {
    pub id: String,
    pub emoji: String,
    pub action: PaginatorAction,
}

impl Control {
    pub fn new(id: impl Into<String>, emoji: impl Into<String>, action: PaginatorAction) -> Self {
        Self {
            id: id.into(),
            emoji: emoji.into(),
            action,
        }
    }
}

/// Ordered, immutable mapping from control identifiers to actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlMap {
    controls: Vec<Control>,
}

impl ControlMap {
    /// Build a map from controls; later duplicates of an id or emoji are dropped.
    pub fn new(controls: impl IntoIterator<Item = Control>) -> Self {
        let mut kept: Vec<Control> = Vec::new();
        for control in controls {
            let duplicate = kept
                .iter()
                .any(|existing| existing.id == control.id || existing.emoji == control.emoji);
            if !duplicate {
                kept.push(control);
            }
        }

        Self { controls: kept }
    }

    /// First/previous/next/last/stop controls.
    pub fn standard() -> Self {
        Self::new([
            Control::new("first", "⏮️", PaginatorAction::First),
            Control::new("prev", "◀️", PaginatorAction::Previous),
            Control::new("next", "▶️", PaginatorAction::Next),
            Control::new("last", "⏭️", PaginatorAction::Last),
            Control::new("stop", "🛑", PaginatorAction::Stop),
        ])
    }

    /// Standard controls plus a jump-to-page control.
    pub fn with_jump() -> Self {
        let mut controls = Self::standard().controls;
        controls.insert(4, Control::new("jump", "🔢", PaginatorAction::Jump));
        Self { controls }
    }

    /// Look up the action bound to a button id.
    pub fn by_id(&self, id: &str) -> Option<PaginatorAction> {
        self.controls
            .iter()
            .find(|control| control.id == id)
            .map(|control| control.action)
    }

    /// Look up the action bound to a reaction emoji.
    pub fn by_emoji(&self, emoji: &str) -> Option<PaginatorAction> {
        self.controls
            .iter()
            .find(|control| control.emoji == emoji)
            .map(|control| control.action)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Control> {
        self.controls.iter()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

impl Default for ControlMap {
    fn default() -> Self {
        Self::standard()
    }
}

/// Which interaction mechanisms a session listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InputType {
    pub buttons: bool,
    pub reactions: bool,
}

impl InputType {
    pub const BUTTONS: Self = Self {
        buttons: true,
        reactions: false,
    };
    pub const REACTIONS: Self = Self {
        buttons: false,
        reactions: true,
    };
    pub const ALL: Self = Self {
        buttons: true,
        reactions: true,
    };

    pub fn is_empty(self) -> bool {
        !self.buttons && !self.reactions
    }
}

impl Default for InputType {
    fn default() -> Self {
        Self::BUTTONS
    }
}

/// Whether reaction input is removed from the message after processing.
///
/// Buttons leave nothing behind, so these flags only matter for reactions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeletionOptions {
    /// Remove reactions that triggered an action.
    pub valid: bool,
    /// Remove reactions from users who may not interact, or unknown emoji.
    pub invalid: bool,
}

/// What happens to the message when a session ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActionOnStop {
    /// Leave the message untouched.
    #[default]
    None,
    /// Delete the message.
    DeleteMessage,
    /// Keep the current page but remove (or disable) the controls.
    DisableControls,
    /// Replace the message with a terminal page and remove the controls.
    ReplaceWithPage,
}

/// Terminal action plus an optional page for one stop condition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StopBehavior {
    pub action: ActionOnStop,
    pub page: Option<Page>,
}

impl StopBehavior {
    pub fn new(action: ActionOnStop) -> Self {
        Self { action, page: None }
    }

    /// Replace the message with `page` when the condition is reached.
    pub fn replace_with(page: Page) -> Self {
        Self {
            action: ActionOnStop::ReplaceWithPage,
            page: Some(page),
        }
    }
}

/// Why a session reached its terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// A user pressed the stop control.
    UserStop,
    /// No accepted interaction arrived before the timeout elapsed.
    Timeout,
    /// The session was cancelled from outside, e.g. on shutdown.
    Cancel,
}

impl StopReason {
    pub fn as_label(self) -> &'static str {
        match self {
            StopReason::UserStop => "user_stop",
            StopReason::Timeout => "timeout",
            StopReason::Cancel => "cancel",
        }
    }
}
