use crate::config::WidgetConfig;

/// The two requests a widget can make.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Check,
    Reset,
}

impl Action {
    /// Last path segment of the endpoint serving this action.
    pub fn endpoint(self) -> &'static str {
        match self {
            Action::Check => "problem_check",
            Action::Reset => "problem_reset",
        }
    }

    pub fn progress_text(self) -> &'static str {
        match self {
            Action::Check => "Checking...",
            Action::Reset => "Resetting...",
        }
    }
}

/// Per-widget state. The button label is rendered from this, never read back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetState {
    AwaitingCheck,
    AwaitingReset,
    Pending(Action),
    Failed { action: Action, message: String },
}

impl WidgetState {
    /// Initial state from the label the host page rendered. Anything other
    /// than the check label counts as a reset button.
    pub fn from_label(label: &str, check_label: &str) -> Self {
        if label == check_label {
            WidgetState::AwaitingCheck
        } else {
            WidgetState::AwaitingReset
        }
    }

    /// Action a click should start, or `None` while a request is in flight.
    pub fn next_action(&self) -> Option<Action> {
        match self {
            WidgetState::AwaitingCheck => Some(Action::Check),
            WidgetState::AwaitingReset => Some(Action::Reset),
            WidgetState::Pending(_) => None,
            WidgetState::Failed { action, .. } => Some(*action),
        }
    }

    /// State after `action` finished with `outcome`.
    pub fn settled(action: Action, outcome: Result<(), String>) -> Self {
        match (action, outcome) {
            (Action::Check, Ok(())) => WidgetState::AwaitingReset,
            (Action::Reset, Ok(())) => WidgetState::AwaitingCheck,
            (action, Err(message)) => WidgetState::Failed { action, message },
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, WidgetState::Pending(_))
    }

    pub fn label<'a>(&self, config: &'a WidgetConfig) -> &'a str {
        let action = match self {
            WidgetState::AwaitingCheck => Action::Check,
            WidgetState::AwaitingReset => Action::Reset,
            WidgetState::Pending(action) | WidgetState::Failed { action, .. } => *action,
        };
        match action {
            Action::Check => &config.check_label,
            Action::Reset => &config.reset_label,
        }
    }
}
