//! DOM Events
//!
//! Event types and the event object seen by inline handlers.

use crate::NodeId;

/// Event type identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    DblClick,
    MouseDown,
    MouseUp,
    MouseEnter,
    MouseLeave,
    KeyDown,
    KeyUp,
    Input,
    Change,
    Focus,
    Blur,
    Submit,
    Reset,
    Load,
    /// Any event name not listed above
    Custom(String),
}

impl EventType {
    /// Map an event name ("click", "input") to its type
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "click" => Self::Click,
            "dblclick" => Self::DblClick,
            "mousedown" => Self::MouseDown,
            "mouseup" => Self::MouseUp,
            "mouseenter" => Self::MouseEnter,
            "mouseleave" => Self::MouseLeave,
            "keydown" => Self::KeyDown,
            "keyup" => Self::KeyUp,
            "input" => Self::Input,
            "change" => Self::Change,
            "focus" => Self::Focus,
            "blur" => Self::Blur,
            "submit" => Self::Submit,
            "reset" => Self::Reset,
            "load" => Self::Load,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Event name as used after the `on` prefix of a handler attribute
    pub fn name(&self) -> &str {
        match self {
            Self::Click => "click",
            Self::DblClick => "dblclick",
            Self::MouseDown => "mousedown",
            Self::MouseUp => "mouseup",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
            Self::Input => "input",
            Self::Change => "change",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::Submit => "submit",
            Self::Reset => "reset",
            Self::Load => "load",
            Self::Custom(name) => name,
        }
    }

    /// Check if this event type can bubble
    pub fn bubbles(&self) -> bool {
        !matches!(
            self,
            Self::Focus | Self::Blur | Self::Load | Self::MouseEnter | Self::MouseLeave
        )
    }

    /// Check if the default action can be cancelled
    pub fn cancelable(&self) -> bool {
        matches!(
            self,
            Self::Click
                | Self::DblClick
                | Self::MouseDown
                | Self::MouseUp
                | Self::KeyDown
                | Self::KeyUp
                | Self::Submit
                | Self::Reset
        )
    }
}

/// Dispatch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPhase {
    None,
    AtTarget,
    Bubbling,
}

/// DOM event
#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: EventType,
    pub target: NodeId,
    pub current_target: Option<NodeId>,
    pub phase: EventPhase,
    pub bubbles: bool,
    pub cancelable: bool,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl Event {
    /// Create an event with the bubbling/cancelable flags of its type
    pub fn new(event_type: EventType, target: NodeId) -> Self {
        Self {
            bubbles: event_type.bubbles(),
            cancelable: event_type.cancelable(),
            event_type,
            target,
            current_target: None,
            phase: EventPhase::None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    /// Create an event from its name
    pub fn named(name: &str, target: NodeId) -> Self {
        Self::new(EventType::from_name(name), target)
    }

    /// Prevent default action
    pub fn prevent_default(&mut self) {
        if self.cancelable {
            self.default_prevented = true;
        }
    }

    /// Stop propagation
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    /// Check if default was prevented
    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    /// Check if propagation was stopped
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}
