use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use crate::keys::ChordAction;

/// Where keyboard focus went when the capture window lost it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDestination {
    /// Another window of this application, e.g. an alert or settings panel.
    OwnAuxiliaryWindow,
    OtherApplication,
}

/// Everything the platform layer reports to the window manager.
///
/// `Debug` never prints the captured text, only its length, so events can be
/// logged as they are.
#[derive(Clone, PartialEq, Eq)]
pub enum AppEvent {
    ToggleRequested,
    ShowRequested,
    BecameActive { has_visible_window: bool },
    SurfaceClosedByUser,
    SurfaceResignedFocus(FocusDestination),
    ContentChanged(String),
    Chord(ChordAction),
    CommitRequested,
    ClearRequested,
    FeedbackElapsed,
}

impl fmt::Debug for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppEvent::ToggleRequested => f.write_str("ToggleRequested"),
            AppEvent::ShowRequested => f.write_str("ShowRequested"),
            AppEvent::BecameActive { has_visible_window } => f
                .debug_struct("BecameActive")
                .field("has_visible_window", has_visible_window)
                .finish(),
            AppEvent::SurfaceClosedByUser => f.write_str("SurfaceClosedByUser"),
            AppEvent::SurfaceResignedFocus(destination) => f
                .debug_tuple("SurfaceResignedFocus")
                .field(destination)
                .finish(),
            AppEvent::ContentChanged(text) => f
                .debug_struct("ContentChanged")
                .field("len", &text.chars().count())
                .finish_non_exhaustive(),
            AppEvent::Chord(action) => f.debug_tuple("Chord").field(action).finish(),
            AppEvent::CommitRequested => f.write_str("CommitRequested"),
            AppEvent::ClearRequested => f.write_str("ClearRequested"),
            AppEvent::FeedbackElapsed => f.write_str("FeedbackElapsed"),
        }
    }
}

pub trait EventHandler {
    fn handle(&mut self, event: AppEvent);
}

/// FIFO in front of a `RefCell`-held handler.
///
/// AppKit calls delegates synchronously, so handling one event can raise
/// another while the handler is still borrowed. Such events are parked and
/// handled by the outer `dispatch` once the current one returns.
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: RefCell<VecDeque<AppEvent>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch<H: EventHandler>(&self, handler: &RefCell<H>, event: AppEvent) {
        self.pending.borrow_mut().push_back(event);

        let Ok(mut handler) = handler.try_borrow_mut() else {
            trace!("handler busy, event deferred");
            return;
        };
        loop {
            let next = self.pending.borrow_mut().pop_front();
            match next {
                Some(event) => handler.handle(event),
                None => break,
            }
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }
}
