//! Lifecycle of the single capture window.
//!
//! The manager is the only owner of the surface and of its visibility. The
//! surface is created on first show, reused across hide/show, and dropped only
//! when the user closes the window, so the next show builds a fresh one.

use std::rc::Rc;

use tracing::{debug, error, info, trace};

use crate::capture::{CaptureController, CaptureIntent};
use crate::error::SurfaceError;
use crate::events::{AppEvent, EventHandler, FocusDestination};
use crate::foreground::{ForegroundPort, ProcessRef};
use crate::keys::ChordAction;
use crate::settings::SettingsStore;

/// What the bottom bar of the window shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceView {
    pub char_count: usize,
    pub can_commit: bool,
    pub show_hint: bool,
    pub feedback_active: bool,
}

/// A capture window as seen by the manager.
pub trait CaptureSurface {
    /// Make the window key and order it front.
    fn present(&mut self);
    /// Order the window out without destroying it.
    fn dismiss(&mut self);
    fn replace_text(&mut self, text: &str);
    fn render(&mut self, view: &SurfaceView);
}

pub trait SurfaceFactory {
    type Surface: CaptureSurface;

    fn create(&mut self) -> Result<Self::Surface, SurfaceError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Restore {
    PreviousForeground,
    Skip,
}

pub struct WindowLifecycleManager<F: SurfaceFactory> {
    factory: F,
    surface: Option<F::Surface>,
    visibility: Visibility,
    previous_foreground: Option<ProcessRef>,
    foreground: Box<dyn ForegroundPort>,
    capture: CaptureController,
    settings: Rc<dyn SettingsStore>,
}

impl<F: SurfaceFactory> WindowLifecycleManager<F> {
    pub fn new(
        factory: F,
        foreground: Box<dyn ForegroundPort>,
        capture: CaptureController,
        settings: Rc<dyn SettingsStore>,
    ) -> Self {
        WindowLifecycleManager {
            factory,
            surface: None,
            visibility: Visibility::Hidden,
            previous_foreground: None,
            foreground,
            capture,
            settings,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn previous_foreground(&self) -> Option<ProcessRef> {
        self.previous_foreground
    }

    pub fn capture(&self) -> &CaptureController {
        &self.capture
    }

    pub fn show(&mut self) {
        if self.surface.is_none() {
            match self.factory.create() {
                Ok(mut surface) => {
                    surface.replace_text(self.capture.content());
                    debug!("capture window created");
                    self.surface = Some(surface);
                }
                Err(err) => {
                    error!(error = %err, "aborting show");
                    return;
                }
            }
        }

        if self.visibility == Visibility::Hidden {
            let own = self.foreground.own_process();
            self.previous_foreground = self
                .foreground
                .current_foreground()
                .filter(|process| *process != own);
            self.visibility = Visibility::Visible;
            debug!(previous = ?self.previous_foreground, "capture window shown");
        }

        self.foreground.activate_self();
        if let Some(surface) = self.surface.as_mut() {
            surface.present();
        }
        self.render();
    }

    pub fn hide(&mut self) {
        self.hide_with(Restore::PreviousForeground);
    }

    pub fn toggle(&mut self) {
        match self.visibility {
            Visibility::Visible => self.hide(),
            Visibility::Hidden => self.show(),
        }
    }

    /// The user closed the window itself. Drop the surface so the next show
    /// builds a new one.
    pub fn on_surface_closed_by_user(&mut self) {
        if self.surface.take().is_some() {
            debug!("capture window closed by user");
        }
        if self.visibility == Visibility::Visible {
            self.visibility = Visibility::Hidden;
            self.restore_previous_foreground();
        }
    }

    pub fn on_surface_resigned_focus(&mut self, destination: FocusDestination) {
        match destination {
            FocusDestination::OwnAuxiliaryWindow => {
                trace!("focus moved to an auxiliary window, staying up");
            }
            FocusDestination::OtherApplication => {
                if self.is_visible() && self.settings.behavior().hide_on_focus_loss {
                    debug!("another application took focus, hiding");
                    // Focus already went where the user wanted it.
                    self.hide_with(Restore::Skip);
                }
            }
        }
    }

    pub fn on_become_active(&mut self, has_visible_window: bool) {
        if !has_visible_window {
            self.show();
        }
    }

    fn hide_with(&mut self, restore: Restore) {
        if self.visibility == Visibility::Hidden {
            return;
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.dismiss();
        }
        self.visibility = Visibility::Hidden;
        debug!("capture window hidden");

        match restore {
            Restore::PreviousForeground => self.restore_previous_foreground(),
            Restore::Skip => self.previous_foreground = None,
        }
    }

    fn restore_previous_foreground(&mut self) {
        let Some(previous) = self.previous_foreground.take() else {
            trace!("no previous application to restore");
            return;
        };
        if !self.foreground.is_running(previous) {
            debug!(%previous, "previous application has exited, not restoring");
            return;
        }
        if !self.foreground.activate(previous) {
            debug!(%previous, "previous application refused activation");
        }
    }

    fn apply_intents(&mut self) {
        while let Some(intent) = self.capture.next_intent() {
            match intent {
                CaptureIntent::Dismiss => self.hide(),
                CaptureIntent::ReplaceSurfaceText(text) => {
                    if let Some(surface) = self.surface.as_mut() {
                        surface.replace_text(&text);
                    }
                }
            }
        }
    }

    fn render(&mut self) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let view = SurfaceView {
            char_count: self.capture.char_count(),
            can_commit: self.capture.can_commit(),
            show_hint: self.settings.behavior().show_hint_text,
            feedback_active: self.capture.feedback_active(),
        };
        surface.render(&view);
    }
}

impl<F: SurfaceFactory> EventHandler for WindowLifecycleManager<F> {
    fn handle(&mut self, event: AppEvent) {
        trace!(?event, "handling");
        match event {
            AppEvent::ToggleRequested => self.toggle(),
            AppEvent::ShowRequested => self.show(),
            AppEvent::BecameActive { has_visible_window } => {
                self.on_become_active(has_visible_window)
            }
            AppEvent::SurfaceClosedByUser => self.on_surface_closed_by_user(),
            AppEvent::SurfaceResignedFocus(destination) => {
                self.on_surface_resigned_focus(destination)
            }
            AppEvent::ContentChanged(text) => self.capture.set_content(text),
            AppEvent::Chord(ChordAction::Commit) | AppEvent::CommitRequested => {
                if self.capture.commit() {
                    info!("committed to clipboard");
                }
            }
            AppEvent::Chord(ChordAction::Cancel) => self.capture.request_dismiss(),
            AppEvent::ClearRequested => self.capture.clear(),
            AppEvent::FeedbackElapsed => {
                self.capture.on_feedback_elapsed();
            }
        }
        self.apply_intents();
        self.render();
    }
}
