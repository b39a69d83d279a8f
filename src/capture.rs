use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

use crate::clipboard::ClipboardPort;
use crate::settings::SettingsStore;

/// How long the "Copied" confirmation stays up after a commit.
pub const FEEDBACK_DURATION: Duration = Duration::from_millis(1200);

/// One-shot timer that reports back on the UI thread through
/// [`CaptureController::on_feedback_elapsed`]. `restart` replaces any pending
/// timer; there is never more than one in flight.
pub trait PulseTimer {
    fn restart(&mut self, after: Duration);
    fn cancel(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseState {
    Idle,
    Showing,
}

struct FeedbackPulse {
    state: PulseState,
    timer: Box<dyn PulseTimer>,
}

impl FeedbackPulse {
    fn trigger(&mut self) {
        self.state = PulseState::Showing;
        self.timer.restart(FEEDBACK_DURATION);
    }

    fn elapse(&mut self) -> bool {
        match self.state {
            PulseState::Showing => {
                self.state = PulseState::Idle;
                true
            }
            PulseState::Idle => false,
        }
    }
}

/// Requests the controller leaves for whoever owns the window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureIntent {
    Dismiss,
    /// The buffer was changed programmatically and the text view must follow.
    ReplaceSurfaceText(String),
}

/// Owns the text being captured and everything a commit does with it.
pub struct CaptureController {
    content: String,
    pulse: FeedbackPulse,
    clipboard: Box<dyn ClipboardPort>,
    settings: Rc<dyn SettingsStore>,
    intents: VecDeque<CaptureIntent>,
}

impl CaptureController {
    pub fn new(
        clipboard: Box<dyn ClipboardPort>,
        timer: Box<dyn PulseTimer>,
        settings: Rc<dyn SettingsStore>,
    ) -> Self {
        CaptureController {
            content: String::new(),
            pulse: FeedbackPulse {
                state: PulseState::Idle,
                timer,
            },
            clipboard,
            settings,
            intents: VecDeque::new(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn can_commit(&self) -> bool {
        !self.content.is_empty()
    }

    /// User-perceived characters, so "👍🏽" counts once.
    pub fn char_count(&self) -> usize {
        self.content.graphemes(true).count()
    }

    pub fn feedback_state(&self) -> PulseState {
        self.pulse.state
    }

    pub fn feedback_active(&self) -> bool {
        self.pulse.state == PulseState::Showing
    }

    /// Mirror an edit made in the text view.
    pub fn set_content(&mut self, text: String) {
        self.content = text;
    }

    /// Copy the buffer to the clipboard. Returns false, touching nothing, when
    /// the buffer is empty or the write fails.
    pub fn commit(&mut self) -> bool {
        if !self.can_commit() {
            debug!("commit skipped, buffer is empty");
            return false;
        }

        let flags = self.settings.behavior();
        let len = self.char_count();

        if let Err(err) = self.clipboard.write_text(&self.content) {
            warn!(error = %err, len, "clipboard write failed");
            return false;
        }
        debug!(len, "copied to clipboard");

        self.pulse.trigger();
        if flags.clear_after_commit {
            self.clear();
        }
        if flags.dismiss_after_commit {
            self.request_dismiss();
        }
        true
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.intents
            .push_back(CaptureIntent::ReplaceSurfaceText(String::new()));
    }

    pub fn request_dismiss(&mut self) {
        self.intents.push_back(CaptureIntent::Dismiss);
    }

    /// Timer callback. Returns true if the pulse was showing and is now idle.
    pub fn on_feedback_elapsed(&mut self) -> bool {
        self.pulse.elapse()
    }

    pub fn next_intent(&mut self) -> Option<CaptureIntent> {
        self.intents.pop_front()
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.pulse.timer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Settings, StaticSettings};
    use crate::testing::{FakeClipboard, FakeTimer};

    fn controller_with(settings: Settings) -> (CaptureController, FakeClipboard, FakeTimer) {
        let clipboard = FakeClipboard::default();
        let timer = FakeTimer::default();
        let controller = CaptureController::new(
            Box::new(clipboard.clone()),
            Box::new(timer.clone()),
            Rc::new(StaticSettings(settings)),
        );
        (controller, clipboard, timer)
    }

    fn drain(controller: &mut CaptureController) -> Vec<CaptureIntent> {
        std::iter::from_fn(|| controller.next_intent()).collect()
    }

    #[test]
    fn empty_commit_does_nothing() {
        let (mut controller, clipboard, timer) = controller_with(Settings::default());

        assert!(!controller.commit());
        assert!(clipboard.writes().is_empty());
        assert_eq!(timer.restarts(), 0);
        assert!(!controller.feedback_active());
        assert!(drain(&mut controller).is_empty());
    }

    #[test]
    fn commit_with_clear_and_dismiss() {
        let (mut controller, clipboard, timer) = controller_with(Settings::default());
        controller.set_content("hello".to_string());

        assert!(controller.commit());
        assert_eq!(clipboard.writes(), vec!["hello".to_string()]);
        assert_eq!(controller.content(), "");
        assert!(controller.feedback_active());
        assert_eq!(timer.restarts(), 1);
        assert_eq!(timer.last_duration(), Some(FEEDBACK_DURATION));
        assert_eq!(
            drain(&mut controller),
            vec![
                CaptureIntent::ReplaceSurfaceText(String::new()),
                CaptureIntent::Dismiss,
            ]
        );

        timer.fire();
        assert!(controller.on_feedback_elapsed());
        assert!(!controller.feedback_active());
    }

    #[test]
    fn commit_keeps_content_when_flags_are_off() {
        let (mut controller, clipboard, _timer) = controller_with(Settings {
            clear_input_after_copy: false,
            close_window_after_copy: false,
            ..Settings::default()
        });
        controller.set_content("draft".to_string());

        assert!(controller.commit());
        assert_eq!(clipboard.writes(), vec!["draft".to_string()]);
        assert_eq!(controller.content(), "draft");
        assert!(drain(&mut controller).is_empty());
    }

    #[test]
    fn failed_write_has_no_side_effects() {
        let (mut controller, clipboard, timer) = controller_with(Settings::default());
        clipboard.fail_writes(true);
        controller.set_content("secret".to_string());

        assert!(!controller.commit());
        assert_eq!(controller.content(), "secret");
        assert!(!controller.feedback_active());
        assert_eq!(timer.restarts(), 0);
        assert!(drain(&mut controller).is_empty());
    }

    #[test]
    fn repeat_commit_extends_the_pulse() {
        let (mut controller, _clipboard, timer) = controller_with(Settings {
            clear_input_after_copy: false,
            close_window_after_copy: false,
            ..Settings::default()
        });
        controller.set_content("a".to_string());

        assert!(controller.commit());
        assert!(controller.commit());
        assert_eq!(timer.restarts(), 2);
        assert_eq!(timer.armed(), 1);
        assert_eq!(controller.feedback_state(), PulseState::Showing);

        timer.fire();
        assert!(controller.on_feedback_elapsed());
        assert_eq!(controller.feedback_state(), PulseState::Idle);
        assert!(!controller.on_feedback_elapsed());
    }

    #[test]
    fn clear_always_pushes_empty_text() {
        let (mut controller, _clipboard, _timer) = controller_with(Settings::default());
        controller.clear();
        controller.set_content("x".to_string());
        controller.clear();
        assert_eq!(controller.content(), "");
        assert_eq!(
            drain(&mut controller),
            vec![
                CaptureIntent::ReplaceSurfaceText(String::new()),
                CaptureIntent::ReplaceSurfaceText(String::new()),
            ]
        );
    }

    #[test]
    fn char_count_counts_grapheme_clusters() {
        let (mut controller, _clipboard, _timer) = controller_with(Settings::default());
        controller.set_content("héllo ✓".to_string());
        assert_eq!(controller.char_count(), 7);

        // Skin tone modifier and a decomposed "e" + combining acute.
        controller.set_content("👍🏽 cafe\u{301}".to_string());
        assert_eq!(controller.char_count(), 6);
    }
}
