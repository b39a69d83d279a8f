use std::time::Duration;

use objc2::rc::{Retained, Weak};
use objc2::runtime::AnyObject;
use objc2::sel;
use objc2_foundation::NSTimer;

use super::app::AppDelegate;
use crate::capture::PulseTimer;

/// One-shot `NSTimer` that calls `feedbackElapsed:` on the app delegate.
pub struct AppKitPulseTimer {
    target: Weak<AppDelegate>,
    timer: Option<Retained<NSTimer>>,
}

impl AppKitPulseTimer {
    pub fn new(target: Weak<AppDelegate>) -> Self {
        AppKitPulseTimer {
            target,
            timer: None,
        }
    }
}

impl PulseTimer for AppKitPulseTimer {
    fn restart(&mut self, after: Duration) {
        self.cancel();
        let Some(delegate) = self.target.load() else {
            return;
        };
        let target: &AnyObject = &delegate;
        let timer = unsafe {
            NSTimer::scheduledTimerWithTimeInterval_target_selector_userInfo_repeats(
                after.as_secs_f64(),
                target,
                sel!(feedbackElapsed:),
                None,
                false,
            )
        };
        self.timer = Some(timer);
    }

    fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.invalidate();
        }
    }
}
