use std::cell::{OnceCell, RefCell};
use std::rc::Rc;

use objc2::rc::{Retained, Weak};
use objc2::runtime::AnyObject;
use objc2::{define_class, msg_send, sel, DefinedClass, MainThreadOnly};
use objc2_app_kit::{NSApplication, NSApplicationDelegate, NSWindowDelegate};
use objc2_foundation::{
    MainThreadMarker, NSNotification, NSObject, NSObjectProtocol, NSString, NSTimer,
};
use tracing::{debug, error, info, warn};

use super::foreground::WorkspaceForeground;
use super::statusbar::StatusBar;
use super::surface::AppKitSurfaceFactory;
use super::timer::AppKitPulseTimer;
use crate::capture::CaptureController;
use crate::clipboard::ArboardClipboard;
use crate::events::{AppEvent, EventQueue, FocusDestination};
use crate::hotkey::{HotkeyBinding, HotkeyDispatcher};
use crate::keys::ChordAction;
use crate::settings::{Settings, SettingsStore, StaticSettings, TomlSettingsStore};
use crate::window::WindowLifecycleManager;

type CaptureManager = WindowLifecycleManager<AppKitSurfaceFactory>;

/// How often the global hotkey channel is drained.
const HOTKEY_POLL_INTERVAL: f64 = 0.1;

pub struct AppDelegateIvars {
    status_bar: RefCell<Option<StatusBar>>,
    hotkeys: RefCell<Option<HotkeyDispatcher>>,
    manager: OnceCell<RefCell<CaptureManager>>,
    events: EventQueue,
}

define_class!(
    #[unsafe(super(NSObject))]
    #[thread_kind = MainThreadOnly]
    #[name = "CalmTypeAppDelegate"]
    #[ivars = AppDelegateIvars]
    pub struct AppDelegate;

    unsafe impl NSObjectProtocol for AppDelegate {}

    unsafe impl NSApplicationDelegate for AppDelegate {
        #[unsafe(method(applicationDidFinishLaunching:))]
        fn application_did_finish_launching(&self, _notification: &NSNotification) {
            self.launch();
        }

        #[unsafe(method(applicationDidBecomeActive:))]
        fn application_did_become_active(&self, _notification: &NSNotification) {
            let has_visible_window = self.has_visible_window();
            self.dispatch(AppEvent::BecameActive { has_visible_window });
        }

        #[unsafe(method(applicationDidResignActive:))]
        fn application_did_resign_active(&self, _notification: &NSNotification) {
            self.dispatch(AppEvent::SurfaceResignedFocus(
                FocusDestination::OtherApplication,
            ));
        }

        #[unsafe(method(applicationShouldHandleReopen:hasVisibleWindows:))]
        fn application_should_handle_reopen(
            &self,
            _sender: &NSApplication,
            has_visible_windows: bool,
        ) -> bool {
            self.dispatch(AppEvent::BecameActive {
                has_visible_window: has_visible_windows,
            });
            true
        }
    }

    unsafe impl NSWindowDelegate for AppDelegate {
        #[unsafe(method(windowWillClose:))]
        fn window_will_close(&self, _notification: &NSNotification) {
            self.dispatch(AppEvent::SurfaceClosedByUser);
        }

        #[unsafe(method(windowDidResignKey:))]
        fn window_did_resign_key(&self, _notification: &NSNotification) {
            // Losing key while still active means another of our windows took
            // it; app deactivation is reported separately.
            let mtm = MainThreadMarker::from(self);
            if NSApplication::sharedApplication(mtm).isActive() {
                self.dispatch(AppEvent::SurfaceResignedFocus(
                    FocusDestination::OwnAuxiliaryWindow,
                ));
            }
        }
    }

    // --- Hotkey polling (called by NSTimer) ---
    impl AppDelegate {
        #[unsafe(method(pollHotkeys:))]
        fn poll_hotkeys(&self, _timer: &NSObject) {
            let presses = match self.ivars().hotkeys.borrow().as_ref() {
                Some(hotkeys) => hotkeys.poll_toggles(),
                None => 0,
            };
            for _ in 0..presses {
                self.dispatch(AppEvent::ToggleRequested);
            }
        }

        #[unsafe(method(feedbackElapsed:))]
        fn feedback_elapsed(&self, _timer: &NSObject) {
            self.dispatch(AppEvent::FeedbackElapsed);
        }
    }

    // --- Menu and button actions (nil-targeted, via the responder chain) ---
    impl AppDelegate {
        #[unsafe(method(toggleCapture:))]
        fn toggle_capture(&self, _sender: &AnyObject) {
            self.dispatch(AppEvent::ToggleRequested);
        }

        #[unsafe(method(commitPressed:))]
        fn commit_pressed(&self, _sender: &AnyObject) {
            self.dispatch(AppEvent::CommitRequested);
        }

        #[unsafe(method(clearPressed:))]
        fn clear_pressed(&self, _sender: &AnyObject) {
            self.dispatch(AppEvent::ClearRequested);
        }
    }

    // --- Text view actions ---
    impl AppDelegate {
        #[unsafe(method(chordCommit:))]
        fn chord_commit(&self, _sender: &AnyObject) {
            self.dispatch(AppEvent::Chord(ChordAction::Commit));
        }

        #[unsafe(method(chordCancel:))]
        fn chord_cancel(&self, _sender: &AnyObject) {
            self.dispatch(AppEvent::Chord(ChordAction::Cancel));
        }

        #[unsafe(method(textChanged:))]
        fn text_changed(&self, sender: &AnyObject) {
            let text: Retained<NSString> = unsafe { msg_send![sender, string] };
            self.dispatch(AppEvent::ContentChanged(text.to_string()));
        }
    }
);

impl AppDelegate {
    pub fn new(mtm: MainThreadMarker) -> Retained<Self> {
        let this = mtm.alloc().set_ivars(AppDelegateIvars {
            status_bar: RefCell::new(None),
            hotkeys: RefCell::new(None),
            manager: OnceCell::new(),
            events: EventQueue::new(),
        });
        unsafe { msg_send![super(this), init] }
    }

    fn launch(&self) {
        let mtm = MainThreadMarker::from(self);

        let (settings, store): (Settings, Rc<dyn SettingsStore>) =
            match TomlSettingsStore::default_location() {
                Ok(store) => {
                    info!(path = %store.path().display(), "using settings file");
                    (store.load_or_default(), Rc::new(store))
                }
                Err(err) => {
                    warn!(error = %err, "running with default settings");
                    let settings = Settings::default();
                    (settings.clone(), Rc::new(StaticSettings(settings)))
                }
            };

        *self.ivars().status_bar.borrow_mut() = Some(StatusBar::new(mtm));

        match HotkeyBinding::parse(&settings.hotkey).and_then(HotkeyDispatcher::register) {
            Ok(hotkeys) => *self.ivars().hotkeys.borrow_mut() = Some(hotkeys),
            Err(err) => error!(error = %err, "global hotkey unavailable, use the status bar menu"),
        }

        let capture = CaptureController::new(
            Box::new(ArboardClipboard),
            Box::new(AppKitPulseTimer::new(Weak::new(self))),
            store.clone(),
        );
        let factory = AppKitSurfaceFactory::new(mtm, Weak::new(self), settings.floating_window);
        let manager = WindowLifecycleManager::new(
            factory,
            Box::new(WorkspaceForeground::new(mtm)),
            capture,
            store,
        );
        if self.ivars().manager.set(RefCell::new(manager)).is_err() {
            warn!("application launched twice, keeping the first window manager");
            return;
        }

        let target: &AnyObject = self;
        unsafe {
            NSTimer::scheduledTimerWithTimeInterval_target_selector_userInfo_repeats(
                HOTKEY_POLL_INTERVAL,
                target,
                sel!(pollHotkeys:),
                None,
                true,
            );
        }

        info!(hotkey = %settings.hotkey, "CalmType started");
        self.dispatch(AppEvent::ShowRequested);
    }

    fn dispatch(&self, event: AppEvent) {
        match self.ivars().manager.get() {
            Some(manager) => self.ivars().events.dispatch(manager, event),
            None => debug!(?event, "dropping event received before launch"),
        }
    }

    fn has_visible_window(&self) -> bool {
        let mtm = MainThreadMarker::from(self);
        // The status item lives in a window too; only count real ones.
        let windows = NSApplication::sharedApplication(mtm).windows();
        for window in &windows {
            if window.isVisible() && window.canBecomeMainWindow() {
                return true;
            }
        }
        false
    }
}
