//! AppKit implementations of the window, foreground, timer and menu ports.

mod app;
mod foreground;
mod statusbar;
mod surface;
mod timer;

use objc2::runtime::ProtocolObject;
use objc2_app_kit::{NSApplication, NSApplicationActivationPolicy, NSApplicationDelegate};
use objc2_foundation::MainThreadMarker;
use tracing::error;

use app::AppDelegate;

/// Install the delegate and run the AppKit loop as a menu bar accessory, with
/// no Dock icon. Returns only if called off the main thread.
pub fn run() {
    let Some(mtm) = MainThreadMarker::new() else {
        error!("CalmType must be started on the main thread");
        return;
    };

    let app = NSApplication::sharedApplication(mtm);
    app.setActivationPolicy(NSApplicationActivationPolicy::Accessory);

    // `setDelegate` holds a weak reference; keep ours alive across `run`.
    let delegate = AppDelegate::new(mtm);
    app.setDelegate(Some(ProtocolObject::<dyn NSApplicationDelegate>::from_ref(
        &*delegate,
    )));
    app.run();
}
