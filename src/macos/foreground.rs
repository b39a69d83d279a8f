use objc2_app_kit::{
    NSApplication, NSApplicationActivationOptions, NSRunningApplication, NSWorkspace,
};
use objc2_foundation::MainThreadMarker;

use crate::foreground::{ForegroundPort, ProcessRef};

/// Frontmost-application queries through `NSWorkspace`.
pub struct WorkspaceForeground {
    mtm: MainThreadMarker,
    own: ProcessRef,
}

impl WorkspaceForeground {
    pub fn new(mtm: MainThreadMarker) -> Self {
        WorkspaceForeground {
            mtm,
            own: ProcessRef(std::process::id() as i32),
        }
    }
}

impl ForegroundPort for WorkspaceForeground {
    fn current_foreground(&self) -> Option<ProcessRef> {
        NSWorkspace::sharedWorkspace()
            .frontmostApplication()
            .map(|app| ProcessRef(app.processIdentifier()))
    }

    fn own_process(&self) -> ProcessRef {
        self.own
    }

    fn is_running(&self, process: ProcessRef) -> bool {
        NSRunningApplication::runningApplicationWithProcessIdentifier(process.pid())
            .is_some_and(|app| !app.isTerminated())
    }

    fn activate(&self, process: ProcessRef) -> bool {
        match NSRunningApplication::runningApplicationWithProcessIdentifier(process.pid()) {
            Some(app) if !app.isTerminated() => {
                #[allow(deprecated)]
                app.activateWithOptions(NSApplicationActivationOptions::ActivateIgnoringOtherApps)
            }
            _ => false,
        }
    }

    fn activate_self(&self) {
        #[allow(deprecated)]
        NSApplication::sharedApplication(self.mtm).activateIgnoringOtherApps(true);
    }
}
