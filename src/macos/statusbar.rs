use objc2::rc::Retained;
use objc2::runtime::Sel;
use objc2::sel;
use objc2_app_kit::{NSMenu, NSMenuItem, NSStatusBar, NSStatusItem, NSVariableStatusItemLength};
use objc2_foundation::{MainThreadMarker, NSString};

const STATUS_TITLE: &str = "\u{270E}"; // ✎

/// Menu entries as (title, action, key equivalent); `None` is a separator.
/// Actions are nil-targeted and reach the app delegate through the responder
/// chain, so the status menu feeds the same event queue as the hotkey.
fn menu_entries() -> [Option<(&'static str, Sel, &'static str)>; 3] {
    [
        Some(("Show/Hide CalmType", sel!(toggleCapture:), "")),
        None,
        Some(("Quit", sel!(terminate:), "q")),
    ]
}

pub struct StatusBar {
    _status_item: Retained<NSStatusItem>,
}

impl StatusBar {
    pub fn new(mtm: MainThreadMarker) -> Self {
        let status_item =
            NSStatusBar::systemStatusBar().statusItemWithLength(NSVariableStatusItemLength);
        if let Some(button) = status_item.button(mtm) {
            button.setTitle(&NSString::from_str(STATUS_TITLE));
        }

        let menu = NSMenu::new(mtm);
        for entry in menu_entries() {
            let item = match entry {
                Some((title, action, key)) => menu_item(mtm, title, action, key),
                None => NSMenuItem::separatorItem(mtm),
            };
            menu.addItem(&item);
        }
        status_item.setMenu(Some(&menu));

        StatusBar {
            _status_item: status_item,
        }
    }
}

fn menu_item(
    mtm: MainThreadMarker,
    title: &str,
    action: Sel,
    key: &str,
) -> Retained<NSMenuItem> {
    unsafe {
        NSMenuItem::initWithTitle_action_keyEquivalent(
            mtm.alloc(),
            &NSString::from_str(title),
            Some(action),
            &NSString::from_str(key),
        )
    }
}
