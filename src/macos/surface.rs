use objc2::rc::{Retained, Weak};
use objc2::runtime::{AnyObject, ProtocolObject, Sel};
use objc2::{define_class, msg_send, sel, DefinedClass, MainThreadOnly};
use objc2_app_kit::{
    NSApplication, NSAutoresizingMaskOptions, NSBackingStoreType, NSButton, NSColor, NSEvent,
    NSEventModifierFlags, NSFont, NSScreen, NSScrollView, NSTextField, NSTextView, NSWindow,
    NSWindowStyleMask, NSWindowTitleVisibility,
};
use objc2_core_foundation::{CGFloat, CGPoint, CGSize};
use objc2_foundation::{MainThreadMarker, NSRect, NSSize, NSString};
use tracing::trace;

use super::app::AppDelegate;
use crate::error::SurfaceError;
use crate::keys::{ChordAction, ChordModifiers, ChordTable, KeyChord};
use crate::window::{CaptureSurface, SurfaceFactory, SurfaceView};

const WINDOW_W: CGFloat = 640.0;
const WINDOW_H: CGFloat = 350.0;
const PADDING: CGFloat = 12.0;
const TITLEBAR_INSET: CGFloat = 28.0;
const BAR_H: CGFloat = 44.0;
const BUTTON_W: CGFloat = 80.0;
const BUTTON_H: CGFloat = 28.0;
const FONT_SIZE: CGFloat = 16.0;

const FLOATING_WINDOW_LEVEL: isize = 3;
const NORMAL_WINDOW_LEVEL: isize = 0;

// --- CaptureTextView: NSTextView that claims the commit and cancel chords ---

pub struct CaptureTextViewIvars {
    chords: ChordTable,
}

define_class!(
    #[unsafe(super(NSTextView))]
    #[thread_kind = MainThreadOnly]
    #[name = "CaptureTextView"]
    #[ivars = CaptureTextViewIvars]
    pub struct CaptureTextView;

    impl CaptureTextView {
        #[unsafe(method(keyDown:))]
        fn key_down(&self, event: &NSEvent) {
            let chord = KeyChord::new(event.keyCode(), chord_modifiers(event.modifierFlags()));
            let action = self.ivars().chords.intercept(chord, || {
                let _: () = unsafe { msg_send![super(self), keyDown: event] };
            });
            if let Some(action) = action {
                let selector = match action {
                    ChordAction::Commit => sel!(chordCommit:),
                    ChordAction::Cancel => sel!(chordCancel:),
                };
                self.send_up_chain(selector);
            }
        }

        #[unsafe(method(didChangeText))]
        fn did_change_text(&self) {
            let _: () = unsafe { msg_send![super(self), didChangeText] };
            self.send_up_chain(sel!(textChanged:));
        }
    }
);

impl CaptureTextView {
    fn new(mtm: MainThreadMarker, frame: NSRect) -> Retained<Self> {
        let this = mtm.alloc().set_ivars(CaptureTextViewIvars {
            chords: ChordTable::default(),
        });
        let view: Retained<Self> = unsafe { msg_send![super(this), initWithFrame: frame] };

        let font = NSFont::systemFontOfSize(FONT_SIZE);
        let _: () = unsafe { msg_send![&*view, setRichText: false] };
        let _: () = unsafe { msg_send![&*view, setAllowsUndo: true] };
        let _: () = unsafe { msg_send![&*view, setFont: &*font] };
        let _: () = unsafe { msg_send![&*view, setTextContainerInset: NSSize::new(5.0, 5.0)] };
        let _: () = unsafe { msg_send![&*view, setDrawsBackground: true] };
        let _: () =
            unsafe { msg_send![&*view, setBackgroundColor: &*NSColor::textBackgroundColor()] };

        // Wrap at the view width and grow vertically inside the scroll view.
        let big = CGSize::new(1.0e7, 1.0e7);
        let _: () = unsafe { msg_send![&*view, setMinSize: CGSize::ZERO] };
        let _: () = unsafe { msg_send![&*view, setMaxSize: big] };
        let _: () = unsafe { msg_send![&*view, setVerticallyResizable: true] };
        let _: () = unsafe { msg_send![&*view, setHorizontallyResizable: false] };
        view.setAutoresizingMask(NSAutoresizingMaskOptions::ViewWidthSizable);
        let tc: *mut AnyObject = unsafe { msg_send![&*view, textContainer] };
        if !tc.is_null() {
            let container = CGSize::new(frame.size.width, 1.0e7);
            let _: () = unsafe { msg_send![tc, setContainerSize: container] };
            let _: () = unsafe { msg_send![tc, setWidthTracksTextView: true] };
        }

        view
    }

    /// Nil-targeted action: walks the responder chain to the window delegate.
    fn send_up_chain(&self, action: Sel) {
        let mtm = MainThreadMarker::from(self);
        let sender: &AnyObject = self;
        let handled = unsafe {
            NSApplication::sharedApplication(mtm).sendAction_to_from(action, None, Some(sender))
        };
        if !handled {
            trace!(?action, "no responder for text view action");
        }
    }

    fn text(&self) -> String {
        let text: Retained<NSString> = unsafe { msg_send![self, string] };
        text.to_string()
    }

    fn set_text(&self, text: &str) {
        let ns_text = NSString::from_str(text);
        let _: () = unsafe { msg_send![self, setString: &*ns_text] };
    }
}

fn chord_modifiers(flags: NSEventModifierFlags) -> ChordModifiers {
    let mut modifiers = ChordModifiers::empty();
    if flags.contains(NSEventModifierFlags::Command) {
        modifiers |= ChordModifiers::COMMAND;
    }
    if flags.contains(NSEventModifierFlags::Shift) {
        modifiers |= ChordModifiers::SHIFT;
    }
    if flags.contains(NSEventModifierFlags::Option) {
        modifiers |= ChordModifiers::OPTION;
    }
    if flags.contains(NSEventModifierFlags::Control) {
        modifiers |= ChordModifiers::CONTROL;
    }
    modifiers
}

// --- CaptureWindow: the reusable surface ---

pub struct CaptureWindow {
    window: Retained<NSWindow>,
    text_view: Retained<CaptureTextView>,
    copy_button: Retained<NSButton>,
    clear_button: Retained<NSButton>,
    count_label: Retained<NSTextField>,
    hint_label: Retained<NSTextField>,
    feedback_label: Retained<NSTextField>,
}

impl CaptureSurface for CaptureWindow {
    fn present(&mut self) {
        self.window.makeKeyAndOrderFront(None);
        self.window.makeFirstResponder(Some(&*self.text_view));
    }

    fn dismiss(&mut self) {
        self.window.orderOut(None);
    }

    fn replace_text(&mut self, text: &str) {
        if self.text_view.text() != text {
            self.text_view.set_text(text);
        }
    }

    fn render(&mut self, view: &SurfaceView) {
        self.count_label
            .setStringValue(&NSString::from_str(&format!("{} Characters", view.char_count)));
        self.copy_button.setEnabled(view.can_commit);
        self.clear_button.setEnabled(view.can_commit);
        self.hint_label.setHidden(!view.show_hint);
        self.feedback_label.setHidden(!view.feedback_active);
    }
}

pub struct AppKitSurfaceFactory {
    mtm: MainThreadMarker,
    delegate: Weak<AppDelegate>,
    floating: bool,
}

impl AppKitSurfaceFactory {
    pub fn new(mtm: MainThreadMarker, delegate: Weak<AppDelegate>, floating: bool) -> Self {
        AppKitSurfaceFactory {
            mtm,
            delegate,
            floating,
        }
    }
}

impl SurfaceFactory for AppKitSurfaceFactory {
    type Surface = CaptureWindow;

    fn create(&mut self) -> Result<CaptureWindow, SurfaceError> {
        let mtm = self.mtm;
        if NSScreen::mainScreen(mtm).is_none() {
            return Err(SurfaceError::NoScreen);
        }
        let delegate = self
            .delegate
            .load()
            .ok_or_else(|| SurfaceError::Construction("app delegate is gone".to_string()))?;

        let content_rect = NSRect::new(CGPoint::ZERO, CGSize::new(WINDOW_W, WINDOW_H));
        let style = NSWindowStyleMask::Titled
            | NSWindowStyleMask::Closable
            | NSWindowStyleMask::Resizable
            | NSWindowStyleMask::FullSizeContentView;
        let window = unsafe {
            NSWindow::initWithContentRect_styleMask_backing_defer(
                mtm.alloc(),
                content_rect,
                style,
                NSBackingStoreType::Buffered,
                false,
            )
        };
        window.setTitle(&NSString::from_str("CalmType"));
        window.setTitleVisibility(NSWindowTitleVisibility::Hidden);
        window.setTitlebarAppearsTransparent(true);
        window.setLevel(if self.floating {
            FLOATING_WINDOW_LEVEL
        } else {
            NORMAL_WINDOW_LEVEL
        });
        window.setHasShadow(true);
        unsafe { window.setReleasedWhenClosed(false) };
        unsafe { window.setDelegate(Some(ProtocolObject::from_ref(&*delegate))) };
        window.center();

        let Some(content_view) = window.contentView() else {
            return Err(SurfaceError::Construction("window has no content view".to_string()));
        };

        // Non-flipped layout (origin bottom-left):
        // y=0..BAR_H: buttons, character count, hint
        // above: scrolling text view
        let scroll_frame = NSRect::new(
            CGPoint::new(PADDING, BAR_H),
            CGSize::new(
                WINDOW_W - PADDING * 2.0,
                WINDOW_H - BAR_H - TITLEBAR_INSET,
            ),
        );
        let scroll: Retained<NSScrollView> =
            unsafe { msg_send![mtm.alloc(), initWithFrame: scroll_frame] };
        scroll.setHasVerticalScroller(true);
        scroll.setHasHorizontalScroller(false);
        scroll.setAutohidesScrollers(true);
        scroll.setDrawsBackground(false);
        scroll.setAutoresizingMask(
            NSAutoresizingMaskOptions::ViewWidthSizable
                | NSAutoresizingMaskOptions::ViewHeightSizable,
        );

        let text_frame = NSRect::new(CGPoint::ZERO, scroll.contentSize());
        let text_view = CaptureTextView::new(mtm, text_frame);
        scroll.setDocumentView(Some(&text_view));
        content_view.addSubview(&scroll);

        let button_y = (BAR_H - BUTTON_H) / 2.0;
        let copy_button = create_button(mtm, "Copy", sel!(commitPressed:), PADDING, button_y);
        let clear_button = create_button(
            mtm,
            "Clear",
            sel!(clearPressed:),
            PADDING + BUTTON_W + 8.0,
            button_y,
        );
        content_view.addSubview(&copy_button);
        content_view.addSubview(&clear_button);

        let count_label = create_label(mtm, "0 Characters", 13.0);
        count_label.setFrameOrigin(CGPoint::new(PADDING + (BUTTON_W + 8.0) * 2.0, button_y + 5.0));
        count_label.setFrameSize(CGSize::new(140.0, 18.0));
        content_view.addSubview(&count_label);

        let hint_label = create_label(mtm, "Shortcut: \u{2318} + Enter", 11.0);
        hint_label.setFrameSize(CGSize::new(140.0, 16.0));
        hint_label.setFrameOrigin(CGPoint::new(WINDOW_W - PADDING - 140.0, button_y + 6.0));
        hint_label.setAutoresizingMask(NSAutoresizingMaskOptions::ViewMinXMargin);
        content_view.addSubview(&hint_label);

        let feedback_label = create_label(mtm, "Copied", 12.0);
        feedback_label.setFrameSize(CGSize::new(60.0, 18.0));
        feedback_label.setFrameOrigin(CGPoint::new(
            WINDOW_W - PADDING - 60.0,
            WINDOW_H - TITLEBAR_INSET - 24.0,
        ));
        feedback_label.setAutoresizingMask(
            NSAutoresizingMaskOptions::ViewMinXMargin | NSAutoresizingMaskOptions::ViewMinYMargin,
        );
        feedback_label.setHidden(true);
        content_view.addSubview(&feedback_label);

        Ok(CaptureWindow {
            window,
            text_view,
            copy_button,
            clear_button,
            count_label,
            hint_label,
            feedback_label,
        })
    }
}

fn create_button(
    mtm: MainThreadMarker,
    title: &str,
    action: Sel,
    x: CGFloat,
    y: CGFloat,
) -> Retained<NSButton> {
    let frame = NSRect::new(CGPoint::new(x, y), CGSize::new(BUTTON_W, BUTTON_H));
    let button: Retained<NSButton> = unsafe { msg_send![mtm.alloc(), initWithFrame: frame] };
    button.setTitle(&NSString::from_str(title));
    unsafe {
        button.setAction(Some(action));
        button.setTarget(None);
    }
    #[allow(deprecated)]
    button.setBezelStyle(objc2_app_kit::NSBezelStyle::Rounded);
    button.setEnabled(false);
    button
}

fn create_label(mtm: MainThreadMarker, text: &str, font_size: CGFloat) -> Retained<NSTextField> {
    let label = NSTextField::labelWithString(&NSString::from_str(text), mtm);
    label.setFont(Some(&NSFont::systemFontOfSize(font_size)));
    label.setTextColor(Some(&NSColor::secondaryLabelColor()));
    label
}
