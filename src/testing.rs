//! In-memory stand-ins for the platform ports.

use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::capture::PulseTimer;
use crate::clipboard::ClipboardPort;
use crate::error::{ClipboardError, SurfaceError};
use crate::foreground::{ForegroundPort, ProcessRef};
use crate::window::{CaptureSurface, SurfaceFactory, SurfaceView};

#[derive(Default)]
struct ClipboardLog {
    writes: Vec<String>,
    fail: bool,
}

#[derive(Clone, Default)]
pub struct FakeClipboard(Rc<RefCell<ClipboardLog>>);

impl FakeClipboard {
    pub fn writes(&self) -> Vec<String> {
        self.0.borrow().writes.clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.0.borrow_mut().fail = fail;
    }
}

impl ClipboardPort for FakeClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut log = self.0.borrow_mut();
        if log.fail {
            return Err(ClipboardError::WriteFailed("pasteboard locked".into()));
        }
        log.writes.push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct TimerLog {
    restarts: usize,
    armed: usize,
    last: Option<Duration>,
}

#[derive(Clone, Default)]
pub struct FakeTimer(Rc<RefCell<TimerLog>>);

impl FakeTimer {
    pub fn restarts(&self) -> usize {
        self.0.borrow().restarts
    }

    /// Timers currently pending.
    pub fn armed(&self) -> usize {
        self.0.borrow().armed
    }

    pub fn last_duration(&self) -> Option<Duration> {
        self.0.borrow().last
    }

    /// Let the pending timer go off. The caller delivers the callback.
    pub fn fire(&self) {
        let mut log = self.0.borrow_mut();
        assert_eq!(log.armed, 1, "no timer pending");
        log.armed = 0;
    }
}

impl PulseTimer for FakeTimer {
    fn restart(&mut self, after: Duration) {
        let mut log = self.0.borrow_mut();
        log.restarts += 1;
        log.armed = 1;
        log.last = Some(after);
    }

    fn cancel(&mut self) {
        self.0.borrow_mut().armed = 0;
    }
}

struct ForegroundState {
    own: ProcessRef,
    current: Option<ProcessRef>,
    terminated: HashSet<ProcessRef>,
    activations: Vec<ProcessRef>,
    self_activations: usize,
}

#[derive(Clone)]
pub struct FakeForeground(Rc<RefCell<ForegroundState>>);

impl FakeForeground {
    pub fn new(own: ProcessRef, current: Option<ProcessRef>) -> Self {
        FakeForeground(Rc::new(RefCell::new(ForegroundState {
            own,
            current,
            terminated: HashSet::new(),
            activations: Vec::new(),
            self_activations: 0,
        })))
    }

    pub fn current(&self) -> Option<ProcessRef> {
        self.0.borrow().current
    }

    pub fn set_current(&self, process: Option<ProcessRef>) {
        self.0.borrow_mut().current = process;
    }

    pub fn terminate(&self, process: ProcessRef) {
        self.0.borrow_mut().terminated.insert(process);
    }

    /// Activations of other processes, in order.
    pub fn activations(&self) -> Vec<ProcessRef> {
        self.0.borrow().activations.clone()
    }

    pub fn self_activations(&self) -> usize {
        self.0.borrow().self_activations
    }
}

impl ForegroundPort for FakeForeground {
    fn current_foreground(&self) -> Option<ProcessRef> {
        self.0.borrow().current
    }

    fn own_process(&self) -> ProcessRef {
        self.0.borrow().own
    }

    fn is_running(&self, process: ProcessRef) -> bool {
        !self.0.borrow().terminated.contains(&process)
    }

    fn activate(&self, process: ProcessRef) -> bool {
        let mut state = self.0.borrow_mut();
        if state.terminated.contains(&process) {
            return false;
        }
        state.activations.push(process);
        state.current = Some(process);
        true
    }

    fn activate_self(&self) {
        let mut state = self.0.borrow_mut();
        state.self_activations += 1;
        state.current = Some(state.own);
    }
}

#[derive(Default)]
struct SurfaceLog {
    created: usize,
    presents: usize,
    dismisses: usize,
    fail_next: bool,
    last_text: Option<String>,
    last_view: Option<SurfaceView>,
}

#[derive(Clone, Default)]
pub struct FakeSurfaceFactory(Rc<RefCell<SurfaceLog>>);

impl FakeSurfaceFactory {
    pub fn created(&self) -> usize {
        self.0.borrow().created
    }

    pub fn presents(&self) -> usize {
        self.0.borrow().presents
    }

    pub fn dismisses(&self) -> usize {
        self.0.borrow().dismisses
    }

    pub fn fail_next_create(&self) {
        self.0.borrow_mut().fail_next = true;
    }

    pub fn last_text(&self) -> Option<String> {
        self.0.borrow().last_text.clone()
    }

    pub fn last_view(&self) -> Option<SurfaceView> {
        self.0.borrow().last_view
    }
}

pub struct FakeSurface(Rc<RefCell<SurfaceLog>>);

impl SurfaceFactory for FakeSurfaceFactory {
    type Surface = FakeSurface;

    fn create(&mut self) -> Result<FakeSurface, SurfaceError> {
        let mut log = self.0.borrow_mut();
        if log.fail_next {
            log.fail_next = false;
            return Err(SurfaceError::NoScreen);
        }
        log.created += 1;
        Ok(FakeSurface(self.0.clone()))
    }
}

impl CaptureSurface for FakeSurface {
    fn present(&mut self) {
        self.0.borrow_mut().presents += 1;
    }

    fn dismiss(&mut self) {
        self.0.borrow_mut().dismisses += 1;
    }

    fn replace_text(&mut self, text: &str) {
        self.0.borrow_mut().last_text = Some(text.to_string());
    }

    fn render(&mut self, view: &SurfaceView) {
        self.0.borrow_mut().last_view = Some(*view);
    }
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a TRACE-level subscriber installed and return what it logged.
pub fn capture_logs(f: impl FnOnce()) -> String {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let bytes = buffer.0.lock().unwrap().clone();
    String::from_utf8_lossy(&bytes).into_owned()
}
