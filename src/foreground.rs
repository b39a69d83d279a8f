use std::fmt;

/// Identity of a running process. Holding one never keeps the process alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessRef(pub i32);

impl ProcessRef {
    pub fn pid(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ProcessRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pid {}", self.0)
    }
}

/// Query and switch the frontmost application.
pub trait ForegroundPort {
    fn current_foreground(&self) -> Option<ProcessRef>;
    fn own_process(&self) -> ProcessRef;
    fn is_running(&self, process: ProcessRef) -> bool;
    /// Returns false when the process refused or no longer exists.
    fn activate(&self, process: ProcessRef) -> bool;
    fn activate_self(&self);
}
