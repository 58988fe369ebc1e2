use std::cell::Cell;
use std::rc::Rc;

/// Shared flag a running search checks before every log it inspects.
///
/// Clones observe the same flag. The session keeps one flag for its lifetime and
/// resets it once the previous search has fully unwound.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Rc<Cell<bool>>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn reset(&self) {
        self.0.set(false);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}
