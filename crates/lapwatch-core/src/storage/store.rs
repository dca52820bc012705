use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::PersistenceError;

/// A key-value slot holding exactly one serialized stopwatch record.
///
/// Implementations are used from a single control thread; they do not need
/// to be `Sync`.
pub trait SnapshotStore {
    /// The stored record, or `None` if nothing was saved.
    fn load(&self) -> Result<Option<String>, PersistenceError>;

    /// Replace the stored record.
    fn save(&self, json: &str) -> Result<(), PersistenceError>;

    /// Delete the stored record entirely.
    fn clear(&self) -> Result<(), PersistenceError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        (**self).load()
    }

    fn save(&self, json: &str) -> Result<(), PersistenceError> {
        (**self).save(json)
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        (**self).clear()
    }
}

/// In-process store. Clones share contents, so a test can hand one clone to
/// a session and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contents: Rc<RefCell<Option<String>>>,
    writes: Rc<Cell<usize>>,
    fail_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(json: &str) -> Self {
        let store = Self::new();
        store.contents.replace(Some(json.to_string()));
        store
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    /// Number of successful `save` calls.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Make every subsequent `save` fail, as a full quota would.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        Ok(self.contents())
    }

    fn save(&self, json: &str) -> Result<(), PersistenceError> {
        if self.fail_writes.get() {
            return Err(PersistenceError::WriteFailed {
                message: "storage quota exceeded".into(),
            });
        }
        self.contents.replace(Some(json.to_string()));
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn clear(&self) -> Result<(), PersistenceError> {
        self.contents.replace(None);
        Ok(())
    }
}
