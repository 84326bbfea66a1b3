//! Thread-shareable buffer manager handle.
//!
//! The manager itself assumes a single caller. [`SharedBufferManager`]
//! serializes callers with one coarse [`parking_lot::Mutex`] around the
//! whole facade.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::buffer::BufferManager;
use crate::storage::PageStore;

/// Cloneable handle to a mutex-protected [`BufferManager`].
///
/// Every operation runs under the lock, so each call is atomic with respect
/// to the others. Buffers borrowed inside [`with`](Self::with) or through a
/// [`lock`](Self::lock) guard cannot escape the critical section.
///
/// # Example
/// ```
/// use clockpool::storage::MemoryStore;
/// use clockpool::{BufferManager, FileId, SharedBufferManager};
///
/// let shared = SharedBufferManager::new(BufferManager::new(4, MemoryStore::new()));
/// let file = FileId::new(0);
///
/// let pid = shared.with(|bpm| {
///     let (pid, _) = bpm.new_page(1, file)?;
///     bpm.unpin_page(pid, file, true)?;
///     Ok::<_, clockpool::Error>(pid)
/// }).unwrap();
///
/// assert_eq!(shared.lock().pin_count(pid, file), Some(0));
/// ```
pub struct SharedBufferManager<S: PageStore> {
    inner: Arc<Mutex<BufferManager<S>>>,
}

impl<S: PageStore> SharedBufferManager<S> {
    pub fn new(bpm: BufferManager<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bpm)),
        }
    }

    /// Acquire exclusive access to the manager.
    pub fn lock(&self) -> MutexGuard<'_, BufferManager<S>> {
        self.inner.lock()
    }

    /// Run `f` with exclusive access to the manager.
    pub fn with<R>(&self, f: impl FnOnce(&mut BufferManager<S>) -> R) -> R {
        let mut bpm = self.inner.lock();
        f(&mut bpm)
    }

    /// Recover the manager if this is the last handle.
    pub fn try_unwrap(self) -> Result<BufferManager<S>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<S: PageStore> Clone for SharedBufferManager<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
