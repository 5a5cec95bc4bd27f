//! Per-repository deferred write queue
//!
//! Writes queued here are held until [`DeferredWrites::drain`] hands them to
//! the executor's transaction path, so a burst of updates lands atomically in
//! one round trip. The queue belongs to a single repository instance and is
//! drained sequentially; the mutex only provides interior mutability for
//! shared references, not a concurrency contract.

use std::sync::Mutex;

use crate::executor::SqlStatement;

#[derive(Debug, Default)]
pub(crate) struct DeferredWrites {
   queue: Mutex<Vec<SqlStatement>>,
}

impl DeferredWrites {
   pub(crate) fn push(&self, statement: SqlStatement) {
      self.queue.lock().expect("deferred queue poisoned").push(statement);
   }

   /// Take every queued statement, leaving the queue empty.
   pub(crate) fn drain(&self) -> Vec<SqlStatement> {
      std::mem::take(&mut *self.queue.lock().expect("deferred queue poisoned"))
   }

   pub(crate) fn len(&self) -> usize {
      self.queue.lock().expect("deferred queue poisoned").len()
   }
}
