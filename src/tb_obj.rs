use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// TbObj shares testbench objects (kernel state, test records, assertion counters) between
// Tasks. The executor is single threaded, so the lock is never contended; it only has to
// make the objects Send so they can live inside boxed futures.
pub struct TbObj<T>(Arc<Mutex<T>>);

impl<T> TbObj<T> {
    pub fn new(data: T) -> TbObj<T> {
        TbObj(Arc::new(Mutex::new(data)))
    }
    pub fn get(&self) -> MutexGuard<'_, T> {
        // poisoned only by a panicking task, the data itself stays consistent
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.get())
    }
}

impl<T> Clone for TbObj<T> {
    fn clone(&self) -> Self {
        TbObj(self.0.clone())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for TbObj<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TbObj").field(&*self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_object() {
        let a = TbObj::new(1u32);
        let b = a.clone();
        b.with_mut(|v| *v += 41);
        assert_eq!(*a.get(), 42);
    }
}
