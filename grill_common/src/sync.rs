//! Process-shared synchronization primitives for the data region.
//!
//! `nix` does not wrap pthread attributes, so the mutex and condition
//! variable live directly on `libc`. Both are initialized in place with
//! `PTHREAD_PROCESS_SHARED` so they stay valid when the region is mapped
//! into a second address space. Condition variables are bound to
//! `CLOCK_MONOTONIC` so timed waits are immune to wall-clock steps.
//!
//! The guard API mirrors `std::sync::Mutex` minus poisoning: a pthread
//! mutex in a mapped region has no owner thread to poison.

use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

use nix::errno::Errno;

/// A mutex + payload pair laid out for shared memory.
///
/// The payload is only reachable through [`ShmMutex::lock`], which keeps
/// the usual aliasing guarantees even though the whole struct lives in a
/// region mapped by two processes.
///
/// # Safety contract
///
/// - The backing memory must be zero-initialized before [`ShmMutex::init`]
///   is called, and `init` must run exactly once (by the region creator)
///   before any `lock` in any process.
/// - `T` must be `#[repr(C)]` plain data: no pointers, all-zeroes valid.
#[repr(C)]
pub struct ShmMutex<T> {
    lock: UnsafeCell<libc::pthread_mutex_t>,
    data: UnsafeCell<T>,
}

unsafe impl<T: Send> Send for ShmMutex<T> {}
unsafe impl<T: Send> Sync for ShmMutex<T> {}

impl<T> ShmMutex<T> {
    /// Initialize the pthread mutex in place with the process-shared
    /// attribute. The payload keeps its current (zeroed) bytes.
    ///
    /// # Safety
    ///
    /// Must be called exactly once, before the region is visible to any
    /// other thread or process.
    pub unsafe fn init(&self) -> Result<(), Errno> {
        let mut attr = MaybeUninit::<libc::pthread_mutexattr_t>::uninit();
        check(libc::pthread_mutexattr_init(attr.as_mut_ptr()))?;
        check(libc::pthread_mutexattr_setpshared(
            attr.as_mut_ptr(),
            libc::PTHREAD_PROCESS_SHARED,
        ))?;
        let rc = check(libc::pthread_mutex_init(self.lock.get(), attr.as_ptr()));
        libc::pthread_mutexattr_destroy(attr.as_mut_ptr());
        rc
    }

    /// Acquire the mutex, blocking until it is available.
    pub fn lock(&self) -> ShmMutexGuard<'_, T> {
        let rc = unsafe { libc::pthread_mutex_lock(self.lock.get()) };
        debug_assert_eq!(rc, 0, "pthread_mutex_lock failed: {rc}");
        ShmMutexGuard {
            mutex: self,
            _not_send: PhantomData,
        }
    }

    fn raw(&self) -> *mut libc::pthread_mutex_t {
        self.lock.get()
    }
}

/// RAII guard produced by [`ShmMutex::lock`]. Unlocks on drop.
///
/// Not `Send`: pthread requires unlock on the locking thread.
pub struct ShmMutexGuard<'a, T> {
    mutex: &'a ShmMutex<T>,
    _not_send: PhantomData<*mut ()>,
}

impl<T> Deref for ShmMutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.mutex.data.get() }
    }
}

impl<T> DerefMut for ShmMutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.mutex.data.get() }
    }
}

impl<T> Drop for ShmMutexGuard<'_, T> {
    fn drop(&mut self) {
        let rc = unsafe { libc::pthread_mutex_unlock(self.mutex.raw()) };
        debug_assert_eq!(rc, 0, "pthread_mutex_unlock failed: {rc}");
    }
}

/// A process-shared condition variable for the data region.
///
/// Same placement and initialization contract as [`ShmMutex`].
#[repr(C)]
pub struct ShmCondvar {
    cond: UnsafeCell<libc::pthread_cond_t>,
}

unsafe impl Send for ShmCondvar {}
unsafe impl Sync for ShmCondvar {}

impl ShmCondvar {
    /// Initialize the pthread condition variable in place, process-shared
    /// and on the monotonic clock.
    ///
    /// # Safety
    ///
    /// Same contract as [`ShmMutex::init`].
    pub unsafe fn init(&self) -> Result<(), Errno> {
        let mut attr = MaybeUninit::<libc::pthread_condattr_t>::uninit();
        check(libc::pthread_condattr_init(attr.as_mut_ptr()))?;
        check(libc::pthread_condattr_setpshared(
            attr.as_mut_ptr(),
            libc::PTHREAD_PROCESS_SHARED,
        ))?;
        check(libc::pthread_condattr_setclock(
            attr.as_mut_ptr(),
            libc::CLOCK_MONOTONIC,
        ))?;
        let rc = check(libc::pthread_cond_init(self.cond.get(), attr.as_ptr()));
        libc::pthread_condattr_destroy(attr.as_mut_ptr());
        rc
    }

    /// Atomically release the guard's mutex and wait for a wakeup.
    ///
    /// Spurious wakeups are possible; callers re-check their predicate.
    pub fn wait<'a, T>(&self, guard: ShmMutexGuard<'a, T>) -> ShmMutexGuard<'a, T> {
        let rc = unsafe { libc::pthread_cond_wait(self.cond.get(), guard.mutex.raw()) };
        debug_assert_eq!(rc, 0, "pthread_cond_wait failed: {rc}");
        guard
    }

    /// [`ShmCondvar::wait`] with an upper bound. Returns the reacquired
    /// guard and whether the wait timed out.
    pub fn wait_timeout<'a, T>(
        &self,
        guard: ShmMutexGuard<'a, T>,
        bound: Duration,
    ) -> (ShmMutexGuard<'a, T>, bool) {
        let deadline = monotonic_deadline(bound);
        let rc =
            unsafe { libc::pthread_cond_timedwait(self.cond.get(), guard.mutex.raw(), &deadline) };
        debug_assert!(
            rc == 0 || rc == libc::ETIMEDOUT,
            "pthread_cond_timedwait failed: {rc}"
        );
        (guard, rc == libc::ETIMEDOUT)
    }

    /// Wake one waiter.
    pub fn notify_one(&self) {
        let rc = unsafe { libc::pthread_cond_signal(self.cond.get()) };
        debug_assert_eq!(rc, 0, "pthread_cond_signal failed: {rc}");
    }

    /// Wake every waiter.
    pub fn notify_all(&self) {
        let rc = unsafe { libc::pthread_cond_broadcast(self.cond.get()) };
        debug_assert_eq!(rc, 0, "pthread_cond_broadcast failed: {rc}");
    }
}

fn check(rc: libc::c_int) -> Result<(), Errno> {
    if rc == 0 {
        Ok(())
    } else {
        Err(Errno::from_raw(rc))
    }
}

/// Absolute `CLOCK_MONOTONIC` deadline `bound` from now.
fn monotonic_deadline(bound: Duration) -> libc::timespec {
    let mut now = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    let rc = unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut now) };
    debug_assert_eq!(rc, 0, "clock_gettime failed: {rc}");

    let mut sec = now.tv_sec.saturating_add(bound.as_secs() as libc::time_t);
    let mut nsec = now.tv_nsec + bound.subsec_nanos() as libc::c_long;
    if nsec >= 1_000_000_000 {
        sec = sec.saturating_add(1);
        nsec -= 1_000_000_000;
    }
    libc::timespec {
        tv_sec: sec,
        tv_nsec: nsec,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Instant;

    // Tests build the primitives on the heap; the layout is identical to
    // the mapped-region placement.
    fn boxed_mutex(value: u64) -> Box<ShmMutex<u64>> {
        let m: Box<ShmMutex<u64>> = unsafe { Box::new(std::mem::zeroed()) };
        unsafe { m.init().expect("mutex init") };
        *m.lock() = value;
        m
    }

    #[test]
    fn lock_guards_payload() {
        let m = boxed_mutex(7);
        {
            let mut g = m.lock();
            *g += 1;
        }
        assert_eq!(*m.lock(), 8);
    }

    #[test]
    fn contended_increments_are_not_lost() {
        let m = boxed_mutex(0);
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..1000 {
                        *m.lock() += 1;
                    }
                });
            }
        });
        assert_eq!(*m.lock(), 4000);
    }

    #[test]
    fn condvar_wakes_waiter() {
        let m = boxed_mutex(0);
        let cv: Box<ShmCondvar> = unsafe { Box::new(std::mem::zeroed()) };
        unsafe { cv.init().expect("cond init") };
        let woke = AtomicBool::new(false);

        std::thread::scope(|s| {
            s.spawn(|| {
                let mut g = m.lock();
                while *g == 0 {
                    g = cv.wait(g);
                }
                woke.store(true, Ordering::SeqCst);
            });
            std::thread::sleep(Duration::from_millis(50));
            *m.lock() = 1;
            cv.notify_one();
        });
        assert!(woke.load(Ordering::SeqCst));
    }

    #[test]
    fn wait_timeout_expires() {
        let m = boxed_mutex(0);
        let cv: Box<ShmCondvar> = unsafe { Box::new(std::mem::zeroed()) };
        unsafe { cv.init().expect("cond init") };

        let start = Instant::now();
        let g = m.lock();
        let (_g, timed_out) = cv.wait_timeout(g, Duration::from_millis(50));
        assert!(timed_out);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }
}
