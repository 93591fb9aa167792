//! Shared data region lifecycle.
//!
//! The producer creates a POSIX shared memory object, maps it and
//! initializes the [`LineShared`] layout in place; the operator console
//! attaches read/write and validates the header before use. Producer
//! exclusivity is enforced with a non-blocking `flock` on a separate
//! `.lock` shm file so attachers are never blocked by it.
//!
//! Lifecycle:
//! - **Create** (producer): flock `.lock` + `shm_open(O_CREAT|O_EXCL)` +
//!   `ftruncate` + `mmap` + in-place init. Drop unmaps and unlinks both
//!   names — the region lives exactly as long as the producer.
//! - **Attach** (operator): `shm_open(O_RDWR)` + size check + `mmap` +
//!   magic/layout-hash validation. Drop only unmaps.
//!
//! The pthread primitives inside are never destroyed explicitly: the
//! operator may still hold one mapped when the producer exits, and
//! unlinking the name is sufficient to reclaim the object.

use std::num::NonZeroUsize;
use std::os::unix::io::{AsRawFd, OwnedFd};
use std::ptr::NonNull;

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg, OFlag};
use nix::sys::mman::{self, MapFlags, ProtFlags};
use nix::sys::stat::Mode;
use nix::unistd;
use tracing::info;

use crate::catalog::Catalog;
use crate::config::LineConfig;
use crate::error::{RegionError, RegionResult};
use crate::layout::{struct_version_hash, wall_clock_secs, LineShared};

/// SHM name prefix for all grill regions.
const SHM_PREFIX: &str = "/grill_";

fn shm_path(name: &str) -> String {
    format!("{SHM_PREFIX}{name}")
}

fn lock_path(name: &str) -> String {
    format!("{SHM_PREFIX}{name}.lock")
}

fn os_err(name: &str) -> impl Fn(Errno) -> RegionError + '_ {
    move |source| RegionError::Os {
        name: name.to_string(),
        source,
    }
}

/// The producer's handle on the region. Owns the name: dropping it
/// unmaps and unlinks.
pub struct RegionOwner {
    /// Exclusive flock on the `.lock` shm file; held for the producer's
    /// lifetime, never taken by attachers.
    _lock: Flock<OwnedFd>,
    _fd: OwnedFd,
    ptr: NonNull<libc::c_void>,
    len: usize,
    name: String,
}

// SAFETY: the mapping stays valid for the owner's lifetime and all data
// behind it is reached through the process-shared locks or atomics of
// `LineShared`.
unsafe impl Send for RegionOwner {}
unsafe impl Sync for RegionOwner {}

impl RegionOwner {
    /// Create and initialize the region under `name`.
    ///
    /// A stale object left by a crashed producer is unlinked and
    /// recreated — the flock proves nobody is serving it.
    pub fn create(name: &str, config: &LineConfig, catalog: &Catalog) -> RegionResult<Self> {
        let lock_name = lock_path(name);
        let lock_fd = mman::shm_open(
            lock_name.as_str(),
            OFlag::O_CREAT | OFlag::O_RDWR,
            Mode::S_IRUSR | Mode::S_IWUSR,
        )
        .map_err(os_err(name))?;

        let lock = Flock::lock(lock_fd, FlockArg::LockExclusiveNonblock).map_err(|(_, errno)| {
            if errno == Errno::EWOULDBLOCK {
                RegionError::ProducerAlreadyRunning {
                    name: name.to_string(),
                }
            } else {
                RegionError::Os {
                    name: name.to_string(),
                    source: errno,
                }
            }
        })?;

        let shm_name = shm_path(name);
        let _ = mman::shm_unlink(shm_name.as_str());
        let fd = mman::shm_open(
            shm_name.as_str(),
            OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR,
            Mode::S_IRUSR | Mode::S_IWUSR,
        )
        .map_err(os_err(name))?;

        let len = LineShared::region_size();
        unistd::ftruncate(&fd, len as libc::off_t).map_err(os_err(name))?;

        let ptr = unsafe {
            mman::mmap(
                None,
                NonZeroUsize::new(len).ok_or_else(|| RegionError::Os {
                    name: name.to_string(),
                    source: Errno::EINVAL,
                })?,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &fd,
                0,
            )
            .map_err(os_err(name))?
        };

        // ftruncate gave zeroed pages; build the layout on top of them
        // before anything else can see the mapping.
        unsafe {
            let state = &mut *(ptr.as_ptr() as *mut LineShared);
            state
                .init_in_place(config, catalog, wall_clock_secs())
                .map_err(os_err(name))?;
        }

        info!(region = name, bytes = len, "shared region created");
        Ok(Self {
            _lock: lock,
            _fd: fd,
            ptr,
            len,
            name: name.to_string(),
        })
    }

    /// The mapped region state.
    pub fn state(&self) -> &LineShared {
        unsafe { &*(self.ptr.as_ptr() as *const LineShared) }
    }

    /// Region name (without the shm prefix).
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RegionOwner {
    fn drop(&mut self) {
        unsafe {
            let _ = mman::munmap(self.ptr, self.len);
        }
        let _ = mman::shm_unlink(shm_path(&self.name).as_str());
        let _ = mman::shm_unlink(lock_path(&self.name).as_str());
        // _lock and _fd close on drop, releasing the flock.
    }
}

/// An attacher's handle on an existing region. Never owns the name.
pub struct RegionClient {
    _fd: OwnedFd,
    ptr: NonNull<libc::c_void>,
    len: usize,
    name: String,
}

// SAFETY: same reasoning as `RegionOwner`.
unsafe impl Send for RegionClient {}
unsafe impl Sync for RegionClient {}

impl RegionClient {
    /// Attach to the region published under `name`.
    pub fn attach(name: &str) -> RegionResult<Self> {
        let shm_name = shm_path(name);
        let fd = mman::shm_open(shm_name.as_str(), OFlag::O_RDWR, Mode::empty()).map_err(|e| {
            match e {
                Errno::ENOENT => RegionError::NotFound {
                    name: name.to_string(),
                },
                Errno::EACCES => RegionError::PermissionDenied {
                    name: name.to_string(),
                },
                other => RegionError::Os {
                    name: name.to_string(),
                    source: other,
                },
            }
        })?;

        let stat = nix::sys::stat::fstat(fd.as_raw_fd()).map_err(os_err(name))?;
        let file_size = stat.st_size as usize;
        let len = LineShared::region_size();
        if file_size < len {
            return Err(RegionError::SizeMismatch {
                name: name.to_string(),
                expected: len,
                actual: file_size,
            });
        }

        let ptr = unsafe {
            mman::mmap(
                None,
                NonZeroUsize::new(len).ok_or_else(|| RegionError::Os {
                    name: name.to_string(),
                    source: Errno::EINVAL,
                })?,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
                &fd,
                0,
            )
            .map_err(os_err(name))?
        };

        let client = Self {
            _fd: fd,
            ptr,
            len,
            name: name.to_string(),
        };

        let state = client.state();
        if !state.magic_valid() {
            return Err(RegionError::InvalidMagic {
                name: name.to_string(),
            });
        }
        let expected = struct_version_hash::<LineShared>();
        if state.layout_hash() != expected {
            return Err(RegionError::LayoutMismatch {
                name: name.to_string(),
                expected,
                actual: state.layout_hash(),
            });
        }
        info!(region = name, stations = state.num_stations(), "attached to shared region");
        Ok(client)
    }

    /// The mapped region state.
    pub fn state(&self) -> &LineShared {
        unsafe { &*(self.ptr.as_ptr() as *const LineShared) }
    }

    /// Region name (without the shm prefix).
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for RegionClient {
    fn drop(&mut self) {
        // Attachers never unlink — the producer owns the name.
        unsafe {
            let _ = mman::munmap(self.ptr, self.len);
        }
    }
}
