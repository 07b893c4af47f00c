// SPDX-License-Identifier: MIT

//! Cross-thread and cross-process control flags and per-worker metrics.
//!
//! §5 requires `processdata`/`stopdata` and the per-worker rate/count/
//! status slots to be atomically readable across thread *and* process
//! boundaries. In thread mode that's a plain `Arc<[Atomic*]>`. In process
//! mode the worker is a separate address space reached only by `execve`,
//! so an anonymous mapping created by the parent is not inherited; instead
//! we back the region with a named file under the OS temp directory that
//! both the parent and the worker subprocess `mmap` independently. The
//! child is handed the path on its command line (see
//! [`crate::worker::process`]).
//!
//! Layout (all fields naturally aligned, no padding needed beyond the
//! per-slot layout):
//! ```text
//! offset 0:  processdata   i32
//! offset 4:  stopdata      i32
//! offset 8:  worker slot 0 { rate_bits: u64, count_bits: u64, status: i32, _pad: i32 }
//! offset 32: worker slot 1
//! ...
//! ```
//! `rate`/`count` are stored as `f64::to_bits`/`from_bits` in an `AtomicU64`
//! — the standard lock-free float pattern, since there is no `AtomicF64`.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};
use std::sync::Arc;

use memmap2::MmapMut;
use rtadp_core::error::BindError;
use rtadp_core::WorkerStatus;

const HEADER_BYTES: usize = 8;
const SLOT_BYTES: usize = 24;

/// The `processdata`/`stopdata` control pair, shared across every worker
/// and ingestion task of one manager (`processdata`) or supervisor
/// (`stopdata`).
#[derive(Clone)]
pub enum ControlFlags {
    /// Thread mode: plain in-process atomics.
    Local(Arc<LocalControl>),
    /// Process mode: a file-backed mapping, independently opened by the
    /// parent and every worker subprocess.
    Shared(Arc<SharedRegion>),
}

struct LocalControl {
    processdata: AtomicI32,
    stopdata: AtomicI32,
}

impl ControlFlags {
    pub fn local() -> Self {
        ControlFlags::Local(Arc::new(LocalControl { processdata: AtomicI32::new(0), stopdata: AtomicI32::new(0) }))
    }

    pub fn shared(region: Arc<SharedRegion>) -> Self {
        ControlFlags::Shared(region)
    }

    pub fn set_processdata(&self, enabled: bool) {
        let value = enabled as i32;
        match self {
            ControlFlags::Local(c) => c.processdata.store(value, Ordering::SeqCst),
            ControlFlags::Shared(r) => r.processdata().store(value, Ordering::SeqCst),
        }
    }

    pub fn processdata(&self) -> bool {
        match self {
            ControlFlags::Local(c) => c.processdata.load(Ordering::SeqCst) != 0,
            ControlFlags::Shared(r) => r.processdata().load(Ordering::SeqCst) != 0,
        }
    }

    pub fn set_stopdata(&self, enabled: bool) {
        let value = enabled as i32;
        match self {
            ControlFlags::Local(c) => c.stopdata.store(value, Ordering::SeqCst),
            ControlFlags::Shared(r) => r.stopdata().store(value, Ordering::SeqCst),
        }
    }

    pub fn stopdata(&self) -> bool {
        match self {
            ControlFlags::Local(c) => c.stopdata.load(Ordering::SeqCst) != 0,
            ControlFlags::Shared(r) => r.stopdata().load(Ordering::SeqCst) != 0,
        }
    }
}

/// Per-worker rate/count/status, written only by the owning worker id and
/// read by the monitoring point. Backing mirrors [`ControlFlags`].
#[derive(Clone)]
pub enum MetricsRegion {
    Local(Arc<Vec<LocalSlot>>),
    Shared(Arc<SharedRegion>),
}

#[derive(Default)]
pub struct LocalSlot {
    rate_bits: AtomicU64,
    count_bits: AtomicU64,
    status: AtomicI32,
}

impl MetricsRegion {
    pub fn local(num_workers: usize) -> Self {
        let slots = (0..num_workers).map(|_| LocalSlot::default()).collect();
        MetricsRegion::Local(Arc::new(slots))
    }

    pub fn shared(region: Arc<SharedRegion>) -> Self {
        MetricsRegion::Shared(region)
    }

    pub fn publish(&self, worker_id: usize, rate: f64, total_count: f64, status: WorkerStatus) {
        match self {
            MetricsRegion::Local(slots) => {
                let slot = &slots[worker_id];
                slot.rate_bits.store(rate.to_bits(), Ordering::SeqCst);
                slot.count_bits.store(total_count.to_bits(), Ordering::SeqCst);
                slot.status.store(status.as_i32(), Ordering::SeqCst);
            }
            MetricsRegion::Shared(region) => region.publish_slot(worker_id, rate, total_count, status),
        }
    }

    pub fn set_status(&self, worker_id: usize, status: WorkerStatus) {
        match self {
            MetricsRegion::Local(slots) => slots[worker_id].status.store(status.as_i32(), Ordering::SeqCst),
            MetricsRegion::Shared(region) => region.set_status(worker_id, status),
        }
    }

    pub fn snapshot(&self, num_workers: usize) -> Vec<(f64, f64, i32)> {
        match self {
            MetricsRegion::Local(slots) => slots
                .iter()
                .take(num_workers)
                .map(|s| {
                    (
                        f64::from_bits(s.rate_bits.load(Ordering::SeqCst)),
                        f64::from_bits(s.count_bits.load(Ordering::SeqCst)),
                        s.status.load(Ordering::SeqCst),
                    )
                })
                .collect(),
            MetricsRegion::Shared(region) => region.snapshot_slots(num_workers),
        }
    }
}

/// A file-backed shared-memory region used in process mode, holding both
/// the control flags and every worker's metrics slot for one manager.
pub struct SharedRegion {
    mmap: MmapMut,
    path: PathBuf,
    #[allow(dead_code)] // retained so the backing file outlives every mapping that borrows it
    file: std::fs::File,
}

// Safety: access is entirely through atomic operations on naturally
// aligned offsets; the region is never read or written through a plain
// reference.
unsafe impl Send for SharedRegion {}
unsafe impl Sync for SharedRegion {}

impl SharedRegion {
    pub fn region_size(num_workers: usize) -> usize {
        HEADER_BYTES + num_workers * SLOT_BYTES
    }

    /// Creates a new shared-memory file at `path` sized for `num_workers`
    /// slots, zero-initialized, and maps it.
    pub fn create(path: impl AsRef<Path>, num_workers: usize) -> Result<Self, BindError> {
        let path = path.as_ref().to_path_buf();
        let size = Self::region_size(num_workers);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(|e| BindError::Bind { address: path.display().to_string(), reason: e.to_string() })?;
        file.set_len(size as u64).map_err(|e| BindError::Bind { address: path.display().to_string(), reason: e.to_string() })?;
        // Safety: `file` is a regular file we just sized to exactly `size`
        // bytes and hold open for the lifetime of the mapping.
        let mmap = unsafe { MmapMut::map_mut(&file) }
            .map_err(|e| BindError::Bind { address: path.display().to_string(), reason: e.to_string() })?;
        Ok(Self { mmap, path, file })
    }

    /// Opens a region previously created by [`Self::create`] — used by a
    /// worker subprocess to attach to its manager's region.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BindError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| BindError::Bind { address: path.display().to_string(), reason: e.to_string() })?;
        // Safety: same contract as `create` — the file is already sized by
        // the region's creator and outlives this mapping.
        let mmap = unsafe { MmapMut::map_mut(&file) }
            .map_err(|e| BindError::Bind { address: path.display().to_string(), reason: e.to_string() })?;
        Ok(Self { mmap, path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn processdata(&self) -> &AtomicI32 {
        // Safety: offset 0 is 4-byte aligned within a page-aligned mapping
        // and the region is always at least HEADER_BYTES long.
        unsafe { &*(self.mmap.as_ptr() as *const AtomicI32) }
    }

    fn stopdata(&self) -> &AtomicI32 {
        // Safety: offset 4 is 4-byte aligned; see `processdata`.
        unsafe { &*(self.mmap.as_ptr().add(4) as *const AtomicI32) }
    }

    fn slot_offset(worker_id: usize) -> usize {
        HEADER_BYTES + worker_id * SLOT_BYTES
    }

    fn rate_bits(&self, worker_id: usize) -> &AtomicU64 {
        let offset = Self::slot_offset(worker_id);
        // Safety: offset is 8-byte aligned (HEADER_BYTES=8, SLOT_BYTES=24)
        // and within bounds for any worker_id the region was sized for.
        unsafe { &*(self.mmap.as_ptr().add(offset) as *const AtomicU64) }
    }

    fn count_bits(&self, worker_id: usize) -> &AtomicU64 {
        let offset = Self::slot_offset(worker_id) + 8;
        unsafe { &*(self.mmap.as_ptr().add(offset) as *const AtomicU64) }
    }

    fn status_cell(&self, worker_id: usize) -> &AtomicI32 {
        let offset = Self::slot_offset(worker_id) + 16;
        unsafe { &*(self.mmap.as_ptr().add(offset) as *const AtomicI32) }
    }

    fn publish_slot(&self, worker_id: usize, rate: f64, total_count: f64, status: WorkerStatus) {
        self.rate_bits(worker_id).store(rate.to_bits(), Ordering::SeqCst);
        self.count_bits(worker_id).store(total_count.to_bits(), Ordering::SeqCst);
        self.status_cell(worker_id).store(status.as_i32(), Ordering::SeqCst);
    }

    fn set_status(&self, worker_id: usize, status: WorkerStatus) {
        self.status_cell(worker_id).store(status.as_i32(), Ordering::SeqCst);
    }

    fn snapshot_slots(&self, num_workers: usize) -> Vec<(f64, f64, i32)> {
        (0..num_workers)
            .map(|id| {
                (
                    f64::from_bits(self.rate_bits(id).load(Ordering::SeqCst)),
                    f64::from_bits(self.count_bits(id).load(Ordering::SeqCst)),
                    self.status_cell(id).load(Ordering::SeqCst),
                )
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "shared_region_tests.rs"]
mod tests;
