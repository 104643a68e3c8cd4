//! Alignment-constrained byte buffers for the engine loader

use std::alloc::{self, Layout, LayoutError};
use std::fmt;
use std::ptr::NonNull;

/// Heap buffer whose start address satisfies a fixed alignment
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

// SAFETY: the buffer exclusively owns its allocation and exposes it only
// through `&self`/`&mut self` borrows.
unsafe impl Send for AlignedBuffer {}
// SAFETY: shared access is read-only.
unsafe impl Sync for AlignedBuffer {}

impl AlignedBuffer {
    /// Copy `bytes` into a fresh buffer aligned to `alignment` bytes
    ///
    /// `alignment` must be a non-zero power of two.
    pub fn from_bytes(bytes: &[u8], alignment: usize) -> Result<Self, LayoutError> {
        let layout = Layout::from_size_align(bytes.len(), alignment)?;
        let ptr = if layout.size() == 0 {
            // Zero-sized allocations are not allowed; any aligned non-null address will do.
            NonNull::new(layout.align() as *mut u8).unwrap_or(NonNull::dangling())
        } else {
            // SAFETY: layout has a non-zero size.
            let raw = unsafe { alloc::alloc(layout) };
            let Some(ptr) = NonNull::new(raw) else {
                alloc::handle_alloc_error(layout)
            };
            // SAFETY: `ptr` is valid for `bytes.len()` writes and does not overlap `bytes`.
            unsafe { std::ptr::copy_nonoverlapping(bytes.as_ptr(), ptr.as_ptr(), bytes.len()) };
            ptr
        };
        Ok(Self { ptr, layout })
    }

    pub fn len(&self) -> usize {
        self.layout.size()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.size() == 0
    }

    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: `ptr` is valid for `len` initialized bytes for the lifetime of `self`.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: allocated in `from_bytes` with this exact layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) };
        }
    }
}

impl fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len())
            .field("alignment", &self.alignment())
            .finish()
    }
}
