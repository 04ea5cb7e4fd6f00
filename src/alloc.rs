//! Fallible allocators backing the containers' storage.
//!
//! Only the buffers owned by a container go through an [`Alloc`]; keys, values
//! and elements manage their own memory through the copy hooks.

use snafu::{OptionExt, Snafu};
use std::{
    alloc::Layout,
    cell::Cell,
    cmp,
    ptr::{self, NonNull},
    rc::Rc,
};

#[derive(Debug, Snafu)]
#[snafu(visibility = "pub")]
pub enum Error {
    #[snafu(display("Allocation of {:?} failed", layout))]
    AllocationError { layout: Layout },

    #[snafu(display("Reallocation of {:?} to size {} failed", layout, new_size))]
    ReallocationError { layout: Layout, new_size: usize },
}

/// A memory allocator that reports exhaustion instead of aborting.
///
/// # Safety
///
/// Implementors must return blocks that satisfy the requested layout and must
/// accept back, through `dealloc` and `realloc`, every block they handed out.
pub unsafe trait Alloc {
    /// Allocates a block for `layout`. The contents are unspecified.
    ///
    /// # Safety
    ///
    /// `layout` must have a non-zero size.
    unsafe fn alloc(&mut self, layout: Layout) -> Result<NonNull<u8>, Error>;

    /// Releases a block previously returned by this allocator.
    ///
    /// # Safety
    ///
    /// `ptr` must denote a live block of this allocator and `layout` must be
    /// the layout it was allocated (or last reallocated) with.
    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout);

    /// Resizes a block to `new_size` bytes, preserving the common prefix.
    ///
    /// On `Err` the original block is untouched and still owned by the caller.
    ///
    /// # Safety
    ///
    /// Same as for `dealloc`; additionally `new_size` must be non-zero.
    unsafe fn realloc(
        &mut self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, Error> {
        let new_layout = Layout::from_size_align_unchecked(new_size, layout.align());
        let new_ptr = self.alloc(new_layout)?;
        ptr::copy_nonoverlapping(
            ptr.as_ptr(),
            new_ptr.as_ptr(),
            cmp::min(layout.size(), new_size),
        );
        self.dealloc(ptr, layout);
        Ok(new_ptr)
    }

    /// Like `alloc`, but the returned block is filled with zeroes.
    ///
    /// # Safety
    ///
    /// Same as for `alloc`.
    unsafe fn alloc_zeroed(&mut self, layout: Layout) -> Result<NonNull<u8>, Error> {
        let p = self.alloc(layout)?;
        ptr::write_bytes(p.as_ptr(), 0, layout.size());
        Ok(p)
    }
}

/// The process-wide heap.
#[derive(Debug, Default, Clone, Copy)]
pub struct Global;

unsafe impl Alloc for Global {
    unsafe fn alloc(&mut self, layout: Layout) -> Result<NonNull<u8>, Error> {
        let ptr = std::alloc::alloc(layout);
        NonNull::new(ptr).context(AllocationError { layout })
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout) {
        std::alloc::dealloc(ptr.as_ptr(), layout)
    }

    unsafe fn realloc(
        &mut self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, Error> {
        let ptr = std::alloc::realloc(ptr.as_ptr(), layout, new_size);
        NonNull::new(ptr).context(ReallocationError { layout, new_size })
    }

    unsafe fn alloc_zeroed(&mut self, layout: Layout) -> Result<NonNull<u8>, Error> {
        let ptr = std::alloc::alloc_zeroed(layout);
        NonNull::new(ptr).context(AllocationError { layout })
    }
}

/// An allocator that never has memory to give.
///
/// Containers created with it stay usable for every operation that does not
/// need storage, which makes it handy for exercising failure paths.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOp;

unsafe impl Alloc for NoOp {
    unsafe fn alloc(&mut self, layout: Layout) -> Result<NonNull<u8>, Error> {
        Err(Error::AllocationError { layout })
    }

    unsafe fn dealloc(&mut self, _ptr: NonNull<u8>, _layout: Layout) {
        /* No op */
    }

    unsafe fn realloc(
        &mut self,
        _ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, Error> {
        Err(Error::ReallocationError { layout, new_size })
    }
}

/// Heap allocator limited to a byte budget shared between its clones.
///
/// Requests that would exceed the remaining budget fail; released blocks give
/// their bytes back.
#[derive(Debug, Clone)]
pub struct Budget {
    remaining: Rc<Cell<usize>>,
}

impl Budget {
    /// Creates an allocator allowed to hold `bytes` at once.
    pub fn new(bytes: usize) -> Self {
        Budget {
            remaining: Rc::new(Cell::new(bytes)),
        }
    }

    /// Bytes that can still be allocated.
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }

    /// Replaces the remaining budget.
    pub fn set_remaining(&self, bytes: usize) {
        self.remaining.set(bytes)
    }

    fn take(&self, bytes: usize) -> bool {
        match self.remaining.get().checked_sub(bytes) {
            Some(left) => {
                self.remaining.set(left);
                true
            }
            None => false,
        }
    }

    fn give_back(&self, bytes: usize) {
        self.remaining.set(self.remaining.get().saturating_add(bytes))
    }
}

unsafe impl Alloc for Budget {
    unsafe fn alloc(&mut self, layout: Layout) -> Result<NonNull<u8>, Error> {
        if !self.take(layout.size()) {
            return Err(Error::AllocationError { layout });
        }
        Global.alloc(layout).map_err(|e| {
            self.give_back(layout.size());
            e
        })
    }

    unsafe fn dealloc(&mut self, ptr: NonNull<u8>, layout: Layout) {
        Global.dealloc(ptr, layout);
        self.give_back(layout.size());
    }

    unsafe fn realloc(
        &mut self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Result<NonNull<u8>, Error> {
        let old_size = layout.size();
        if new_size > old_size && !self.take(new_size - old_size) {
            return Err(Error::ReallocationError { layout, new_size });
        }
        match Global.realloc(ptr, layout, new_size) {
            Ok(p) => {
                if new_size < old_size {
                    self.give_back(old_size - new_size);
                }
                Ok(p)
            }
            Err(e) => {
                if new_size > old_size {
                    self.give_back(new_size - old_size);
                }
                Err(e)
            }
        }
    }
}
