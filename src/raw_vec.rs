//! Owned, uninitialised storage for the containers.

use core::mem;
use std::{alloc::Layout, ptr::NonNull};

use crate::alloc::{Alloc, Global};
use snafu::{ensure, OptionExt, ResultExt, Snafu};

/// A buffer of `capacity` slots of `T` obtained from an [`Alloc`].
///
/// `RawVec` never looks at what is stored in it: dropping it frees the memory
/// but does not drop any `T`. Keeping track of which slots are initialised is
/// up to the owner.
///
/// Zero-sized types never allocate and report a capacity of `usize::MAX`.
pub struct RawVec<T, A: Alloc = Global> {
    ptr: NonNull<T>,
    cap: usize,
    a: A,
}

unsafe impl<T: Send, A: Alloc + Send> Send for RawVec<T, A> {}
unsafe impl<T: Sync, A: Alloc + Sync> Sync for RawVec<T, A> {}

#[derive(Debug, Snafu)]
#[snafu(visibility = "pub(crate)")]
pub enum Error {
    #[snafu(display("Capacity overflow"))]
    CapacityOverflow,

    #[snafu(display("Allocation failed for: {}", source))]
    Allocation { source: crate::alloc::Error },
}

impl<T, A: Alloc> RawVec<T, A> {
    /// Creates an empty buffer; nothing is allocated.
    pub fn new_in(a: A) -> Self {
        RawVec {
            ptr: NonNull::dangling(),
            cap: if mem::size_of::<T>() == 0 { !0 } else { 0 },
            a,
        }
    }

    /// Allocates room for exactly `capacity` items, all bytes set to zero.
    pub fn with_capacity_zeroed_in(capacity: usize, mut a: A) -> Result<Self, Error> {
        let layout = array_layout::<T>(capacity)?;
        if layout.size() == 0 {
            return Ok(RawVec::new_in(a));
        }
        let ptr = unsafe { a.alloc_zeroed(layout) }.context(Allocation)?;
        Ok(RawVec {
            ptr: ptr.cast(),
            cap: capacity,
            a,
        })
    }

    /// Pointer to the first slot. Dangling while nothing is allocated.
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns a shared reference to the allocator backing this buffer.
    pub fn alloc(&self) -> &A {
        &self.a
    }

    /// Grows or shrinks the buffer to exactly `new_cap` slots.
    ///
    /// The first `min(capacity, new_cap)` slots keep their bytes; any slots
    /// past the old capacity are uninitialised. On error the buffer is left
    /// exactly as it was.
    pub fn try_resize_exact(&mut self, new_cap: usize) -> Result<(), Error> {
        if mem::size_of::<T>() == 0 || new_cap == self.cap {
            return Ok(());
        }
        if new_cap == 0 {
            self.release();
            return Ok(());
        }

        let new_layout = array_layout::<T>(new_cap)?;
        let ptr = match self.current_layout() {
            Some(layout) => unsafe {
                self.a
                    .realloc(self.ptr.cast(), layout, new_layout.size())
                    .context(Allocation)?
            },
            None => unsafe { self.a.alloc(new_layout).context(Allocation)? },
        };
        self.ptr = ptr.cast();
        self.cap = new_cap;
        Ok(())
    }

    /// Frees the allocation *without* dropping anything stored in it.
    pub fn release(&mut self) {
        if let Some(layout) = self.current_layout() {
            unsafe { self.a.dealloc(self.ptr.cast(), layout) };
            self.ptr = NonNull::dangling();
            self.cap = 0;
        }
    }

    fn current_layout(&self) -> Option<Layout> {
        if mem::size_of::<T>() == 0 || self.cap == 0 {
            None
        } else {
            // The layout was validated when the block was obtained.
            unsafe {
                Some(Layout::from_size_align_unchecked(
                    mem::size_of::<T>() * self.cap,
                    mem::align_of::<T>(),
                ))
            }
        }
    }
}

impl<T, A: Alloc> Drop for RawVec<T, A> {
    /// Frees the memory owned by the `RawVec` *without* trying to drop its contents.
    fn drop(&mut self) {
        self.release();
    }
}

fn array_layout<T>(capacity: usize) -> Result<Layout, Error> {
    let size = mem::size_of::<T>()
        .checked_mul(capacity)
        .context(CapacityOverflow)?;
    alloc_guard(size)?;
    Layout::from_size_align(size, mem::align_of::<T>())
        .ok()
        .context(CapacityOverflow)
}

// We never hand out objects larger than `isize::MAX` bytes. On 64-bit targets
// the allocator rejects such sizes anyway; smaller targets need the check.
#[inline]
fn alloc_guard(alloc_size: usize) -> Result<(), Error> {
    ensure!(
        !(mem::size_of::<usize>() < 8 && alloc_size > core::isize::MAX as usize),
        CapacityOverflow
    );
    Ok(())
}
