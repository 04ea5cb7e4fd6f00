//! Growable array with pluggable element hooks.
//!
//! Capacities come from a fixed power-of-two table. Once the length drops
//! below 30% of the capacity the array gives memory back, shrinking to the
//! smallest tabulated capacity that still fits.

#[macro_use]
pub mod macros;

mod capacity;

use crate::{
    alloc::{Alloc, Global},
    hooks::{self, Hooks, Plain},
    raw_vec::{self, RawVec},
};
use core::{cmp, fmt, marker::PhantomData, ops, ptr, slice};
use log::{debug, trace};
use snafu::{ensure, OptionExt, ResultExt, Snafu};

#[derive(Debug, Snafu)]
#[snafu(visibility = "pub(crate)")]
pub enum Error {
    #[snafu(display("Unable to resize storage: {}", source))]
    Storage { source: raw_vec::Error },

    #[snafu(display("Unable to copy element: {}", source))]
    ElementCopy { source: hooks::Error },

    #[snafu(display("Index {} is out of bounds (length = {})", index, len))]
    OutOfBounds { index: usize, len: usize },

    #[snafu(display("Index {} is beyond the largest supported capacity", index))]
    IndexTooLarge { index: usize },
}

/// Index-addressable sequence whose elements enter through `H::copy` and
/// leave through `H::destroy`.
pub struct Array<T, H = Plain, A = Global>
where
    H: Hooks<T>,
    A: Alloc,
{
    buf: RawVec<T, A>,
    len: usize,
    shrink_threshold: usize,
    _hooks: PhantomData<fn() -> H>,
}

impl<T, H> Array<T, H>
where
    H: Hooks<T>,
{
    /// Creates an empty array on the global heap without allocating.
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<T, H> Default for Array<T, H>
where
    H: Hooks<T>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H, A> Array<T, H, A>
where
    H: Hooks<T>,
    A: Alloc,
{
    /// Creates an empty array whose storage comes from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        Array {
            buf: RawVec::new_in(alloc),
            len: 0,
            shrink_threshold: 0,
            _hooks: PhantomData,
        }
    }

    /// Number of live elements.
    #[inline]
    pub fn size(&self) -> usize {
        self.len
    }

    /// Same as [`size`](Self::size).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    pub fn as_slice(&self) -> &[T] {
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { slice::from_raw_parts_mut(self.buf.as_ptr(), self.len) }
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Returns the element at `ix`.
    ///
    /// # Panics
    ///
    /// Panics if `ix` is out of bounds.
    pub fn get(&self, ix: usize) -> &T {
        self.as_slice()
            .get(ix)
            .unwrap_or_else(|| panic!("Index {} is out of bounds (length = {})", ix, self.len))
    }

    /// Returns the element at `ix` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `ix` is out of bounds.
    pub fn get_mut(&mut self, ix: usize) -> &mut T {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(ix)
            .unwrap_or_else(|| panic!("Index {} is out of bounds (length = {})", ix, len))
    }

    /// Position of the first element equal to `value`.
    pub fn find(&self, value: &T) -> Option<usize> {
        self.iter().position(|item| H::equals(item, value))
    }

    pub fn contains(&self, value: &T) -> bool {
        self.find(value).is_some()
    }

    /// Appends a copy of `value`.
    pub fn push(&mut self, value: &T) -> Result<(), Error> {
        let value = H::copy(value).context(ElementCopy)?;
        if let Err(e) = self.fit_storage(self.len) {
            H::destroy(value);
            return Err(e);
        }
        unsafe { self.buf.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the last element and hands it over to the caller; the destroy
    /// hook is not run.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        let item = unsafe { self.buf.as_ptr().add(self.len).read() };
        self.shrink_if_sparse();
        Some(item)
    }

    /// Stores a copy of `value` at `ix`.
    ///
    /// Writing past the end extends the array: the skipped positions are filled
    /// with `T::default()` and become live elements. On error nothing changes.
    pub fn set(&mut self, ix: usize, value: &T) -> Result<(), Error>
    where
        T: Default,
    {
        let value = H::copy(value).context(ElementCopy)?;
        if let Err(e) = self.fit_storage(ix) {
            H::destroy(value);
            return Err(e);
        }

        let base = self.buf.as_ptr();
        if ix < self.len {
            let old = unsafe { ptr::replace(base.add(ix), value) };
            H::destroy(old);
        } else {
            while self.len < ix {
                unsafe { base.add(self.len).write(T::default()) };
                self.len += 1;
            }
            unsafe { base.add(ix).write(value) };
            self.len = ix + 1;
        }
        Ok(())
    }

    /// Destroys the element at `ix` and shifts the tail down by one.
    pub fn delete(&mut self, ix: usize) -> Result<(), Error> {
        ensure!(
            ix < self.len,
            OutOfBounds {
                index: ix,
                len: self.len
            }
        );
        let removed = unsafe {
            let at = self.buf.as_ptr().add(ix);
            let removed = at.read();
            ptr::copy(at.add(1), at, self.len - ix - 1);
            removed
        };
        self.len -= 1;
        H::destroy(removed);
        self.shrink_if_sparse();
        Ok(())
    }

    /// Destroys every element and releases the storage.
    pub fn clear(&mut self) {
        let len = self.len;
        // Length is zeroed before any hook runs.
        self.len = 0;
        let base = self.buf.as_ptr();
        for ix in 0..len {
            H::destroy(unsafe { base.add(ix).read() });
        }
        self.buf.release();
        self.shrink_threshold = 0;
    }

    /// Copies every element through the copy hook into a new array.
    pub fn try_clone(&self) -> Result<Self, Error>
    where
        A: Clone,
    {
        let mut copy = Array::new_in(A::clone(self.buf.alloc()));
        for item in self.iter() {
            copy.push(item)?;
        }
        Ok(copy)
    }

    /// Makes sure slot `ix` lies within the capacity, giving memory back when
    /// the array has become sparse.
    fn fit_storage(&mut self, ix: usize) -> Result<(), Error> {
        let needed = ix.checked_add(1).context(IndexTooLarge { index: ix })?;
        if needed > self.capacity() {
            let cap = capacity::fit(needed).context(IndexTooLarge { index: ix })?;
            self.buf.try_resize_exact(cap).context(Storage)?;
            self.shrink_threshold = capacity::shrink_threshold(cap);
            trace!("Array capacity grown to {} for index {}", cap, ix);
        } else if self.len < self.shrink_threshold {
            self.shrink_to(cmp::max(self.len, ix) + 1);
        }
        Ok(())
    }

    fn shrink_if_sparse(&mut self) {
        if self.len < self.shrink_threshold {
            self.shrink_to(self.len + 1);
        }
    }

    fn shrink_to(&mut self, needed: usize) {
        let cap = match capacity::fit(needed) {
            Some(cap) if cap < self.capacity() => cap,
            _ => return,
        };
        match self.buf.try_resize_exact(cap) {
            Ok(()) => {
                self.shrink_threshold = capacity::shrink_threshold(cap);
                trace!("Array capacity shrunk to {} (length = {})", cap, self.len);
            }
            Err(e) => debug!("Keeping array capacity {}: {}", self.capacity(), e),
        }
    }
}

impl<T, H, A> Drop for Array<T, H, A>
where
    H: Hooks<T>,
    A: Alloc,
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, H, A> ops::Index<usize> for Array<T, H, A>
where
    H: Hooks<T>,
    A: Alloc,
{
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.get(index)
    }
}

impl<T, H, A> ops::IndexMut<usize> for Array<T, H, A>
where
    H: Hooks<T>,
    A: Alloc,
{
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.get_mut(index)
    }
}

impl<'a, T, H, A> IntoIterator for &'a Array<T, H, A>
where
    H: Hooks<T>,
    A: Alloc,
{
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug, H, A> fmt::Debug for Array<T, H, A>
where
    H: Hooks<T>,
    A: Alloc,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T1, T2, H, A> PartialEq<[T1]> for Array<T2, H, A>
where
    T2: PartialEq<T1>,
    H: Hooks<T2>,
    A: Alloc,
{
    fn eq(&self, other: &[T1]) -> bool {
        self.as_slice() == other
    }
}
