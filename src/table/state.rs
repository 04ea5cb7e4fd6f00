//! Per-bucket states, packed four to a byte.

use crate::{
    alloc::Alloc,
    raw_vec::{self, RawVec},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum State {
    Empty = 0,
    Full = 1,
    Deleted = 2,
}

/// Two bits per bucket; a freshly allocated array reads as all `Empty`.
pub(crate) struct BucketStates<A: Alloc> {
    bits: RawVec<u8, A>,
}

impl<A: Alloc> BucketStates<A> {
    /// A state array for an unallocated table. Must not be read.
    pub fn unallocated(alloc: A) -> Self {
        BucketStates {
            bits: RawVec::new_in(alloc),
        }
    }

    /// Allocates states for `n_buckets`, all `Empty`.
    pub fn with_buckets_in(n_buckets: usize, alloc: A) -> Result<Self, raw_vec::Error> {
        Ok(BucketStates {
            bits: RawVec::with_capacity_zeroed_in((n_buckets >> 2) + 1, alloc)?,
        })
    }

    #[inline]
    pub fn get(&self, ix: usize) -> State {
        debug_assert!(ix >> 2 < self.bits.capacity());
        let byte = unsafe { *self.bits.as_ptr().add(ix >> 2) };
        match (byte >> ((ix & 3) << 1)) & 3 {
            0 => State::Empty,
            1 => State::Full,
            _ => State::Deleted,
        }
    }

    #[inline]
    pub fn set(&mut self, ix: usize, state: State) {
        debug_assert!(ix >> 2 < self.bits.capacity());
        let shift = (ix & 3) << 1;
        unsafe {
            let byte = self.bits.as_ptr().add(ix >> 2);
            *byte = (*byte & !(3 << shift)) | ((state as u8) << shift);
        }
    }
}
