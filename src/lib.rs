//! Collections whose element handling is plugged in through hook types and
//! whose storage comes from a fallible allocator.
//!
//! * [`HashTable`] is an open-addressing table with double hashing over a
//!   prime number of buckets.
//! * [`Array`] is a growable array with tabulated power-of-two capacities.
//!
//! Both copy their inputs through [`Hooks::copy`] and hand every element they
//! delete, overwrite or drop to [`Hooks::destroy`] exactly once. `Array::pop`
//! moves the element out to the caller instead.

pub mod alloc;
#[macro_use]
pub mod array;
pub mod hooks;
pub mod raw_vec;
#[macro_use]
pub mod table;

pub use alloc::Alloc;
pub use array::Array;
pub use hooks::{Cloned, Djb2, HashHook, Hooks, Identity, Plain, Sdbm, StrDup};
pub use table::{Config, HashTable, TableConfig};
