//! Open-addressing hash table with tombstones and double hashing.
//!
//! Buckets live in one contiguous buffer; a parallel array of 2-bit states
//! says which of them are EMPTY, FULL or DELETED. Deleting leaves a DELETED
//! tombstone that still counts towards the load, so churn eventually triggers
//! a rehash. Rehashing reuses the bucket buffer in place: entries are moved to
//! their new positions in one pass, displacing not-yet-visited entries along
//! the way instead of copying everything into a second buffer.

#[macro_use]
pub mod macros;

mod capacity;
mod config;
mod state;

pub use config::{Config, TableConfig};

use crate::{
    alloc::{Alloc, Global},
    hooks::{self, HashHook, Hooks},
    raw_vec::{self, RawVec},
};
use core::{fmt, marker::PhantomData, mem, ptr};
use log::{debug, trace};
use snafu::{OptionExt, ResultExt, Snafu};
use state::{BucketStates, State};

#[derive(Debug, Snafu)]
#[snafu(visibility = "pub(crate)")]
pub enum Error {
    #[snafu(display("Unable to resize bucket storage: {}", source))]
    Resize { source: raw_vec::Error },

    #[snafu(display("No bucket count above {} is available", n_buckets))]
    CapacityExhausted { n_buckets: usize },

    #[snafu(display("Unable to copy key: {}", source))]
    KeyCopy { source: hooks::Error },

    #[snafu(display("Unable to copy value: {}", source))]
    ValueCopy { source: hooks::Error },
}

struct Bucket<K, V> {
    key: K,
    value: V,
}

/// Open-addressing hash table configured by `C`.
///
/// Keys and values are stored through the copy hooks of `C` and released
/// through its destroy hooks. The table is not synchronised; sharing it between
/// threads requires an external lock.
pub struct HashTable<K, V, C = Config, A = Global>
where
    C: TableConfig<K, V>,
    A: Alloc + Clone,
{
    buckets: RawVec<Bucket<K, V>, A>,
    states: BucketStates<A>,
    n_buckets: usize,
    n_occupied: usize,
    size: usize,
    upper_bound: usize,
    _config: PhantomData<fn() -> C>,
}

impl<K, V, C> HashTable<K, V, C>
where
    C: TableConfig<K, V>,
{
    /// Creates an empty table on the global heap. Nothing is allocated until
    /// the first `put`.
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}

impl<K, V, C> Default for HashTable<K, V, C>
where
    C: TableConfig<K, V>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C, A> HashTable<K, V, C, A>
where
    C: TableConfig<K, V>,
    A: Alloc + Clone,
{
    /// Creates an empty table whose storage comes from `alloc`.
    pub fn new_in(alloc: A) -> Self {
        HashTable {
            states: BucketStates::unallocated(alloc.clone()),
            buckets: RawVec::new_in(alloc),
            n_buckets: 0,
            n_occupied: 0,
            size: 0,
            upper_bound: 0,
            _config: PhantomData,
        }
    }

    /// Number of live entries.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Same as [`size`](Self::size).
    #[inline]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Current number of buckets; `0` while nothing is allocated.
    #[inline]
    pub fn n_buckets(&self) -> usize {
        self.n_buckets
    }

    /// Buckets that are FULL or DELETED.
    #[inline]
    pub fn n_occupied(&self) -> usize {
        self.n_occupied
    }

    /// Occupancy at which the next `put` rehashes.
    #[inline]
    pub fn upper_bound(&self) -> usize {
        self.upper_bound
    }

    /// Index of the bucket holding `key`, or [`n_buckets`](Self::n_buckets)
    /// if the key is absent.
    pub fn find_slot(&self, key: &K) -> usize {
        let n = self.n_buckets;
        if n == 0 {
            return n;
        }
        let mut probe = Probe::new(C::Hash::hash(key), n);
        loop {
            let ix = probe.ix;
            match self.states.get(ix) {
                State::Empty => break,
                State::Full if C::Key::equals(unsafe { &(*self.bucket(ix)).key }, key) => {
                    return ix;
                }
                _ => {}
            }
            if !probe.advance() {
                break;
            }
        }
        n
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find_slot(key) != self.n_buckets
    }

    /// Returns the value stored under `key`.
    pub fn read(&self, key: &K) -> Option<&V> {
        let slot = self.find_slot(key);
        if slot == self.n_buckets {
            None
        } else {
            Some(unsafe { &(*self.bucket(slot)).value })
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// On error no entry is added, replaced or removed, and `size` and
    /// `n_occupied` keep their values unless a rehash already went through.
    pub fn put(&mut self, key: &K, value: &V) -> Result<(), Error> {
        while self.n_occupied >= self.upper_bound {
            // Mostly tombstones: rebuild at the same size rather than grow.
            let compact = self.n_buckets > self.size * 2 && self.size < self.upper_bound;
            let requested = if compact {
                self.n_buckets - 1
            } else {
                self.n_buckets + 1
            };
            self.rehash(requested)?;
        }

        let n = self.n_buckets;
        let mut probe = Probe::new(C::Hash::hash(key), n);
        let mut target = None;
        let mut existing = None;
        loop {
            let ix = probe.ix;
            match self.states.get(ix) {
                State::Empty => {
                    target.get_or_insert(ix);
                    break;
                }
                State::Deleted => {
                    target.get_or_insert(ix);
                }
                State::Full => {
                    if C::Key::equals(unsafe { &(*self.bucket(ix)).key }, key) {
                        target.get_or_insert(ix);
                        existing = Some(ix);
                        break;
                    }
                }
            }
            if !probe.advance() {
                break;
            }
        }
        let target = target.context(CapacityExhausted { n_buckets: n })?;

        match existing {
            Some(slot) => {
                let value = C::Value::copy(value).context(ValueCopy)?;
                let old = unsafe { mem::replace(&mut (*self.bucket(slot)).value, value) };
                if slot != target {
                    // A tombstone earlier on the probe path takes the entry.
                    unsafe { ptr::write(self.bucket(target), ptr::read(self.bucket(slot))) };
                    self.states.set(slot, State::Deleted);
                    self.states.set(target, State::Full);
                }
                C::Value::destroy(old);
            }
            None => {
                let key = C::Key::copy(key).context(KeyCopy)?;
                let value = match C::Value::copy(value) {
                    Ok(value) => value,
                    Err(e) => {
                        C::Key::destroy(key);
                        return Err(e).context(ValueCopy);
                    }
                };
                if self.states.get(target) == State::Empty {
                    self.n_occupied += 1;
                }
                unsafe { ptr::write(self.bucket(target), Bucket { key, value }) };
                self.states.set(target, State::Full);
                self.size += 1;
            }
        }
        debug_assert!(self.size <= self.n_occupied && self.n_occupied <= self.n_buckets);
        Ok(())
    }

    /// Removes `key` and releases its key and value. Returns `false` if the
    /// key was not present.
    pub fn delete(&mut self, key: &K) -> bool {
        let slot = self.find_slot(key);
        if slot == self.n_buckets {
            return false;
        }
        let removed = unsafe { ptr::read(self.bucket(slot)) };
        self.states.set(slot, State::Deleted);
        self.size -= 1;
        C::Key::destroy(removed.key);
        C::Value::destroy(removed.value);
        true
    }

    /// Iterates over the live entries in bucket order.
    pub fn iter(&self) -> Iter<'_, K, V, C, A> {
        Iter {
            table: self,
            ix: 0,
            remaining: self.size,
        }
    }

    #[inline]
    fn bucket(&self, ix: usize) -> *mut Bucket<K, V> {
        debug_assert!(ix < self.n_buckets);
        unsafe { self.buckets.as_ptr().add(ix) }
    }

    /// Moves every live entry to its place in a table of the smallest
    /// tabulated size above `requested` buckets.
    fn rehash(&mut self, requested: usize) -> Result<(), Error> {
        debug_assert!(C::MAX_LOAD_FACTOR > 0.0 && C::MAX_LOAD_FACTOR <= 1.0);
        let old_buckets = self.n_buckets;
        let new_buckets = capacity::next_above(requested).context(CapacityExhausted {
            n_buckets: old_buckets,
        })?;
        trace!(
            "Rehashing {} live of {} occupied buckets: {} -> {} buckets",
            self.size,
            self.n_occupied,
            old_buckets,
            new_buckets
        );

        let mut new_states =
            BucketStates::with_buckets_in(new_buckets, self.buckets.alloc().clone())
                .context(Resize)?;
        if new_buckets > self.buckets.capacity() {
            self.buckets.try_resize_exact(new_buckets).context(Resize)?;
        }

        let base = self.buckets.as_ptr();
        for j in 0..old_buckets {
            if self.states.get(j) != State::Full {
                continue;
            }
            self.states.set(j, State::Deleted);
            let mut entry = unsafe { ptr::read(base.add(j)) };
            loop {
                let mut probe = Probe::new(C::Hash::hash(&entry.key), new_buckets);
                while new_states.get(probe.ix) != State::Empty {
                    probe.advance();
                }
                let ix = probe.ix;
                new_states.set(ix, State::Full);
                if ix < old_buckets && self.states.get(ix) == State::Full {
                    // Not visited yet: carry the occupant on to its own place.
                    self.states.set(ix, State::Deleted);
                    entry = unsafe { ptr::replace(base.add(ix), entry) };
                } else {
                    unsafe { ptr::write(base.add(ix), entry) };
                    break;
                }
            }
        }

        if new_buckets < old_buckets {
            if let Err(e) = self.buckets.try_resize_exact(new_buckets) {
                debug!(
                    "Keeping {} bucket slots after a failed shrink to {}: {}",
                    old_buckets, new_buckets, e
                );
            }
        }

        self.states = new_states;
        self.n_buckets = new_buckets;
        self.n_occupied = self.size;
        self.upper_bound = capacity::upper_bound(new_buckets, C::MAX_LOAD_FACTOR);
        Ok(())
    }
}

impl<K, V, C, A> Drop for HashTable<K, V, C, A>
where
    C: TableConfig<K, V>,
    A: Alloc + Clone,
{
    fn drop(&mut self) {
        for ix in 0..self.n_buckets {
            if self.states.get(ix) == State::Full {
                self.states.set(ix, State::Deleted);
                let Bucket { key, value } = unsafe { ptr::read(self.bucket(ix)) };
                C::Key::destroy(key);
                C::Value::destroy(value);
            }
        }
    }
}

/// Double-hashing probe sequence over `n` buckets.
struct Probe {
    ix: usize,
    home: usize,
    step: usize,
    n: usize,
}

impl Probe {
    #[inline]
    fn new(hash: u64, n: usize) -> Self {
        debug_assert!(n >= 3);
        let n64 = n as u64;
        let home = (hash % n64) as usize;
        Probe {
            ix: home,
            home,
            step: 1 + (hash % (n64 - 1)) as usize,
            n,
        }
    }

    /// Moves to the next bucket; `false` once the sequence is back at home.
    #[inline]
    fn advance(&mut self) -> bool {
        self.ix += self.step;
        if self.ix >= self.n {
            self.ix -= self.n;
        }
        self.ix != self.home
    }
}

/// Iterator over the entries of a [`HashTable`].
pub struct Iter<'a, K, V, C, A>
where
    C: TableConfig<K, V>,
    A: Alloc + Clone,
{
    table: &'a HashTable<K, V, C, A>,
    ix: usize,
    remaining: usize,
}

impl<'a, K, V, C, A> Iterator for Iter<'a, K, V, C, A>
where
    C: TableConfig<K, V>,
    A: Alloc + Clone,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while self.remaining > 0 && self.ix < self.table.n_buckets {
            let ix = self.ix;
            self.ix += 1;
            if self.table.states.get(ix) == State::Full {
                self.remaining -= 1;
                let bucket = unsafe { &*self.table.bucket(ix) };
                return Some((&bucket.key, &bucket.value));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V, C, A> IntoIterator for &'a HashTable<K, V, C, A>
where
    C: TableConfig<K, V>,
    A: Alloc + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C, A> fmt::Debug for HashTable<K, V, C, A>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: TableConfig<K, V>,
    A: Alloc + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Tables are equal when they hold the same keys with values equal under the
/// value hooks.
impl<K, V, C, A1, A2> PartialEq<HashTable<K, V, C, A2>> for HashTable<K, V, C, A1>
where
    C: TableConfig<K, V>,
    A1: Alloc + Clone,
    A2: Alloc + Clone,
{
    fn eq(&self, other: &HashTable<K, V, C, A2>) -> bool {
        self.size == other.size
            && self.iter().all(|(key, value)| match other.read(key) {
                Some(theirs) => C::Value::equals(value, theirs),
                None => false,
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        alloc::{Budget, NoOp},
        hooks::{Cloned, Djb2, Identity, Plain, StrDup},
    };
    use quickcheck::{Arbitrary, TestResult};
    use quickcheck_macros::quickcheck;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::{collections::HashMap, rc::Rc};

    type IntTable = HashTable<u64, u64>;

    fn check_invariants<K, V, C, A>(table: &HashTable<K, V, C, A>)
    where
        C: TableConfig<K, V>,
        A: Alloc + Clone,
    {
        assert!(table.size() <= table.n_occupied());
        assert!(table.n_occupied() <= table.n_buckets());
        assert!(table.n_occupied() <= table.upper_bound());
        assert_eq!(table.iter().count(), table.size());
    }

    #[test]
    fn put_delete_put() {
        let mut t = HashTable::<&str, i32, Config<Djb2>>::new();
        t.put(&"a", &1).unwrap();
        t.put(&"b", &2).unwrap();
        assert!(t.delete(&"a"));
        t.put(&"c", &3).unwrap();

        assert!(!t.contains(&"a"));
        assert_eq!(t.read(&"b"), Some(&2));
        assert_eq!(t.read(&"c"), Some(&3));
        assert_eq!(t.size(), 2);
        check_invariants(&t);
    }

    #[test]
    fn empty_table() {
        let t = IntTable::new();
        assert_eq!(t.n_buckets(), 0);
        assert_eq!(t.find_slot(&5), 0);
        assert!(!t.contains(&5));
        assert_eq!(t.read(&5), None);
        assert!(t.is_empty());
        check_invariants(&t);
    }

    #[test]
    fn delete_absent_is_noop() {
        let mut t = IntTable::new();
        assert!(!t.delete(&1));
        t.put(&1, &10).unwrap();
        assert!(!t.delete(&2));
        assert_eq!(t.size(), 1);
        assert!(t.delete(&1));
        assert!(!t.delete(&1));
        assert_eq!(t.size(), 0);
        check_invariants(&t);
    }

    #[test]
    fn overwrite_keeps_size() {
        let mut t = IntTable::new();
        t.put(&7, &1).unwrap();
        t.put(&7, &2).unwrap();
        assert_eq!(t.size(), 1);
        assert_eq!(t.read(&7), Some(&2));
        assert_eq!(t.find_slot(&7), 7 % 3);
    }

    #[test]
    fn growth_follows_prime_table() {
        let mut t = IntTable::new();
        let mut seen = vec![];
        for k in 0..100u64 {
            t.put(&k, &(k * 2)).unwrap();
            if seen.last() != Some(&t.n_buckets()) {
                seen.push(t.n_buckets());
            }
            check_invariants(&t);
        }
        assert_eq!(seen, vec![3, 11, 23, 53, 97, 193]);
        for k in 0..100u64 {
            assert_eq!(t.read(&k), Some(&(k * 2)));
        }
    }

    #[test]
    fn tombstone_churn_compacts() {
        let mut t = IntTable::new();
        for k in 0..10u64 {
            t.put(&k, &k).unwrap();
        }
        assert_eq!(t.n_buckets(), 23);
        for k in 0..9u64 {
            assert!(t.delete(&k));
        }
        assert_eq!(t.n_occupied(), 10);

        for k in 10..2000u64 {
            t.put(&k, &k).unwrap();
            assert!(t.delete(&k));
            assert_eq!(t.n_buckets(), 23);
            check_invariants(&t);
        }
        assert_eq!(t.size(), 1);
        assert_eq!(t.read(&9), Some(&9));
    }

    #[test]
    fn reinsert_after_delete_all() {
        let keys: Vec<u64> = (0..500).map(|k| k * 7919 + 13).collect();
        let mut t = IntTable::new();
        for k in &keys {
            t.put(k, &(k + 1)).unwrap();
        }
        for k in &keys {
            assert!(t.delete(k));
        }
        assert!(t.is_empty());
        for k in &keys {
            t.put(k, &(k + 1)).unwrap();
        }

        let mut fresh = IntTable::new();
        for k in &keys {
            fresh.put(k, &(k + 1)).unwrap();
        }
        for k in &keys {
            assert_eq!(t.read(k), fresh.read(k));
        }
        assert_eq!(t.size(), fresh.size());
        assert_eq!(t, fresh);
        check_invariants(&t);
    }

    struct Constant;

    impl HashHook<u32> for Constant {
        fn hash(_: &u32) -> u64 {
            42
        }
    }

    #[test]
    fn colliding_keys_survive_rehash() {
        let mut t = HashTable::<u32, u32, Config<Constant>>::new();
        for k in 0..200 {
            t.put(&k, &(k * 3)).unwrap();
        }
        for k in (0..200).step_by(2) {
            assert!(t.delete(&k));
        }
        for k in 200..300 {
            t.put(&k, &(k * 3)).unwrap();
        }
        for k in 0..300 {
            let expected = if k < 200 && k % 2 == 0 {
                None
            } else {
                Some(k * 3)
            };
            assert_eq!(t.read(&k).copied(), expected, "key {}", k);
        }
        check_invariants(&t);
    }

    #[test]
    fn tombstone_reuse_keeps_occupancy() {
        let mut t = HashTable::<u32, u32, Config<Constant>>::new();
        for k in 1..=4 {
            t.put(&k, &k).unwrap();
        }
        assert_eq!(t.n_buckets(), 11);
        assert_eq!(t.n_occupied(), 4);

        assert!(t.delete(&1));
        assert_eq!(t.n_occupied(), 4);
        assert_eq!(t.size(), 3);

        // Key 5 lands on the tombstone left by key 1.
        t.put(&5, &5).unwrap();
        assert_eq!(t.n_occupied(), 4);
        assert_eq!(t.size(), 4);
        assert_eq!(t.read(&5), Some(&5));
        assert_eq!(t.read(&1), None);

        t.put(&6, &6).unwrap();
        assert_eq!(t.n_occupied(), 5);
        assert_eq!(t.size(), 5);
        check_invariants(&t);
    }

    /// Keys that hash to their own value modulo small primes, so that rehashing
    /// in place keeps landing on buckets that have not been visited yet.
    #[test]
    fn displacement_chain() {
        let mut t = HashTable::<u64, u64, Config<Identity>>::new();
        for k in (0..16u64).rev() {
            t.put(&(k * 11 + 1), &k).unwrap();
        }
        for k in 0..16u64 {
            assert_eq!(t.read(&(k * 11 + 1)), Some(&k));
        }
        check_invariants(&t);
    }

    #[test]
    fn string_keys_are_duplicated() {
        let mut t = HashTable::<String, String, Config<Djb2, StrDup, StrDup>>::new();
        let key = String::from("key");
        let value = String::from("value");
        t.put(&key, &value).unwrap();
        drop(key);
        drop(value);
        assert_eq!(t.read(&"key".to_string()).map(String::as_str), Some("value"));
    }

    #[test]
    fn destroy_hooks_release_everything() {
        let r = Rc::new(());
        {
            let mut t = HashTable::<u32, Rc<()>, Config<Identity, Plain, Cloned>>::new();
            for k in 0..50 {
                t.put(&k, &r).unwrap();
            }
            assert_eq!(Rc::strong_count(&r), 51);
            t.put(&0, &r).unwrap();
            assert_eq!(Rc::strong_count(&r), 51);
            for k in 0..10 {
                assert!(t.delete(&k));
            }
            assert_eq!(Rc::strong_count(&r), 41);
        }
        assert_eq!(Rc::strong_count(&r), 1);
    }

    struct PickyValues;

    impl Hooks<u32> for PickyValues {
        fn equals(a: &u32, b: &u32) -> bool {
            a == b
        }

        fn copy(src: &u32) -> Result<u32, hooks::Error> {
            if *src == 13 {
                Err(hooks::Error::Rejected { reason: "unlucky" })
            } else {
                Ok(*src)
            }
        }
    }

    #[test]
    fn failed_value_copy_changes_nothing() {
        let mut t = HashTable::<u32, u32, Config<Identity, Plain, PickyValues>>::new();
        t.put(&1, &1).unwrap();
        t.put(&2, &2).unwrap();
        let (size, occupied) = (t.size(), t.n_occupied());

        match t.put(&3, &13) {
            Err(Error::ValueCopy { .. }) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
        assert!(!t.contains(&3));
        assert_eq!((t.size(), t.n_occupied()), (size, occupied));

        assert!(t.put(&1, &13).is_err());
        assert_eq!(t.read(&1), Some(&1));
        check_invariants(&t);
    }

    #[test]
    fn failed_key_copy_changes_nothing() {
        let mut t = HashTable::<u32, u32, Config<Identity, PickyValues, Plain>>::new();
        t.put(&1, &1).unwrap();
        match t.put(&13, &5) {
            Err(Error::KeyCopy { .. }) => {}
            other => panic!("Unexpected result: {:?}", other),
        }
        assert!(!t.contains(&13));
        assert_eq!(t.size(), 1);
    }

    #[test]
    fn allocation_failure_is_reported() {
        let mut t = HashTable::<u64, u64, Config, _>::new_in(NoOp);
        assert!(matches!(t.put(&1, &1), Err(Error::Resize { .. })));
        assert_eq!(t.n_buckets(), 0);
        assert!(t.is_empty());
        assert!(!t.delete(&1));
    }

    #[test]
    fn failed_growth_keeps_table_usable() {
        let budget = Budget::new(4096);
        let mut t = HashTable::<u64, u64, Config, _>::new_in(budget.clone());
        for k in 0..7u64 {
            t.put(&k, &k).unwrap();
        }
        assert_eq!(t.n_buckets(), 11);

        budget.set_remaining(0);
        assert!(t.put(&100, &100).is_err());
        assert_eq!(t.n_buckets(), 11);
        assert_eq!(t.size(), 7);
        for k in 0..7u64 {
            assert_eq!(t.read(&k), Some(&k));
        }
        // At the bound even an overwrite rehashes first.
        assert!(t.put(&3, &30).is_err());
        assert_eq!(t.read(&3), Some(&3));

        budget.set_remaining(4096);
        t.put(&100, &100).unwrap();
        assert_eq!(t.n_buckets(), 23);
        assert_eq!(t.size(), 8);
        check_invariants(&t);
    }

    #[test]
    fn storage_is_returned_on_drop() {
        let budget = Budget::new(1 << 20);
        {
            let mut t = HashTable::<u64, u64, Config, _>::new_in(budget.clone());
            for k in 0..1000u64 {
                t.put(&k, &k).unwrap();
            }
            assert!(budget.remaining() < 1 << 20);
        }
        assert_eq!(budget.remaining(), 1 << 20);
    }

    #[test]
    fn low_load_factor() {
        table_config! {
            struct Sparse<u64, u64> {
                hash: Identity,
                key: Plain,
                value: Plain,
                max_load_factor: 0.25,
            }
        }

        let mut t = HashTable::<u64, u64, Sparse>::new();
        for k in 0..100u64 {
            t.put(&k, &k).unwrap();
            check_invariants(&t);
            assert!(t.size() * 4 <= t.n_buckets() + 4);
        }
    }

    #[test]
    fn debug_and_iter() {
        let mut t = IntTable::new();
        t.put(&1, &2).unwrap();
        assert_eq!(format!("{:?}", t), "{1: 2}");
        t.put(&5, &6).unwrap();
        assert_eq!(t.iter().size_hint(), (2, Some(2)));
        let mut pairs: Vec<(u64, u64)> = (&t).into_iter().map(|(k, v)| (*k, *v)).collect();
        pairs.sort();
        assert_eq!(pairs, vec![(1, 2), (5, 6)]);
    }

    #[test]
    fn stress_against_reference() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let keys: Vec<String> = (0..4000)
            .map(|i| {
                let len = rng.gen_range(1, 9);
                let prefix: String = (0..len)
                    .map(|_| (b'a' + rng.gen_range(0, 26)) as char)
                    .collect();
                format!("{}{}", prefix, i)
            })
            .collect();

        let mut t = HashTable::<String, String, Config<Djb2, StrDup, StrDup>>::new();
        let mut reference = HashMap::new();
        for pass in 0..60 {
            let insert = pass % 4 != 0;
            let start = rng.gen_range(0, keys.len());
            let end = (start + rng.gen_range(1, 600)).min(keys.len());
            for key in &keys[start..end] {
                if insert {
                    let value = format!("{}#{}", key, pass);
                    t.put(key, &value).unwrap();
                    reference.insert(key.clone(), value);
                } else {
                    assert_eq!(t.delete(key), reference.remove(key).is_some());
                }
            }
            assert_eq!(t.size(), reference.len());
            for key in &keys {
                assert_eq!(t.read(key), reference.get(key));
            }
            check_invariants(&t);
        }
    }

    #[derive(Debug, Clone)]
    enum Action {
        Put(u8, u16),
        Delete(u8),
        Read(u8),
    }

    impl Arbitrary for Action {
        fn arbitrary<G: quickcheck::Gen>(g: &mut G) -> Self {
            match g.gen_range(0, 3) {
                0 => Action::Put(u8::arbitrary(g), u16::arbitrary(g)),
                1 => Action::Delete(u8::arbitrary(g)),
                2 => Action::Read(u8::arbitrary(g)),
                _ => unreachable!(),
            }
        }
    }

    fn check_actions<C>(actions: Vec<Action>) -> TestResult
    where
        C: TableConfig<u8, u16>,
    {
        let mut table = HashTable::<u8, u16, C>::new();
        let mut reference = HashMap::new();
        for action in actions {
            match action {
                Action::Put(k, v) => {
                    table.put(&k, &v).expect("Put failed");
                    reference.insert(k, v);
                }
                Action::Delete(k) => {
                    assert_eq!(table.delete(&k), reference.remove(&k).is_some());
                }
                Action::Read(k) => {
                    assert_eq!(table.read(&k), reference.get(&k));
                }
            }
            check_invariants(&table);
        }
        assert_eq!(table.size(), reference.len());
        for (k, v) in &reference {
            assert_eq!(table.read(k), Some(v));
        }
        TestResult::passed()
    }

    struct Narrow;

    impl HashHook<u8> for Narrow {
        fn hash(key: &u8) -> u64 {
            u64::from(*key % 4)
        }
    }

    #[quickcheck]
    fn check_actions_identity(actions: Vec<Action>) -> TestResult {
        check_actions::<Config>(actions)
    }

    #[quickcheck]
    fn check_actions_colliding(actions: Vec<Action>) -> TestResult {
        check_actions::<Config<Narrow>>(actions)
    }
}
