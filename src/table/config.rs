//! Hook bindings of a hash table type.

use crate::hooks::{HashHook, Hooks, Identity, Plain};
use std::marker::PhantomData;

/// Everything a [`HashTable`](super::HashTable) needs to know about its keys
/// and values.
///
/// Use [`Config`] to combine stock hooks, or [`table_config!`](crate::table_config)
/// to give a binding set a name and a custom load factor.
pub trait TableConfig<K, V> {
    /// Hashes keys.
    type Hash: HashHook<K>;
    /// Compares, copies and destroys keys.
    type Key: Hooks<K>;
    /// Compares, copies and destroys values.
    type Value: Hooks<V>;

    /// Fraction of buckets that may be FULL or DELETED before the table is
    /// rehashed. Must lie in `(0, 1]`.
    const MAX_LOAD_FACTOR: f64 = 0.7;
}

/// Binds a hash hook, key hooks and value hooks with the default load factor.
pub struct Config<H = Identity, KH = Plain, VH = Plain>(PhantomData<fn() -> (H, KH, VH)>);

impl<K, V, H, KH, VH> TableConfig<K, V> for Config<H, KH, VH>
where
    H: HashHook<K>,
    KH: Hooks<K>,
    VH: Hooks<V>,
{
    type Hash = H;
    type Key = KH;
    type Value = VH;
}
