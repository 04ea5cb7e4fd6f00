//! Macros for hash tables.

/// Declares a named [`TableConfig`](crate::TableConfig) binding.
///
/// `max_load_factor` may be omitted, in which case the default of `0.7` is
/// used.
///
/// ```rust
/// use gen_collections::{table_config, Djb2, HashTable, Plain, StrDup};
///
/// table_config! {
///     /// Word counts keyed by owned strings.
///     pub struct Words<String, u32> {
///         hash: Djb2,
///         key: StrDup,
///         value: Plain,
///         max_load_factor: 0.5,
///     }
/// }
///
/// let mut counts = HashTable::<String, u32, Words>::new();
/// counts.put(&"apple".to_string(), &3).unwrap();
/// assert_eq!(counts.read(&"apple".to_string()), Some(&3));
/// ```
#[macro_export]
macro_rules! table_config {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident<$key:ty, $value:ty> {
            hash: $hash:ty,
            key: $key_hooks:ty,
            value: $value_hooks:ty $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name;

        impl $crate::TableConfig<$key, $value> for $name {
            type Hash = $hash;
            type Key = $key_hooks;
            type Value = $value_hooks;
        }
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident<$key:ty, $value:ty> {
            hash: $hash:ty,
            key: $key_hooks:ty,
            value: $value_hooks:ty,
            max_load_factor: $load:expr $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name;

        impl $crate::TableConfig<$key, $value> for $name {
            type Hash = $hash;
            type Key = $key_hooks;
            type Value = $value_hooks;

            const MAX_LOAD_FACTOR: f64 = $load;
        }
    };
}
