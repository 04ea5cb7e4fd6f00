//! Hooks that parameterize the containers.
//!
//! Every stored key, value or element enters a container through
//! [`Hooks::copy`] and leaves it through [`Hooks::destroy`]; lookups compare
//! with [`Hooks::equals`]. Hash tables additionally need a [`HashHook`] for
//! their keys. Hooks are plain types, chosen once per container type, so all of
//! it is resolved at compile time.

use snafu::{OptionExt, Snafu};

#[derive(Debug, Snafu)]
#[snafu(visibility = "pub")]
pub enum Error {
    #[snafu(display("Unable to allocate {} bytes for a copy", len))]
    Allocation { len: usize },

    #[snafu(display("Copy rejected: {}", reason))]
    Rejected { reason: &'static str },
}

/// Equality, copy and destroy hooks for values of type `T`.
pub trait Hooks<T> {
    /// Whether two values are to be treated as the same key or element.
    fn equals(a: &T, b: &T) -> bool;

    /// Builds the value a container will own from the caller's `src`.
    fn copy(src: &T) -> Result<T, Error>;

    /// Releases a value the container owned.
    #[inline]
    fn destroy(value: T) {
        drop(value)
    }
}

/// Hash function for keys of type `K`.
///
/// The result does not need to be well distributed over all bits; tables only
/// ever reduce it modulo a prime.
pub trait HashHook<K> {
    fn hash(key: &K) -> u64;
}

/// Plain assignment: values are bit-copied and compared with `==`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl<T: Copy + PartialEq> Hooks<T> for Plain {
    #[inline]
    fn equals(a: &T, b: &T) -> bool {
        a == b
    }

    #[inline]
    fn copy(src: &T) -> Result<T, Error> {
        Ok(*src)
    }
}

/// Values are duplicated with `Clone`, which is assumed not to fail.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cloned;

impl<T: Clone + PartialEq> Hooks<T> for Cloned {
    #[inline]
    fn equals(a: &T, b: &T) -> bool {
        a == b
    }

    #[inline]
    fn copy(src: &T) -> Result<T, Error> {
        Ok(src.clone())
    }
}

/// Duplicates byte strings into fresh allocations, reporting exhaustion.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrDup;

impl Hooks<String> for StrDup {
    fn equals(a: &String, b: &String) -> bool {
        a == b
    }

    fn copy(src: &String) -> Result<String, Error> {
        let mut out = String::new();
        out.try_reserve_exact(src.len())
            .ok()
            .context(Allocation { len: src.len() })?;
        out.push_str(src);
        Ok(out)
    }
}

impl Hooks<Vec<u8>> for StrDup {
    fn equals(a: &Vec<u8>, b: &Vec<u8>) -> bool {
        a == b
    }

    fn copy(src: &Vec<u8>) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        out.try_reserve_exact(src.len())
            .ok()
            .context(Allocation { len: src.len() })?;
        out.extend_from_slice(src);
        Ok(out)
    }
}

/// Uses an integer-like key as its own hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

macro_rules! identity_hash {
    ($($ty:ty),* $(,)?) => {
        $(
            impl HashHook<$ty> for Identity {
                #[inline]
                fn hash(key: &$ty) -> u64 {
                    *key as u64
                }
            }
        )*
    };
}

identity_hash!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize, char, bool);

/// Bernstein's djb2: `h = h * 33 + byte`, starting from 5381.
///
/// Not suitable for keys chosen by an adversary.
#[derive(Debug, Clone, Copy, Default)]
pub struct Djb2;

impl<K: AsRef<[u8]>> HashHook<K> for Djb2 {
    fn hash(key: &K) -> u64 {
        key.as_ref().iter().fold(5381u64, |hash, &c| {
            (hash << 5).wrapping_add(hash).wrapping_add(u64::from(c))
        })
    }
}

/// The sdbm hash: `h = byte + (h << 6) + (h << 16) - h`.
///
/// Not suitable for keys chosen by an adversary.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sdbm;

impl<K: AsRef<[u8]>> HashHook<K> for Sdbm {
    fn hash(key: &K) -> u64 {
        key.as_ref().iter().fold(0u64, |hash, &c| {
            u64::from(c)
                .wrapping_add(hash << 6)
                .wrapping_add(hash << 16)
                .wrapping_sub(hash)
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn djb2_known_values() {
        assert_eq!(<Djb2 as HashHook<&str>>::hash(&""), 5381);
        assert_eq!(<Djb2 as HashHook<&str>>::hash(&"a"), 5381 * 33 + 97);
        assert_eq!(
            <Djb2 as HashHook<String>>::hash(&"ab".to_string()),
            (5381 * 33 + 97) * 33 + 98
        );
    }

    #[test]
    fn sdbm_known_values() {
        assert_eq!(<Sdbm as HashHook<&str>>::hash(&""), 0);
        assert_eq!(<Sdbm as HashHook<&str>>::hash(&"a"), 97);
        assert_eq!(<Sdbm as HashHook<Vec<u8>>>::hash(&b"ab".to_vec()), 6_363_201);
    }

    #[test]
    fn long_keys_wrap() {
        let key = "x".repeat(10_000);
        let a = <Djb2 as HashHook<String>>::hash(&key);
        let b = <Djb2 as HashHook<String>>::hash(&key.clone());
        assert_eq!(a, b);
        let _ = <Sdbm as HashHook<String>>::hash(&key);
    }

    #[test]
    fn identity_casts() {
        assert_eq!(<Identity as HashHook<u8>>::hash(&200), 200);
        assert_eq!(<Identity as HashHook<i64>>::hash(&-1), u64::MAX);
        assert_eq!(<Identity as HashHook<char>>::hash(&'A'), 65);
    }

    #[test]
    fn strdup_copies() {
        let src = String::from("duplicate me");
        let copy = <StrDup as Hooks<String>>::copy(&src).unwrap();
        assert_eq!(copy, src);
        assert_ne!(copy.as_ptr(), src.as_ptr());
        assert!(<StrDup as Hooks<String>>::equals(&copy, &src));
    }

    #[test]
    fn plain_and_cloned() {
        assert_eq!(<Plain as Hooks<u32>>::copy(&7).unwrap(), 7);
        assert!(!<Plain as Hooks<&str>>::equals(&"a", &"b"));
        let v = vec![1, 2, 3];
        assert_eq!(<Cloned as Hooks<Vec<i32>>>::copy(&v).unwrap(), v);
    }
}
