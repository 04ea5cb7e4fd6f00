//! Macro for Array

/// Array initialization macros.
///
/// Items are copied in through the [`Plain`](crate::Plain) hooks.
///
/// ```rust
/// use gen_collections::array;
///
/// let a = array![1; 4].unwrap();
/// assert_eq!(a.as_slice(), &[1, 1, 1, 1]);
///
/// let a = array![1, 2, 3, 4].unwrap();
/// assert_eq!(a.as_slice(), &[1, 2, 3, 4]);
/// ```
#[macro_export]
macro_rules! array {
    ($item:expr; $count:expr) => {{
        let init = || -> Result<_, $crate::array::Error> {
            let item = $item;
            let mut a = $crate::Array::<_, $crate::Plain>::new();
            for _ in 0..$count {
                a.push(&item)?;
            }
            Ok(a)
        };
        init()
    }};
    ($($x:expr),* $(,)?) => {{
        let init = || -> Result<_, $crate::array::Error> {
            let mut a = $crate::Array::<_, $crate::Plain>::new();
            $(
                a.push(&$x)?;
            )*
            Ok(a)
        };
        init()
    }};
}
