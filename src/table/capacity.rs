//! Bucket counts a table may use.

/// Primes, each roughly double the previous one.
const BUCKET_SIZES: [usize; 29] = [
    3, 11, 23, 53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196613,
    393241, 786433, 1572869, 3145739, 6291469, 12582917, 25165843, 50331653, 100663319, 201326611,
    402653189, 805306457, 1610612741,
];

/// The smallest tabulated bucket count strictly greater than `requested`.
pub(crate) fn next_above(requested: usize) -> Option<usize> {
    let ix = BUCKET_SIZES.partition_point(|&size| size <= requested);
    BUCKET_SIZES.get(ix).copied()
}

/// The `n_occupied` threshold at which a table with `n_buckets` is rehashed.
pub(crate) fn upper_bound(n_buckets: usize, max_load_factor: f64) -> usize {
    (n_buckets as f64 * max_load_factor) as usize
}
