//! Capacities an array may use.

const CAPACITIES: [usize; 27] = [
    1 << 4,
    1 << 5,
    1 << 6,
    1 << 7,
    1 << 8,
    1 << 9,
    1 << 10,
    1 << 11,
    1 << 12,
    1 << 13,
    1 << 14,
    1 << 15,
    1 << 16,
    1 << 17,
    1 << 18,
    1 << 19,
    1 << 20,
    1 << 21,
    1 << 22,
    1 << 23,
    1 << 24,
    1 << 25,
    1 << 26,
    1 << 27,
    1 << 28,
    1 << 29,
    1 << 30,
];

/// Percentage of the capacity below which the length lets the array shrink.
const SHRINK_PERCENT: usize = 30;

/// The smallest tabulated capacity that holds `needed` items.
pub(crate) fn fit(needed: usize) -> Option<usize> {
    let ix = CAPACITIES.partition_point(|&cap| cap < needed);
    CAPACITIES.get(ix).copied()
}

pub(crate) fn shrink_threshold(capacity: usize) -> usize {
    capacity / 100 * SHRINK_PERCENT + capacity % 100 * SHRINK_PERCENT / 100
}
