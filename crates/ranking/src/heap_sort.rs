//! In-place binary-heap sort.
//!
//! ## Algorithm
//! 1. Build a heap over the whole slice by sifting down every internal
//!    index, from the last one back to the root.
//! 2. Swap the root (the greatest element under `compare`) into the last
//!    unsorted slot, shrink the heap by one and sift the new root down.
//!
//! The result is ascending under `compare`; pass a reversed comparator for a
//! descending order. The sort is not stable: equal elements end up wherever
//! the swaps leave them, which is deterministic for a given input.

use std::cmp::Ordering;

/// Sort `items` in place, ascending under `compare`.
pub fn heap_sort_by<T, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    for root in (0..len / 2).rev() {
        sift_down(items, root, len, &mut compare);
    }
    for end in (1..len).rev() {
        items.swap(0, end);
        sift_down(items, 0, end, &mut compare);
    }
}

/// Restore the heap property below `root`, looking only at `items[..len]`.
fn sift_down<T, F>(items: &mut [T], mut root: usize, len: usize, compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    loop {
        let left = 2 * root + 1;
        let right = left + 1;
        let mut largest = root;

        if left < len && compare(&items[left], &items[largest]) == Ordering::Greater {
            largest = left;
        }
        if right < len && compare(&items[right], &items[largest]) == Ordering::Greater {
            largest = right;
        }
        if largest == root {
            return;
        }
        items.swap(root, largest);
        root = largest;
    }
}
