//! Case-sensitive ordered lookup used by the tag table, the entity table,
//! and (indirectly) the transcoder's per-target maps: a flat sorted array
//! and a binary search, not an actual tree — the ordering invariant is
//! what matters.

use std::cmp::Ordering;

/// Binary search a table sorted by `key_of`, returning the matching
/// entry's value. `O(log n)`; callers are expected to validate sortedness
/// once (see [`is_sorted_by_key`]) rather than on every lookup.
pub fn lookup<'a, T, K: Ord>(
    table: &'a [T],
    key_of: impl Fn(&T) -> K,
    target: &K,
) -> Option<&'a T> {
    table
        .binary_search_by(|entry| key_of(entry).cmp(target))
        .ok()
        .map(|i| &table[i])
}

/// Validates that `table` is strictly increasing under `key_of`. Used to
/// check the entity/element catalogues at startup and the transcoder's
/// per-target maps at target-selection time.
pub fn is_sorted_strictly_by_key<T, K: Ord>(table: &[T], key_of: impl Fn(&T) -> K) -> Option<usize> {
    for i in 1..table.len() {
        if key_of(&table[i - 1]).cmp(&key_of(&table[i])) != Ordering::Less {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_present_and_absent_keys() {
        let table = [("alpha", 1), ("bravo", 2), ("charlie", 3)];
        assert_eq!(lookup(&table, |e| e.0, &"bravo").map(|e| e.1), Some(2));
        assert_eq!(lookup(&table, |e| e.0, &"delta"), None);
    }

    #[test]
    fn detects_unsorted_table() {
        let table = [("b", 1), ("a", 2)];
        assert_eq!(is_sorted_strictly_by_key(&table, |e| e.0), Some(1));
    }

    #[test]
    fn binary_search_agrees_with_linear_scan() {
        let table: Vec<(i32, i32)> = (0..200).map(|i| (i * 2, i)).collect();
        for target in 0..400 {
            let via_binary = lookup(&table, |e| e.0, &target).map(|e| e.1);
            let via_linear = table.iter().find(|e| e.0 == target).map(|e| e.1);
            assert_eq!(via_binary, via_linear, "target={target}");
        }
    }
}
