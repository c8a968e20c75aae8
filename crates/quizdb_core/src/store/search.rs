//! Binary search with insertion-point encoding.
//!
//! A hit returns the index of the match. A miss returns
//! `-(insertion_point) - 1`, which is always negative, so one search
//! both answers "is it there" and "where would it go".

use std::cmp::Ordering;

/// Searches a slice sorted consistently with `compare`.
///
/// `compare` orders an element relative to the key being searched for.
#[allow(clippy::cast_possible_wrap)]
pub fn search_by<T, F>(items: &[T], mut compare: F) -> isize
where
    F: FnMut(&T) -> Ordering,
{
    let mut low = 0usize;
    let mut high = items.len();
    while low < high {
        let mid = low + (high - low) / 2;
        match compare(&items[mid]) {
            Ordering::Less => low = mid + 1,
            Ordering::Greater => high = mid,
            // slices never hold more than isize::MAX elements
            Ordering::Equal => return mid as isize,
        }
    }
    -(low as isize) - 1
}

/// Searches a sorted slice for `key`.
pub fn search<T: Ord>(items: &[T], key: &T) -> isize {
    search_by(items, |item| item.cmp(key))
}

/// Decodes a search result: `Ok(index)` on a hit, `Err(insertion_point)`
/// on a miss.
#[allow(clippy::cast_sign_loss)]
pub fn decode(result: isize) -> Result<usize, usize> {
    if result >= 0 {
        Ok(result as usize)
    } else {
        Err((-(result + 1)) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hits_and_misses() {
        let items = [10, 20, 30];
        assert_eq!(search(&items, &20), 1);
        assert_eq!(search(&items, &5), -1);
        assert_eq!(search(&items, &25), -3);
        assert_eq!(search(&items, &35), -4);
        assert_eq!(search(&[] as &[i32], &1), -1);
    }

    #[test]
    fn decode_results() {
        assert_eq!(decode(2), Ok(2));
        assert_eq!(decode(-1), Err(0));
        assert_eq!(decode(-4), Err(3));
    }

    proptest! {
        #[test]
        fn miss_encodes_insertion_point(
            values in prop::collection::btree_set(0i32..1000, 0..=50),
            key in 0i32..1000,
        ) {
            let items: Vec<i32> = values.iter().copied().collect();
            prop_assume!(!values.contains(&key));
            let result = search(&items, &key);
            prop_assert!(result < 0);
            let expected = items.iter().filter(|&&v| v < key).count();
            prop_assert_eq!((-(result + 1)) as usize, expected);
        }

        #[test]
        fn hit_returns_index(
            values in prop::collection::btree_set(0i32..1000, 1..=50),
            pick in any::<prop::sample::Index>(),
        ) {
            let items: Vec<i32> = values.iter().copied().collect();
            let index = pick.index(items.len());
            prop_assert_eq!(search(&items, &items[index]), index as isize);
        }
    }

    #[test]
    fn every_size_up_to_fifty() {
        for n in 0..=50i32 {
            // even numbers 0, 2, ..., 2(n-1); odd keys are all misses
            let items: Vec<i32> = (0..n).map(|i| i * 2).collect();
            for key in (-1..=2 * n).filter(|k| k % 2 != 0) {
                let result = search(&items, &key);
                assert!(result < 0);
                let expected = items.iter().filter(|&&v| v < key).count();
                assert_eq!(decode(result), Err(expected));
            }
        }
    }
}
