#[cfg(feature = "tracing")]
use std::fmt::Debug;
#[cfg(feature = "tracing")]
use std::fmt::Formatter;
#[cfg(feature = "tracing")]
use std::fmt::LowerHex;
#[cfg(feature = "tracing")]
use std::fmt::Result as FmtResult;


/// A wrapper for formatting integers (and slices thereof) as hexadecimal
/// numbers in `Debug` contexts, such as tracing spans.
#[cfg(feature = "tracing")]
pub(crate) struct Hexify<T>(pub T);

#[cfg(feature = "tracing")]
impl<T> Debug for Hexify<&[T]>
where
    T: LowerHex,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let mut list = f.debug_list();
        for value in self.0 {
            let _list = list.entry(&format_args!("{value:#x}"));
        }
        list.finish()
    }
}


/// Perform a binary search on a slice, returning the index of the
/// first item matching `item` (if found) or the one of the last item
/// preceding it (if any), taking into account duplicates.
///
/// Items are compared by the key that `f` extracts. The slice is
/// expected to be sorted by that key.
///
/// This functionality is useful for cases where we compare elements
/// with a size, such as ranges, and an address to search for can be
/// covered by a range whose start is before the item to search for.
pub(crate) fn find_match_or_lower_bound_by_key<T, U, F>(
    slice: &[T],
    item: U,
    mut f: F,
) -> Option<usize>
where
    U: Ord,
    F: FnMut(&T) -> U,
{
    let idx = slice.partition_point(|e| f(e) < item);

    // At this point `idx` references the first item greater or equal to
    // the one we are looking for.

    if let Some(e) = slice.get(idx) {
        // If the item at `idx` is equal to what we were looking for, we
        // are trivially done, as it's guaranteed to be the first one to
        // match.
        if f(e) == item {
            return Some(idx)
        }
    }

    // Otherwise `idx` points to a "greater" item. Hence, we pick the
    // previous one, but then have to scan backwards for as long as we
    // see this one item, so that we end up reporting the index of the
    // first of all equal ones.
    let idx = idx.checked_sub(1)?;
    let cmp_e = f(slice.get(idx)?);

    for i in (0..idx).rev() {
        let e = slice.get(i)?;
        if f(e) != cmp_e {
            return Some(i + 1)
        }
    }
    Some(0)
}
