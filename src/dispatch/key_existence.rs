/// Linear membership test over a short candidate list.
#[inline]
pub(crate) fn exists<K>(
    haystack: &[K],
    needle: &K,
) -> bool
where
    K: PartialEq,
{
    haystack.iter().any(|candidate| candidate == needle)
}

/// Whether the two key lists share at least one key.
///
/// Walks the shorter list, probing the longer one.
pub(crate) fn intersects<K>(
    left: &[K],
    right: &[K],
) -> bool
where
    K: PartialEq,
{
    let (short, long) = if left.len() < right.len() { (left, right) } else { (right, left) };
    short.iter().any(|key| exists(long, key))
}
