/// Returns `true` if `count` bytes of `a` starting at `offset_a` equal `count` bytes of `b`
/// starting at `offset_b`.
///
/// Callers guarantee that both ranges lie inside the populated part of their buffers; an
/// out-of-range request panics like any other slice index.
pub fn range_equal(a: &[u8], offset_a: usize, b: &[u8], offset_b: usize, count: usize) -> bool {
    // Same memory, same window.
    if std::ptr::eq(a.as_ptr(), b.as_ptr()) && offset_a == offset_b {
        return true;
    }

    // Slice equality on `u8` lowers to `memcmp`, which is already word-at-a-time.
    a[offset_a..offset_a + count] == b[offset_b..offset_b + count]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_ranges_at_different_offsets() {
        let a = b"xxhello";
        let b = b"hello!";
        assert!(range_equal(a, 2, b, 0, 5));
        assert!(!range_equal(a, 1, b, 0, 5));
    }

    #[test]
    fn zero_count_is_always_equal() {
        assert!(range_equal(b"abc", 3, b"", 0, 0));
    }

    #[test]
    fn single_differing_tail_byte() {
        let a: Vec<u8> = (0..=255).cycle().take(4099).collect();
        let mut b = a.clone();
        *b.last_mut().unwrap() ^= 0xff;
        assert!(range_equal(&a, 0, &b, 0, a.len() - 1));
        assert!(!range_equal(&a, 0, &b, 0, a.len()));
    }

    #[test]
    fn identical_buffer_and_offset_short_circuits() {
        let a = [7u8; 32];
        assert!(range_equal(&a, 4, &a, 4, 16));
        assert!(range_equal(&a, 4, &a, 8, 16));
    }
}
