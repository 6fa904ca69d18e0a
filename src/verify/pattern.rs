//! Test pattern generation and comparison

/// Offset added to the byte index so no chunk starts with zero
pub const PATTERN_OFFSET: usize = 11;

/// Pattern value at a given offset within a chunk
pub fn pattern_byte(offset: usize) -> u8 {
    // wraps every 256 bytes, only a known spacing is needed
    ((offset + PATTERN_OFFSET) % 256) as u8
}

/// Refill `buf` with `len` pattern bytes, reusing its allocation
pub fn fill_pattern(buf: &mut Vec<u8>, len: usize) {
    buf.clear();
    buf.extend((0..len).map(pattern_byte));
}

/// Offset of the first byte where `actual` differs from `expected`
pub fn first_mismatch(expected: &[u8], actual: &[u8]) -> Option<usize> {
    expected.iter().zip(actual).position(|(e, a)| e != a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_for_default_chunk_sizes() {
        let mut buf = Vec::new();
        for chunk_size in [256, 512, 4096] {
            fill_pattern(&mut buf, chunk_size);
            assert_eq!(buf.len(), chunk_size);
            for (j, &byte) in buf.iter().enumerate() {
                assert_eq!(byte as usize, (j + 11) % 256);
            }
        }
    }

    #[test]
    fn test_pattern_wraps() {
        assert_eq!(pattern_byte(0), 11);
        assert_eq!(pattern_byte(244), 255);
        assert_eq!(pattern_byte(245), 0);
        assert_eq!(pattern_byte(256), 11);
    }

    #[test]
    fn test_refill_shrinks_buffer() {
        let mut buf = Vec::new();
        fill_pattern(&mut buf, 4096);
        fill_pattern(&mut buf, 256);
        assert_eq!(buf.len(), 256);
        assert_eq!(buf[255], pattern_byte(255));
    }

    #[test]
    fn test_first_mismatch_short_circuits() {
        let mut expected = Vec::new();
        fill_pattern(&mut expected, 64);
        let mut actual = expected.clone();
        assert_eq!(first_mismatch(&expected, &actual), None);

        actual[9] ^= 0xff;
        actual[40] ^= 0xff;
        assert_eq!(first_mismatch(&expected, &actual), Some(9));
    }
}
