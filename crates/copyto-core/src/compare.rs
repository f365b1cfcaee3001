use std::cmp::Ordering;
use std::io::{self, Read};

/// Chunk size used when comparing a source against an occupied destination.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// Compare two byte streams chunk by chunk.
///
/// Returns `Ordering::Equal` only when both streams have the same length and
/// content. A shorter stream that is a prefix of the longer one compares as
/// `Less`. Reading stops at the first differing chunk.
pub fn compare<A: Read, B: Read>(mut a: A, mut b: B, chunk_size: usize) -> io::Result<Ordering> {
    let chunk_size = chunk_size.max(1);
    let mut buf_a = vec![0u8; chunk_size];
    let mut buf_b = vec![0u8; chunk_size];

    loop {
        let n_a = read_chunk(&mut a, &mut buf_a)?;
        let n_b = read_chunk(&mut b, &mut buf_b)?;
        let common = n_a.min(n_b);

        match buf_a[..common].cmp(&buf_b[..common]) {
            Ordering::Equal => {}
            other => return Ok(other),
        }
        if n_a != n_b {
            return Ok(n_a.cmp(&n_b));
        }
        // A short chunk means both streams hit EOF together.
        if n_a < chunk_size {
            return Ok(Ordering::Equal);
        }
    }
}

/// Fill `buf` as far as the reader allows. Anything short of a full buffer
/// means EOF was reached.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Cursor;

    /// Hands out at most `step` bytes per read, like a pipe or socket would.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn cmp_bytes(a: &[u8], b: &[u8], chunk: usize) -> Ordering {
        compare(Cursor::new(a), Cursor::new(b), chunk).unwrap()
    }

    #[test]
    fn test_empty_streams_are_equal() {
        assert_eq!(cmp_bytes(b"", b"", 8), Ordering::Equal);
    }

    #[test]
    fn test_exact_chunk_multiple() {
        let data = vec![7u8; 32];
        assert_eq!(cmp_bytes(&data, &data, 8), Ordering::Equal);
        assert_eq!(cmp_bytes(&data, &data[..24], 8), Ordering::Greater);
        assert_eq!(cmp_bytes(&data[..24], &data, 8), Ordering::Less);
    }

    #[test]
    fn test_difference_in_later_chunk() {
        let a = b"aaaaaaaaaaaaaaaaX".to_vec();
        let b = b"aaaaaaaaaaaaaaaaY".to_vec();
        assert_eq!(cmp_bytes(&a, &b, 4), Ordering::Less);
        assert_eq!(cmp_bytes(&b, &a, 4), Ordering::Greater);
    }

    #[test]
    fn test_short_reads_do_not_change_verdict() {
        let data: Vec<u8> = (0..=255u8).cycle().take(5000).collect();
        let a = Trickle { data: &data, step: 3 };
        let b = Trickle { data: &data, step: 1000 };
        assert_eq!(compare(a, b, 512).unwrap(), Ordering::Equal);

        let a = Trickle { data: &data[..4999], step: 7 };
        let b = Cursor::new(&data);
        assert_eq!(compare(a, b, 512).unwrap(), Ordering::Less);
    }

    proptest! {
        #[test]
        fn prop_identical_streams_equal(data in prop::collection::vec(any::<u8>(), 0..2048), chunk in 1usize..300) {
            prop_assert_eq!(cmp_bytes(&data, &data, chunk), Ordering::Equal);
        }

        #[test]
        fn prop_strict_prefix_is_less(
            data in prop::collection::vec(any::<u8>(), 1..2048),
            cut in any::<prop::sample::Index>(),
            chunk in 1usize..300,
        ) {
            let short = &data[..cut.index(data.len())];
            prop_assert_eq!(cmp_bytes(short, &data, chunk), Ordering::Less);
            prop_assert_eq!(cmp_bytes(&data, short, chunk), Ordering::Greater);
        }

        #[test]
        fn prop_first_difference_decides(
            prefix in prop::collection::vec(any::<u8>(), 0..1024),
            x in any::<u8>(),
            y in any::<u8>(),
            tail_a in prop::collection::vec(any::<u8>(), 0..64),
            tail_b in prop::collection::vec(any::<u8>(), 0..64),
            chunk in 1usize..300,
        ) {
            prop_assume!(x != y);
            let mut a = prefix.clone();
            a.push(x);
            a.extend(tail_a);
            let mut b = prefix;
            b.push(y);
            b.extend(tail_b);
            prop_assert_eq!(cmp_bytes(&a, &b, chunk), x.cmp(&y));
        }
    }
}
