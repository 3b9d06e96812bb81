//! Cursor over an in-memory MDX image.

use crate::FormatError;

/// Sequential, seekable reader over a byte slice.
///
/// Positions are absolute indices into the slice. Seeking past the end is
/// allowed; every read from there reports end-of-stream.
#[derive(Clone)]
pub(crate) struct MdxReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> MdxReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub(crate) fn tell(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, FormatError> {
        if self.pos >= self.data.len() {
            return Err(FormatError::UnexpectedEof);
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub(crate) fn read_u16_be(&mut self) -> Result<u16, FormatError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub(crate) fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        if self.pos.saturating_add(n) > self.data.len() {
            return Err(FormatError::UnexpectedEof);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read exactly `N` bytes, or `None` on a short read.
    ///
    /// A short read leaves the cursor at end-of-stream.
    pub(crate) fn read_array<const N: usize>(&mut self) -> Option<&'a [u8; N]> {
        match self.read_bytes(N) {
            Ok(b) => b.try_into().ok(),
            Err(_) => {
                self.pos = self.pos.max(self.data.len());
                None
            }
        }
    }

    /// Read a line ending in `terminator`, looking at no more than
    /// `max_len` bytes. The terminator is consumed but not returned.
    pub(crate) fn read_line_bounded(
        &mut self,
        terminator: u8,
        max_len: usize,
    ) -> Result<&'a [u8], FormatError> {
        let start = self.pos.min(self.data.len());
        let window = &self.data[start..self.data.len().min(start.saturating_add(max_len))];
        match window.iter().position(|&b| b == terminator) {
            Some(len) => {
                self.pos = start + len + 1;
                Ok(&window[..len])
            }
            None => Err(FormatError::MissingTerminator {
                terminator,
                max_len,
            }),
        }
    }

    /// Read a line ending in `terminator` or at end-of-stream.
    pub(crate) fn read_line(&mut self, terminator: u8) -> &'a [u8] {
        let start = self.pos.min(self.data.len());
        let rest = &self.data[start..];
        match rest.iter().position(|&b| b == terminator) {
            Some(len) => {
                self.pos = start + len + 1;
                &rest[..len]
            }
            None => {
                self.pos = self.data.len();
                rest
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian_words() {
        let mut r = MdxReader::new(&[0x12, 0x34, 0x56]);
        assert_eq!(r.read_u16_be().unwrap(), 0x1234);
        assert!(matches!(r.read_u16_be(), Err(FormatError::UnexpectedEof)));
    }

    #[test]
    fn seek_past_end_is_eof() {
        let mut r = MdxReader::new(&[1, 2, 3]);
        r.seek(10);
        assert!(r.is_eof());
        assert!(r.read_u8().is_err());
        assert!(r.read_array::<2>().is_none());
    }

    #[test]
    fn bounded_line_needs_terminator_in_window() {
        let data = b"abcdef\x1a";
        let mut r = MdxReader::new(data);
        assert!(matches!(
            r.read_line_bounded(0x1A, 4),
            Err(FormatError::MissingTerminator { .. })
        ));
        assert_eq!(r.tell(), 0);
        assert_eq!(r.read_line_bounded(0x1A, 16).unwrap(), b"abcdef");
        assert_eq!(r.tell(), 7);
    }

    #[test]
    fn unbounded_line_stops_at_end_of_stream() {
        let mut r = MdxReader::new(b"pcm\0rest");
        assert_eq!(r.read_line(0), b"pcm");
        assert_eq!(r.read_line(0), b"rest");
        assert!(r.is_eof());
        assert_eq!(r.read_line(0), b"");
    }

    #[test]
    fn short_array_read_moves_to_end() {
        let mut r = MdxReader::new(&[1, 2, 3]);
        assert_eq!(r.read_array::<2>(), Some(&[1, 2]));
        assert!(r.read_array::<2>().is_none());
        assert!(r.is_eof());
    }
}
