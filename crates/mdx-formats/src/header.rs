//! Title lines and the self-describing offset table.

use arrayvec::ArrayVec;
use std::borrow::Cow;
use tracing::warn;

use mdx_ir::MAX_CHANNELS;

use crate::reader::MdxReader;
use crate::FormatError;

/// Byte that ends the title line.
pub const TITLE_TERMINATOR: u8 = 0x1A;

/// Longest title line searched for [`TITLE_TERMINATOR`].
pub const MAX_TITLE_LEN: usize = 1024;

/// Header fields of an MDX file.
///
/// All offsets are relative to `file_base`, the position right after
/// the PCM filename line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MdxHeader {
    /// Title bytes (usually Shift-JIS), trailing line terminator removed
    pub title: Vec<u8>,
    /// PCM bank filename; empty when the song uses no samples
    pub pcm_file_name: Vec<u8>,
    pub file_base: usize,
    pub voice_table_offset: u16,
    /// One entry per channel, in channel order
    pub channel_offsets: ArrayVec<u16, MAX_CHANNELS>,
}

impl MdxHeader {
    pub fn num_channels(&self) -> usize {
        self.channel_offsets.len()
    }

    /// Title with invalid UTF-8 replaced. Shift-JIS conversion is left
    /// to the caller.
    pub fn title_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.title)
    }

    pub fn pcm_file_name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.pcm_file_name)
    }

    /// Absolute position of the first voice record.
    pub fn voice_table_start(&self) -> usize {
        self.file_base + self.voice_table_offset as usize
    }

    /// Absolute position of channel `index`'s command stream.
    pub fn channel_start(&self, index: usize) -> Option<usize> {
        self.channel_offsets
            .get(index)
            .map(|&off| self.file_base + off as usize)
    }

    /// Absolute position where channel `index`'s stream must stop: the
    /// start of the next channel. `None` for the last channel.
    pub fn channel_end(&self, index: usize) -> Option<usize> {
        self.channel_start(index + 1)
    }
}

/// Channel count implied by the first channel offset.
///
/// Channel data starts right after the offset table, so the first offset
/// equals the table's length in bytes: two per channel plus the voice
/// table slot. Counts above [`MAX_CHANNELS`] are clamped.
pub fn channel_count(first_offset: u16) -> usize {
    let implied = (first_offset / 2).saturating_sub(1) as usize;
    if implied > MAX_CHANNELS {
        warn!(implied, "[MDX] offset table implies too many channels, clamping");
    }
    implied.min(MAX_CHANNELS)
}

pub(crate) fn parse_header(r: &mut MdxReader) -> Result<MdxHeader, FormatError> {
    let mut title = r.read_line_bounded(TITLE_TERMINATOR, MAX_TITLE_LEN)?;
    // Drop the trailing CR/LF; CRs inside a multi-line title stay.
    if let Some(cr) = title.iter().rposition(|&b| b == b'\r') {
        title = &title[..cr];
    }
    let pcm_file_name = r.read_line(0);

    let file_base = r.tell();
    let voice_table_offset = r.read_u16_be()?;
    let first = r.read_u16_be()?;
    let num_channels = channel_count(first);
    let mut channel_offsets = ArrayVec::new();
    if num_channels == 0 {
        warn!(first, "[MDX] offset table has no channels");
    } else {
        channel_offsets.push(first);
        for _ in 1..num_channels {
            channel_offsets.push(r.read_u16_be()?);
        }
    }

    Ok(MdxHeader {
        title: title.to_vec(),
        pcm_file_name: pcm_file_name.to_vec(),
        file_base,
        voice_table_offset,
        channel_offsets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Title + PCM line + offset table with `k` channels.
    fn header_bytes(title: &[u8], pcm: &[u8], k: u16) -> Vec<u8> {
        let mut buf = title.to_vec();
        buf.push(TITLE_TERMINATOR);
        buf.extend_from_slice(pcm);
        buf.push(0);
        let table_len = 2 * (k + 1);
        buf.extend_from_slice(&0x1234u16.to_be_bytes());
        for i in 0..k {
            buf.extend_from_slice(&(table_len + i * 3).to_be_bytes());
        }
        buf
    }

    #[test]
    fn channel_count_recovers_table_size() {
        for k in 1..=16u16 {
            assert_eq!(channel_count(2 * (k + 1)), k as usize);
        }
    }

    #[test]
    fn channel_count_clamps_to_sixteen() {
        assert_eq!(channel_count(2 * 18), 16);
        assert_eq!(channel_count(0xFFFF), 16);
    }

    #[test]
    fn channel_count_of_tiny_offsets_is_zero() {
        assert_eq!(channel_count(0), 0);
        assert_eq!(channel_count(2), 0);
        assert_eq!(channel_count(3), 0);
    }

    #[test]
    fn parses_offset_table() {
        let data = header_bytes(b"Song\r\n", b"drums.pdx", 9);
        let mut r = MdxReader::new(&data);
        let h = parse_header(&mut r).unwrap();
        assert_eq!(h.title, b"Song");
        assert_eq!(h.pcm_file_name, b"drums.pdx");
        assert_eq!(h.file_base, 7 + 10);
        assert_eq!(h.voice_table_offset, 0x1234);
        assert_eq!(h.num_channels(), 9);
        assert_eq!(h.channel_offsets[0], 20);
        assert_eq!(h.channel_offsets[8], 20 + 24);
        assert_eq!(h.channel_start(1), Some(h.file_base + 23));
        assert_eq!(h.channel_end(8), None);
        assert_eq!(r.tell(), h.file_base + 20);
    }

    #[test]
    fn title_truncates_at_last_carriage_return() {
        let data = header_bytes(b"line one\rline two\r\n", b"", 1);
        let h = parse_header(&mut MdxReader::new(&data)).unwrap();
        assert_eq!(h.title, b"line one\rline two");
        assert!(h.pcm_file_name.is_empty());
    }

    #[test]
    fn title_without_carriage_return_is_kept_whole() {
        let data = header_bytes(b"plain", b"", 1);
        let h = parse_header(&mut MdxReader::new(&data)).unwrap();
        assert_eq!(h.title, b"plain");
    }

    #[test]
    fn missing_title_terminator_is_fatal() {
        let data = vec![b'x'; MAX_TITLE_LEN + 8];
        assert!(matches!(
            parse_header(&mut MdxReader::new(&data)),
            Err(FormatError::MissingTerminator { terminator: 0x1A, .. })
        ));
    }

    #[test]
    fn truncated_offset_table_is_fatal() {
        let mut data = header_bytes(b"t", b"", 4);
        data.truncate(data.len() - 1);
        assert!(matches!(
            parse_header(&mut MdxReader::new(&data)),
            Err(FormatError::UnexpectedEof)
        ));
    }

    #[test]
    fn zero_channel_table_parses_empty() {
        let mut data = b"t\x1a\0".to_vec();
        data.extend_from_slice(&[0x00, 0x10, 0x00, 0x02]);
        let mut r = MdxReader::new(&data);
        let h = parse_header(&mut r).unwrap();
        assert_eq!(h.num_channels(), 0);
        assert_eq!(h.voice_table_offset, 0x10);
        assert_eq!(h.channel_start(0), None);
        assert_eq!(r.tell(), data.len());
    }
}
