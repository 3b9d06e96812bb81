//! MDX decoder.
//!
//! Turns an MDX music container (FM music for the X68000's YM2151) into
//! a header, a table of FM voices, and one typed event stream per channel.
//! Consumers either implement [`MdxHandler`] and call [`load_mdx`], or
//! walk an [`MdxFile`] themselves with [`MdxFile::voices`] and
//! [`MdxFile::channel`].

mod channel;
mod collect;
mod handler;
mod header;
mod reader;
mod voice;

use thiserror::Error;
use tracing::{debug, warn};

pub use channel::{ChannelDecoder, Command, DecodeOptions, KeyOnDelayMode};
pub use collect::{ChannelItem, ChannelTrack, MdxCollector};
pub use handler::MdxHandler;
pub use header::{channel_count, MdxHeader, MAX_TITLE_LEN, TITLE_TERMINATOR};
pub use voice::{decode_voice, encode_voice, Voices, VOICE_RECORD_LEN};

pub use mdx_ir::{ChannelEnd, Event, LfoControl, RawCommand, Voice, MAX_CHANNELS};

use reader::MdxReader;

/// Error type for MDX parsing.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The stream ended before a required field
    #[error("unexpected end of file")]
    UnexpectedEof,
    /// A bounded text line had no terminator
    #[error("no 0x{terminator:02X} terminator within {max_len} bytes")]
    MissingTerminator { terminator: u8, max_len: usize },
    /// A voice record could not be read or written
    #[error("voice record: {0}")]
    VoiceRecord(#[from] binrw::Error),
}

/// A parsed MDX image: header fields plus the bytes they index into.
#[derive(Clone)]
pub struct MdxFile<'a> {
    data: &'a [u8],
    header: MdxHeader,
}

impl<'a> MdxFile<'a> {
    /// Parse the header. Fails on any short read.
    pub fn parse(data: &'a [u8]) -> Result<Self, FormatError> {
        let mut r = MdxReader::new(data);
        let header = header::parse_header(&mut r)?;
        Ok(Self { data, header })
    }

    pub fn header(&self) -> &MdxHeader {
        &self.header
    }

    /// Voice records, read until a short read.
    pub fn voices(&self) -> Voices<'a> {
        let mut r = MdxReader::new(self.data);
        r.seek(self.header.voice_table_start());
        Voices::new(r)
    }

    /// Decoder for channel `index`, or `None` past the channel count.
    pub fn channel(&self, index: usize, options: DecodeOptions) -> Option<ChannelDecoder<'a>> {
        let start = self.header.channel_start(index)?;
        // A next channel that starts before this one bounds nothing.
        let end = self.header.channel_end(index).filter(|&end| end >= start);
        let mut r = MdxReader::new(self.data);
        r.seek(start);
        Some(ChannelDecoder::new(r, index as u8, end, options))
    }
}

/// Load an MDX image with default options, reporting everything to `handler`.
pub fn load_mdx<H: MdxHandler>(data: &[u8], handler: &mut H) -> Result<MdxHeader, FormatError> {
    load_mdx_with(data, DecodeOptions::default(), handler)
}

/// Load an MDX image, reporting everything to `handler`.
///
/// Order: header, each voice, then each channel in ascending index
/// (start, one event/command pair per decoded unit, end).
pub fn load_mdx_with<H: MdxHandler>(
    data: &[u8],
    options: DecodeOptions,
    handler: &mut H,
) -> Result<MdxHeader, FormatError> {
    let file = MdxFile::parse(data)?;
    let header = file.header();
    debug!(
        title = %header.title_lossy(),
        pcm = %header.pcm_file_name_lossy(),
        file_base = header.file_base,
        channels = header.num_channels(),
        "[MDX] header parsed"
    );
    handler.header(header);

    let mut num_voices = 0;
    for voice in file.voices() {
        handler.voice(&voice?);
        num_voices += 1;
    }
    debug!(num_voices, "[MDX] voice table read");

    for index in 0..header.num_channels() {
        let Some(mut decoder) = file.channel(index, options) else {
            continue;
        };
        let channel = index as u8;
        handler.channel_start(channel);
        let mut num_commands = 0usize;
        for cmd in decoder.by_ref() {
            handler.event(channel, &cmd.event);
            handler.command(channel, &cmd.raw);
            num_commands += 1;
        }
        let end = decoder.end().unwrap_or(ChannelEnd::EndOfStream);
        if let ChannelEnd::Truncated { opcode } = end {
            warn!(channel, opcode, "[MDX] channel data ends inside a command");
        }
        debug!(channel, num_commands, ?end, "[MDX] channel decoded");
        handler.channel_end(channel, end);
    }

    Ok(file.header)
}
