//! A handler that keeps everything it is given.

use mdx_ir::{ChannelEnd, Event, RawCommand, Voice};

use crate::{load_mdx_with, DecodeOptions, FormatError, MdxHandler, MdxHeader};

/// One decoded unit with both of its forms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelItem {
    pub event: Event,
    pub raw: RawCommand,
}

/// All commands decoded for one channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelTrack {
    pub channel: u8,
    pub items: Vec<ChannelItem>,
    /// `None` only while the channel is still being decoded
    pub end: Option<ChannelEnd>,
}

impl ChannelTrack {
    fn new(channel: u8) -> Self {
        Self {
            channel,
            items: Vec::new(),
            end: None,
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.items.iter().map(|item| &item.event)
    }

    /// Sum of rest and note durations as written; repeats are not expanded.
    pub fn total_ticks(&self) -> u32 {
        self.events().map(|e| e.ticks() as u32).sum()
    }
}

/// Collects an entire file into memory.
#[derive(Clone, Debug, Default)]
pub struct MdxCollector {
    pub header: Option<MdxHeader>,
    pub voices: Vec<Voice>,
    pub channels: Vec<ChannelTrack>,
    pending: Option<Event>,
}

impl MdxCollector {
    /// Decode `data` and return everything found.
    pub fn load(data: &[u8], options: DecodeOptions) -> Result<Self, FormatError> {
        let mut collector = Self::default();
        load_mdx_with(data, options, &mut collector)?;
        Ok(collector)
    }

    pub fn find_voice(&self, number: u8) -> Option<&Voice> {
        self.voices.iter().find(|v| v.number == number)
    }
}

impl MdxHandler for MdxCollector {
    fn header(&mut self, header: &MdxHeader) {
        self.header = Some(header.clone());
    }

    fn voice(&mut self, voice: &Voice) {
        self.voices.push(*voice);
    }

    fn channel_start(&mut self, channel: u8) {
        self.channels.push(ChannelTrack::new(channel));
    }

    fn event(&mut self, _channel: u8, event: &Event) {
        self.pending = Some(*event);
    }

    fn command(&mut self, _channel: u8, raw: &RawCommand) {
        let (Some(event), Some(track)) = (self.pending.take(), self.channels.last_mut()) else {
            return;
        };
        track.items.push(ChannelItem {
            event,
            raw: raw.clone(),
        });
    }

    fn channel_end(&mut self, _channel: u8, end: ChannelEnd) {
        if let Some(track) = self.channels.last_mut() {
            track.end = Some(end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_events_with_commands() {
        let mut c = MdxCollector::default();
        c.channel_start(0);
        c.event(0, &Event::Rest { duration: 4 });
        c.command(0, &RawCommand::new(0x03));
        c.event(0, &Event::Note { note: 1, duration: 8 });
        c.command(0, &RawCommand::with_operands(0x81, &[0x07]));
        c.channel_end(0, ChannelEnd::EndOfStream);

        let track = &c.channels[0];
        assert_eq!(track.items.len(), 2);
        assert_eq!(track.items[1].raw.opcode, 0x81);
        assert_eq!(track.total_ticks(), 12);
        assert_eq!(track.end, Some(ChannelEnd::EndOfStream));
    }

    #[test]
    fn finds_voice_by_number() {
        let mut c = MdxCollector::default();
        c.voice(&Voice {
            number: 9,
            ..Default::default()
        });
        assert!(c.find_voice(9).is_some());
        assert!(c.find_voice(1).is_none());
    }
}
