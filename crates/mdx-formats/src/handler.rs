//! Callback surface for [`load_mdx`](crate::load_mdx).

use mdx_ir::{ChannelEnd, Event, RawCommand, Voice};

use crate::MdxHeader;

/// Receives everything the decoder finds, in stream order.
///
/// Every method defaults to a no-op, so a dumper can implement only
/// [`command`](MdxHandler::command) and a player only
/// [`event`](MdxHandler::event). Handlers observe; they cannot steer the
/// decoder. To stop early, record a flag and ignore the rest.
pub trait MdxHandler {
    /// Header fields are final.
    fn header(&mut self, _header: &MdxHeader) {}

    /// One voice record from the voice table.
    fn voice(&mut self, _voice: &Voice) {}

    fn channel_start(&mut self, _channel: u8) {}

    /// Semantic form of a decoded command. Always followed by
    /// [`command`](MdxHandler::command) for the same unit.
    fn event(&mut self, _channel: u8, _event: &Event) {}

    /// Byte-level form of a decoded command.
    fn command(&mut self, _channel: u8, _raw: &RawCommand) {}

    /// Fires exactly once per channel, whatever stopped decoding.
    fn channel_end(&mut self, _channel: u8, _end: ChannelEnd) {}
}
