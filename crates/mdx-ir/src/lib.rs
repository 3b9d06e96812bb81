//! Core types for the MDX decoder.
//!
//! This crate defines the values the decoder hands to its consumers:
//! FM voice definitions and the typed events of a channel command stream.
//! Format parsing lives in `mdx-formats`; players, converters and dumpers
//! only need these types.
//!
//! Designed to be `no_std` compatible.

#![cfg_attr(not(feature = "std"), no_std)]

mod event;
mod names;
mod voice;

pub use event::{ChannelEnd, Event, LfoControl, RawCommand, MAX_OPERANDS};
pub use names::{channel_name, command_name, note_name, note_octave, operator_name};
pub use voice::{Oscillator, Voice, DEFAULT_PAN};

/// Hardware channel limit: 8 FM channels plus 8 PCM channels.
pub const MAX_CHANNELS: usize = 16;
