//! Channel command-stream events.

use arrayvec::ArrayVec;
use core::fmt;

/// Largest operand count of any command (LFO configure: waveform + period + change).
pub const MAX_OPERANDS: usize = 5;

/// LFO control operand shared by the pitch, volume and chip LFO commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LfoControl {
    /// Operand 0x80: stop the LFO
    Off,
    /// Operand 0x81: restart the LFO with its last settings
    On,
    /// Any other operand: configure and start
    Configure {
        /// Waveform selector
        waveform: u8,
        /// Period in ticks
        period: u16,
        /// Per-step change amount
        change: i16,
    },
}

/// One decoded unit of a channel command stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    // === Timing ===
    /// Silence for `duration` ticks (0x00-0x7F)
    Rest { duration: u16 },
    /// Key on `note` for `duration` ticks (0x80-0xDE)
    Note { note: u8, duration: u16 },

    // === Global / chip ===
    /// 0xFF: timer-B tempo value
    SetTempo(u8),
    /// 0xFE: raw chip register write
    SetRegister { register: u8, value: u8 },
    /// 0xF1: end of channel data; `end` is the loop target when present
    DataEnd { end: Option<u16> },
    /// 0xEF: send a sync signal to another channel
    SyncSend { channel: u8 },
    /// 0xEE: wait for a sync signal
    SyncWait,
    /// 0xED: ADPCM sample rate / noise frequency
    AdpcmNoiseFreq(u8),
    /// 0xE8: PCM8 expansion shift enable
    Pcm8ExpansionShift,
    /// 0xE7: fade out at the given speed
    FadeOut(u8),

    // === Voice and level ===
    /// 0xFD: select voice by instrument number
    SetVoice(u8),
    /// 0xFC: output phase (pan)
    SetPan(u8),
    /// 0xFB: set volume
    SetVolume(u8),
    /// 0xFA
    VolumeDown,
    /// 0xF9
    VolumeUp,
    /// 0xF8: gate time
    SoundLength(u8),
    /// 0xF7: tie into the next note
    DisableKeyOff,
    /// 0xF0: key-on delay in ticks
    KeyOnDelay(u8),

    // === Flow ===
    /// 0xF6: start of a repeat block
    RepeatStart { count: u8 },
    /// 0xF5: end of a repeat block, jumping back by `offset`
    RepeatEnd { offset: u16 },
    /// 0xF4: leave the repeat block on its final pass
    RepeatEscape { offset: u16 },

    // === Pitch ===
    /// 0xF3
    Detune(u16),
    /// 0xF2
    Portamento(u16),

    // === Modulation ===
    /// 0xEC
    PitchLfo(LfoControl),
    /// 0xEB
    VolumeLfo(LfoControl),
    /// 0xEA
    ChipLfo(LfoControl),
    /// 0xE9
    LfoDelay(u8),

    /// An opcode in the command range with no known meaning
    Undefined(u8),
}

impl Event {
    /// Whether this event ends the channel stream.
    pub const fn is_terminator(&self) -> bool {
        matches!(self, Event::DataEnd { .. })
    }

    /// Ticks this event advances the channel by (rests and notes only).
    pub const fn ticks(&self) -> u16 {
        match self {
            Event::Rest { duration } | Event::Note { duration, .. } => *duration,
            _ => 0,
        }
    }
}

/// The byte-level form of a decoded command: opcode plus operand bytes
/// in stream order, reserved bytes included.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawCommand {
    pub opcode: u8,
    pub operands: ArrayVec<u8, MAX_OPERANDS>,
}

impl RawCommand {
    /// A command with no operands.
    pub fn new(opcode: u8) -> Self {
        Self {
            opcode,
            operands: ArrayVec::new(),
        }
    }

    /// A command with the given operands. Extra operands past
    /// [`MAX_OPERANDS`] are dropped.
    pub fn with_operands(opcode: u8, operands: &[u8]) -> Self {
        let mut cmd = Self::new(opcode);
        cmd.operands
            .extend(operands.iter().copied().take(MAX_OPERANDS));
        cmd
    }

    /// Encoded length in bytes, opcode included.
    pub fn len(&self) -> usize {
        1 + self.operands.len()
    }

    /// Always false; a command has at least its opcode.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for RawCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}", self.opcode)?;
        for b in &self.operands {
            write!(f, " {:02X}", b)?;
        }
        Ok(())
    }
}

/// Why decoding of a channel stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelEnd {
    /// The 0xF1 data-end command was decoded
    Terminator,
    /// The read position reached the next channel's data
    Boundary,
    /// The stream ended between commands
    EndOfStream,
    /// The stream ended inside a command's operands
    Truncated { opcode: u8 },
}
