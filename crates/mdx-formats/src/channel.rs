//! Channel command-stream decoder.
//!
//! A channel's data is a byte-coded MML stream:
//!
//! - `0x00-0x7F`: rest of `byte + 1` ticks
//! - `0x80-0xDE`: note `byte - 0x80`, followed by a duration byte (`+ 1` ticks)
//! - `0xDF-0xFF`: commands with 0, 1, 2 or 4+ operand bytes
//!
//! The tokenizer consumes one byte at a time. Each in-progress command is
//! an explicit [`State`] carrying the operand bytes gathered so far; a
//! command is only emitted once all its operands have arrived.

use arrayvec::ArrayVec;
use mdx_ir::{ChannelEnd, Event, LfoControl, RawCommand, MAX_OPERANDS};
use tracing::warn;

use crate::reader::MdxReader;

/// How the key-on delay command (0xF0) is tokenized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyOnDelayMode {
    /// One operand byte, like every other single-operand command.
    #[default]
    SingleOperand,
    /// Legacy-decoder compatibility: after 0xF0 the tokenizer never leaves
    /// the operand state, so every later byte of the channel is reported
    /// as another key-on delay value.
    Sticky,
}

/// Decoder settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    pub key_on_delay: KeyOnDelayMode,
}

/// One fully decoded command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    /// Absolute stream position of the opcode byte
    pub offset: usize,
    pub event: Event,
    pub raw: RawCommand,
}

/// Tokenizer state between bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
enum State {
    Idle,
    /// Note byte seen, waiting for its duration
    NoteDuration { note: u8 },
    /// Waiting for the single operand of `opcode`
    Byte { opcode: u8 },
    /// Two-operand command; `first` is filled once the first byte arrives
    Pair { opcode: u8, first: Option<u8> },
    /// 0xF1 seen; `high` is set when the end value is two bytes
    DataEnd { high: Option<u8> },
    /// LFO command seen, waiting for its mode byte
    LfoMode { opcode: u8 },
    /// LFO configure: waveform known, collecting period and change
    LfoParams {
        opcode: u8,
        waveform: u8,
        params: ArrayVec<u8, 4>,
    },
    /// Legacy 0xF0 handling: every byte is another delay value
    KeyOnDelayLatched,
}

type Decoded = (Event, RawCommand);

/// Byte-at-a-time MML tokenizer.
#[derive(Clone, Debug)]
struct Tokenizer {
    state: State,
    key_on_delay: KeyOnDelayMode,
}

impl Tokenizer {
    fn new(options: DecodeOptions) -> Self {
        Self {
            state: State::Idle,
            key_on_delay: options.key_on_delay,
        }
    }

    /// Opcode of the command whose operands are still being collected.
    fn pending_opcode(&self) -> Option<u8> {
        match self.state {
            State::Idle | State::KeyOnDelayLatched => None,
            State::NoteDuration { note } => Some(note + 0x80),
            State::Byte { opcode }
            | State::Pair { opcode, .. }
            | State::LfoMode { opcode }
            | State::LfoParams { opcode, .. } => Some(opcode),
            State::DataEnd { .. } => Some(0xF1),
        }
    }

    /// Feed one byte; returns the command it completes, if any.
    fn feed(&mut self, b: u8) -> Option<Decoded> {
        let state = core::mem::replace(&mut self.state, State::Idle);
        match state {
            State::Idle => self.start(b),
            State::NoteDuration { note } => Some((
                Event::Note {
                    note,
                    duration: b as u16 + 1,
                },
                RawCommand::with_operands(note + 0x80, &[b]),
            )),
            State::Byte { opcode } => {
                if opcode == 0xF0 && self.key_on_delay == KeyOnDelayMode::Sticky {
                    self.state = State::KeyOnDelayLatched;
                }
                Some((
                    single_operand(opcode, b),
                    RawCommand::with_operands(opcode, &[b]),
                ))
            }
            State::KeyOnDelayLatched => {
                self.state = State::KeyOnDelayLatched;
                Some((Event::KeyOnDelay(b), RawCommand::with_operands(0xF0, &[b])))
            }
            State::Pair { opcode, first: None } => {
                self.state = State::Pair {
                    opcode,
                    first: Some(b),
                };
                None
            }
            State::Pair {
                opcode,
                first: Some(first),
            } => Some((
                two_operands(opcode, first, b),
                RawCommand::with_operands(opcode, &[first, b]),
            )),
            State::DataEnd { high: None } => {
                if b == 0 {
                    Some((
                        Event::DataEnd { end: None },
                        RawCommand::with_operands(0xF1, &[0]),
                    ))
                } else {
                    self.state = State::DataEnd { high: Some(b) };
                    None
                }
            }
            State::DataEnd { high: Some(high) } => Some((
                Event::DataEnd {
                    end: Some(u16::from_be_bytes([high, b])),
                },
                RawCommand::with_operands(0xF1, &[high, b]),
            )),
            State::LfoMode { opcode } => match b {
                0x80 | 0x81 => {
                    let control = if b == 0x80 {
                        LfoControl::Off
                    } else {
                        LfoControl::On
                    };
                    Some((
                        lfo_event(opcode, control),
                        RawCommand::with_operands(opcode, &[b]),
                    ))
                }
                waveform => {
                    self.state = State::LfoParams {
                        opcode,
                        waveform,
                        params: ArrayVec::new(),
                    };
                    None
                }
            },
            State::LfoParams {
                opcode,
                waveform,
                mut params,
            } => {
                params.push(b);
                if params.len() < 4 {
                    self.state = State::LfoParams {
                        opcode,
                        waveform,
                        params,
                    };
                    return None;
                }
                let control = LfoControl::Configure {
                    waveform,
                    period: u16::from_be_bytes([params[0], params[1]]),
                    change: i16::from_be_bytes([params[2], params[3]]),
                };
                let mut operands: ArrayVec<u8, MAX_OPERANDS> = ArrayVec::new();
                operands.push(waveform);
                operands.extend(params);
                Some((lfo_event(opcode, control), RawCommand { opcode, operands }))
            }
        }
    }

    /// Classify the first byte of a command.
    fn start(&mut self, b: u8) -> Option<Decoded> {
        match b {
            0x00..=0x7F => {
                return Some((
                    Event::Rest {
                        duration: b as u16 + 1,
                    },
                    RawCommand::new(b),
                ))
            }
            0x80..=0xDE => self.state = State::NoteDuration { note: b - 0x80 },
            0xFF | 0xFD | 0xFC | 0xFB | 0xF8 | 0xF0 | 0xEF | 0xED | 0xE9 => {
                self.state = State::Byte { opcode: b }
            }
            0xFE | 0xF6 | 0xF5 | 0xF4 | 0xF3 | 0xF2 | 0xE7 => {
                self.state = State::Pair {
                    opcode: b,
                    first: None,
                }
            }
            0xF1 => self.state = State::DataEnd { high: None },
            0xEC | 0xEB | 0xEA => self.state = State::LfoMode { opcode: b },
            0xFA => return Some((Event::VolumeDown, RawCommand::new(b))),
            0xF9 => return Some((Event::VolumeUp, RawCommand::new(b))),
            0xF7 => return Some((Event::DisableKeyOff, RawCommand::new(b))),
            0xEE => return Some((Event::SyncWait, RawCommand::new(b))),
            0xE8 => return Some((Event::Pcm8ExpansionShift, RawCommand::new(b))),
            _ => return Some((Event::Undefined(b), RawCommand::new(b))),
        }
        None
    }
}

fn single_operand(opcode: u8, v: u8) -> Event {
    match opcode {
        0xFF => Event::SetTempo(v),
        0xFD => Event::SetVoice(v),
        0xFC => Event::SetPan(v),
        0xFB => Event::SetVolume(v),
        0xF8 => Event::SoundLength(v),
        0xF0 => Event::KeyOnDelay(v),
        0xEF => Event::SyncSend { channel: v },
        0xED => Event::AdpcmNoiseFreq(v),
        0xE9 => Event::LfoDelay(v),
        _ => Event::Undefined(opcode),
    }
}

fn two_operands(opcode: u8, first: u8, second: u8) -> Event {
    let word = u16::from_be_bytes([first, second]);
    match opcode {
        0xFE => Event::SetRegister {
            register: first,
            value: second,
        },
        // Second byte is reserved
        0xF6 => Event::RepeatStart { count: first },
        0xF5 => Event::RepeatEnd { offset: word },
        0xF4 => Event::RepeatEscape { offset: word },
        0xF3 => Event::Detune(word),
        0xF2 => Event::Portamento(word),
        // First byte is reserved
        0xE7 => Event::FadeOut(second),
        _ => Event::Undefined(opcode),
    }
}

fn lfo_event(opcode: u8, control: LfoControl) -> Event {
    match opcode {
        0xEC => Event::PitchLfo(control),
        0xEB => Event::VolumeLfo(control),
        _ => Event::ChipLfo(control),
    }
}

/// Pull-style decoder for one channel's command stream.
///
/// Yields one [`Command`] per decoded unit. Decoding stops after the
/// data-end command, when the position reaches the next channel's data
/// (checked between commands only), or at end-of-stream. [`end`] reports
/// which of these happened once the iterator is exhausted.
///
/// [`end`]: ChannelDecoder::end
pub struct ChannelDecoder<'a> {
    reader: MdxReader<'a>,
    channel: u8,
    limit: Option<usize>,
    tokenizer: Tokenizer,
    end: Option<ChannelEnd>,
}

impl<'a> ChannelDecoder<'a> {
    pub(crate) fn new(
        reader: MdxReader<'a>,
        channel: u8,
        limit: Option<usize>,
        options: DecodeOptions,
    ) -> Self {
        Self {
            reader,
            channel,
            limit,
            tokenizer: Tokenizer::new(options),
            end: None,
        }
    }

    /// Decode a standalone command stream with no boundary.
    pub fn from_bytes(data: &'a [u8], channel: u8, options: DecodeOptions) -> Self {
        Self::new(MdxReader::new(data), channel, None, options)
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Why decoding stopped; `None` while commands remain.
    pub fn end(&self) -> Option<ChannelEnd> {
        self.end
    }

    /// Current absolute read position.
    pub fn position(&self) -> usize {
        self.reader.tell()
    }
}

impl Iterator for ChannelDecoder<'_> {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        if self.end.is_some() {
            return None;
        }
        if let Some(limit) = self.limit {
            if self.reader.tell() >= limit {
                self.end = Some(ChannelEnd::Boundary);
                return None;
            }
        }

        let offset = self.reader.tell();
        loop {
            let Ok(b) = self.reader.read_u8() else {
                self.end = Some(match self.tokenizer.pending_opcode() {
                    Some(opcode) => ChannelEnd::Truncated { opcode },
                    None => ChannelEnd::EndOfStream,
                });
                return None;
            };
            let Some((event, raw)) = self.tokenizer.feed(b) else {
                continue;
            };
            if let Event::Undefined(opcode) = event {
                warn!(channel = self.channel, offset, opcode, "[MDX] undefined command");
            }
            if event.is_terminator() {
                self.end = Some(ChannelEnd::Terminator);
            }
            return Some(Command { offset, event, raw });
        }
    }
}
