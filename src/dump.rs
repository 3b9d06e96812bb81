//! Text rendering of a decoded MDX file.

use std::fmt::Write;

use mdx_formats::{ChannelEnd, Event, LfoControl, MdxHandler, MdxHeader, RawCommand, Voice};
use mdx_ir::{channel_name, command_name, note_name, note_octave};

/// What the dumper prints.
#[derive(Clone, Copy, Debug, Default)]
pub struct DumpOptions {
    /// Print raw command bytes instead of decoded events
    pub raw: bool,
    /// Skip channel data entirely
    pub voices_only: bool,
    /// Print only this channel
    pub channel: Option<u8>,
}

/// Handler that renders everything it sees into a string.
pub struct Dumper {
    options: DumpOptions,
    out: String,
    ticks: u32,
}

impl Dumper {
    pub fn new(options: DumpOptions) -> Self {
        Self {
            options,
            out: String::new(),
            ticks: 0,
        }
    }

    pub fn into_output(self) -> String {
        self.out
    }

    fn shows(&self, channel: u8) -> bool {
        !self.options.voices_only && self.options.channel.map_or(true, |c| c == channel)
    }
}

impl MdxHandler for Dumper {
    fn header(&mut self, header: &MdxHeader) {
        let _ = writeln!(self.out, "Title:    {}", header.title_lossy());
        let _ = writeln!(self.out, "PCM file: {}", header.pcm_file_name_lossy());
        let _ = writeln!(self.out, "Channels: {}", header.num_channels());
        let _ = writeln!(
            self.out,
            "Voices @  0x{:04X}",
            header.voice_table_start()
        );
        let _ = writeln!(self.out);
    }

    fn voice(&mut self, voice: &Voice) {
        let _ = write!(self.out, "{}", voice);
        if self.options.raw {
            if let Ok(bytes) = mdx_formats::encode_voice(voice) {
                let hex: Vec<_> = bytes.iter().map(|b| format!("{:02X}", b)).collect();
                let _ = writeln!(self.out, "raw: {}", hex.join(" "));
            }
        }
        let _ = writeln!(self.out);
    }

    fn channel_start(&mut self, channel: u8) {
        self.ticks = 0;
        if self.shows(channel) {
            let _ = writeln!(self.out, "Channel {} ({}):", channel_name(channel), channel);
        }
    }

    fn event(&mut self, channel: u8, event: &Event) {
        self.ticks += event.ticks() as u32;
        if self.shows(channel) && !self.options.raw {
            let _ = writeln!(self.out, "  {}", describe_event(event));
        }
    }

    fn command(&mut self, channel: u8, raw: &RawCommand) {
        if self.shows(channel) && self.options.raw {
            let _ = writeln!(self.out, "  {}", raw);
        }
    }

    fn channel_end(&mut self, channel: u8, end: ChannelEnd) {
        if self.shows(channel) {
            let _ = writeln!(self.out, "  end: {:?}, {} ticks", end, self.ticks);
            let _ = writeln!(self.out);
        }
    }
}

fn describe_lfo(control: &LfoControl) -> String {
    match control {
        LfoControl::Off => "off".to_string(),
        LfoControl::On => "on".to_string(),
        LfoControl::Configure {
            waveform,
            period,
            change,
        } => format!("wave={} period={} change={}", waveform, period, change),
    }
}

/// One-line description of an event.
pub fn describe_event(event: &Event) -> String {
    match event {
        Event::Rest { duration } => format!("Rest len={}", duration),
        Event::Note { note, duration } => format!(
            "Note o{}{} ({}) len={}",
            note_octave(*note),
            note_name(*note),
            note,
            duration
        ),
        Event::SetTempo(t) => format!("{} {}", command_name(0xFF), t),
        Event::SetRegister { register, value } => {
            format!("{} 0x{:02X}=0x{:02X}", command_name(0xFE), register, value)
        }
        Event::SetVoice(v) => format!("{} {}", command_name(0xFD), v),
        Event::SetPan(p) => format!("{} {}", command_name(0xFC), p),
        Event::SetVolume(v) => format!("{} {}", command_name(0xFB), v),
        Event::VolumeDown => command_name(0xFA).to_string(),
        Event::VolumeUp => command_name(0xF9).to_string(),
        Event::SoundLength(l) => format!("{} {}", command_name(0xF8), l),
        Event::DisableKeyOff => command_name(0xF7).to_string(),
        Event::RepeatStart { count } => format!("{} x{}", command_name(0xF6), count),
        Event::RepeatEnd { offset } => format!("{} {}", command_name(0xF5), offset),
        Event::RepeatEscape { offset } => format!("{} {}", command_name(0xF4), offset),
        Event::Detune(d) => format!("{} {}", command_name(0xF3), d),
        Event::Portamento(p) => format!("{} {}", command_name(0xF2), p),
        Event::DataEnd { end: None } => command_name(0xF1).to_string(),
        Event::DataEnd { end: Some(end) } => format!("{} loop={}", command_name(0xF1), end),
        Event::KeyOnDelay(d) => format!("{} {}", command_name(0xF0), d),
        Event::SyncSend { channel } => {
            format!("{} {}", command_name(0xEF), channel_name(*channel))
        }
        Event::SyncWait => command_name(0xEE).to_string(),
        Event::AdpcmNoiseFreq(f) => format!("{} {}", command_name(0xED), f),
        Event::PitchLfo(c) => format!("{} {}", command_name(0xEC), describe_lfo(c)),
        Event::VolumeLfo(c) => format!("{} {}", command_name(0xEB), describe_lfo(c)),
        Event::ChipLfo(c) => format!("{} {}", command_name(0xEA), describe_lfo(c)),
        Event::LfoDelay(d) => format!("{} {}", command_name(0xE9), d),
        Event::Pcm8ExpansionShift => command_name(0xE8).to_string(),
        Event::FadeOut(f) => format!("{} {}", command_name(0xE7), f),
        Event::Undefined(op) => format!("Undefined 0x{:02X}", op),
    }
}
