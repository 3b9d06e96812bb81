//! FM voice (instrument) definitions.

use core::fmt;

/// Pan assigned to every decoded voice.
///
/// The voice record carries no pan. Players set the real output phase at
/// play time through the channel's pan command (0xFC); this value only
/// gives freshly decoded voices a deterministic starting point (both
/// outputs enabled).
pub const DEFAULT_PAN: u8 = 0xC0;

/// One FM operator's parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Oscillator {
    /// Detune 1 (0-7)
    pub detune1: u8,
    /// Detune 2 (0-3)
    pub detune2: u8,
    /// Frequency multiple (0-15)
    pub multiple: u8,
    /// Total level (0-255)
    pub total_level: u8,
    /// Key scale (0-3)
    pub key_scale: u8,
    /// Attack rate (0-31)
    pub attack_rate: u8,
    /// Amplitude modulation enable (0-1)
    pub amplitude_mod_enable: u8,
    /// Decay 1 rate (0-31)
    pub decay1_rate: u8,
    /// Decay 2 rate (0-31)
    pub decay2_rate: u8,
    /// Decay 1 level, a.k.a. sustain level (0-15)
    pub decay1_level: u8,
    /// Release rate (0-15)
    pub release_rate: u8,
}

/// A 4-operator FM instrument definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Voice {
    /// Instrument number referenced by the voice-select command
    pub number: u8,
    /// Self-feedback level of operator 1 (0-7)
    pub feedback: u8,
    /// Operator connection algorithm (0-7)
    pub algorithm: u8,
    /// Output phase; always [`DEFAULT_PAN`] after decoding
    pub pan: u8,
    /// Bitmask of active operators
    pub slot_mask: u8,
    /// Operators in record order; always four, whatever `slot_mask` says
    pub oscillators: [Oscillator; 4],
}

impl fmt::Display for Oscillator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "\tdt1={} dt2={} mul={}",
            self.detune1, self.detune2, self.multiple
        )?;
        writeln!(
            f,
            "\ttl={} ks={} ar={}",
            self.total_level, self.key_scale, self.attack_rate
        )?;
        writeln!(
            f,
            "\tame={} rr={}",
            self.amplitude_mod_enable, self.release_rate
        )?;
        writeln!(
            f,
            "\td1r={} d2r={} d1l={}",
            self.decay1_rate, self.decay2_rate, self.decay1_level
        )
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Voice {}", self.number)?;
        writeln!(
            f,
            "fl={} con={} pan={} slot_mask=0x{:02x}",
            self.feedback, self.algorithm, self.pan, self.slot_mask
        )?;
        for (i, osc) in self.oscillators.iter().enumerate() {
            writeln!(f, "Osc {} ({})", i, crate::operator_name(i as u8))?;
            write!(f, "{}", osc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_voice_has_four_oscillators() {
        let v = Voice::default();
        assert_eq!(v.oscillators.len(), 4);
    }

    #[test]
    fn display_lists_every_operator() {
        let mut v = Voice {
            number: 3,
            feedback: 7,
            algorithm: 4,
            pan: DEFAULT_PAN,
            slot_mask: 0x0F,
            ..Default::default()
        };
        v.oscillators[2].total_level = 27;
        let text = v.to_string();
        assert!(text.starts_with("Voice 3\nfl=7 con=4 pan=192 slot_mask=0x0f\n"));
        assert!(text.contains("Osc 3 (C2)"));
        assert!(text.contains("\ttl=27 ks=0 ar=0"));
    }
}
