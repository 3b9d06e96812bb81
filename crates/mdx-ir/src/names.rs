//! Display names for notes, channels, operators and commands.

const COMMAND_NAMES: [&str; 26] = [
    "Informal command",   // 0xE6
    "Extended MML",       // 0xE7
    "PCM4/8 enable",      // 0xE8
    "LFO delay setting",  // 0xE9
    "OPM LFO control",    // 0xEA
    "LFO volume control", // 0xEB
    "LFO pitch control",  // 0xEC
    "ADPCM/noise freq",   // 0xED
    "Sync signal wait",   // 0xEE
    "Sync signal send",   // 0xEF
    "Key on delay",       // 0xF0
    "Data end",           // 0xF1
    "Portamento time",    // 0xF2
    "Detune",             // 0xF3
    "Repeat escape",      // 0xF4
    "Repeat end",         // 0xF5
    "Repeat start",       // 0xF6
    "Disable key-off",    // 0xF7
    "Sound length",       // 0xF8
    "Volume increment",   // 0xF9
    "Volume decrement",   // 0xFA
    "Set volume",         // 0xFB
    "Output phase",       // 0xFC
    "Set voice #",        // 0xFD
    "Set OPM register",   // 0xFE
    "Set tempo",          // 0xFF
];

const NOTE_NAMES: [&str; 12] = [
    "c", "c+", "d", "d+", "e", "f", "f+", "g", "g+", "a", "a+", "b",
];

const OPERATOR_NAMES: [&str; 4] = ["M1", "M2", "C1", "C2"];

/// Name of a command opcode (0xE6-0xFF), or "Unknown".
pub fn command_name(opcode: u8) -> &'static str {
    match opcode {
        0xE6..=0xFF => COMMAND_NAMES[(opcode - 0xE6) as usize],
        _ => "Unknown",
    }
}

/// Operator name by slot index; only the low two bits are used.
pub fn operator_name(n: u8) -> &'static str {
    OPERATOR_NAMES[(n & 0x03) as usize]
}

/// MML note name. Note 0 is o0 d+, so names are offset by three semitones.
pub fn note_name(note: u8) -> &'static str {
    NOTE_NAMES[(note as usize + 3) % 12]
}

/// MML octave of a note number.
pub fn note_octave(note: u8) -> u8 {
    ((note as u16 + 3) / 12) as u8
}

/// Channel letter: A-H for the FM channels, P-W for the PCM channels.
pub fn channel_name(channel: u8) -> char {
    match channel {
        0..=7 => (b'A' + channel) as char,
        8..=15 => (b'P' + channel - 8) as char,
        _ => '!',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_cover_command_range() {
        assert_eq!(command_name(0xFF), "Set tempo");
        assert_eq!(command_name(0xF1), "Data end");
        assert_eq!(command_name(0xE6), "Informal command");
        assert_eq!(command_name(0xE5), "Unknown");
        assert_eq!(command_name(0x10), "Unknown");
    }

    #[test]
    fn volume_names_match_opcodes() {
        assert_eq!(command_name(0xF9), "Volume increment");
        assert_eq!(command_name(0xFA), "Volume decrement");
    }

    #[test]
    fn note_zero_is_d_sharp_octave_zero() {
        assert_eq!(note_name(0), "d+");
        assert_eq!(note_octave(0), 0);
    }

    #[test]
    fn note_names_wrap_at_octave() {
        // 9 + 3 = 12: first c of octave 1
        assert_eq!(note_name(9), "c");
        assert_eq!(note_octave(9), 1);
        assert_eq!(note_name(0x5E), "c+");
        assert_eq!(note_octave(0x5E), 8);
    }

    #[test]
    fn channel_letters() {
        assert_eq!(channel_name(0), 'A');
        assert_eq!(channel_name(7), 'H');
        assert_eq!(channel_name(8), 'P');
        assert_eq!(channel_name(15), 'W');
        assert_eq!(channel_name(16), '!');
    }

    #[test]
    fn operator_names_mask_index() {
        assert_eq!(operator_name(0), "M1");
        assert_eq!(operator_name(3), "C2");
        assert_eq!(operator_name(5), "M2");
    }
}
