//! 27-byte FM voice records.
//!
//! Record layout (bit 0 = least significant):
//!
//! | bytes | fields                                      |
//! |-------|---------------------------------------------|
//! | 0     | instrument number                           |
//! | 1     | feedback (bits 3-5), algorithm (bits 0-2)   |
//! | 2     | slot mask                                   |
//! | 3-6   | DT1 (bits 4-6), MUL (bits 0-3), per operator|
//! | 7-10  | TL                                          |
//! | 11-14 | KS (bits 6-7), AR (bits 0-4)                |
//! | 15-18 | AME (bit 7), D1R (bits 0-4)                 |
//! | 19-22 | DT2 (bits 6-7), D2R (bits 0-4)              |
//! | 23-26 | D1L (bits 4-7), RR (bits 0-3)               |

use binrw::io::Cursor;
use binrw::{binrw, BinRead, BinWrite};
use mdx_ir::{Oscillator, Voice, DEFAULT_PAN};

use crate::reader::MdxReader;
use crate::FormatError;

/// Size of one voice record in bytes.
pub const VOICE_RECORD_LEN: usize = 27;

#[binrw]
#[brw(big)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct VoiceRecord {
    number: u8,
    fb_con: u8,
    slot_mask: u8,
    dt1_mul: [u8; 4],
    tl: [u8; 4],
    ks_ar: [u8; 4],
    ame_d1r: [u8; 4],
    dt2_d2r: [u8; 4],
    d1l_rr: [u8; 4],
}

impl From<&VoiceRecord> for Voice {
    fn from(rec: &VoiceRecord) -> Self {
        let mut oscillators = [Oscillator::default(); 4];
        for (i, osc) in oscillators.iter_mut().enumerate() {
            osc.detune1 = (rec.dt1_mul[i] >> 4) & 0x07;
            osc.multiple = rec.dt1_mul[i] & 0x0F;
            osc.total_level = rec.tl[i];
            osc.key_scale = (rec.ks_ar[i] >> 6) & 0x03;
            osc.attack_rate = rec.ks_ar[i] & 0x1F;
            osc.amplitude_mod_enable = (rec.ame_d1r[i] >> 7) & 0x01;
            osc.decay1_rate = rec.ame_d1r[i] & 0x1F;
            osc.detune2 = (rec.dt2_d2r[i] >> 6) & 0x03;
            osc.decay2_rate = rec.dt2_d2r[i] & 0x1F;
            osc.decay1_level = (rec.d1l_rr[i] >> 4) & 0x0F;
            osc.release_rate = rec.d1l_rr[i] & 0x0F;
        }
        Voice {
            number: rec.number,
            feedback: (rec.fb_con >> 3) & 0x07,
            algorithm: rec.fb_con & 0x07,
            pan: DEFAULT_PAN,
            slot_mask: rec.slot_mask,
            oscillators,
        }
    }
}

impl From<&Voice> for VoiceRecord {
    fn from(v: &Voice) -> Self {
        let mut rec = VoiceRecord {
            number: v.number,
            fb_con: ((v.feedback & 0x07) << 3) | (v.algorithm & 0x07),
            slot_mask: v.slot_mask,
            ..Default::default()
        };
        for (i, osc) in v.oscillators.iter().enumerate() {
            rec.dt1_mul[i] = ((osc.detune1 & 0x07) << 4) | (osc.multiple & 0x0F);
            rec.tl[i] = osc.total_level;
            rec.ks_ar[i] = ((osc.key_scale & 0x03) << 6) | (osc.attack_rate & 0x1F);
            rec.ame_d1r[i] = ((osc.amplitude_mod_enable & 0x01) << 7) | (osc.decay1_rate & 0x1F);
            rec.dt2_d2r[i] = ((osc.detune2 & 0x03) << 6) | (osc.decay2_rate & 0x1F);
            rec.d1l_rr[i] = ((osc.decay1_level & 0x0F) << 4) | (osc.release_rate & 0x0F);
        }
        rec
    }
}

/// Decode one voice record. Pan is set to [`DEFAULT_PAN`].
pub fn decode_voice(bytes: &[u8; VOICE_RECORD_LEN]) -> Result<Voice, FormatError> {
    let rec = VoiceRecord::read(&mut Cursor::new(&bytes[..]))?;
    Ok(Voice::from(&rec))
}

/// Pack a voice back into its record form. Pan is not stored; bits the
/// layout leaves unused are written as zero.
pub fn encode_voice(voice: &Voice) -> Result<[u8; VOICE_RECORD_LEN], FormatError> {
    let mut out = [0u8; VOICE_RECORD_LEN];
    VoiceRecord::from(voice).write(&mut Cursor::new(&mut out[..]))?;
    Ok(out)
}

/// Iterator over the voice table.
///
/// The table has no count; it ends at the first short read.
pub struct Voices<'a> {
    reader: MdxReader<'a>,
}

impl<'a> Voices<'a> {
    pub(crate) fn new(reader: MdxReader<'a>) -> Self {
        Self { reader }
    }
}

impl Iterator for Voices<'_> {
    type Item = Result<Voice, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reader.is_eof() {
            return None;
        }
        let bytes = self.reader.read_array::<VOICE_RECORD_LEN>()?;
        Some(decode_voice(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A record with every field set to a distinct in-range value.
    fn sample_record() -> [u8; VOICE_RECORD_LEN] {
        [
            0x05, // number
            0b0010_1011, // FB=5 CON=3
            0x0F, // slot mask
            0x71, 0x02, 0x33, 0x0F, // DT1/MUL
            0x1B, 0x25, 0x00, 0x7F, // TL
            0xDF, 0x1F, 0x41, 0x9A, // KS/AR
            0x85, 0x0C, 0x9F, 0x00, // AME/D1R
            0xC0, 0x1F, 0x43, 0x85, // DT2/D2R
            0xF5, 0x2F, 0x10, 0x0F, // D1L/RR
        ]
    }

    #[test]
    fn decodes_header_fields() {
        let v = decode_voice(&sample_record()).unwrap();
        assert_eq!(v.number, 5);
        assert_eq!(v.feedback, 5);
        assert_eq!(v.algorithm, 3);
        assert_eq!(v.slot_mask, 0x0F);
        assert_eq!(v.pan, DEFAULT_PAN);
    }

    #[test]
    fn decodes_operator_fields() {
        let v = decode_voice(&sample_record()).unwrap();
        let op0 = v.oscillators[0];
        assert_eq!((op0.detune1, op0.multiple), (7, 1));
        assert_eq!(op0.total_level, 0x1B);
        assert_eq!((op0.key_scale, op0.attack_rate), (3, 0x1F));
        assert_eq!((op0.amplitude_mod_enable, op0.decay1_rate), (1, 5));
        assert_eq!((op0.detune2, op0.decay2_rate), (3, 0));
        assert_eq!((op0.decay1_level, op0.release_rate), (0x0F, 5));

        let op3 = v.oscillators[3];
        assert_eq!((op3.detune1, op3.multiple), (0, 0x0F));
        assert_eq!((op3.key_scale, op3.attack_rate), (2, 0x1A));
        assert_eq!((op3.detune2, op3.decay2_rate), (2, 5));
        assert_eq!((op3.decay1_level, op3.release_rate), (0, 0x0F));
    }

    #[test]
    fn reencodes_valid_record_exactly() {
        let rec = sample_record();
        let v = decode_voice(&rec).unwrap();
        assert_eq!(encode_voice(&v).unwrap(), rec);
    }

    /// Bits each record byte actually carries.
    fn used_bits() -> [u8; VOICE_RECORD_LEN] {
        let mut mask = [0u8; VOICE_RECORD_LEN];
        mask[0] = 0xFF;
        mask[1] = 0x3F;
        mask[2] = 0xFF;
        for i in 0..4 {
            mask[3 + i] = 0x7F;
            mask[7 + i] = 0xFF;
            mask[11 + i] = 0xDF;
            mask[15 + i] = 0x9F;
            mask[19 + i] = 0xDF;
            mask[23 + i] = 0xFF;
        }
        mask
    }

    #[test]
    fn every_in_range_byte_reencodes_exactly() {
        let base = sample_record();
        for (pos, &mask) in used_bits().iter().enumerate() {
            for value in (0..=0xFFu8).filter(|v| v & !mask == 0) {
                let mut rec = base;
                rec[pos] = value;
                let v = decode_voice(&rec).unwrap();
                assert_eq!(encode_voice(&v).unwrap(), rec, "byte {} = {:02X}", pos, value);
            }
        }
    }

    #[test]
    fn reencode_clears_unused_bits() {
        let mut rec = sample_record();
        rec[1] |= 0xC0; // above FB
        rec[3] |= 0x80; // above DT1
        let v = decode_voice(&rec).unwrap();
        let out = encode_voice(&v).unwrap();
        assert_eq!(out[1], 0b0010_1011);
        assert_eq!(out[3], 0x71);
    }

    #[test]
    fn voice_table_stops_at_short_read() {
        let mut data = sample_record().to_vec();
        data.extend_from_slice(&sample_record());
        data.extend_from_slice(&[0xAA; 10]);
        let voices: Vec<_> = Voices::new(MdxReader::new(&data))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(voices.len(), 2);
    }

    #[test]
    fn empty_voice_table() {
        assert_eq!(Voices::new(MdxReader::new(&[])).count(), 0);
    }
}
