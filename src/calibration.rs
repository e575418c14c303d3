use crate::registers::CALIBRATION_LENGTH;

/// Factory trimming coefficients, `dig_T1..3` and `dig_P1..9`.
///
/// Stored in the device as one little-endian block starting at `calib00`. A fixed size block
/// always decodes, so there is no decode error to report.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Calibration {
    pub t1: u16,
    pub t2: i16,
    pub t3: i16,
    pub p1: u16,
    pub p2: i16,
    pub p3: i16,
    pub p4: i16,
    pub p5: i16,
    pub p6: i16,
    pub p7: i16,
    pub p8: i16,
    pub p9: i16,
}

impl Calibration {
    pub fn from_bytes(bytes: &[u8; CALIBRATION_LENGTH]) -> Self {
        let mut words = [0u16; CALIBRATION_LENGTH / 2];
        for (word, pair) in words.iter_mut().zip(bytes.chunks_exact(2)) {
            *word = u16::from_le_bytes([pair[0], pair[1]]);
        }
        Self {
            t1: words[0],
            t2: words[1] as i16,
            t3: words[2] as i16,
            p1: words[3],
            p2: words[4] as i16,
            p3: words[5] as i16,
            p4: words[6] as i16,
            p5: words[7] as i16,
            p6: words[8] as i16,
            p7: words[9] as i16,
            p8: words[10] as i16,
            p9: words[11] as i16,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Calibration;

    #[test]
    fn field_order_and_sign() {
        let calibration = Calibration::from_bytes(&hex!(
            "70 6B 43 67 18 FC 7D 8E 43 D6 D0 0B
             27 0B 8C 00 F9 FF 8C 3C F8 C6 70 17"
        ));
        let expected = Calibration {
            t1: 27504,
            t2: 26435,
            t3: -1000,
            p1: 36477,
            p2: -10685,
            p3: 3024,
            p4: 2855,
            p5: 140,
            p6: -7,
            p7: 15500,
            p8: -14600,
            p9: 6000,
        };
        assert_eq!(calibration, expected);
    }

    #[test]
    fn unsigned_coefficients_keep_high_bit() {
        let mut bytes = [0u8; 24];
        bytes[0..2].copy_from_slice(&[0xff, 0xff]);
        bytes[6..8].copy_from_slice(&[0x00, 0x90]);
        let calibration = Calibration::from_bytes(&bytes);
        assert_eq!(calibration.t1, 0xffff);
        assert_eq!(calibration.p1, 0x9000);
        assert_eq!(calibration.t2, 0);
    }
}
