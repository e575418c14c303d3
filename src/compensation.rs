//! Fixed-point compensation of raw ADC codes.
//!
//! Integer arithmetic wraps like the 32-bit reference formula so results stay bit-exact for
//! every raw input, including ones a healthy sensor never produces.

use crate::calibration::Calibration;

/// Largest value a 20-bit ADC code can take.
pub const RAW_MAX: u32 = 0xF_FFFF;

/// Packs `msb`, `lsb` and the upper nibble of `xlsb` into a 20-bit code.
#[inline]
pub fn decode_raw(bytes: &[u8; 3]) -> u32 {
    (bytes[0] as u32) << 12 | (bytes[1] as u32) << 4 | (bytes[2] as u32) >> 4
}

macro_rules! pow2 {
    ($x:expr) => {
        $x.wrapping_mul($x)
    };
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TemperatureFine(i32);

impl TemperatureFine {
    pub fn new(value: i32) -> Self {
        Self(value)
    }

    #[inline]
    pub fn degree_celsius_x100(self) -> i32 {
        self.0.wrapping_mul(5).wrapping_add(128) >> 8
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RawTemperature(i32);

impl RawTemperature {
    pub fn new(adc: u32) -> Self {
        Self((adc & RAW_MAX) as i32)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    pub fn t_fine(self, calib: &Calibration) -> TemperatureFine {
        let t1 = calib.t1 as i32;
        let var1 = ((self.0 >> 3).wrapping_sub(t1 << 1)).wrapping_mul(calib.t2 as i32) >> 11;
        let delta = (self.0 >> 4).wrapping_sub(t1);
        let var2 = (pow2!(delta) >> 12).wrapping_mul(calib.t3 as i32) >> 14;
        TemperatureFine(var1.wrapping_add(var2))
    }

    /// Temperature in hundredths of a degree Celsius, e.g. 2508 is 25.08 °C.
    pub fn compensated(self, calib: &Calibration) -> i32 {
        self.t_fine(calib).degree_celsius_x100()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RawPressure(i32);

impl RawPressure {
    pub fn new(adc: u32) -> Self {
        Self((adc & RAW_MAX) as i32)
    }

    pub fn value(self) -> i32 {
        self.0
    }

    /// Pressure in Pa. Returns 0 when the calibration makes the divisor vanish.
    pub fn compensated(self, t_fine: TemperatureFine, calib: &Calibration) -> u32 {
        let (p1, p2, p3) = (calib.p1 as i32, calib.p2 as i32, calib.p3 as i32);
        let (p4, p5, p6) = (calib.p4 as i32, calib.p5 as i32, calib.p6 as i32);
        let (p7, p8, p9) = (calib.p7 as i32, calib.p8 as i32, calib.p9 as i32);

        let mut var1 = (t_fine.0 >> 1).wrapping_sub(64000);
        let mut var2 = (pow2!(var1 >> 2) >> 11).wrapping_mul(p6);
        var2 = var2.wrapping_add(var1.wrapping_mul(p5) << 1);
        var2 = (var2 >> 2).wrapping_add(p4 << 16);
        var1 = ((p3.wrapping_mul(pow2!(var1 >> 2) >> 13) >> 3)
            .wrapping_add(p2.wrapping_mul(var1) >> 1))
            >> 18;
        var1 = (32768i32.wrapping_add(var1)).wrapping_mul(p1) >> 15;
        if var1 == 0 {
            return 0;
        }
        let mut p = 1048576i32.wrapping_sub(self.0).wrapping_sub(var2 >> 12) as u32;
        p = p.wrapping_mul(3125);
        if p < 0x8000_0000 {
            p = (p << 1) / var1 as u32;
        } else {
            p = (p / var1 as u32).wrapping_mul(2);
        }
        var1 = p9.wrapping_mul((pow2!(p >> 3) >> 13) as i32) >> 12;
        var2 = ((p >> 2) as i32).wrapping_mul(p8) >> 13;
        (p as i32).wrapping_add(var1.wrapping_add(var2).wrapping_add(p7) >> 4) as u32
    }

    /// Pressure in Pa * 256 (Q24.8), e.g. 24674867 is 24674867 / 256 = 96386.2 Pa.
    /// Returns 0 when the calibration makes the divisor vanish.
    pub fn i64_compensated(self, t_fine: TemperatureFine, calib: &Calibration) -> u32 {
        let mut var1 = t_fine.0 as i64 - 128000;
        let mut var2 = pow2!(var1)
            .wrapping_mul(calib.p6 as i64)
            .wrapping_add(var1.wrapping_mul(calib.p5 as i64) << 17);
        var2 = var2.wrapping_add((calib.p4 as i64) << 35);
        var1 = (pow2!(var1).wrapping_mul(calib.p3 as i64) >> 8)
            .wrapping_add(var1.wrapping_mul(calib.p2 as i64) << 12);
        var1 = ((1i64 << 47).wrapping_add(var1)).wrapping_mul(calib.p1 as i64) >> 33;
        if var1 == 0 {
            return 0;
        }
        let mut p = 1048576 - self.0 as i64;
        p = ((p << 31).wrapping_sub(var2)).wrapping_mul(3125).wrapping_div(var1);
        var1 = (calib.p9 as i64).wrapping_mul(pow2!(p >> 13)) >> 25;
        var2 = (calib.p8 as i64).wrapping_mul(p) >> 19;
        ((p.wrapping_add(var1).wrapping_add(var2) >> 8) + ((calib.p7 as i64) << 4)) as u32
    }
}
