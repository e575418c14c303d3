pub const ID: u8 = 0x58;

pub const RESET: u8 = 0xb6;

/// `measuring` flag of the status register, set while a conversion is running.
pub const STATUS_MEASURING: u8 = 1 << 3;

pub const CALIBRATION_LENGTH: usize = 24;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Register {
    Calib0 = 0x88,
    Id = 0xd0,
    Reset = 0xe0,
    Status = 0xf3,
    ControlMeasurement = 0xf4,
    Config = 0xf5,
    PressureMsb = 0xf7,
    PressureLsb = 0xf8,
    PressureXLsb = 0xf9,
    TemperatureMsb = 0xfa,
    TemperatureLsb = 0xfb,
    TemperatureXLsb = 0xfc,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Sleep = 0b00,
    Forced = 0b01,
    Normal = 0b11,
}

/// Oversampling setting, the `osrs_t`/`osrs_p` field value of `ctrl_meas`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Oversampling {
    Skipped = 0x0,
    X1 = 0x1,
    X2 = 0x2,
    X4 = 0x3,
    X8 = 0x4,
    X16 = 0x5,
}

/// Symbolic accuracy request, mapped onto an oversampling setting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Accuracy {
    UltraLow,
    Low,
    Standard,
    High,
    UltraHigh,
}

impl Default for Accuracy {
    fn default() -> Self {
        Accuracy::UltraLow
    }
}

impl Accuracy {
    /// Parses names such as `"ULTRA_HIGH"`, anything unrecognized is `UltraLow`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ULTRA_LOW" => Accuracy::UltraLow,
            "LOW" => Accuracy::Low,
            "STANDARD" => Accuracy::Standard,
            "HIGH" => Accuracy::High,
            "ULTRA_HIGH" => Accuracy::UltraHigh,
            _ => Accuracy::UltraLow,
        }
    }

    pub fn oversampling(self) -> Oversampling {
        match self {
            Accuracy::UltraLow => Oversampling::X1,
            Accuracy::Low => Oversampling::X2,
            Accuracy::Standard => Oversampling::X4,
            Accuracy::High => Oversampling::X8,
            Accuracy::UltraHigh => Oversampling::X16,
        }
    }
}

impl From<&str> for Accuracy {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<Accuracy> for Oversampling {
    fn from(accuracy: Accuracy) -> Self {
        accuracy.oversampling()
    }
}

#[macro_export]
macro_rules! temperature_resolution {
    (16bit/0.0050dC) => {
        $crate::registers::Accuracy::UltraLow
    };
    (17bit/0.0025dC) => {
        $crate::registers::Accuracy::Low
    };
    (18bit/0.0012dC) => {
        $crate::registers::Accuracy::Standard
    };
    (19bit/0.0006dC) => {
        $crate::registers::Accuracy::High
    };
    (20bit/0.0003dC) => {
        $crate::registers::Accuracy::UltraHigh
    };
}

#[macro_export]
macro_rules! pressure_resolution {
    (16bit/2.62Pa) => {
        $crate::registers::Accuracy::UltraLow
    };
    (17bit/1.31Pa) => {
        $crate::registers::Accuracy::Low
    };
    (18bit/0.66Pa) => {
        $crate::registers::Accuracy::Standard
    };
    (19bit/0.33Pa) => {
        $crate::registers::Accuracy::High
    };
    (20bit/0.16Pa) => {
        $crate::registers::Accuracy::UltraHigh
    };
}
