/// What a conversion does when the sensor still reports `measuring` after the last poll.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Exhausted {
    /// Read the data registers anyway, they may hold the previous conversion.
    ReadAnyway,
    /// Abort with `Error::Timeout`.
    Fail,
}

/// Bounded busy-wait on the status register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u8,
    pub interval_ms: u8,
    pub on_exhausted: Exhausted,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self { attempts: 30, interval_ms: 5, on_exhausted: Exhausted::ReadAnyway }
    }
}

impl PollPolicy {
    /// Status reads per conversion. At least one, so a zero budget still asks the sensor.
    pub fn polls(&self) -> u8 {
        self.attempts.max(1)
    }

    /// Upper bound of time spent sleeping in one conversion.
    pub fn budget_ms(&self) -> u32 {
        self.polls() as u32 * self.interval_ms as u32
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CalibrationPolicy {
    /// Re-read the coefficients for every compensated reading.
    EveryRead,
    /// Read once, reuse until `reset` or an explicit `read_calibration`.
    Cached,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub poll: PollPolicy,
    pub calibration: CalibrationPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self { poll: PollPolicy::default(), calibration: CalibrationPolicy::EveryRead }
    }
}

impl Config {
    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_calibration(mut self, calibration: CalibrationPolicy) -> Self {
        self.calibration = calibration;
        self
    }

    /// Turn an exhausted poll budget into `Error::Timeout` instead of reading stale data.
    pub fn strict(self) -> Self {
        let poll = PollPolicy { on_exhausted: Exhausted::Fail, ..self.poll };
        self.with_poll(poll)
    }
}
