//! # Wall Clock Device
//!
//! Read-only UTC calendar time on six ports:
//!
//! | Port | Value |
//! |------|-------|
//! | 0x31 | year (e.g. 2024) |
//! | 0x32 | month, 1-12 |
//! | 0x33 | day of month, 1-31 |
//! | 0x34 | hour, 0-23 |
//! | 0x35 | minute, 0-59 |
//! | 0x36 | second, 0-59 |
//!
//! Each read samples the time source afresh. Writes are ignored.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::devices::PortDevice;

pub const CLOCK_YEAR_PORT: u16 = 0x31;
pub const CLOCK_MONTH_PORT: u16 = 0x32;
pub const CLOCK_DAY_PORT: u16 = 0x33;
pub const CLOCK_HOUR_PORT: u16 = 0x34;
pub const CLOCK_MINUTE_PORT: u16 = 0x35;
pub const CLOCK_SECOND_PORT: u16 = 0x36;

/// A broken-down UTC timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTime {
    pub year: i64,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
}

impl CivilTime {
    /// Converts seconds since the Unix epoch to a proleptic Gregorian date.
    ///
    /// ```
    /// use vm16::devices::clock::CivilTime;
    ///
    /// let t = CivilTime::from_unix(951_782_400); // 2000-02-29 00:00:00
    /// assert_eq!((t.year, t.month, t.day), (2000, 2, 29));
    /// ```
    pub fn from_unix(secs: i64) -> Self {
        let days = secs.div_euclid(86_400);
        let rem = secs.rem_euclid(86_400);

        // Days-to-civil over 400-year eras, with years starting in March
        let z = days + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = yoe + era * 400 + i64::from(month <= 2);

        Self {
            year,
            month: month as u16,
            day: day as u16,
            hour: (rem / 3_600) as u16,
            minute: (rem % 3_600 / 60) as u16,
            second: (rem % 60) as u16,
        }
    }
}

/// Calendar clock reading from an injectable time source.
pub struct ClockDevice {
    now: Box<dyn Fn() -> i64>,
}

impl ClockDevice {
    /// Ports the clock answers on, in order.
    pub const PORTS: [u16; 6] = [
        CLOCK_YEAR_PORT,
        CLOCK_MONTH_PORT,
        CLOCK_DAY_PORT,
        CLOCK_HOUR_PORT,
        CLOCK_MINUTE_PORT,
        CLOCK_SECOND_PORT,
    ];

    /// A clock reading the host's system time.
    pub fn new() -> Self {
        Self::with_source(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs() as i64)
                .unwrap_or(0)
        })
    }

    /// A clock reading seconds since the Unix epoch from `now`.
    pub fn with_source(now: impl Fn() -> i64 + 'static) -> Self {
        Self { now: Box::new(now) }
    }

    fn sample(&self) -> CivilTime {
        CivilTime::from_unix((self.now)())
    }
}

impl Default for ClockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl PortDevice for ClockDevice {
    fn port_in(&mut self, port: u16) -> u16 {
        let time = self.sample();
        match port {
            CLOCK_YEAR_PORT => time.year.clamp(0, u16::MAX as i64) as u16,
            CLOCK_MONTH_PORT => time.month,
            CLOCK_DAY_PORT => time.day,
            CLOCK_HOUR_PORT => time.hour,
            CLOCK_MINUTE_PORT => time.minute,
            CLOCK_SECOND_PORT => time.second,
            _ => 0,
        }
    }

    fn port_out(&mut self, _port: u16, _data: u16) {}
}
