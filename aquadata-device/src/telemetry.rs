//! Periodic water-quality telemetry
//!
//! The device pushes a reading record over the notify channel every few
//! seconds while a central is attached: pH, dissolved-oxygen concentration
//! and saturation, temperature, plus an overall status indicator the app
//! renders as a traffic light.

use aquadata_proto::{SensorCounters, SensorReadings};
use rand::Rng;

/// Cadence of telemetry records while attached, in milliseconds.
pub const TELEMETRY_INTERVAL_MS: u64 = 3_000;

pub const STATUS_NORMAL: &str = "🟢 All systems normal";
pub const STATUS_WARNING: &str = "🟡 Warning levels detected";
pub const STATUS_CRITICAL: &str = "🔴 Critical levels detected";
pub const STATUS_SENSOR_ERROR: &str = "⚪ Sensor reading error";

/// One raw sample from the probe head.
///
/// `None` means the sensor did not answer this cycle; saturation is
/// derived, not measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub ph: Option<f64>,
    pub do_conc: Option<f64>,
    pub temp: Option<f64>,
}

/// Trait for the probe head.
pub trait Sensors {
    fn sample(&mut self) -> Sample;
}

/// Synthetic probe model for bench runs without hardware.
///
/// Readings wander around realistic freshwater values with a 5% dropout
/// rate per sensor group.
pub struct SimulatedSensors<R: Rng> {
    rng: R,
}

impl SimulatedSensors<rand::rngs::ThreadRng> {
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for SimulatedSensors<rand::rngs::ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> SimulatedSensors<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Sensors for SimulatedSensors<R> {
    fn sample(&mut self) -> Sample {
        let ph = round_to(7.2 + 1.5 * (self.rng.gen::<f64>() - 0.5), 2);
        let temp = round_to(22.5 + 5.0 * (self.rng.gen::<f64>() - 0.5), 1);
        let do_conc = round_to(10.0 - (temp - 20.0) * 0.4 + 2.0 * (self.rng.gen::<f64>() - 0.5), 1);

        let ph = (self.rng.gen::<f64>() >= 0.05).then_some(ph);
        let (do_conc, temp) = if self.rng.gen::<f64>() < 0.05 {
            (None, None)
        } else {
            (Some(do_conc), Some(temp))
        };

        Sample { ph, do_conc, temp }
    }
}

/// Accumulates per-sensor counters and renders wire-ready readings.
#[derive(Debug, Default)]
pub struct Telemetry {
    readings: SensorCounters,
    errors: SensorCounters,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn build_readings(
        &mut self,
        sample: Sample,
        uptime_ms: u64,
        wifi_connected: bool,
    ) -> SensorReadings {
        match sample.ph {
            Some(_) => self.readings.ph += 1,
            None => self.errors.ph += 1,
        }
        match sample.do_conc {
            Some(_) => self.readings.dissolved_oxygen += 1,
            None => self.errors.dissolved_oxygen += 1,
        }

        let do_sat = saturation(sample.do_conc, sample.temp);
        SensorReadings {
            ph: sample.ph,
            do_conc: sample.do_conc,
            do_sat,
            temp: sample.temp,
            timestamp: format_uptime(uptime_ms),
            status: status_indicator(sample.ph, sample.do_conc, do_sat).to_string(),
            readings_count: self.readings,
            errors_count: self.errors,
            wifi_status: if wifi_connected {
                "connected"
            } else {
                "disconnected"
            }
            .to_string(),
        }
    }
}

/// Dissolved-oxygen saturation relative to the temperature-dependent
/// theoretical maximum.
fn saturation(do_conc: Option<f64>, temp: Option<f64>) -> Option<f64> {
    let (do_conc, temp) = (do_conc?, temp?);
    let theoretical_max = 10.5 - (temp - 20.0) * 0.3;
    (theoretical_max > 0.0).then(|| round_to(do_conc / theoretical_max * 100.0, 1))
}

/// Overall status indicator from the raw readings.
pub fn status_indicator(ph: Option<f64>, do_conc: Option<f64>, do_sat: Option<f64>) -> &'static str {
    let (ph, do_conc) = match (ph, do_conc) {
        (Some(ph), Some(do_conc)) => (ph, do_conc),
        _ => return STATUS_SENSOR_ERROR,
    };
    if !(6.0..=9.0).contains(&ph) || do_conc < 4.0 || do_sat.is_some_and(|s| s < 60.0) {
        return STATUS_CRITICAL;
    }
    if !(6.5..=8.5).contains(&ph) || do_conc < 6.0 || do_sat.is_some_and(|s| s < 80.0) {
        return STATUS_WARNING;
    }
    STATUS_NORMAL
}

/// Format device uptime as `HH:MM:SS`.
pub fn format_uptime(uptime_ms: u64) -> String {
    let uptime_s = uptime_ms / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        uptime_s / 3600,
        (uptime_s / 60) % 60,
        uptime_s % 60
    )
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
