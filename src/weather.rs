/// Weather source contract
/// The engine only needs a temperature and a rainfall figure; whether they
/// came from a live service or a simulator is the source's business.

use std::f64::consts::PI;

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::error::{Result, SimError};
use crate::models::{round_dp, WeatherReport};

pub trait WeatherSource {
    fn current(&mut self, city: &str) -> Result<WeatherReport>;
}

impl<T: WeatherSource + ?Sized> WeatherSource for Box<T> {
    fn current(&mut self, city: &str) -> Result<WeatherReport> {
        (**self).current(city)
    }
}

/// Always reports the same conditions
#[derive(Debug, Clone)]
pub struct FixedWeather {
    temperature: f64,
    rainfall: f64,
}

impl FixedWeather {
    pub fn new(temperature: f64, rainfall: f64) -> Self {
        FixedWeather { temperature, rainfall }
    }
}

impl WeatherSource for FixedWeather {
    fn current(&mut self, city: &str) -> Result<WeatherReport> {
        if !self.temperature.is_finite() || !self.rainfall.is_finite() || self.rainfall < 0.0 {
            return Err(SimError::weather("fixed reading is not a valid measurement"));
        }
        Ok(WeatherReport {
            temperature: self.temperature,
            rainfall: self.rainfall,
            description: describe(self.rainfall).to_string(),
            city: city.to_string(),
            source: "fixed".to_string(),
        })
    }
}

/// Seasonal and diurnal temperature curve with random jitter and
/// occasional light rain.
#[derive(Debug)]
pub struct SimulatedWeather<R> {
    rng: R,
    clock: Option<NaiveDateTime>,
}

impl<R: Rng> SimulatedWeather<R> {
    /// Reads the local clock on every call.
    pub fn new(rng: R) -> Self {
        SimulatedWeather { rng, clock: None }
    }

    /// Pins the clock so readings only vary with the random source.
    pub fn at(rng: R, clock: NaiveDateTime) -> Self {
        SimulatedWeather { rng, clock: Some(clock) }
    }

    fn now(&self) -> NaiveDateTime {
        self.clock.unwrap_or_else(|| Local::now().naive_local())
    }
}

/// Expected temperature before jitter for a day of year and hour.
pub fn seasonal_temperature(day_of_year: u32, hour: u32) -> f64 {
    let base = 25.0 + 10.0 * (2.0 * PI * day_of_year as f64 / 365.0).sin();
    let hour_offset = -5.0 * (2.0 * PI * (hour as f64 - 14.0) / 24.0).cos();
    base + hour_offset
}

fn describe(rainfall: f64) -> &'static str {
    if rainfall > 0.0 {
        "light rain"
    } else {
        "clear sky"
    }
}

impl<R: Rng> WeatherSource for SimulatedWeather<R> {
    fn current(&mut self, city: &str) -> Result<WeatherReport> {
        let now = self.now();
        let jitter = Uniform::new(-2.0, 2.0).sample(&mut self.rng);
        let temperature = round_dp(seasonal_temperature(now.ordinal(), now.hour()) + jitter, 1);

        let rainfall = if self.rng.gen_bool(0.2) {
            round_dp(Uniform::new(0.0, 5.0).sample(&mut self.rng), 1)
        } else {
            0.0
        };

        Ok(WeatherReport {
            temperature,
            rainfall,
            description: describe(rainfall).to_string(),
            city: city.to_string(),
            source: "simulated".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn noon(month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, month, day)
            .and_then(|d| d.and_hms_opt(14, 0, 0))
            .unwrap()
    }

    #[test]
    fn test_fixed_weather() {
        let report = FixedWeather::new(31.0, 3.5).current("Pune").unwrap();
        assert_eq!(report.city, "Pune");
        assert_eq!(report.description, "light rain");
        assert_eq!(report.source, "fixed");

        assert!(FixedWeather::new(20.0, -1.0).current("Pune").is_err());
    }

    #[test]
    fn test_simulated_weather_band() {
        let clock = noon(4, 10);
        let expected = seasonal_temperature(clock.ordinal(), 14);
        let mut source = SimulatedWeather::at(StdRng::seed_from_u64(11), clock);

        for _ in 0..100 {
            let report = source.current("Delhi").unwrap();
            assert!((report.temperature - expected).abs() <= 2.05);
            assert!((0.0..=5.0).contains(&report.rainfall));
            assert_eq!(report.source, "simulated");
        }
    }

    #[test]
    fn test_seasonal_curve_peaks_mid_afternoon() {
        assert!(seasonal_temperature(100, 14) > seasonal_temperature(100, 2));
        assert!((seasonal_temperature(0, 14) - 20.0).abs() < 1e-9);
    }
}
