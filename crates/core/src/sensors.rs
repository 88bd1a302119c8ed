//! Ground-sensor time series

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Periodic readings of the field's ground sensors.
///
/// Every series is optional (empty by default), but all non-empty series
/// must share one length: sample `i` of every series was taken at the
/// same time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorSeries {
    /// Volumetric water content (0-1)
    pub soil_moisture: Vec<f64>,
    /// °C
    pub soil_temperature: Vec<f64>,
    /// °C
    pub air_temperature: Vec<f64>,
    /// Relative humidity (%)
    pub humidity: Vec<f64>,
    pub ph: Vec<f64>,
    /// dS/m
    pub electrical_conductivity: Vec<f64>,
    /// lux
    pub light_intensity: Vec<f64>,
    /// m/s
    pub wind_speed: Vec<f64>,
    /// mm
    pub precipitation: Vec<f64>,
}

impl SensorSeries {
    /// Every series with its name, in declaration order
    pub fn named(&self) -> [(&'static str, &[f64]); 9] {
        [
            ("soil_moisture", self.soil_moisture.as_slice()),
            ("soil_temperature", self.soil_temperature.as_slice()),
            ("air_temperature", self.air_temperature.as_slice()),
            ("humidity", self.humidity.as_slice()),
            ("ph", self.ph.as_slice()),
            ("electrical_conductivity", self.electrical_conductivity.as_slice()),
            ("light_intensity", self.light_intensity.as_slice()),
            ("wind_speed", self.wind_speed.as_slice()),
            ("precipitation", self.precipitation.as_slice()),
        ]
    }

    /// Look a series up by name
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.named()
            .into_iter()
            .find_map(|(n, s)| (n == name).then_some(s))
    }

    /// Common length of the non-empty series (0 when all are empty).
    ///
    /// Fails with `SeriesLengthMismatch` naming the first series whose
    /// length differs from the first non-empty one.
    pub fn validate(&self) -> Result<usize> {
        let mut expected: Option<usize> = None;
        for (name, series) in self.named() {
            if series.is_empty() {
                continue;
            }
            match expected {
                None => expected = Some(series.len()),
                Some(len) if len != series.len() => {
                    return Err(Error::SeriesLengthMismatch {
                        name,
                        expected: len,
                        actual: series.len(),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(expected.unwrap_or(0))
    }

    /// Fail with `EmptySeries` when the named series was not supplied.
    ///
    /// A supplied series may still hold only gaps (NaN); see [`has_readings`].
    ///
    /// [`has_readings`]: SensorSeries::has_readings
    pub fn require(&self, name: &'static str) -> Result<&[f64]> {
        match self.get(name) {
            Some(series) if !series.is_empty() => Ok(series),
            _ => Err(Error::EmptySeries(name)),
        }
    }

    /// Whether the named series holds at least one finite sample
    pub fn has_readings(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|s| s.iter().any(|v| v.is_finite()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_lengths() {
        let s = SensorSeries {
            soil_moisture: vec![0.3, 0.31, 0.29],
            ph: vec![6.5, 6.6, 6.4],
            ..Default::default()
        };
        assert_eq!(s.validate().unwrap(), 3);
    }

    #[test]
    fn test_length_mismatch_names_series() {
        let s = SensorSeries {
            soil_moisture: vec![0.3, 0.31, 0.29],
            ph: vec![6.5, 6.6],
            ..Default::default()
        };
        match s.validate() {
            Err(Error::SeriesLengthMismatch {
                name,
                expected,
                actual,
            }) => {
                assert_eq!(name, "ph");
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_require() {
        let s = SensorSeries {
            ph: vec![f64::NAN, 6.2],
            humidity: vec![f64::NAN],
            ..Default::default()
        };
        assert!(s.require("ph").is_ok());
        // Supplied but all gaps
        assert_eq!(s.require("humidity").unwrap().len(), 1);
        assert!(matches!(s.require("wind_speed"), Err(Error::EmptySeries("wind_speed"))));
    }

    #[test]
    fn test_has_readings() {
        let s = SensorSeries {
            ph: vec![f64::NAN, 6.2],
            humidity: vec![f64::NAN, f64::INFINITY],
            ..Default::default()
        };
        assert!(s.has_readings("ph"));
        assert!(!s.has_readings("humidity"));
        assert!(!s.has_readings("wind_speed"));
        assert!(!s.has_readings("no_such_series"));
    }

    #[test]
    fn test_json_with_missing_fields() {
        let s: SensorSeries = serde_json::from_str(r#"{"ph": [6.0, 6.5]}"#).unwrap();
        assert_eq!(s.ph, vec![6.0, 6.5]);
        assert!(s.soil_moisture.is_empty());
        assert_eq!(s.get("ph"), Some(&[6.0, 6.5][..]));
    }
}
