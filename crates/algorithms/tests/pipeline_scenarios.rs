//! End-to-end scenarios over the public scoring API

use cropsight_algorithms::health::{score_health, HealthParams};
use cropsight_algorithms::imagery::{compute_indices, IndexMaps, IndexParams, SpectralIndex};
use cropsight_algorithms::pest::{risk_map, score_pest_risk, PestParams};
use cropsight_algorithms::scoring::{HealthLevel, HealthStatus, RiskLevel};
use cropsight_algorithms::soil::{score_soil, SoilCondition, SoilParameter, SoilParams};
use cropsight_algorithms::{analyze_field, AnalysisConfig};
use cropsight_core::raster::{BandStack, Raster};
use cropsight_core::{Error, SensorSeries};
use ndarray::Array3;

// Blue, Green, Red, NIR, RE1, RE2, RE3, SWIR1
const CANOPY: [f64; 8] = [0.05, 0.08, 0.1, 0.6, 0.25, 0.4, 0.5, 0.2];

fn uniform(spectrum: [f64; 8]) -> (BandStack, IndexMaps) {
    let stack = BandStack::uniform(10, 10, &spectrum).unwrap();
    let maps = compute_indices(&stack, &IndexParams::default()).unwrap();
    (stack, maps)
}

fn sensors(ph: f64) -> SensorSeries {
    SensorSeries {
        soil_moisture: vec![0.3; 6],
        soil_temperature: vec![20.0; 6],
        ph: vec![ph; 6],
        electrical_conductivity: vec![1.0; 6],
        humidity: vec![60.0; 6],
        ..Default::default()
    }
}

/// Raw counts of a field whose vigour falls off from left to right
fn raw_field(rows: usize, cols: usize) -> BandStack {
    let mut data = Array3::zeros((rows, cols, 8));
    for ((r, c, b), v) in data.indexed_iter_mut() {
        let vigor = 1.0 - 0.6 * c as f64 / cols as f64;
        let texture = 0.01 * ((r * 5 + c * 11 + b) % 7) as f64;
        let value = if b == 3 { CANOPY[b] * vigor } else { CANOPY[b] };
        *v = (value + texture + 0.02) * 65535.0;
    }
    BandStack::from_array(data).unwrap()
}

#[test]
fn healthy_canopy_is_all_green() {
    let (_, maps) = uniform(CANOPY);
    let health = score_health(&maps, &HealthParams::default()).unwrap();

    let ndvi = health.index(SpectralIndex::Ndvi).unwrap();
    assert!((ndvi.summary.mean - 0.5 / 0.7).abs() < 1e-9);
    assert!((ndvi.levels.healthy - 100.0).abs() < 1e-9);
    assert!(matches!(
        health.overall.status,
        HealthStatus::Excellent | HealthStatus::Good
    ));
    assert!(health
        .health_map
        .data()
        .iter()
        .all(|&c| c == 3));
}

#[test]
fn dry_canopy_is_water_stressed() {
    // NDWI = (0.1 - 0.5) / 0.6 < -0.1
    let (_, maps) = uniform([0.05, 0.1, 0.1, 0.5, 0.25, 0.35, 0.45, 0.2]);
    let health = score_health(&maps, &HealthParams::default()).unwrap();
    assert!((health.stress.water_stress_percentage - 100.0).abs() < 1e-9);
    assert!(health.stress.overall_stress_percentage >= health.stress.water_stress_percentage - 1e-9);
}

#[test]
fn constant_ndvi_has_no_anomalies() {
    // NDVI = (0.4 - 0.2) / 0.6
    let (_, maps) = uniform([0.05, 0.1, 0.2, 0.4, 0.25, 0.3, 0.35, 0.2]);
    assert!(maps
        .ndvi
        .data()
        .iter()
        .all(|&v| (v - 1.0 / 3.0).abs() < 1e-9));

    let health = score_health(&maps, &HealthParams::default()).unwrap();
    assert_eq!(health.anomalies.statistical.count, 0);
    assert_eq!(health.anomalies.spatial.count, 0);
    assert_eq!(health.anomalies.statistical.percentage, 0.0);
}

#[test]
fn neutral_ph_is_optimal() {
    let (stack, maps) = uniform(CANOPY);
    let soil = score_soil(&maps, &stack, &sensors(6.0), &SoilParams::default()).unwrap();
    let ph = soil.parameter(SoilParameter::Ph).unwrap();
    assert_eq!(ph.condition, Some(SoilCondition::Optimal));
    assert!((ph.score - 1.0).abs() < 1e-12);
    assert!((0.0..=1.0).contains(&soil.quality_index));
}

#[test]
fn saturated_risk_factors_are_high() {
    let zeros = || Raster::filled(5, 5, 0.0);
    let maps = IndexMaps {
        ndvi: zeros(),
        gndvi: zeros(),
        ndre: zeros(),
        savi: zeros(),
        evi: zeros(),
        ndwi: Raster::filled(5, 5, 0.3),
        msr: zeros(),
        ci: zeros(),
    };
    let anomaly = Raster::filled(5, 5, 1.0);
    let visible = Raster::filled(5, 5, 0.0);
    let map = risk_map(&maps, &anomaly, &visible, &PestParams::default()).unwrap();
    assert!((map.mean - 1.0).abs() < 1e-12);
    assert!((map.percentage(RiskLevel::High) - 100.0).abs() < 1e-12);
}

#[test]
fn pest_risk_follows_health() {
    let (stack, maps) = uniform(CANOPY);
    let health = score_health(&maps, &HealthParams::default()).unwrap();
    let pest = score_pest_risk(&maps, &stack, &health, &PestParams::default()).unwrap();
    assert_eq!(pest.vulnerable_area_percentage, 0.0);
    assert!((0.0..=1.0).contains(&pest.overall.score));
    assert_eq!(pest.pests.len(), PestParams::default().pests.len());
}

#[test]
fn analysis_is_repeatable_and_bounded() {
    let raw = raw_field(16, 16);
    let config = AnalysisConfig::default();
    let a = analyze_field(&raw, &sensors(6.5), &config).unwrap();
    let b = analyze_field(&raw, &sensors(6.5), &config).unwrap();

    assert_eq!(a.shape, (16, 16));
    assert_eq!(a.overall.score, b.overall.score);
    assert_eq!(a.health.health_map.data(), b.health.health_map.data());
    assert_eq!(a.pest.risk_map.values.data(), b.pest.risk_map.values.data());
    assert_eq!(a.spectral.corrected.data(), b.spectral.corrected.data());
    for index in SpectralIndex::ALL {
        assert_eq!(
            a.spectral.indices.get(index).data(),
            b.spectral.indices.get(index).data(),
            "{} differs between runs",
            index.name()
        );
    }

    for score in [
        a.overall.score,
        a.health.overall.score,
        a.soil.overall.score,
        a.pest.overall.score,
    ] {
        assert!((0.0..=1.0).contains(&score));
    }
    for level in [HealthLevel::Unhealthy, HealthLevel::Stressed, HealthLevel::Healthy] {
        assert!((0.0..=100.0).contains(&a.health.map_levels.get(level)));
    }
    let total: f64 = RiskLevel::ALL
        .iter()
        .map(|&l| a.pest.risk_map.percentage(l))
        .sum();
    assert!((total - 100.0).abs() < 1e-9);
}

#[test]
fn downsampled_analysis_shrinks_maps() {
    let raw = raw_field(16, 16);
    let config = AnalysisConfig {
        downsample: 4,
        ..Default::default()
    };
    let a = analyze_field(&raw, &sensors(6.5), &config).unwrap();
    assert_eq!(a.shape, (4, 4));
    assert_eq!(a.soil.moisture_map.shape(), (4, 4));
    assert_eq!(a.health.health_map_rgb.len(), 4 * 4 * 3);
}

#[test]
fn default_weights_sum_to_one() {
    let config = AnalysisConfig::default();
    let sums = [
        config.health.weights.iter().sum::<f64>(),
        config.soil.weights.iter().sum::<f64>(),
        config.pest.risk_map.weights.iter().sum::<f64>(),
        config.pest.environment.weights.iter().sum::<f64>(),
        config.pest.overall_weights.iter().sum::<f64>(),
        config.overall_weights.iter().sum::<f64>(),
    ];
    for s in sums {
        assert!((s - 1.0).abs() < 1e-9, "weights sum to {}", s);
    }
}

#[test]
fn too_few_bands_is_rejected() {
    let stack = BandStack::uniform(4, 4, &[0.1, 0.2, 0.3, 0.4]).unwrap();
    let err = analyze_field(&stack, &sensors(6.5), &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        Error::BandCountMismatch {
            expected: 8,
            actual: 4
        }
    ));
}

#[test]
fn assessment_serializes() {
    let raw = raw_field(8, 8);
    let a = analyze_field(&raw, &sensors(6.5), &AnalysisConfig::default()).unwrap();
    let json = serde_json::to_value(&a).unwrap();
    assert!(json["overall"]["score"].is_number());
    assert!(json["health"].get("health_map").is_none());
    assert_eq!(json["indices"].as_array().unwrap().len(), 8);
}

#[test]
fn gap_only_sensor_degrades_soil_score() {
    let raw = raw_field(8, 8);
    let mut readings = sensors(7.5);
    readings.electrical_conductivity = vec![f64::NAN; 6];
    let a = analyze_field(&raw, &readings, &AnalysisConfig::default()).unwrap();

    assert_eq!(a.soil.missing, vec![SoilParameter::ElectricalConductivity]);
    let ec = a.soil.parameter(SoilParameter::ElectricalConductivity).unwrap();
    assert_eq!(ec.condition, None);
    let ph = a.soil.parameter(SoilParameter::Ph).unwrap();
    assert_eq!(ph.condition, Some(SoilCondition::Optimal));
    assert!((0.0..=1.0).contains(&a.overall.score));
}
