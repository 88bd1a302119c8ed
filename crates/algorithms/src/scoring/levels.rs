//! Ordinal levels and statuses shared across scorers

use serde::Serialize;

/// Map code of a three-level classification.
///
/// Code 1 is the worst level and renders red, 2 renders yellow and 3
/// (the best level) renders green. Code 0 is reserved for "no value".
pub trait LevelCode: Copy {
    fn code(self) -> u8;
}

/// Per-pixel / per-index vegetation health level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HealthLevel {
    Unhealthy,
    Stressed,
    Healthy,
}

impl HealthLevel {
    pub const ALL: [HealthLevel; 3] = [Self::Unhealthy, Self::Stressed, Self::Healthy];

    /// Level from a three-band threshold level (0, 1, 2)
    pub fn from_level(level: usize) -> Self {
        match level {
            0 => Self::Unhealthy,
            1 => Self::Stressed,
            _ => Self::Healthy,
        }
    }

    /// Inverse of [`LevelCode::code`]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Unhealthy),
            2 => Some(Self::Stressed),
            3 => Some(Self::Healthy),
            _ => None,
        }
    }

    /// Scalar health score of the level
    pub fn score(self) -> f64 {
        match self {
            Self::Unhealthy => 0.2,
            Self::Stressed => 0.6,
            Self::Healthy => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unhealthy => "Unhealthy",
            Self::Stressed => "Stressed",
            Self::Healthy => "Healthy",
        }
    }
}

impl LevelCode for HealthLevel {
    fn code(self) -> u8 {
        match self {
            Self::Unhealthy => 1,
            Self::Stressed => 2,
            Self::Healthy => 3,
        }
    }
}

/// Five-step status of a health score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HealthStatus {
    Critical,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl HealthStatus {
    /// Bucket a score at 0.8 / 0.6 / 0.4 / 0.2 (lower bound inclusive)
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Self::Excellent
        } else if score >= 0.6 {
            Self::Good
        } else if score >= 0.4 {
            Self::Fair
        } else if score >= 0.2 {
            Self::Poor
        } else {
            Self::Critical
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }
}

/// Three-step risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [Self::Low, Self::Medium, Self::High];

    /// Level of a risk score: High at >= 0.8, Medium at >= 0.6, else Low
    pub fn from_score(score: f64) -> Self {
        Self::from_score_with(score, 0.6, 0.8)
    }

    /// Level of a risk score with explicit medium/high cut points
    pub fn from_score_with(score: f64, medium: f64, high: f64) -> Self {
        if score >= high {
            Self::High
        } else if score >= medium {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Scalar stress/risk weight of the level
    pub fn score(self) -> f64 {
        match self {
            Self::Low => 0.2,
            Self::Medium => 0.6,
            Self::High => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl LevelCode for RiskLevel {
    fn code(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_buckets() {
        assert_eq!(HealthStatus::from_score(0.8), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(0.79), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(0.4), HealthStatus::Fair);
        assert_eq!(HealthStatus::from_score(0.2), HealthStatus::Poor);
        assert_eq!(HealthStatus::from_score(0.0), HealthStatus::Critical);
    }

    #[test]
    fn test_risk_level_buckets() {
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.6), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.59), RiskLevel::Low);
    }

    #[test]
    fn test_codes_put_worst_first() {
        assert_eq!(HealthLevel::Unhealthy.code(), 1);
        assert_eq!(HealthLevel::Healthy.code(), 3);
        assert_eq!(RiskLevel::High.code(), 1);
        assert_eq!(RiskLevel::Low.code(), 3);
        for level in HealthLevel::ALL {
            assert_eq!(HealthLevel::from_code(level.code()), Some(level));
        }
        assert_eq!(HealthLevel::from_code(0), None);
    }
}
