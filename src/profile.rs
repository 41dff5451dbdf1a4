//! Dog profile - the record the fallback generator and history work from

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl ActivityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityLevel::Low => "low",
            ActivityLevel::Medium => "medium",
            ActivityLevel::High => "high",
        }
    }
}

impl std::str::FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(ActivityLevel::Low),
            "medium" => Ok(ActivityLevel::Medium),
            "high" => Ok(ActivityLevel::High),
            other => Err(format!("unknown activity level: {other}")),
        }
    }
}

/// Dog profile record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DogProfile {
    pub id: Option<i64>,
    pub name: String,
    pub age_months: u32,
    pub sex: String,
    pub breed: String,
    pub weight_kg: f64,
    pub activity_level: ActivityLevel,
    /// Free-form issue tags, e.g. "joint", "heart"
    pub health_issues: Vec<String>,
    /// Health sensitivity ratings per body area (knee, hip, spine, ...)
    pub health_values: BTreeMap<String, i32>,
    /// Performance ratings (endurance, balance, agility, ...)
    pub performance_values: BTreeMap<String, i32>,
    pub equipment: Vec<String>,
    pub preferred_activities: Vec<String>,
}

impl DogProfile {
    pub fn has_health_issue(&self, issue: &str) -> bool {
        self.health_issues.iter().any(|i| i.eq_ignore_ascii_case(issue))
    }

    /// Age split into (years, months) for display
    pub fn age_years_months(&self) -> (u32, u32) {
        (self.age_months / 12, self.age_months % 12)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_health_issue_case_insensitive() {
        let profile = DogProfile {
            health_issues: vec!["Joint".to_string()],
            ..Default::default()
        };
        assert!(profile.has_health_issue("joint"));
        assert!(!profile.has_health_issue("heart"));
    }

    #[test]
    fn test_age_years_months() {
        let profile = DogProfile { age_months: 27, ..Default::default() };
        assert_eq!(profile.age_years_months(), (2, 3));
    }

    #[test]
    fn test_activity_level_from_str() {
        assert_eq!("HIGH".parse::<ActivityLevel>(), Ok(ActivityLevel::High));
        assert!("extreme".parse::<ActivityLevel>().is_err());
    }
}
