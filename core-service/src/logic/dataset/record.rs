use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::FEATURE_COUNT;

/// Performance category of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PerformanceLevel {
    Low,
    Medium,
    High,
}

impl PerformanceLevel {
    pub const ALL: [PerformanceLevel; 3] = [
        PerformanceLevel::Low,
        PerformanceLevel::Medium,
        PerformanceLevel::High,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceLevel::Low => "Low",
            PerformanceLevel::Medium => "Medium",
            PerformanceLevel::High => "High",
        }
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerformanceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Low" => Ok(PerformanceLevel::Low),
            "Medium" => Ok(PerformanceLevel::Medium),
            "High" => Ok(PerformanceLevel::High),
            other => Err(format!("unknown performance level '{}'", other)),
        }
    }
}

/// One row of the raw student table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(rename = "StudentID")]
    pub student_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Attendance")]
    pub attendance: u32,
    #[serde(rename = "Assignments")]
    pub assignments: u32,
    #[serde(rename = "Tutorials")]
    pub tutorials: u32,
    #[serde(rename = "Volunteering")]
    pub volunteering: u32,
    #[serde(rename = "MOOCs")]
    pub moocs: u32,
    #[serde(rename = "EventsParticipation")]
    pub events_participation: u32,
    #[serde(rename = "PerformanceLevel")]
    pub performance_level: PerformanceLevel,
}

impl StudentRecord {
    /// Engagement metrics in `FEATURE_COLUMNS` order
    pub fn features(&self) -> [f64; FEATURE_COUNT] {
        [
            self.attendance as f64,
            self.assignments as f64,
            self.tutorials as f64,
            self.volunteering as f64,
            self.moocs as f64,
            self.events_participation as f64,
        ]
    }

    /// Attach a classifier prediction
    pub fn with_prediction(self, predicted: PerformanceLevel) -> PredictedRecord {
        PredictedRecord {
            student_id: self.student_id,
            name: self.name,
            attendance: self.attendance,
            assignments: self.assignments,
            tutorials: self.tutorials,
            volunteering: self.volunteering,
            moocs: self.moocs,
            events_participation: self.events_participation,
            performance_level: self.performance_level,
            predicted_performance: predicted,
        }
    }
}

/// One row of the predictions table.
///
/// Fields are spelled out instead of flattening a `StudentRecord` because the
/// csv deserializer does not support `#[serde(flatten)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedRecord {
    #[serde(rename = "StudentID")]
    pub student_id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Attendance")]
    pub attendance: u32,
    #[serde(rename = "Assignments")]
    pub assignments: u32,
    #[serde(rename = "Tutorials")]
    pub tutorials: u32,
    #[serde(rename = "Volunteering")]
    pub volunteering: u32,
    #[serde(rename = "MOOCs")]
    pub moocs: u32,
    #[serde(rename = "EventsParticipation")]
    pub events_participation: u32,
    #[serde(rename = "PerformanceLevel")]
    pub performance_level: PerformanceLevel,
    #[serde(rename = "Predicted_Performance")]
    pub predicted_performance: PerformanceLevel,
}

impl PredictedRecord {
    pub fn is_at_risk(&self) -> bool {
        self.predicted_performance == PerformanceLevel::Low
    }
}

/// Persisted association rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    /// `, `-joined antecedent tokens
    pub antecedents: String,
    /// `, `-joined consequent tokens
    pub consequents: String,
    pub support: f64,
    pub confidence: f64,
    pub antecedent_support: f64,
    pub consequent_support: f64,
    pub lift: f64,
}

impl RuleRecord {
    /// Copy with metrics rounded to `places` decimals, for display only
    pub fn rounded(&self, places: u32) -> Self {
        Self {
            support: round_to(self.support, places),
            confidence: round_to(self.confidence, places),
            antecedent_support: round_to(self.antecedent_support, places),
            consequent_support: round_to(self.consequent_support, places),
            lift: round_to(self.lift, places),
            ..self.clone()
        }
    }
}

pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places.min(15) as i32);
    (value * factor).round() / factor
}
