//! Central Configuration Constants
//!
//! Single source of truth for table layouts and pipeline defaults.
//! To change a default threshold, only edit this file.

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Student Analytics";

// ============================================
// Table columns
// ============================================

pub const COL_STUDENT_ID: &str = "StudentID";
pub const COL_NAME: &str = "Name";
pub const COL_PERFORMANCE: &str = "PerformanceLevel";
pub const COL_PREDICTED: &str = "Predicted_Performance";

/// Engagement metrics used as classifier features, in matrix column order
pub const FEATURE_COLUMNS: [&str; 6] = [
    "Attendance",
    "Assignments",
    "Tutorials",
    "Volunteering",
    "MOOCs",
    "EventsParticipation",
];

/// Number of classifier features
pub const FEATURE_COUNT: usize = FEATURE_COLUMNS.len();

/// Columns a raw student table must carry
pub const REQUIRED_COLUMNS: [&str; 9] = [
    COL_STUDENT_ID,
    COL_NAME,
    "Attendance",
    "Assignments",
    "Tutorials",
    "Volunteering",
    "MOOCs",
    "EventsParticipation",
    COL_PERFORMANCE,
];

/// Features discretized into `_Low` / `_High` indicators for rule mining
pub const DISCRETIZED_FEATURES: [&str; 2] = ["Assignments", "Tutorials"];

// ============================================
// Table file names
// ============================================

pub const RAW_TABLE_FILE: &str = "student_performance.csv";
pub const PREDICTIONS_TABLE_FILE: &str = "student_performance_with_predictions.csv";
pub const RULES_TABLE_FILE: &str = "performance_association_rules.csv";

/// Default data directory
pub const DEFAULT_DATA_DIR: &str = "data";

// ============================================
// Pipeline defaults
// ============================================

/// Decision tree depth bound (interpretability over accuracy)
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Classifier seed
pub const DEFAULT_RANDOM_SEED: u64 = 42;

/// Minimum itemset support for Apriori
pub const DEFAULT_MIN_SUPPORT: f64 = 0.2;

/// Minimum rule confidence
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.6;

/// Rows produced by the synthetic generator
pub const DEFAULT_GENERATED_ROWS: usize = 1000;

/// Decimal places used when displaying rule metrics
pub const DISPLAY_PRECISION: u32 = 2;
