//! Synthetic Data Generator
//!
//! Produces a table of random engagement metrics with a performance label
//! derived from fixed nested thresholds.

use std::ops::RangeInclusive;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::constants::DEFAULT_GENERATED_ROWS;
use crate::error::PipelineResult;
use super::dataset::{write_students, PerformanceLevel, StudentRecord};
use super::store::{Commit, Table, TableStore};

pub const ATTENDANCE_RANGE: RangeInclusive<u32> = 55..=100;
pub const ASSIGNMENTS_RANGE: RangeInclusive<u32> = 7..=10;
pub const TUTORIALS_RANGE: RangeInclusive<u32> = 1..=5;
pub const VOLUNTEERING_RANGE: RangeInclusive<u32> = 0..=5;
pub const MOOCS_RANGE: RangeInclusive<u32> = 0..=3;
pub const EVENTS_RANGE: RangeInclusive<u32> = 2..=5;

const FIRST_NAMES: &[&str] = &[
    "John", "Jane", "Alex", "Emily", "Michael", "Sarah", "Chris", "Jessica",
    "David", "Sophia", "Daniel", "Olivia", "Matthew", "Emma", "Andrew", "Ava",
    "Joshua", "Isabella", "Ryan", "Mia", "Luke", "Ella", "Benjamin", "Lily",
    "Samuel", "Charlotte", "Jack", "Grace", "Ethan", "Amelia", "Nathan", "Zoe",
    "Aaron", "Madison", "Jacob", "Chloe", "Tyler", "Layla", "Logan", "Hannah",
    "William", "Victoria", "Gabriel", "Samantha", "Elijah", "Nora", "Henry", "Scarlett",
    "Mason", "Abigail", "Sebastian", "Penelope", "Owen", "Avery", "Julian", "Camila",
    "Leo", "Aria", "Adam", "Riley", "Isaac", "Zoey", "Anthony", "Luna", "Thomas", "Sophie",
    "Joseph", "Harper", "Robert", "Mila", "Charles", "Aurora", "James", "Brooklyn",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas",
    "Taylor", "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White",
    "Harris", "Sanchez", "Clark", "Ramirez", "Lewis", "Robinson", "Walker", "Young",
    "Allen", "King", "Wright", "Scott", "Torres", "Nguyen", "Hill", "Flores",
    "Green", "Adams", "Nelson", "Baker", "Hall", "Rivera", "Campbell", "Mitchell",
    "Carter", "Roberts", "Gomez", "Phillips", "Evans", "Turner", "Diaz", "Parker",
    "Cruz", "Edwards", "Collins", "Reyes", "Stewart", "Morris", "Morales", "Murphy",
    "Cook", "Rogers", "Gutierrez", "Ortiz", "Morgan", "Cooper", "Peterson", "Bailey",
    "Reed", "Kelly", "Howard", "Ramos", "Kim", "Cox", "Ward", "Richardson",
];

/// Label a row from its metrics.
///
/// Attendance gates Low; every other metric below its floor caps the row at
/// Medium.
pub fn determine_performance(
    attendance: u32,
    assignments: u32,
    tutorials: u32,
    volunteering: u32,
    moocs: u32,
    events_participation: u32,
) -> PerformanceLevel {
    if attendance < 75 {
        PerformanceLevel::Low
    } else if assignments < 7
        || tutorials < 3
        || volunteering < 2
        || moocs < 1
        || events_participation < 3
    {
        PerformanceLevel::Medium
    } else {
        PerformanceLevel::High
    }
}

/// Synthetic student table generator
pub struct Generator {
    rows: usize,
    rng: StdRng,
}

impl Generator {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible generator
    pub fn with_seed(rows: usize, seed: u64) -> Self {
        Self {
            rows,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self) -> Vec<StudentRecord> {
        (0..self.rows).map(|i| self.next_record(i + 1)).collect()
    }

    fn next_record(&mut self, index: usize) -> StudentRecord {
        let name = self.random_name();
        let attendance = self.rng.gen_range(ATTENDANCE_RANGE);
        let assignments = self.rng.gen_range(ASSIGNMENTS_RANGE);
        let tutorials = self.rng.gen_range(TUTORIALS_RANGE);
        let volunteering = self.rng.gen_range(VOLUNTEERING_RANGE);
        let moocs = self.rng.gen_range(MOOCS_RANGE);
        let events_participation = self.rng.gen_range(EVENTS_RANGE);

        StudentRecord {
            student_id: format!("S{:04}", index),
            name,
            attendance,
            assignments,
            tutorials,
            volunteering,
            moocs,
            events_participation,
            performance_level: determine_performance(
                attendance,
                assignments,
                tutorials,
                volunteering,
                moocs,
                events_participation,
            ),
        }
    }

    fn random_name(&mut self) -> String {
        let first = FIRST_NAMES.choose(&mut self.rng).copied().unwrap_or("Student");
        let last = LAST_NAMES.choose(&mut self.rng).copied().unwrap_or("Unknown");
        format!("{} {}", first, last)
    }
}

/// Overwrite the raw table with generated records
pub fn store_generated(store: &dyn TableStore, records: &[StudentRecord]) -> PipelineResult<()> {
    let data = write_students(records)?;
    store.commit(Commit::new().put(Table::RawStudents, data))?;
    log::info!("Wrote {} synthetic student records", records.len());
    Ok(())
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(DEFAULT_GENERATED_ROWS)
    }
}
