use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use crate::error::{TimetableError, TimetableResult};
use crate::time_slot::{TimeSlot, normalize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Semester {
    pub number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Semester {
    pub fn new(number: u32) -> Self {
        Self { number, name: None }
    }

    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Semester {}", self.number))
    }
}

/// Static academic calendar: displayed days, canonical slots, semesters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcademicConfig {
    #[serde(default)]
    pub days: Vec<Weekday>,
    #[serde(default, alias = "time_slots")]
    pub time_slots: Vec<String>,
    #[serde(default)]
    pub semesters: Vec<Semester>,
}

impl Default for AcademicConfig {
    fn default() -> Self {
        Self {
            days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ],
            time_slots: (9..17)
                .map(|hour| format!("{:02}:00-{:02}:00", hour, hour + 1))
                .collect(),
            semesters: (1..=8).map(Semester::new).collect(),
        }
    }
}

impl AcademicConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> TimetableResult<Self> {
        let file = File::open(path)?;
        let config: AcademicConfig = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TimetableResult<()> {
        let mut seen = HashSet::with_capacity(self.days.len());
        for day in &self.days {
            if !seen.insert(*day) {
                return Err(TimetableError::InvalidData(format!(
                    "day {day} listed more than once"
                )));
            }
        }
        let mut numbers = HashSet::with_capacity(self.semesters.len());
        for semester in &self.semesters {
            if !numbers.insert(semester.number) {
                return Err(TimetableError::InvalidData(format!(
                    "semester {} listed more than once",
                    semester.number
                )));
            }
        }
        Ok(())
    }

    /// Canonical slots, deduplicated and sorted.
    pub fn canonical_slots(&self) -> Vec<TimeSlot> {
        normalize(&self.time_slots)
    }

    pub fn semester_options(&self) -> Vec<(u32, String)> {
        self.semesters
            .iter()
            .map(|semester| (semester.number, semester.label()))
            .collect()
    }
}
