//! Synthetic population generator for the registrar and aid data files.

use finaid_core::error::RecordError;
use finaid_core::record::StudentProfile;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::financial_aid::{Determination, FinancialAidSystem};

pub const FIELDS_OF_STUDY: &[&str] = &[
    "Computer Science",
    "Engineering",
    "Mathematics",
    "IT",
    "Statistics",
    "Psychology",
    "Sociology",
    "Social Work",
    "Anthropology",
    "Paralegal",
    "Law",
    "Business",
    "English",
    "History",
    "Philosophy",
    "Art",
    "Music",
];

const FIRST_NAMES: &[&str] = &["Alice", "Bob", "Charlie", "Diana", "Evan", "Fiona", "George"];
const LAST_NAMES: &[&str] = &["Smith", "Johnson", "Williams", "Brown", "Jones", "Miller", "Davis"];
const YEARS: &[&str] = &["Freshman", "Sophomore", "Junior", "Senior"];

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

fn degree_for(major: &str) -> &'static str {
    match major {
        "Computer Science" | "Engineering" | "Mathematics" | "IT" | "Statistics" => {
            "Bachelor of Science"
        }
        "Paralegal" | "Law" => "Legal Studies",
        _ => "Bachelor of Arts",
    }
}

/// Generate one random student profile.
pub fn generate_student<R: Rng + ?Sized>(rng: &mut R) -> StudentProfile {
    let major = pick(rng, FIELDS_OF_STUDY);
    let gpa = (rng.random_range(2.0..=4.0_f64) * 100.0).round() / 100.0;

    StudentProfile {
        student_id: format!("S{:05X}", rng.random_range(0..0x10_0000u32)),
        name: format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES)),
        major: major.to_string(),
        program: degree_for(major).to_string(),
        gpa,
        year: pick(rng, YEARS).to_string(),
        courses: vec![
            format!("Introduction to {major}"),
            format!("{major} Theory"),
            format!("{major} Seminar"),
        ],
        is_need_based_qualified: rng.random_bool(0.5),
        enrollment_status: if rng.random_bool(0.8) { "Full-time" } else { "Part-time" }.to_string(),
    }
}

/// Generate `count` profiles with unique student IDs.
pub fn generate_students<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<StudentProfile> {
    let mut seen = std::collections::HashSet::new();
    let mut students = Vec::with_capacity(count);
    while students.len() < count {
        let student = generate_student(rng);
        if seen.insert(student.student_id.clone()) {
            students.push(student);
        }
    }
    students
}

/// Determinations matching what the eligibility rules say about each student.
pub fn determinations_for(students: &[StudentProfile]) -> Vec<Determination> {
    students
        .iter()
        .map(|s| {
            let outcome = FinancialAidSystem::determine_eligibility(s.gpa, &s.major);
            Determination {
                id: s.student_id.clone(),
                name: s.name.clone(),
                gpa: s.gpa,
                field_of_study: s.major.clone(),
                financial_aid: outcome.financial_aid,
                requirements: outcome.requirements,
            }
        })
        .collect()
}

/// Paths written by [`write_population`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub students: PathBuf,
    pub determinations: PathBuf,
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), RecordError> {
    let failed = |reason: String| RecordError::WriteFailed {
        path: path.display().to_string(),
        reason,
    };
    let json = serde_json::to_string_pretty(value).map_err(|e| failed(e.to_string()))?;
    std::fs::write(path, json).map_err(|e| failed(e.to_string()))
}

/// Write `students.json` and a matching `determinations.json` into `dir`,
/// creating it if needed.
pub fn write_population(dir: &Path, students: &[StudentProfile]) -> Result<DataFiles, RecordError> {
    std::fs::create_dir_all(dir).map_err(|e| RecordError::WriteFailed {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;

    let files = DataFiles {
        students: dir.join("students.json"),
        determinations: dir.join("determinations.json"),
    };
    write_json(&files.students, students)?;
    write_json(&files.determinations, &determinations_for(students))?;

    info!(dir = %dir.display(), count = students.len(), "Synthetic population written");
    Ok(files)
}
