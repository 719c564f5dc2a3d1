//! Study time estimation.
//!
//! The constants are empirical and must stay verbatim.

use codex_core::{NoteRecord, ProjectRecord, QuizResult, ResourceRecord};

/// Minimum hours credited for any note.
pub const NOTE_MIN_HOURS: f64 = 0.15;
/// Words written per hour of note taking.
pub const NOTE_WORDS_PER_HOUR: f64 = 220.0;
/// Minimum hours for a fully completed resource.
pub const RESOURCE_MIN_HOURS: f64 = 0.4;
/// Hours per difficulty point for a resource.
pub const RESOURCE_HOURS_PER_DIFFICULTY: f64 = 0.8;
/// Minimum hours for a fully completed project.
pub const PROJECT_MIN_HOURS: f64 = 1.2;
/// Hours per difficulty point for a project.
pub const PROJECT_HOURS_PER_DIFFICULTY: f64 = 2.2;
/// Hours credited per quiz attempt.
pub const QUIZ_HOURS: f64 = 0.25;

/// Per-source breakdown of estimated hours.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HoursEstimate {
    /// Hours from notes
    pub note_hours: f64,
    /// Hours from resources
    pub resource_hours: f64,
    /// Hours from projects
    pub project_hours: f64,
    /// Hours from quiz attempts
    pub quiz_hours: f64,
    /// Sum of the above, rounded to one decimal place
    pub total: f64,
}

/// Turns auxiliary records into an hours estimate.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoursEstimator;

impl HoursEstimator {
    /// Hours credited for one note.
    pub fn note_hours(&self, note: &NoteRecord) -> f64 {
        let words = note.word_count.unwrap_or(0.0);
        NOTE_MIN_HOURS.max(words / NOTE_WORDS_PER_HOUR)
    }

    /// Hours credited for one resource.
    pub fn resource_hours(&self, resource: &ResourceRecord) -> f64 {
        let progress = resource.progress.unwrap_or(0.0);
        let difficulty = resource.difficulty.unwrap_or(0.0);
        (progress / 100.0) * RESOURCE_MIN_HOURS.max(difficulty * RESOURCE_HOURS_PER_DIFFICULTY)
    }

    /// Hours credited for one project.
    pub fn project_hours(&self, project: &ProjectRecord) -> f64 {
        let progress = project.progress.unwrap_or(0.0);
        let difficulty = project.difficulty.unwrap_or(0.0);
        (progress / 100.0) * PROJECT_MIN_HOURS.max(difficulty * PROJECT_HOURS_PER_DIFFICULTY)
    }

    /// Combine every source. Terms are summed in record order.
    pub fn estimate(
        &self,
        quizzes: &[QuizResult],
        notes: &[NoteRecord],
        resources: &[ResourceRecord],
        projects: &[ProjectRecord],
    ) -> HoursEstimate {
        let note_hours = notes.iter().fold(0.0, |acc, n| acc + self.note_hours(n));
        let resource_hours = resources
            .iter()
            .fold(0.0, |acc, r| acc + self.resource_hours(r));
        let project_hours = projects
            .iter()
            .fold(0.0, |acc, p| acc + self.project_hours(p));
        let quiz_hours = quizzes.len() as f64 * QUIZ_HOURS;

        let sum = note_hours + resource_hours + project_hours + quiz_hours;
        HoursEstimate {
            note_hours,
            resource_hours,
            project_hours,
            quiz_hours,
            total: (sum * 10.0).round() / 10.0,
        }
    }
}
