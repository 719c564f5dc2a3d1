//! Store keys read or written by the engine.
//!
//! Completion keys are generated by `codex_core::CompletionKey`.

/// Serialized activity log array.
pub const ACTIVITY_LOG_KEY: &str = "codex_activity_log";

/// Quiz attempts, written by the quiz feature.
pub const QUIZ_RESULTS_KEY: &str = "codex_quiz_results";

/// Notes, written by the note editor.
pub const NOTES_KEY: &str = "codex_notes";

/// Learning resources, written by the resource tracker.
pub const RESOURCES_KEY: &str = "codex_resources";

/// Projects, written by the project tracker.
pub const PROJECTS_KEY: &str = "codex_projects";
