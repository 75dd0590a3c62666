//! Core entity types for gymlog.
//!
//! This module defines the records held by the store:
//! - Users and the exercise catalog
//! - Workout templates and sessions (with their exercise blobs)
//! - Exercise logs
//! - AI coaching suggestions
//! - Derived progress statistics
//!
//! Each stored entity has a `New*` insert payload (everything the client may
//! supply) and, where partial update is supported, a `*Patch`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Users
// ============================================================================

/// A registered user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
}

/// Insert payload for a user
#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

// ============================================================================
// Exercise Catalog
// ============================================================================

/// A catalog exercise (e.g., "Bench Press")
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub category: String,
    pub difficulty: String,
    pub equipment: String,
    pub instructions: Option<String>,
    pub target_muscles: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a catalog exercise
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewExercise {
    pub name: String,
    pub category: String,
    pub difficulty: String,
    pub equipment: String,
    pub instructions: Option<String>,
    pub target_muscles: Option<Vec<String>>,
}

// ============================================================================
// Templates and Sessions
// ============================================================================

/// One planned or performed exercise inside a template or session.
///
/// `exercise_id` is not checked against the catalog.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutExercise {
    pub exercise_id: String,
    pub sets: i32,
    pub reps: i32,
    #[serde(default)]
    pub weight: f64,
}

/// A reusable workout plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplate {
    pub id: String,
    pub user_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub exercises: Vec<WorkoutExercise>,
    /// Minutes
    pub estimated_duration: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a workout template
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkoutTemplate {
    pub user_id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub exercises: Vec<WorkoutExercise>,
    pub estimated_duration: Option<i32>,
}

/// Partial update for a workout template.
///
/// Absent fields are left alone; nullable fields sent as `null` are cleared.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutTemplatePatch {
    #[serde(default, deserialize_with = "nullable")]
    pub user_id: Option<Option<String>>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub exercises: Option<Vec<WorkoutExercise>>,
    #[serde(default, deserialize_with = "nullable")]
    pub estimated_duration: Option<Option<i32>>,
}

/// A performed (or in-progress) workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: String,
    pub user_id: Option<String>,
    pub template_id: Option<String>,
    pub name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub exercises: Vec<WorkoutExercise>,
    pub notes: Option<String>,
    /// Decimal text, e.g. `"4050"`
    pub total_weight: Option<String>,
    /// Minutes
    pub duration: Option<i32>,
}

/// Insert payload for a workout session; `start_time` is always server-assigned
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkoutSession {
    pub user_id: Option<String>,
    pub template_id: Option<String>,
    pub name: String,
    pub end_time: Option<DateTime<Utc>>,
    pub exercises: Vec<WorkoutExercise>,
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "decimal_text")]
    pub total_weight: Option<String>,
    pub duration: Option<i32>,
}

/// Partial update for a workout session
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSessionPatch {
    #[serde(default, deserialize_with = "nullable")]
    pub user_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub template_id: Option<Option<String>>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub end_time: Option<Option<DateTime<Utc>>>,
    pub exercises: Option<Vec<WorkoutExercise>>,
    #[serde(default, deserialize_with = "nullable")]
    pub notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_decimal_text")]
    pub total_weight: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub duration: Option<Option<i32>>,
}

// ============================================================================
// Exercise Logs
// ============================================================================

/// A single logged exercise entry
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseLog {
    pub id: String,
    pub user_id: Option<String>,
    pub exercise_id: Option<String>,
    pub session_id: Option<String>,
    pub sets: i32,
    pub reps: i32,
    /// Decimal text, e.g. `"135"`
    pub weight: Option<String>,
    pub notes: Option<String>,
    pub logged_at: DateTime<Utc>,
}

impl ExerciseLog {
    /// Weight × sets × reps, with a missing or non-numeric weight counting as 0
    pub fn volume(&self) -> f64 {
        decimal_value(self.weight.as_deref()) * f64::from(self.sets) * f64::from(self.reps)
    }
}

/// Insert payload for an exercise log; `logged_at` is always server-assigned
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewExerciseLog {
    pub user_id: Option<String>,
    pub exercise_id: Option<String>,
    pub session_id: Option<String>,
    pub sets: i32,
    pub reps: i32,
    #[serde(default, deserialize_with = "decimal_text")]
    pub weight: Option<String>,
    pub notes: Option<String>,
}

// ============================================================================
// AI Suggestions
// ============================================================================

/// Kind of coaching suggestion
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Tip,
    Recommendation,
    FormAdvice,
}

/// A persisted coaching suggestion
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSuggestion {
    pub id: String,
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: String,
    pub content: String,
    /// 0 = unread, 1 = read
    pub is_read: u8,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a coaching suggestion
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAiSuggestion {
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub kind: SuggestionKind,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub is_read: u8,
}

// ============================================================================
// Statistics
// ============================================================================

/// Workout duration on one calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayProgress {
    pub day: String,
    pub duration: i32,
}

/// Derived progress summary for one user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub weekly_workouts: usize,
    pub total_weight: i64,
    pub streak: u32,
    pub weekly_progress: Vec<DayProgress>,
}

// ============================================================================
// Decimal text helpers
// ============================================================================

/// Parse decimal text, treating absent, non-numeric and non-finite values as 0
pub fn decimal_value(text: Option<&str>) -> f64 {
    text.and_then(|t| t.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

/// Accept a JSON number or string for a decimal column and keep it as text
fn decimal_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<NumberOrText>::deserialize(deserializer)?.map(|v| match v {
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s,
        }),
    )
}

/// Distinguish "field absent" (outer `None`) from "field set to null"
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn nullable_decimal_text<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    decimal_text(deserializer).map(Some)
}
