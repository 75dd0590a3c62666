//! Coaching advice generation.
//!
//! The advice backend is an external service reached through the
//! [`AdviceGenerator`] capability. Callers never talk to a backend directly:
//! they go through [`FallbackAdvisor`], which masks every backend failure
//! with fixed fallback text so that advice requests cannot fail.

mod openai;

pub use openai::OpenAiAdvisor;

use crate::config::AdviceConfig;
use crate::types::{ExerciseLog, UserStats, WorkoutSession};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// System prompt for workout suggestions
pub const COACH_SYSTEM_PROMPT: &str = "You are a professional fitness coach providing personalized workout advice. Be encouraging, specific, and focus on progressive improvement and proper form.";

/// System prompt for single-exercise advice
pub const TRAINER_SYSTEM_PROMPT: &str = "You are a certified personal trainer providing specific exercise form corrections and progression advice.";

/// Advice returned when the backend cannot provide any
pub const FALLBACK_EXERCISE_ADVICE: &str = "Focus on proper form and controlled movements.";

/// Tips, recommendations and form advice for one user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutAnalysis {
    pub tips: Vec<String>,
    pub recommendations: Vec<String>,
    pub form_advice: Vec<String>,
}

impl WorkoutAnalysis {
    /// The fixed fallback triple
    pub fn fallback() -> Self {
        Self {
            tips: fallback_tips(),
            recommendations: fallback_recommendations(),
            form_advice: fallback_form_advice(),
        }
    }
}

pub(crate) fn fallback_tips() -> Vec<String> {
    vec![
        "Stay consistent with your workouts!".into(),
        "Focus on progressive overload.".into(),
        "Don't forget to rest and recover.".into(),
    ]
}

pub(crate) fn fallback_recommendations() -> Vec<String> {
    vec![
        "Try adding more compound movements.".into(),
        "Consider increasing workout frequency.".into(),
        "Focus on proper form over heavy weight.".into(),
    ]
}

pub(crate) fn fallback_form_advice() -> Vec<String> {
    vec![
        "Keep your core engaged during lifts.".into(),
        "Control the weight on both up and down movements.".into(),
        "Breathe properly - exhale on exertion.".into(),
    ]
}

/// An external source of coaching advice
#[async_trait]
pub trait AdviceGenerator: Send + Sync {
    /// Analyze stats and recent sessions into tips, recommendations and form advice
    async fn workout_suggestions(
        &self,
        stats: &UserStats,
        recent_sessions: &[WorkoutSession],
    ) -> Result<WorkoutAnalysis>;

    /// One or two sentences of advice for a single exercise
    async fn exercise_advice(
        &self,
        exercise_name: &str,
        performance: &[ExerciseLog],
    ) -> Result<String>;
}

/// Generator that always answers with the fallback text
///
/// Used when no API key is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticAdvisor;

#[async_trait]
impl AdviceGenerator for StaticAdvisor {
    async fn workout_suggestions(
        &self,
        _stats: &UserStats,
        _recent_sessions: &[WorkoutSession],
    ) -> Result<WorkoutAnalysis> {
        Ok(WorkoutAnalysis::fallback())
    }

    async fn exercise_advice(
        &self,
        _exercise_name: &str,
        _performance: &[ExerciseLog],
    ) -> Result<String> {
        Ok(FALLBACK_EXERCISE_ADVICE.to_string())
    }
}

/// Wraps a generator and substitutes fallback text for any failure
pub struct FallbackAdvisor {
    inner: Box<dyn AdviceGenerator>,
}

impl FallbackAdvisor {
    pub fn new(inner: impl AdviceGenerator + 'static) -> Self {
        Self {
            inner: Box::new(inner),
        }
    }

    /// OpenAI-compatible backend if an API key is available, static otherwise
    pub fn from_config(config: &AdviceConfig) -> Result<Self> {
        match config.api_key() {
            Some(api_key) => {
                tracing::info!(
                    "Using advice backend {} (model {})",
                    config.base_url,
                    config.model
                );
                Ok(Self::new(OpenAiAdvisor::new(config, api_key)?))
            }
            None => {
                tracing::info!(
                    "{} not set, serving static coaching advice",
                    config.api_key_env
                );
                Ok(Self::new(StaticAdvisor))
            }
        }
    }

    pub async fn workout_suggestions(
        &self,
        stats: &UserStats,
        recent_sessions: &[WorkoutSession],
    ) -> WorkoutAnalysis {
        match self.inner.workout_suggestions(stats, recent_sessions).await {
            Ok(analysis) => analysis,
            Err(e) => {
                tracing::warn!("Advice backend failed: {}. Using fallback suggestions.", e);
                WorkoutAnalysis::fallback()
            }
        }
    }

    pub async fn exercise_advice(&self, exercise_name: &str, performance: &[ExerciseLog]) -> String {
        match self.inner.exercise_advice(exercise_name, performance).await {
            Ok(advice) => advice,
            Err(e) => {
                tracing::warn!(
                    "Advice backend failed for {}: {}. Using fallback advice.",
                    exercise_name,
                    e
                );
                FALLBACK_EXERCISE_ADVICE.to_string()
            }
        }
    }
}

/// User prompt for workout suggestions
pub fn suggestions_prompt(stats: &UserStats, recent_sessions: &[WorkoutSession]) -> String {
    let workouts: Vec<String> = recent_sessions
        .iter()
        .map(|w| {
            let duration = w
                .duration
                .filter(|d| *d != 0)
                .map_or_else(|| "Unknown".to_string(), |d| d.to_string());
            format!(
                "- {}: {} minutes, {} exercises",
                w.name,
                duration,
                w.exercises.len()
            )
        })
        .collect();

    format!(
        r#"Analyze this fitness data and provide personalized workout suggestions:

User Stats:
- Weekly workouts: {weekly}
- Total weight lifted: {total} lbs
- Current streak: {streak} days

Recent Workouts:
{workouts}

Please provide:
1. Daily fitness tips (2-3 tips)
2. Workout recommendations based on their patterns (2-3 recommendations)
3. Form and technique advice (2-3 pieces of advice)

Respond with JSON in this format:
{{
  "tips": ["tip1", "tip2", "tip3"],
  "recommendations": ["rec1", "rec2", "rec3"],
  "formAdvice": ["advice1", "advice2", "advice3"]
}}"#,
        weekly = stats.weekly_workouts,
        total = stats.total_weight,
        streak = stats.streak,
        workouts = workouts.join("\n"),
    )
}

/// User prompt for single-exercise advice
pub fn exercise_advice_prompt(exercise_name: &str, performance: &[ExerciseLog]) -> Result<String> {
    let performance = serde_json::to_string(performance)?;
    Ok(format!(
        "Provide specific form and technique advice for the exercise \"{}\" based on this performance data:\n\nRecent performance: {}\n\nGive 1-2 sentences of actionable advice to improve form, technique, or progression. Be specific and encouraging.",
        exercise_name, performance
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DayProgress, WorkoutExercise};
    use crate::Error;
    use chrono::Utc;

    struct FailingAdvisor;

    #[async_trait]
    impl AdviceGenerator for FailingAdvisor {
        async fn workout_suggestions(
            &self,
            _stats: &UserStats,
            _recent_sessions: &[WorkoutSession],
        ) -> Result<WorkoutAnalysis> {
            Err(Error::Advice("backend unavailable".into()))
        }

        async fn exercise_advice(
            &self,
            _exercise_name: &str,
            _performance: &[ExerciseLog],
        ) -> Result<String> {
            Err(Error::Advice("backend unavailable".into()))
        }
    }

    struct CannedAdvisor;

    #[async_trait]
    impl AdviceGenerator for CannedAdvisor {
        async fn workout_suggestions(
            &self,
            _stats: &UserStats,
            _recent_sessions: &[WorkoutSession],
        ) -> Result<WorkoutAnalysis> {
            Ok(WorkoutAnalysis {
                tips: vec!["Sleep more".into()],
                recommendations: vec![],
                form_advice: vec![],
            })
        }

        async fn exercise_advice(
            &self,
            exercise_name: &str,
            _performance: &[ExerciseLog],
        ) -> Result<String> {
            Ok(format!("Brace before every {} rep.", exercise_name))
        }
    }

    fn stats() -> UserStats {
        UserStats {
            weekly_workouts: 3,
            total_weight: 10710,
            streak: 2,
            weekly_progress: vec![DayProgress {
                day: "Mon".into(),
                duration: 60,
            }],
        }
    }

    fn session(name: &str, duration: Option<i32>, exercises: usize) -> WorkoutSession {
        WorkoutSession {
            id: "s".into(),
            user_id: None,
            template_id: None,
            name: name.into(),
            start_time: Utc::now(),
            end_time: None,
            exercises: (0..exercises)
                .map(|i| WorkoutExercise {
                    exercise_id: i.to_string(),
                    sets: 3,
                    reps: 10,
                    weight: 0.0,
                })
                .collect(),
            notes: None,
            total_weight: None,
            duration,
        }
    }

    #[tokio::test]
    async fn test_fallback_masks_failure() {
        let advisor = FallbackAdvisor::new(FailingAdvisor);

        let analysis = advisor.workout_suggestions(&stats(), &[]).await;
        assert_eq!(analysis, WorkoutAnalysis::fallback());

        let advice = advisor.exercise_advice("Deadlift", &[]).await;
        assert_eq!(advice, FALLBACK_EXERCISE_ADVICE);
    }

    #[tokio::test]
    async fn test_fallback_passes_through_success() {
        let advisor = FallbackAdvisor::new(CannedAdvisor);

        let analysis = advisor.workout_suggestions(&stats(), &[]).await;
        assert_eq!(analysis.tips, vec!["Sleep more".to_string()]);

        let advice = advisor.exercise_advice("Squats", &[]).await;
        assert_eq!(advice, "Brace before every Squats rep.");
    }

    #[tokio::test]
    async fn test_static_advisor_returns_fallback() {
        let analysis = StaticAdvisor.workout_suggestions(&stats(), &[]).await.unwrap();
        assert_eq!(analysis.tips.len(), 3);
        assert_eq!(analysis.recommendations.len(), 3);
        assert_eq!(analysis.form_advice.len(), 3);
    }

    #[test]
    fn test_from_config_without_key_is_static() {
        let config = AdviceConfig {
            api_key_env: "GYMLOG_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..AdviceConfig::default()
        };
        assert!(FallbackAdvisor::from_config(&config).is_ok());
    }

    #[test]
    fn test_suggestions_prompt_lists_workouts() {
        let recent = vec![
            session("Morning Workout", Some(60), 2),
            session("Quick Run", None, 0),
        ];
        let prompt = suggestions_prompt(&stats(), &recent);

        assert!(prompt.contains("- Weekly workouts: 3"));
        assert!(prompt.contains("- Total weight lifted: 10710 lbs"));
        assert!(prompt.contains("- Current streak: 2 days"));
        assert!(prompt.contains("- Morning Workout: 60 minutes, 2 exercises"));
        assert!(prompt.contains("- Quick Run: Unknown minutes, 0 exercises"));
        assert!(prompt.contains("\"formAdvice\""));
    }

    #[test]
    fn test_exercise_prompt_embeds_performance() {
        let prompt = exercise_advice_prompt("Bench Press", &[]).unwrap();
        assert!(prompt.contains("\"Bench Press\""));
        assert!(prompt.contains("Recent performance: []"));
    }
}
