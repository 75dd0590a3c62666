//! Coaching flows that combine the store with the advice backend.
//!
//! The store lock is never held while waiting on the backend.

use crate::advice::FallbackAdvisor;
use crate::store::SharedStore;
use crate::types::{AiSuggestion, NewAiSuggestion, SuggestionKind};
use crate::Result;

/// Number of recent sessions passed to the advice backend
const RECENT_SESSION_COUNT: usize = 5;

pub const TIP_TITLE: &str = "💡 Today's Tip";
pub const RECOMMENDATION_TITLE: &str = "🎯 Recommendation";

/// Generate and persist fresh suggestions for `user_id`
///
/// Tips are stored before recommendations, in the order the backend gave
/// them. Form advice is not persisted. Backend failures are masked by the
/// advisor, so the only error is a poisoned store lock.
pub async fn generate_suggestions(
    store: &SharedStore,
    advisor: &FallbackAdvisor,
    user_id: &str,
) -> Result<Vec<AiSuggestion>> {
    let (stats, recent) = {
        let store = store.read()?;
        (
            store.user_stats(user_id),
            store.list_workout_sessions(user_id, Some(RECENT_SESSION_COUNT)),
        )
    };

    let analysis = advisor.workout_suggestions(&stats, &recent).await;

    let items = analysis
        .tips
        .into_iter()
        .map(|content| (SuggestionKind::Tip, TIP_TITLE, content))
        .chain(
            analysis
                .recommendations
                .into_iter()
                .map(|content| (SuggestionKind::Recommendation, RECOMMENDATION_TITLE, content)),
        );

    let mut store = store.write()?;
    let created: Vec<AiSuggestion> = items
        .map(|(kind, title, content)| {
            store.create_ai_suggestion(NewAiSuggestion {
                user_id: Some(user_id.to_string()),
                kind,
                title: title.to_string(),
                content,
                is_read: 0,
            })
        })
        .collect();

    tracing::info!("Generated {} suggestions for {}", created.len(), user_id);
    Ok(created)
}

/// Advice for one catalog exercise based on the user's logs for it
///
/// Returns `None` if the exercise does not exist.
pub async fn exercise_advice(
    store: &SharedStore,
    advisor: &FallbackAdvisor,
    user_id: &str,
    exercise_id: &str,
) -> Result<Option<String>> {
    let (exercise, logs) = {
        let store = store.read()?;
        match store.get_exercise(exercise_id) {
            Some(exercise) => (exercise, store.list_exercise_logs(user_id, Some(exercise_id))),
            None => return Ok(None),
        }
    };

    Ok(Some(advisor.exercise_advice(&exercise.name, &logs).await))
}
