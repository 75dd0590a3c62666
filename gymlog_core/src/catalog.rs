//! Built-in seed data: the demo user and the default exercise catalog.
//!
//! The store loads this once at construction. The sample session and logs
//! that reference the catalog are inserted by `MemStore::new`.

use crate::types::{NewExercise, NewUser};
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Identifier of the seeded demo user; all API requests are scoped to it by default
pub const DEMO_USER_ID: &str = "demo-user";

/// Cached default catalog - built once and reused across store constructions
static SEED_EXERCISES: Lazy<Vec<NewExercise>> = Lazy::new(build_seed_exercises);

/// The demo account inserted under [`DEMO_USER_ID`]
pub fn demo_user() -> NewUser {
    NewUser {
        username: "demo".into(),
        password: "demo123".into(),
    }
}

/// Get a reference to the cached default exercise catalog
pub fn seed_exercises() -> &'static [NewExercise] {
    &SEED_EXERCISES
}

fn exercise(
    name: &str,
    category: &str,
    difficulty: &str,
    equipment: &str,
    instructions: &str,
    target_muscles: &[&str],
) -> NewExercise {
    NewExercise {
        name: name.into(),
        category: category.into(),
        difficulty: difficulty.into(),
        equipment: equipment.into(),
        instructions: Some(instructions.into()),
        target_muscles: Some(target_muscles.iter().map(|m| m.to_string()).collect()),
    }
}

fn build_seed_exercises() -> Vec<NewExercise> {
    vec![
        exercise(
            "Bench Press",
            "Chest",
            "Intermediate",
            "Barbell",
            "Lie on bench, lower bar to chest, press up",
            &["chest", "triceps", "shoulders"],
        ),
        exercise(
            "Deadlift",
            "Back",
            "Advanced",
            "Barbell",
            "Hip hinge movement, lift bar from ground",
            &["hamstrings", "glutes", "back"],
        ),
        exercise(
            "Squats",
            "Legs",
            "Intermediate",
            "Barbell",
            "Lower hips down and back, then stand up",
            &["quadriceps", "glutes", "hamstrings"],
        ),
        exercise(
            "Pull-ups",
            "Back",
            "Intermediate",
            "Bodyweight",
            "Hang from bar, pull body up",
            &["lats", "biceps", "rear delts"],
        ),
        exercise(
            "Shoulder Press",
            "Shoulders",
            "Beginner",
            "Dumbbells",
            "Press weights overhead from shoulder height",
            &["shoulders", "triceps"],
        ),
        exercise(
            "Planks",
            "Core",
            "Beginner",
            "Bodyweight",
            "Hold body in straight line on elbows",
            &["abs", "core"],
        ),
        exercise(
            "Push-ups",
            "Chest",
            "Beginner",
            "Bodyweight",
            "Lower body to ground, push back up",
            &["chest", "triceps", "shoulders"],
        ),
        exercise(
            "Bicep Curls",
            "Arms",
            "Beginner",
            "Dumbbells",
            "Curl weights to shoulders",
            &["biceps"],
        ),
    ]
}

/// Validate a catalog for completeness
///
/// Returns a list of validation errors, or empty Vec if valid.
pub fn validate_seed_exercises(exercises: &[NewExercise]) -> Vec<String> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for ex in exercises {
        if ex.name.trim().is_empty() {
            errors.push("Exercise has empty name".to_string());
            continue;
        }
        if !seen.insert(ex.name.to_lowercase()) {
            errors.push(format!("Duplicate exercise name '{}'", ex.name));
        }
        for (field, value) in [
            ("category", &ex.category),
            ("difficulty", &ex.difficulty),
            ("equipment", &ex.equipment),
        ] {
            if value.trim().is_empty() {
                errors.push(format!("Exercise '{}' has empty {}", ex.name, field));
            }
        }
        if let Some(muscles) = &ex.target_muscles {
            if muscles.iter().any(|m| m.trim().is_empty()) {
                errors.push(format!("Exercise '{}' has an empty target muscle", ex.name));
            }
        }
    }

    errors
}
