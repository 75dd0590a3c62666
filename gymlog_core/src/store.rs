//! In-memory entity store.
//!
//! Holds one keyed collection per entity kind for the lifetime of the
//! process. Every insert assigns a fresh id and server-side timestamp and
//! fills unset optional fields; absence of a record is reported as `None`
//! or `false`, never as an error.

use crate::catalog::{demo_user, seed_exercises, DEMO_USER_ID};
use crate::types::*;
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Category value meaning "no category filter"
pub const ALL_CATEGORIES: &str = "all";

/// Label the web UI sends for the same sentinel
const ALL_CATEGORIES_LABEL: &str = "All Categories";

/// Exercise catalog filter
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ExerciseFilter {
    /// Case-insensitive substring of the name or of any target muscle
    pub search: Option<String>,
    /// Exact category, or [`ALL_CATEGORIES`]
    pub category: Option<String>,
}

impl ExerciseFilter {
    fn matches(&self, exercise: &Exercise) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let in_name = exercise.name.to_lowercase().contains(&needle);
            let in_muscles = exercise
                .target_muscles
                .as_ref()
                .is_some_and(|ms| ms.iter().any(|m| m.to_lowercase().contains(&needle)));
            if !in_name && !in_muscles {
                return false;
            }
        }

        match self.category.as_deref() {
            None | Some("") | Some(ALL_CATEGORIES) | Some(ALL_CATEGORIES_LABEL) => true,
            Some(category) => exercise.category == category,
        }
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Process-lifetime holder of all entity collections
#[derive(Clone, Debug)]
pub struct MemStore {
    users: HashMap<String, User>,
    exercises: HashMap<String, Exercise>,
    workout_templates: HashMap<String, WorkoutTemplate>,
    workout_sessions: HashMap<String, WorkoutSession>,
    exercise_logs: HashMap<String, ExerciseLog>,
    ai_suggestions: HashMap<String, AiSuggestion>,
    /// Insertion sequence of every record id, used to break timestamp ties
    insertion_order: HashMap<String, u64>,
    next_seq: u64,
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemStore {
    /// Create a store loaded with the demo seed data
    pub fn new() -> Self {
        let mut store = Self::empty();
        store.seed();
        store
    }

    /// Create a store with no records at all
    pub fn empty() -> Self {
        Self {
            users: HashMap::new(),
            exercises: HashMap::new(),
            workout_templates: HashMap::new(),
            workout_sessions: HashMap::new(),
            exercise_logs: HashMap::new(),
            ai_suggestions: HashMap::new(),
            insertion_order: HashMap::new(),
            next_seq: 0,
        }
    }

    fn seed(&mut self) {
        let demo = demo_user();
        self.record_insertion(DEMO_USER_ID);
        self.users.insert(
            DEMO_USER_ID.to_string(),
            User {
                id: DEMO_USER_ID.to_string(),
                username: demo.username,
                password: demo.password,
            },
        );

        let exercise_ids: Vec<String> = seed_exercises()
            .iter()
            .map(|ex| self.create_exercise(ex.clone()).id)
            .collect();

        let bench = exercise_ids[0].clone();
        let squat = exercise_ids[2].clone();

        let yesterday = Utc::now() - Duration::days(1);
        let session = self.create_workout_session_at(
            NewWorkoutSession {
                user_id: Some(DEMO_USER_ID.into()),
                template_id: None,
                name: "Morning Workout".into(),
                end_time: Some(yesterday + Duration::hours(1)),
                exercises: vec![
                    WorkoutExercise {
                        exercise_id: bench.clone(),
                        sets: 3,
                        reps: 10,
                        weight: 135.0,
                    },
                    WorkoutExercise {
                        exercise_id: squat.clone(),
                        sets: 3,
                        reps: 12,
                        weight: 185.0,
                    },
                ],
                notes: Some("Good workout, felt strong".into()),
                total_weight: Some("4050".into()),
                duration: Some(60),
            },
            yesterday,
        );

        for (exercise_id, reps, weight) in [(bench, 10, "135"), (squat, 12, "185")] {
            self.create_exercise_log_at(
                NewExerciseLog {
                    user_id: Some(DEMO_USER_ID.into()),
                    exercise_id: Some(exercise_id),
                    session_id: Some(session.id.clone()),
                    sets: 3,
                    reps,
                    weight: Some(weight.into()),
                    notes: None,
                },
                yesterday,
            );
        }

        tracing::info!(
            "Seeded store with {} exercises, {} session, {} logs",
            self.exercises.len(),
            self.workout_sessions.len(),
            self.exercise_logs.len()
        );
    }

    fn record_insertion(&mut self, id: &str) {
        self.insertion_order.insert(id.to_string(), self.next_seq);
        self.next_seq += 1;
    }

    fn seq(&self, id: &str) -> u64 {
        self.insertion_order.get(id).copied().unwrap_or(u64::MAX)
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    pub fn get_user(&self, id: &str) -> Option<User> {
        self.users.get(id).cloned()
    }

    /// First user with this exact username
    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.users
            .values()
            .filter(|u| u.username == username)
            .min_by_key(|u| self.seq(&u.id))
            .cloned()
    }

    /// Insert a user; username uniqueness is not checked here
    pub fn create_user(&mut self, new: NewUser) -> User {
        let user = User {
            id: new_id(),
            username: new.username,
            password: new.password,
        };
        self.record_insertion(&user.id);
        self.users.insert(user.id.clone(), user.clone());
        tracing::debug!("Created user {}", user.id);
        user
    }

    // ------------------------------------------------------------------------
    // Exercises
    // ------------------------------------------------------------------------

    /// Catalog exercises matching the filter, in insertion order
    pub fn list_exercises(&self, filter: &ExerciseFilter) -> Vec<Exercise> {
        let mut exercises: Vec<Exercise> = self
            .exercises
            .values()
            .filter(|ex| filter.matches(ex))
            .cloned()
            .collect();
        exercises.sort_by_key(|r| self.seq(&r.id));
        exercises
    }

    pub fn get_exercise(&self, id: &str) -> Option<Exercise> {
        self.exercises.get(id).cloned()
    }

    pub fn create_exercise(&mut self, new: NewExercise) -> Exercise {
        let exercise = Exercise {
            id: new_id(),
            name: new.name,
            category: new.category,
            difficulty: new.difficulty,
            equipment: new.equipment,
            instructions: new.instructions,
            target_muscles: new.target_muscles,
            created_at: Utc::now(),
        };
        self.record_insertion(&exercise.id);
        self.exercises.insert(exercise.id.clone(), exercise.clone());
        tracing::debug!("Created exercise {} ({})", exercise.id, exercise.name);
        exercise
    }

    // ------------------------------------------------------------------------
    // Workout templates
    // ------------------------------------------------------------------------

    /// Templates owned by `user_id`, in insertion order
    pub fn list_workout_templates(&self, user_id: &str) -> Vec<WorkoutTemplate> {
        let mut templates: Vec<WorkoutTemplate> = self
            .workout_templates
            .values()
            .filter(|t| t.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        templates.sort_by_key(|r| self.seq(&r.id));
        templates
    }

    pub fn get_workout_template(&self, id: &str) -> Option<WorkoutTemplate> {
        self.workout_templates.get(id).cloned()
    }

    pub fn create_workout_template(&mut self, new: NewWorkoutTemplate) -> WorkoutTemplate {
        let template = WorkoutTemplate {
            id: new_id(),
            user_id: new.user_id,
            name: new.name,
            description: new.description,
            exercises: new.exercises,
            estimated_duration: new.estimated_duration,
            created_at: Utc::now(),
        };
        self.record_insertion(&template.id);
        self.workout_templates
            .insert(template.id.clone(), template.clone());
        tracing::debug!("Created workout template {}", template.id);
        template
    }

    /// Merge `patch` into an existing template
    pub fn update_workout_template(
        &mut self,
        id: &str,
        patch: WorkoutTemplatePatch,
    ) -> Option<WorkoutTemplate> {
        let template = self.workout_templates.get_mut(id)?;

        if let Some(user_id) = patch.user_id {
            template.user_id = user_id;
        }
        if let Some(name) = patch.name {
            template.name = name;
        }
        if let Some(description) = patch.description {
            template.description = description;
        }
        if let Some(exercises) = patch.exercises {
            template.exercises = exercises;
        }
        if let Some(estimated_duration) = patch.estimated_duration {
            template.estimated_duration = estimated_duration;
        }

        tracing::debug!("Updated workout template {}", id);
        Some(template.clone())
    }

    /// Remove a template; returns whether it existed
    pub fn delete_workout_template(&mut self, id: &str) -> bool {
        let removed = self.workout_templates.remove(id).is_some();
        if removed {
            self.insertion_order.remove(id);
        }
        tracing::debug!("Delete workout template {}: removed={}", id, removed);
        removed
    }

    // ------------------------------------------------------------------------
    // Workout sessions
    // ------------------------------------------------------------------------

    /// Sessions owned by `user_id`, newest first, truncated to `limit` if given
    ///
    /// Sessions with the same start time keep insertion order. A limit of
    /// zero means no limit.
    pub fn list_workout_sessions(&self, user_id: &str, limit: Option<usize>) -> Vec<WorkoutSession> {
        let mut sessions: Vec<WorkoutSession> = self
            .workout_sessions
            .values()
            .filter(|s| s.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        sessions.sort_by(|a, b| {
            b.start_time
                .cmp(&a.start_time)
                .then_with(|| self.seq(&a.id).cmp(&self.seq(&b.id)))
        });

        if let Some(limit) = limit.filter(|l| *l > 0) {
            sessions.truncate(limit);
        }
        sessions
    }

    pub fn get_workout_session(&self, id: &str) -> Option<WorkoutSession> {
        self.workout_sessions.get(id).cloned()
    }

    pub fn create_workout_session(&mut self, new: NewWorkoutSession) -> WorkoutSession {
        self.create_workout_session_at(new, Utc::now())
    }

    pub(crate) fn create_workout_session_at(
        &mut self,
        new: NewWorkoutSession,
        start_time: DateTime<Utc>,
    ) -> WorkoutSession {
        let session = WorkoutSession {
            id: new_id(),
            user_id: new.user_id,
            template_id: new.template_id,
            name: new.name,
            start_time,
            end_time: new.end_time,
            exercises: new.exercises,
            notes: new.notes,
            total_weight: new.total_weight,
            duration: new.duration,
        };
        self.record_insertion(&session.id);
        self.workout_sessions
            .insert(session.id.clone(), session.clone());
        tracing::debug!("Created workout session {} ({})", session.id, session.name);
        session
    }

    /// Merge `patch` into an existing session
    pub fn update_workout_session(
        &mut self,
        id: &str,
        patch: WorkoutSessionPatch,
    ) -> Option<WorkoutSession> {
        let session = self.workout_sessions.get_mut(id)?;

        if let Some(user_id) = patch.user_id {
            session.user_id = user_id;
        }
        if let Some(template_id) = patch.template_id {
            session.template_id = template_id;
        }
        if let Some(name) = patch.name {
            session.name = name;
        }
        if let Some(end_time) = patch.end_time {
            session.end_time = end_time;
        }
        if let Some(exercises) = patch.exercises {
            session.exercises = exercises;
        }
        if let Some(notes) = patch.notes {
            session.notes = notes;
        }
        if let Some(total_weight) = patch.total_weight {
            session.total_weight = total_weight;
        }
        if let Some(duration) = patch.duration {
            session.duration = duration;
        }

        tracing::debug!("Updated workout session {}", id);
        Some(session.clone())
    }

    // ------------------------------------------------------------------------
    // Exercise logs
    // ------------------------------------------------------------------------

    /// Logs owned by `user_id`, optionally for one exercise, newest first
    pub fn list_exercise_logs(&self, user_id: &str, exercise_id: Option<&str>) -> Vec<ExerciseLog> {
        let exercise_id = exercise_id.filter(|e| !e.is_empty());
        let mut logs: Vec<ExerciseLog> = self
            .exercise_logs
            .values()
            .filter(|l| l.user_id.as_deref() == Some(user_id))
            .filter(|l| exercise_id.map_or(true, |e| l.exercise_id.as_deref() == Some(e)))
            .cloned()
            .collect();
        logs.sort_by(|a, b| {
            b.logged_at
                .cmp(&a.logged_at)
                .then_with(|| self.seq(&a.id).cmp(&self.seq(&b.id)))
        });
        logs
    }

    pub fn get_exercise_log(&self, id: &str) -> Option<ExerciseLog> {
        self.exercise_logs.get(id).cloned()
    }

    pub fn create_exercise_log(&mut self, new: NewExerciseLog) -> ExerciseLog {
        self.create_exercise_log_at(new, Utc::now())
    }

    pub(crate) fn create_exercise_log_at(
        &mut self,
        new: NewExerciseLog,
        logged_at: DateTime<Utc>,
    ) -> ExerciseLog {
        let log = ExerciseLog {
            id: new_id(),
            user_id: new.user_id,
            exercise_id: new.exercise_id,
            session_id: new.session_id,
            sets: new.sets,
            reps: new.reps,
            weight: new.weight,
            notes: new.notes,
            logged_at,
        };
        self.record_insertion(&log.id);
        self.exercise_logs.insert(log.id.clone(), log.clone());
        tracing::debug!("Created exercise log {}", log.id);
        log
    }

    // ------------------------------------------------------------------------
    // AI suggestions
    // ------------------------------------------------------------------------

    /// Suggestions owned by `user_id`, newest first
    pub fn list_ai_suggestions(&self, user_id: &str) -> Vec<AiSuggestion> {
        let mut suggestions: Vec<AiSuggestion> = self
            .ai_suggestions
            .values()
            .filter(|s| s.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect();
        suggestions.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| self.seq(&a.id).cmp(&self.seq(&b.id)))
        });
        suggestions
    }

    pub fn get_ai_suggestion(&self, id: &str) -> Option<AiSuggestion> {
        self.ai_suggestions.get(id).cloned()
    }

    pub fn create_ai_suggestion(&mut self, new: NewAiSuggestion) -> AiSuggestion {
        self.create_ai_suggestion_at(new, Utc::now())
    }

    pub(crate) fn create_ai_suggestion_at(
        &mut self,
        new: NewAiSuggestion,
        created_at: DateTime<Utc>,
    ) -> AiSuggestion {
        let suggestion = AiSuggestion {
            id: new_id(),
            user_id: new.user_id,
            kind: new.kind,
            title: new.title,
            content: new.content,
            is_read: new.is_read,
            created_at,
        };
        self.record_insertion(&suggestion.id);
        self.ai_suggestions
            .insert(suggestion.id.clone(), suggestion.clone());
        tracing::debug!("Created AI suggestion {} ({:?})", suggestion.id, suggestion.kind);
        suggestion
    }

    /// Mark a suggestion read; returns whether it existed
    pub fn mark_ai_suggestion_read(&mut self, id: &str) -> bool {
        match self.ai_suggestions.get_mut(id) {
            Some(suggestion) => {
                suggestion.is_read = 1;
                true
            }
            None => false,
        }
    }
}

/// Store handle shared between request handlers
///
/// Locks are only held for the duration of a single store operation.
#[derive(Clone, Debug)]
pub struct SharedStore(Arc<RwLock<MemStore>>);

impl SharedStore {
    pub fn new(store: MemStore) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, MemStore>> {
        self.0
            .read()
            .map_err(|_| Error::State("store lock poisoned".into()))
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, MemStore>> {
        self.0
            .write()
            .map_err(|_| Error::State("store lock poisoned".into()))
    }
}
