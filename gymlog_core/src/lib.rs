#![forbid(unsafe_code)]

//! Core domain model and business logic for gymlog.
//!
//! This crate provides:
//! - Entity types (users, exercises, templates, sessions, logs, suggestions)
//! - The in-memory entity store and its seed catalog
//! - Progress statistics
//! - Coaching advice generation with static fallback
//! - The HTTP/JSON API over the store

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod store;
pub mod stats;
pub mod advice;
pub mod coach;
pub mod api;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{seed_exercises, validate_seed_exercises, DEMO_USER_ID};
pub use config::Config;
pub use store::{ExerciseFilter, MemStore, SharedStore};
pub use advice::{AdviceGenerator, FallbackAdvisor, OpenAiAdvisor, StaticAdvisor};
pub use coach::{exercise_advice, generate_suggestions};
