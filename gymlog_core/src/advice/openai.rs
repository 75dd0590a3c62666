//! OpenAI-compatible chat-completions backend for coaching advice.

use super::{
    exercise_advice_prompt, fallback_form_advice, fallback_recommendations, fallback_tips,
    suggestions_prompt, AdviceGenerator, WorkoutAnalysis, COACH_SYSTEM_PROMPT,
    FALLBACK_EXERCISE_ADVICE, TRAINER_SYSTEM_PROMPT,
};
use crate::config::AdviceConfig;
use crate::types::{ExerciseLog, UserStats, WorkoutSession};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SUGGESTIONS_MAX_TOKENS: u32 = 800;
const EXERCISE_ADVICE_MAX_TOKENS: u32 = 150;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// Shape the model is asked to answer with; any missing list is filled from the fallback
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisPayload {
    tips: Option<Vec<String>>,
    recommendations: Option<Vec<String>>,
    form_advice: Option<Vec<String>>,
}

fn parse_analysis(content: &str) -> Result<WorkoutAnalysis> {
    let payload: AnalysisPayload = serde_json::from_str(content)?;
    Ok(WorkoutAnalysis {
        tips: payload.tips.unwrap_or_else(fallback_tips),
        recommendations: payload
            .recommendations
            .unwrap_or_else(fallback_recommendations),
        form_advice: payload.form_advice.unwrap_or_else(fallback_form_advice),
    })
}

/// Advice from any OpenAI-compatible `chat/completions` endpoint
pub struct OpenAiAdvisor {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiAdvisor {
    pub fn new(config: &AdviceConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send one system + user exchange and return the first choice's content
    async fn chat(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        json_mode: bool,
    ) -> Result<Option<String>> {
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens,
            response_format: json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Advice(format!(
                "backend returned {}: {}",
                status, body
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Advice("response contained no choices".into()))?;

        tracing::debug!("Advice backend answered with {} bytes", body.len());
        Ok(choice.message.content.filter(|c| !c.is_empty()))
    }
}

#[async_trait]
impl AdviceGenerator for OpenAiAdvisor {
    async fn workout_suggestions(
        &self,
        stats: &UserStats,
        recent_sessions: &[WorkoutSession],
    ) -> Result<WorkoutAnalysis> {
        let prompt = suggestions_prompt(stats, recent_sessions);
        let content = self
            .chat(COACH_SYSTEM_PROMPT, &prompt, SUGGESTIONS_MAX_TOKENS, true)
            .await?;
        parse_analysis(content.as_deref().unwrap_or("{}"))
    }

    async fn exercise_advice(
        &self,
        exercise_name: &str,
        performance: &[ExerciseLog],
    ) -> Result<String> {
        let prompt = exercise_advice_prompt(exercise_name, performance)?;
        let content = self
            .chat(TRAINER_SYSTEM_PROMPT, &prompt, EXERCISE_ADVICE_MAX_TOKENS, false)
            .await?;
        Ok(content.unwrap_or_else(|| FALLBACK_EXERCISE_ADVICE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserStats;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    fn stats() -> UserStats {
        UserStats {
            weekly_workouts: 0,
            total_weight: 0,
            streak: 0,
            weekly_progress: vec![],
        }
    }

    /// Serve `router` on an ephemeral port and return its base URL
    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn advisor(base_url: String) -> OpenAiAdvisor {
        let config = AdviceConfig {
            base_url,
            ..AdviceConfig::default()
        };
        OpenAiAdvisor::new(&config, "test-key".into()).unwrap()
    }

    fn completion(content: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[test]
    fn test_parse_analysis_fills_missing_lists() {
        let analysis = parse_analysis(r#"{"tips": ["Walk daily"]}"#).unwrap();
        assert_eq!(analysis.tips, vec!["Walk daily".to_string()]);
        assert_eq!(analysis.recommendations, fallback_recommendations());
        assert_eq!(analysis.form_advice, fallback_form_advice());
    }

    #[test]
    fn test_parse_analysis_rejects_garbage() {
        assert!(parse_analysis("not json").is_err());
    }

    #[tokio::test]
    async fn test_suggestions_from_backend() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["response_format"]["type"], "json_object");
                assert_eq!(body["messages"][0]["role"], "system");
                Json(completion(
                    r#"{"tips":["a"],"recommendations":["b"],"formAdvice":["c"]}"#,
                ))
            }),
        );
        let advisor = advisor(spawn_backend(router).await);

        let analysis = advisor.workout_suggestions(&stats(), &[]).await.unwrap();
        assert_eq!(analysis.tips, vec!["a".to_string()]);
        assert_eq!(analysis.recommendations, vec!["b".to_string()]);
        assert_eq!(analysis.form_advice, vec!["c".to_string()]);
    }

    #[tokio::test]
    async fn test_exercise_advice_from_backend() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert!(body.get("response_format").is_none());
                Json(completion("Keep the bar over mid-foot."))
            }),
        );
        let advisor = advisor(spawn_backend(router).await);

        let advice = advisor.exercise_advice("Deadlift", &[]).await.unwrap();
        assert_eq!(advice, "Keep the bar over mid-foot.");
    }

    #[tokio::test]
    async fn test_error_status_is_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }),
        );
        let advisor = advisor(spawn_backend(router).await);

        let err = advisor.workout_suggestions(&stats(), &[]).await.unwrap_err();
        assert!(matches!(err, Error::Advice(_)));
    }

    #[tokio::test]
    async fn test_empty_choices_is_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let advisor = advisor(spawn_backend(router).await);

        assert!(advisor.exercise_advice("Squats", &[]).await.is_err());
    }
}
