//! Quiz generation for the activity ledger.
//!
//! Asks an OpenAI-compatible chat-completions endpoint (`OpenRouter` by
//! default) for multiple-choice questions on a sustainability topic. The
//! model's reply is either parsed into a [`Quiz`] or handed back as raw text.

use std::fmt;
use std::time::Duration;

use eco_core::{Quiz, QuizQuestion};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// Longest slice of an error body echoed back in [`QuizError::Api`].
const ERROR_BODY_PREVIEW: usize = 100;
const QUESTION_COUNT: usize = 3;

pub const DEFAULT_API_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "x-ai/grok-4.1-fast:free";
pub const DEFAULT_TOPIC: &str = "carbon footprint";

/// Quiz client errors.
#[derive(Debug, Error)]
pub enum QuizError {
    /// The provided API key was invalid.
    #[error("invalid API key: {reason}")]
    InvalidApiKey { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed before a response arrived.
    #[error("network or request setup error: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("quiz API call failed (status {status}): {preview}")]
    Api { status: u16, preview: String },
    /// The response envelope was malformed or had no message content.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// What the generator returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizResponse {
    /// Questions parsed from the model's JSON.
    Parsed(Quiz),
    /// The model replied, but not with parseable quiz JSON.
    Raw(String),
}

/// Chat-completions client for quiz generation.
///
/// # Thread Safety
///
/// The client is safe to clone and share across threads. Each clone shares
/// the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    api_key: String,
    api_url: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or whitespace-only, or if
    /// the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>, api_url: impl Into<String>) -> Result<Self, QuizError> {
        let api_key = api_key.into();

        if api_key.is_empty() {
            return Err(QuizError::InvalidApiKey {
                reason: "API key cannot be empty",
            });
        }
        if api_key.trim().is_empty() {
            return Err(QuizError::InvalidApiKey {
                reason: "API key cannot be whitespace-only",
            });
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(QuizError::ClientBuild)?;

        Ok(Self {
            http,
            api_key,
            api_url: api_url.into(),
        })
    }

    /// Generates a quiz about `topic`.
    pub async fn generate_quiz(&self, model: &str, topic: &str) -> Result<QuizResponse, QuizError> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![Message {
                role: "user",
                content: build_quiz_prompt(topic),
            }],
        };

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(QuizError::Api {
                status: status.as_u16(),
                preview: preview(&body),
            });
        }

        let payload: ChatResponse = serde_json::from_str(&body)
            .map_err(|err| QuizError::InvalidResponse(err.to_string()))?;
        let content = extract_content(payload)?;

        Ok(match extract_quiz_questions(&content) {
            Some(questions) => QuizResponse::Parsed(Quiz {
                id: uuid::Uuid::new_v4().to_string(),
                questions,
            }),
            None => {
                tracing::warn!(topic, "quiz response was not valid quiz JSON");
                QuizResponse::Raw(content)
            }
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn extract_content(payload: ChatResponse) -> Result<String, QuizError> {
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| {
            QuizError::InvalidResponse("API response received but contained no content".to_string())
        })
}

fn build_quiz_prompt(topic: &str) -> String {
    format!(
        "Generate {QUESTION_COUNT} multiple-choice quiz questions about {topic}.\n\
         Format the response strictly as JSON:\n\
         {{\"questions\":[{{\"question\":\"...\",\"options\":[\"A\",\"B\",\"C\",\"D\"],\"answer\":\"...\"}}]}}"
    )
}

/// Parses quiz questions from model output, tolerating a Markdown code fence.
fn extract_quiz_questions(content: &str) -> Option<Vec<QuizQuestion>> {
    #[derive(Deserialize)]
    struct Payload {
        questions: Vec<QuizQuestion>,
    }

    let trimmed = content.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map_or(trimmed, |rest| rest.strip_suffix("```").unwrap_or(rest))
        .trim();

    serde_json::from_str::<Payload>(unfenced)
        .ok()
        .map(|payload| payload.questions)
}

fn preview(body: &str) -> String {
    match body.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const QUIZ_JSON: &str = r#"{"questions":[{"question":"Which bin takes cardboard?","options":["Blue","Green","Black","Red"],"answer":"Blue"}]}"#;

    #[test]
    fn client_rejects_empty_api_key() {
        assert!(matches!(
            Client::new("", DEFAULT_API_URL),
            Err(QuizError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_rejects_whitespace_api_key() {
        assert!(matches!(
            Client::new("   ", DEFAULT_API_URL),
            Err(QuizError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn client_debug_redacts_api_key() {
        let client = Client::new("secret-key", DEFAULT_API_URL).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn prompt_names_topic_and_format() {
        let prompt = build_quiz_prompt("home heating");
        assert!(prompt.starts_with("Generate 3 multiple-choice quiz questions about home heating."));
        assert!(prompt.contains(r#"{"questions":[{"question":"...""#));
    }

    #[test]
    fn extracts_plain_json() {
        let questions = extract_quiz_questions(QUIZ_JSON).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].answer, "Blue");
        assert_eq!(questions[0].options.len(), 4);
    }

    #[test]
    fn extracts_fenced_json() {
        let fenced = format!("```json\n{QUIZ_JSON}\n```\n");
        assert!(extract_quiz_questions(&fenced).is_some());
        let bare_fence = format!("  ```\n{QUIZ_JSON}\n```");
        assert!(extract_quiz_questions(&bare_fence).is_some());
    }

    #[test]
    fn prose_is_not_a_quiz() {
        assert!(extract_quiz_questions("Sure! Here are some questions: ...").is_none());
        assert!(extract_quiz_questions(r#"{"quiz":[]}"#).is_none());
    }

    #[test]
    fn missing_content_is_an_error() {
        let payload: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            extract_content(payload),
            Err(QuizError::InvalidResponse(_))
        ));
        let payload: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(extract_content(payload).is_err());
    }

    #[test]
    fn preview_truncates_long_bodies() {
        let long = "x".repeat(150);
        let shown = preview(&long);
        assert_eq!(shown.len(), ERROR_BODY_PREVIEW + 3);
        assert!(shown.ends_with("..."));
        assert_eq!(preview("short"), "short");
    }

    /// Serves one canned HTTP response and returns the endpoint URL.
    async fn serve_once(status_line: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0_u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/chat")
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        request.len() >= header_end + 4 + content_length
    }

    fn chat_body(content: &str) -> String {
        serde_json::json!({ "choices": [{ "message": { "content": content } }] }).to_string()
    }

    #[tokio::test]
    async fn generate_quiz_parses_questions() {
        let url = serve_once("200 OK", chat_body(&format!("```json\n{QUIZ_JSON}\n```"))).await;
        let client = Client::new("test-key", url).unwrap();
        let response = client.generate_quiz(DEFAULT_MODEL, DEFAULT_TOPIC).await.unwrap();
        let QuizResponse::Parsed(quiz) = response else {
            panic!("expected parsed quiz, got {response:?}");
        };
        assert_eq!(quiz.questions.len(), 1);
        assert!(uuid::Uuid::parse_str(&quiz.id).is_ok());
    }

    #[tokio::test]
    async fn generate_quiz_falls_back_to_raw_text() {
        let url = serve_once("200 OK", chat_body("I cannot produce JSON today.")).await;
        let client = Client::new("test-key", url).unwrap();
        let response = client.generate_quiz(DEFAULT_MODEL, "recycling").await.unwrap();
        assert_eq!(
            response,
            QuizResponse::Raw("I cannot produce JSON today.".to_string())
        );
    }

    #[tokio::test]
    async fn generate_quiz_reports_status_errors() {
        let url = serve_once(
            "401 Unauthorized",
            r#"{"error":{"message":"No auth credentials found"}}"#.to_string(),
        )
        .await;
        let client = Client::new("test-key", url).unwrap();
        let err = client.generate_quiz(DEFAULT_MODEL, DEFAULT_TOPIC).await.unwrap_err();
        assert!(matches!(err, QuizError::Api { status: 401, .. }));
        assert!(err.to_string().contains("No auth credentials found"));
    }
}
