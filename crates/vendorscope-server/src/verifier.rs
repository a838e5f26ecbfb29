//! OpenAI-compatible context verifier

use crate::config::VerifierConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use vendorscope_classifiers::ContextVerifier;
use vendorscope_core::{Error, Result, ValidationMethod};

/// Asks a chat-completions model whether a page shows a direct business
/// relationship between the company and the vendor
pub struct OpenAiVerifier {
    client: Client,
    api_key: String,
    vendor: String,
    config: VerifierConfig,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ContextAnswer {
    #[serde(rename = "hasBusinessContext", default)]
    has_business_context: bool,
    #[serde(default)]
    reason: Option<String>,
}

impl OpenAiVerifier {
    pub fn new(
        api_key: impl Into<String>,
        vendor: impl Into<String>,
        config: VerifierConfig,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build verifier client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            vendor: vendor.into(),
            config,
        })
    }

    /// Instruction sent to the model
    pub fn prompt(&self, company_name: &str, page_text: &str) -> String {
        let text: String = page_text.chars().take(self.config.max_text_chars).collect();
        let vendor = &self.vendor;
        format!(
            r#"Decide whether the text shows a REAL, DIRECT business relationship between "{company_name}" (the company under investigation) and {vendor} (ERP and management software vendor).

All of the following must hold:
1. The company mentioned is really "{company_name}", not another company of the same sector or group.
2. There is a direct commercial relationship: customer and supplier, partnership or contract.
3. It is not merely a joint mention in a list, ranking or market comparison.
4. It is not a mention of a holding, group or shareholder without a direct link to "{company_name}".

Answer true only if "{company_name}" is explicitly a customer, partner or contracting party of {vendor}, with clear evidence such as implemented, contracted, uses or migrated.

TEXT:
{text}

Reply with JSON only:
{{"hasBusinessContext": true or false, "reason": "short explanation"}}"#
        )
    }
}

/// Parse the model's reply, tolerating a fenced code block
fn parse_answer(content: &str) -> Result<ContextAnswer> {
    let trimmed = content.trim();
    let json = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|s| s.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();
    serde_json::from_str(json).map_err(|e| Error::verifier(format!("Unparseable answer: {}", e)))
}

#[async_trait]
impl ContextVerifier for OpenAiVerifier {
    async fn confirm(&self, company_name: &str, page_text: &str) -> Result<bool> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: self.prompt(company_name, page_text),
            }],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::verifier(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::verifier(format!("status {}", response.status())));
        }

        let data: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::verifier(format!("Malformed response: {}", e)))?;
        let content = data
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::verifier("Empty response"))?;

        let answer = parse_answer(&content)?;
        debug!(
            company = %company_name,
            confirmed = answer.has_business_context,
            reason = answer.reason.as_deref().unwrap_or(""),
            "Context verified"
        );
        Ok(answer.has_business_context)
    }

    fn method(&self) -> ValidationMethod {
        ValidationMethod::Ai
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_fenced_answers() {
        let answer = parse_answer(r#"{"hasBusinessContext": true, "reason": "case"}"#).unwrap();
        assert!(answer.has_business_context);

        let fenced = "```json\n{\"hasBusinessContext\": false, \"reason\": \"ranking\"}\n```";
        let answer = parse_answer(fenced).unwrap();
        assert!(!answer.has_business_context);
        assert_eq!(answer.reason.as_deref(), Some("ranking"));
    }

    #[test]
    fn test_parse_garbage_is_verifier_error() {
        let err = parse_answer("probably yes").unwrap_err();
        assert!(matches!(err, Error::Verifier(_)));
    }

    #[test]
    fn test_prompt_truncates_page_text() {
        let config = VerifierConfig {
            max_text_chars: 20,
            ..VerifierConfig::default()
        };
        let verifier = OpenAiVerifier::new("key", "TOTVS", config).unwrap();
        let prompt = verifier.prompt("Acme", &"x".repeat(500));
        assert!(prompt.contains("\"Acme\""));
        assert!(prompt.contains("TOTVS"));
        assert!(prompt.contains(&"x".repeat(20)));
        assert!(!prompt.contains(&"x".repeat(21)));
    }
}
