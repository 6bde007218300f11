//! Parts technical lookup through the LLM, with a Redis cache

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{
    llm::{LlmClient, LlmError},
    redis::RedisService,
};
use crate::models::part::{LookupSource, PartLookupResponse, PartTechnicalInfo};

pub const UNAVAILABLE: &str = "Information unavailable";

const AUTH_NOTICE: &str =
    "The parts lookup service rejected its credentials. Ask an administrator to check the API key.";
const GENERIC_NOTICE: &str = "The parts lookup service could not answer. Try again later.";

const SYSTEM_PROMPT: &str = "You are an expert in agricultural spare parts with deep knowledge of \
farm equipment, part numbering schemes and technical specifications. Answer with precise, \
detailed information as a JSON object with the keys function, installation, symptoms, \
maintenance and compatibleEquipment (an array of strings).";

impl PartTechnicalInfo {
    /// Answer used when nothing could be retrieved
    pub fn placeholder() -> Self {
        Self {
            function: UNAVAILABLE.to_string(),
            installation: UNAVAILABLE.to_string(),
            symptoms: UNAVAILABLE.to_string(),
            maintenance: UNAVAILABLE.to_string(),
            compatible_equipment: Vec::new(),
        }
    }

    /// Read a model answer; missing or empty fields become the placeholder text
    pub fn from_answer(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .unwrap_or(UNAVAILABLE)
                .to_string()
        };

        let compatible_equipment = value
            .get("compatibleEquipment")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            function: text("function"),
            installation: text("installation"),
            symptoms: text("symptoms"),
            maintenance: text("maintenance"),
            compatible_equipment,
        }
    }
}

fn user_prompt(part_number: &str, context: Option<&str>) -> String {
    let context = context
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| format!(" ({})", c))
        .unwrap_or_default();

    format!(
        "Give all available information about the agricultural part with reference \"{}\"{}.\n\
         Include:\n\
         1. Its function and use\n\
         2. Detailed installation steps\n\
         3. Failure symptoms showing it must be replaced\n\
         4. Care and maintenance recommendations\n\
         5. Compatible equipment\n\
         If you have no precise information about this reference, analyse the number format \
         to suggest what kind of part it may be and which manufacturer makes it.",
        part_number, context
    )
}

/// Cache key for a lookup; part numbers are compared case-insensitively
pub fn cache_key(part_number: &str, context: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(part_number.trim().to_uppercase().as_bytes());
    hasher.update(b"|");
    hasher.update(context.unwrap_or("").trim().as_bytes());
    format!("parts:lookup:{}", hex::encode(hasher.finalize()))
}

#[derive(Clone)]
pub struct PartsLookupService {
    client: LlmClient,
    redis: Option<RedisService>,
    cache_ttl_seconds: u64,
}

impl PartsLookupService {
    pub fn new(client: LlmClient, redis: Option<RedisService>, cache_ttl_seconds: u64) -> Self {
        Self {
            client,
            redis,
            cache_ttl_seconds,
        }
    }

    /// Look up a part. Provider failures never surface as errors: the caller gets the
    /// placeholder and a notice instead.
    pub async fn lookup(&self, part_number: &str, context: Option<&str>) -> PartLookupResponse {
        let part_number = part_number.trim();
        let key = cache_key(part_number, context);

        if let Some(info) = self.cached(&key).await {
            tracing::debug!("Parts lookup cache hit for {}", part_number);
            return PartLookupResponse {
                part_number: part_number.to_string(),
                info,
                source: LookupSource::Cache,
                notice: None,
            };
        }

        tracing::info!("Looking up part {} with {}", part_number, self.client.model());
        match self.client.ask(SYSTEM_PROMPT, &user_prompt(part_number, context)).await {
            Ok(answer) => {
                let info = PartTechnicalInfo::from_answer(&answer);
                self.store(&key, &info).await;
                PartLookupResponse {
                    part_number: part_number.to_string(),
                    info,
                    source: LookupSource::Llm,
                    notice: None,
                }
            }
            Err(e) => {
                tracing::warn!("Parts lookup for {} failed: {}", part_number, e);
                PartLookupResponse {
                    part_number: part_number.to_string(),
                    info: PartTechnicalInfo::placeholder(),
                    source: LookupSource::Unavailable,
                    notice: Some(notice_for(&e).to_string()),
                }
            }
        }
    }

    async fn cached(&self, key: &str) -> Option<PartTechnicalInfo> {
        let redis = self.redis.as_ref()?;
        match redis.get_json(key).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!("Parts lookup cache unavailable: {}", e);
                None
            }
        }
    }

    async fn store(&self, key: &str, info: &PartTechnicalInfo) {
        if let Some(redis) = &self.redis {
            if let Err(e) = redis.set_json_ex(key, info, self.cache_ttl_seconds).await {
                tracing::warn!("Failed to cache parts lookup: {}", e);
            }
        }
    }
}

fn notice_for(err: &LlmError) -> &'static str {
    if err.is_credentials() {
        AUTH_NOTICE
    } else {
        GENERIC_NOTICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use serde_json::json;

    fn service(base_url: String) -> PartsLookupService {
        let config = LlmConfig {
            api_key: Some("sk-test".to_string()),
            base_url,
            ..LlmConfig::default()
        };
        PartsLookupService::new(LlmClient::new(&config).unwrap(), None, 60)
    }

    #[test]
    fn test_from_answer_fills_missing_fields() {
        let info = PartTechnicalInfo::from_answer(&json!({
            "function": "Hydraulic filter",
            "symptoms": "  ",
            "compatibleEquipment": ["6155R", 3, "7R"]
        }));
        assert_eq!(info.function, "Hydraulic filter");
        assert_eq!(info.installation, UNAVAILABLE);
        assert_eq!(info.symptoms, UNAVAILABLE);
        assert_eq!(info.compatible_equipment, vec!["6155R", "7R"]);
    }

    #[test]
    fn test_cache_key_is_case_insensitive() {
        assert_eq!(cache_key("re504836", None), cache_key(" RE504836 ", Some("")));
        assert_ne!(cache_key("RE504836", None), cache_key("RE504836", Some("6155R")));
        assert!(cache_key("x", None).starts_with("parts:lookup:"));
    }

    #[test]
    fn test_prompt_includes_context() {
        assert!(user_prompt("AL123", Some("John Deere 6155R")).contains("\"AL123\" (John Deere 6155R)"));
        assert!(!user_prompt("AL123", Some(" ")).contains("()"));
    }

    #[tokio::test]
    async fn test_lookup_success() {
        let mut server = mockito::Server::new_async().await;
        let answer = json!({
            "function": "Engine oil filter",
            "installation": "Unscrew, oil the gasket, screw hand-tight",
            "symptoms": "Low oil pressure",
            "maintenance": "Replace every 500 hours",
            "compatibleEquipment": ["6155R"]
        });
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"choices": [{"message": {"content": answer.to_string()}}]}).to_string())
            .create_async()
            .await;

        let response = service(server.url()).lookup("RE504836", None).await;
        assert_eq!(response.source, LookupSource::Llm);
        assert_eq!(response.info.function, "Engine oil filter");
        assert!(response.notice.is_none());
    }

    #[tokio::test]
    async fn test_lookup_auth_failure_returns_placeholder() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .create_async()
            .await;

        let response = service(server.url()).lookup("RE504836", None).await;
        assert_eq!(response.source, LookupSource::Unavailable);
        assert_eq!(response.info, PartTechnicalInfo::placeholder());
        assert_eq!(response.notice.as_deref(), Some(AUTH_NOTICE));
    }

    #[tokio::test]
    async fn test_lookup_malformed_answer_returns_generic_notice() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"choices": [{"message": {"content": "{not json"}}]}).to_string())
            .create_async()
            .await;

        let response = service(server.url()).lookup("RE504836", None).await;
        assert_eq!(response.info, PartTechnicalInfo::placeholder());
        assert_eq!(response.notice.as_deref(), Some(GENERIC_NOTICE));
    }
}
