use crate::ollama::OllamaClient;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub ollama_url: String,
    pub model: String,
    pub allowed_models: Vec<String>,
    pub timeout: Duration,
}

/// Read-only per-request state: the shared backend client plus the resolved
/// model policy. Built once before the server starts accepting connections.
#[derive(Debug, Clone)]
pub struct GatewayState {
    pub client: OllamaClient,
    pub model: String,
    pub allowed_models: Vec<String>,
    pub timeout: Duration,
}

impl GatewayState {
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let model = resolve_default_model(&config.model, &config.allowed_models);
        if !config.allowed_models.is_empty() && model != config.model.trim() {
            log::warn!(
                "default model {:?} not in the allow-list; using {:?} instead",
                config.model,
                model
            );
        }
        let client = OllamaClient::new(&config.ollama_url, config.timeout)?;
        Ok(GatewayState {
            client,
            model,
            allowed_models: config.allowed_models.clone(),
            timeout: config.timeout,
        })
    }
}

/// Splits a comma-separated model list, trimming entries and dropping blanks
/// and duplicates. Insertion order is preserved for error messages.
pub fn parse_model_list(value: &str) -> Vec<String> {
    let mut models: Vec<String> = Vec::new();
    for part in value.split(',') {
        let name = part.trim();
        if name.is_empty() || models.iter().any(|m| m == name) {
            continue;
        }
        models.push(name.to_string());
    }
    models
}

/// Parses the configured request timeout. Accepts bare seconds or an
/// `ms`/`s`/`m`/`h` suffix; anything invalid or non-positive falls back to
/// the two-minute default with a diagnostic.
pub fn parse_timeout(value: &str) -> Duration {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return DEFAULT_TIMEOUT;
    }
    match parse_duration(trimmed) {
        Some(d) if !d.is_zero() => d,
        _ => {
            log::warn!(
                "invalid timeout {:?}; using default {}s",
                value,
                DEFAULT_TIMEOUT.as_secs()
            );
            DEFAULT_TIMEOUT
        }
    }
}

fn parse_duration(value: &str) -> Option<Duration> {
    if let Some(n) = value.strip_suffix("ms") {
        return n.parse::<u64>().ok().map(Duration::from_millis);
    }
    if let Some(n) = value.strip_suffix('s') {
        return n.parse::<u64>().ok().map(Duration::from_secs);
    }
    if let Some(n) = value.strip_suffix('m') {
        return n.parse::<u64>().ok().map(|v| Duration::from_secs(v * 60));
    }
    if let Some(n) = value.strip_suffix('h') {
        return n.parse::<u64>().ok().map(|v| Duration::from_secs(v * 3600));
    }
    value.parse::<u64>().ok().map(Duration::from_secs)
}

/// Picks the effective default model. With a non-empty allow-list the
/// default must be a member; otherwise the first allow-listed entry wins.
pub fn resolve_default_model(base: &str, allowed: &[String]) -> String {
    let trimmed = base.trim();
    if allowed.is_empty() {
        return trimmed.to_string();
    }
    if !trimmed.is_empty() && allowed.iter().any(|m| m == trimmed) {
        return trimmed.to_string();
    }
    allowed[0].clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_list_trims_dedups_and_keeps_order() {
        assert_eq!(
            parse_model_list(" m1, m2 ,m1,,m3 "),
            vec!["m1", "m2", "m3"]
        );
        assert!(parse_model_list("").is_empty());
        assert!(parse_model_list(" , ,").is_empty());
    }

    #[test]
    fn timeout_accepts_seconds_and_suffixed_forms() {
        assert_eq!(parse_timeout("90"), Duration::from_secs(90));
        assert_eq!(parse_timeout("  30s  "), Duration::from_secs(30));
        assert_eq!(parse_timeout("2m"), Duration::from_secs(120));
        assert_eq!(parse_timeout("1h"), Duration::from_secs(3600));
        assert_eq!(parse_timeout("1500ms"), Duration::from_millis(1500));
    }

    #[test]
    fn timeout_falls_back_on_invalid_or_non_positive_values() {
        assert_eq!(parse_timeout(""), DEFAULT_TIMEOUT);
        assert_eq!(parse_timeout("soon"), DEFAULT_TIMEOUT);
        assert_eq!(parse_timeout("0"), DEFAULT_TIMEOUT);
        assert_eq!(parse_timeout("0s"), DEFAULT_TIMEOUT);
        assert_eq!(parse_timeout("-5s"), DEFAULT_TIMEOUT);
    }

    #[test]
    fn default_model_resolution_honors_allow_list() {
        let allowed = vec!["m1".to_string(), "m2".to_string()];
        assert_eq!(resolve_default_model(" m2 ", &allowed), "m2");
        assert_eq!(resolve_default_model("m3", &allowed), "m1");
        assert_eq!(resolve_default_model("", &allowed), "m1");
        assert_eq!(resolve_default_model(" m9 ", &[]), "m9");
    }
}
