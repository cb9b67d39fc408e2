//! Endpoint compatibility checking: an endpoint becomes active only after it
//! lists the selected model and answers a probe completion with it.

use crate::core::config::settings::ProbeSettings;
use crate::core::config::PanelSettings;
use crate::models;
use crate::session::SessionContext;
use crate::stack::{ChatMessage, StackApi, StackConnector};

use super::types::{Confirmation, Incompatibility, IncompatibilityReport, TestOutcome};

/// Runs the three checks against `api` without touching any session.
pub async fn check_compatibility(
    api: &dyn StackApi,
    model: &str,
    probe: &ProbeSettings,
    similar_preview: usize,
) -> Result<Confirmation, IncompatibilityReport> {
    let endpoint = api.endpoint().to_string();
    let report = |reason: Incompatibility| IncompatibilityReport {
        endpoint: endpoint.clone(),
        model: model.to_string(),
        reason,
    };

    let listed = models::list_models(api).await.map_err(|err| {
        report(Incompatibility::ConnectionError {
            error: err.to_string(),
        })
    })?;
    let identifiers: Vec<String> = listed.into_iter().map(|m| m.identifier).collect();

    if !identifiers.iter().any(|id| id == model) {
        return Err(report(Incompatibility::ModelNotFound {
            models_found: identifiers.len(),
            similar_models: similar_models(model, &identifiers, similar_preview),
        }));
    }

    let messages = [ChatMessage::user(probe.prompt.clone())];
    let completion = api
        .chat_completion(model, &messages, &probe.sampling())
        .await
        .map_err(|err| {
            report(Incompatibility::ChatCompletionError {
                error: err.to_string(),
            })
        })?;

    Ok(Confirmation {
        endpoint: endpoint.clone(),
        model: model.to_string(),
        response: completion.text(),
    })
}

/// Tests `candidate_url` with the session's picked model (or the configured
/// default) and commits the pair on success. On failure the active endpoint
/// is left untouched. The outcome is kept on the session until dismissed.
pub async fn verify_and_maybe_commit(
    ctx: &mut SessionContext,
    connector: &dyn StackConnector,
    settings: &PanelSettings,
    candidate_url: &str,
) -> Result<Confirmation, IncompatibilityReport> {
    let candidate_url = candidate_url.trim();
    let model = if ctx.picked_model.trim().is_empty() {
        settings.endpoint.model.clone()
    } else {
        ctx.picked_model.trim().to_string()
    };

    tracing::info!("Testing {} with model {}", candidate_url, model);
    let api = connector.connect(candidate_url, ctx.api_key());
    let result = check_compatibility(
        api.as_ref(),
        &model,
        &settings.probe,
        settings.chat.similar_models_preview,
    )
    .await;

    match &result {
        Ok(confirmation) => {
            ctx.commit_endpoint(candidate_url, &confirmation.model);
            tracing::info!("Committed endpoint {} with model {}", candidate_url, model);
        }
        Err(report) => {
            tracing::warn!("Endpoint test failed: {}", report);
        }
    }
    ctx.last_test = Some(TestOutcome::from(&result));
    result
}

/// Shortest listed id that may match as a substring of the requested one.
const MIN_CONTAINED_CHARS: usize = 3;

/// Models sharing a case-insensitive substring or a `-`/`_` delimited token
/// with `requested`, at most `cap` of them. Single-char tokens never match.
pub fn similar_models(requested: &str, available: &[String], cap: usize) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    let requested_tokens = tokens(&requested_lower);

    available
        .iter()
        .filter(|candidate| {
            let candidate_lower = candidate.to_lowercase();
            if candidate_lower.is_empty() || requested_lower.is_empty() {
                return false;
            }
            candidate_lower.contains(&requested_lower)
                || (candidate_lower.chars().count() >= MIN_CONTAINED_CHARS
                    && requested_lower.contains(&candidate_lower))
                || tokens(&candidate_lower)
                    .iter()
                    .any(|token| requested_tokens.contains(token))
        })
        .take(cap)
        .cloned()
        .collect()
}

fn tokens(value: &str) -> Vec<&str> {
    value
        .split(['-', '_'])
        .filter(|token| token.chars().count() > 1)
        .collect()
}

/// Restores the edit field to the committed endpoint and drops unconfirmed
/// picker state.
pub fn reset_to_active(ctx: &mut SessionContext) {
    ctx.edit_url = ctx.endpoint().to_string();
    ctx.picked_model = ctx.model().to_string();
    ctx.available_models.clear();
    ctx.model_fetch_error = None;
    ctx.refresh_pending = false;
}

pub fn dismiss_test(ctx: &mut SessionContext) {
    ctx.last_test = None;
    ctx.refresh_pending = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::fake::{FakeConnector, FakeStack};
    use crate::stack::StackError;

    fn settings() -> PanelSettings {
        PanelSettings::default()
    }

    fn session() -> SessionContext {
        SessionContext::new("s1".to_string(), &settings())
    }

    #[tokio::test]
    async fn compatible_endpoint_is_committed() {
        let connector = FakeConnector::new();
        connector.register(FakeStack::new("http://good:8321").with_llm_models(&["m1"]));
        let mut ctx = session();
        ctx.picked_model = "m1".to_string();

        let confirmation =
            verify_and_maybe_commit(&mut ctx, connector.as_ref(), &settings(), "http://good:8321")
                .await
                .unwrap();

        assert_eq!(confirmation.response, "Hello! How can I help?");
        assert_eq!(ctx.endpoint(), "http://good:8321");
        assert_eq!(ctx.model(), "m1");
        assert_eq!(ctx.edit_url, "http://good:8321");
        assert!(matches!(ctx.last_test, Some(TestOutcome::Success(_))));
    }

    #[tokio::test]
    async fn probe_uses_short_low_temperature_completion() {
        let connector = FakeConnector::new();
        let stack = connector.register(FakeStack::new("http://good:8321").with_llm_models(&["m1"]));
        let mut ctx = session();
        ctx.picked_model = "m1".to_string();

        verify_and_maybe_commit(&mut ctx, connector.as_ref(), &settings(), "http://good:8321")
            .await
            .unwrap();

        let state = stack.state.lock().unwrap();
        let (model, messages, sampling) = &state.chat_requests[0];
        assert_eq!(model, "m1");
        assert_eq!(messages, &vec![ChatMessage::user("Hello")]);
        assert_eq!(sampling.max_tokens, 10);
        assert_eq!(sampling.temperature, 0.1);
    }

    #[tokio::test]
    async fn missing_model_reports_and_keeps_active_endpoint() {
        let connector = FakeConnector::new();
        connector.register(FakeStack::new("http://other:8321").with_llm_models(&["m2", "m3"]));
        let mut ctx = session();
        ctx.picked_model = "m1".to_string();

        let report =
            verify_and_maybe_commit(&mut ctx, connector.as_ref(), &settings(), "http://other:8321")
                .await
                .unwrap_err();

        assert_eq!(report.endpoint, "http://other:8321");
        assert_eq!(report.model, "m1");
        assert_eq!(
            report.reason,
            Incompatibility::ModelNotFound {
                models_found: 2,
                similar_models: vec![],
            }
        );
        assert_eq!(ctx.endpoint(), "http://llamastack:8321");
        assert_eq!(ctx.model(), "default-model");
        assert!(matches!(ctx.last_test, Some(TestOutcome::Failure(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_connection_error() {
        let connector = FakeConnector::new();
        let mut ctx = session();
        ctx.picked_model = "m1".to_string();

        let report =
            verify_and_maybe_commit(&mut ctx, connector.as_ref(), &settings(), "http://down:1")
                .await
                .unwrap_err();

        assert!(matches!(report.reason, Incompatibility::ConnectionError { .. }));
        assert_eq!(ctx.endpoint(), "http://llamastack:8321");
    }

    #[tokio::test]
    async fn failed_completion_is_not_committed() {
        let connector = FakeConnector::new();
        let stack = connector.register(FakeStack::new("http://good:8321").with_llm_models(&["m1"]));
        stack.set_completion(Err(StackError::Status {
            status: 500,
            body: "model not loaded".to_string(),
        }));
        let mut ctx = session();
        ctx.picked_model = "m1".to_string();

        let report =
            verify_and_maybe_commit(&mut ctx, connector.as_ref(), &settings(), "http://good:8321")
                .await
                .unwrap_err();

        match report.reason {
            Incompatibility::ChatCompletionError { error } => {
                assert!(error.contains("model not loaded"))
            }
            other => panic!("unexpected reason: {:?}", other),
        }
        assert_eq!(ctx.endpoint(), "http://llamastack:8321");
    }

    #[tokio::test]
    async fn blank_pick_falls_back_to_configured_model() {
        let connector = FakeConnector::new();
        connector.register(FakeStack::new("http://good:8321").with_llm_models(&["default-model"]));
        let mut ctx = session();

        let confirmation =
            verify_and_maybe_commit(&mut ctx, connector.as_ref(), &settings(), " http://good:8321 ")
                .await
                .unwrap();
        assert_eq!(confirmation.model, "default-model");
        assert_eq!(ctx.endpoint(), "http://good:8321");
    }

    #[test]
    fn similar_models_uses_substrings_and_shared_tokens() {
        let available: Vec<String> = [
            "meta-llama/Llama-3.2-3B-Instruct",
            "llama3.2:3b",
            "granite-3b-code",
            "mistral_7b",
            "Qwen2",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        assert_eq!(
            similar_models("Llama3.2:3B", &available, 5),
            vec!["llama3.2:3b"]
        );
        assert_eq!(
            similar_models("granite-7b", &available, 5),
            vec!["granite-3b-code", "mistral_7b"]
        );
        assert_eq!(similar_models("mistral-7b", &available, 5), vec!["mistral_7b"]);
        assert!(similar_models("m1", &["m2".to_string(), "m3".to_string()], 5).is_empty());
    }

    #[test]
    fn short_ids_are_not_similar_to_everything() {
        let available: Vec<String> = ["m", "la", "x", "mistral_7b", "llama"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(similar_models("mistral-7b", &available, 5), vec!["mistral_7b"]);
        assert_eq!(similar_models("llama-guard", &available, 5), vec!["llama"]);
    }

    #[test]
    fn similar_models_is_capped() {
        let available: Vec<String> = (0..10).map(|i| format!("llama-{}", i)).collect();
        assert_eq!(similar_models("llama-x", &available, 3).len(), 3);
    }

    #[test]
    fn reset_discards_unconfirmed_edits() {
        let mut ctx = session();
        ctx.edit_url = "http://typo:8321".to_string();
        ctx.picked_model = "m9".to_string();
        ctx.available_models = vec!["m9".to_string()];
        ctx.refresh_pending = true;

        reset_to_active(&mut ctx);

        assert_eq!(ctx.edit_url, "http://llamastack:8321");
        assert_eq!(ctx.picked_model, "default-model");
        assert!(ctx.available_models.is_empty());
        assert!(!ctx.refresh_pending);
    }

    #[test]
    fn dismiss_clears_outcome() {
        let mut ctx = session();
        ctx.last_test = Some(TestOutcome::Failure(IncompatibilityReport {
            endpoint: "http://x".to_string(),
            model: "m".to_string(),
            reason: Incompatibility::ConnectionError {
                error: "refused".to_string(),
            },
        }));
        dismiss_test(&mut ctx);
        assert!(ctx.last_test.is_none());
    }
}
