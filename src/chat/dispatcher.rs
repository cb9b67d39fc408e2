use serde_json::{json, Value};

use super::prompt::build_prompt;
use crate::core::config::PanelSettings;
use crate::session::{ChatTurn, Role, SessionContext};
use crate::stack::{ChatMessage, StackApi, StackConnector};
use crate::vector_dbs::naming;
use crate::vector_dbs::probe::truncate;

const CONTENT_PROBE_QUERY: &str = "test query to check if database has content";
const CONTEXT_PREVIEW_CHARS: usize = 200;
const PROMPT_PREVIEW_CHARS: usize = 500;

/// Answers one chat message. The user turn is appended first; an assistant
/// turn is always appended, carrying the error text when the completion
/// fails. Retrieval problems only show up in the debug trail.
pub async fn answer(
    ctx: &mut SessionContext,
    connector: &dyn StackConnector,
    settings: &PanelSettings,
    query: &str,
) -> ChatTurn {
    ctx.push_user_turn(query);

    let store_api = connector.connect(settings.document_endpoint(), ctx.api_key());
    let context = retrieve_context(ctx, store_api.as_ref(), settings, query).await;

    let prompt = build_prompt(settings.chat.prompt_variant, query, context.as_deref());
    ctx.log_debug(
        "enhanced_prompt_construction",
        json!({
            "has_rag_context": context.is_some(),
            "prompt_length": prompt.chars().count(),
            "enhanced_prompt": truncate(&prompt, PROMPT_PREVIEW_CHARS),
        }),
    );

    let endpoint = ctx.endpoint().to_string();
    let model = ctx.model().to_string();
    ctx.log_debug("endpoint_selection", json!({ "endpoint": endpoint, "model": model }));

    let chat_api = connector.connect(&endpoint, ctx.api_key());
    let messages = [
        ChatMessage::system(settings.chat.system_prompt.clone()),
        ChatMessage::user(prompt),
    ];
    let content = match chat_api
        .chat_completion(&model, &messages, &settings.sampling)
        .await
    {
        Ok(completion) => {
            let text = completion.text();
            ctx.log_debug(
                "completion",
                json!({
                    "model": model,
                    "response_length": text.chars().count(),
                    "status": "success",
                }),
            );
            text
        }
        Err(err) => {
            tracing::warn!("Chat completion on {} with {} failed: {}", endpoint, model, err);
            ctx.log_debug("completion_error", json!({ "model": model, "error": err.to_string() }));
            format!("❌ LLM Error: {}", err)
        }
    };

    ctx.push_assistant_turn(content.clone());
    ChatTurn {
        role: Role::Assistant,
        content,
    }
}

/// Resolves the selected stores and runs one retrieval across all of them.
/// Returns `None` when nothing was selected, nothing matched, or retrieval
/// failed or came back empty.
async fn retrieve_context(
    ctx: &mut SessionContext,
    api: &dyn StackApi,
    settings: &PanelSettings,
    query: &str,
) -> Option<String> {
    let label = &settings.vector_db.unnamed_label;
    let listed = api.list_vector_dbs().await;

    let selected: Vec<String> = match (&ctx.vector_db_selection, &listed) {
        (Some(names), _) => names.clone(),
        (None, Ok(records)) => records
            .iter()
            .map(|record| naming::display_name(record, label))
            .collect(),
        (None, Err(_)) => Vec::new(),
    };
    ctx.log_debug(
        "vector_db_selection",
        json!({ "selected_vector_dbs": selected, "selected_count": selected.len() }),
    );

    let records = match listed {
        Ok(records) => records,
        Err(err) => {
            ctx.log_debug("vector_db_list_error", json!({ "error": err.to_string() }));
            return None;
        }
    };
    if selected.is_empty() {
        ctx.log_debug(
            "no_vector_dbs_selected",
            json!({ "message": "No vector databases were selected for RAG" }),
        );
        return None;
    }

    let (ids, unmatched) = naming::resolve_ids(&records, &selected, label);
    let all: Vec<Value> = records
        .iter()
        .map(|record| {
            let d = naming::describe(record, label);
            json!({ "name": d.display_name, "id": d.identifier })
        })
        .collect();
    ctx.log_debug(
        "available_vector_dbs",
        json!({
            "total_vector_dbs": records.len(),
            "matching_vector_db_ids": ids,
            "unmatched_names": unmatched,
            "all_vector_dbs": all,
        }),
    );
    if ids.is_empty() {
        ctx.log_debug(
            "no_matching_vector_dbs",
            json!({
                "selected_vector_dbs": selected,
                "available_vector_dbs": records.len(),
                "message": "No vector database IDs matched the selected databases",
            }),
        );
        return None;
    }

    if ctx.debug_mode {
        content_probe(ctx, api, &ids[0]).await;
    }

    match api.query(&ids, query).await {
        Ok(result) => {
            let document_ids = result.metadata.get("document_ids").cloned();
            let content = result.content.filter(|c| !c.trim().is_empty());
            ctx.log_debug(
                "rag_query",
                json!({
                    "query": query,
                    "vector_db_ids_used": ids,
                    "context_length": content.as_ref().map_or(0, |c| c.chars().count()),
                    "context_preview": content
                        .as_deref()
                        .map_or_else(|| "None".to_string(), |c| truncate(c, CONTEXT_PREVIEW_CHARS)),
                    "document_ids": document_ids.unwrap_or(Value::Null),
                }),
            );
            content
        }
        Err(err) => {
            tracing::warn!("Retrieval from {:?} failed: {}", ids, err);
            ctx.log_debug(
                "rag_error",
                json!({ "error": err.to_string(), "vector_db_ids_attempted": ids }),
            );
            None
        }
    }
}

async fn content_probe(ctx: &mut SessionContext, api: &dyn StackApi, vector_db_id: &str) {
    let ids = [vector_db_id.to_string()];
    match api.query(&ids, CONTENT_PROBE_QUERY).await {
        Ok(result) => {
            let content = result.content.unwrap_or_default();
            ctx.log_debug(
                "vector_db_content_test",
                json!({
                    "vector_db_id": vector_db_id,
                    "test_query_result_length": content.chars().count(),
                    "test_query_has_content": !content.is_empty(),
                    "test_response_preview": if content.is_empty() {
                        "Empty".to_string()
                    } else {
                        truncate(&content, 100)
                    },
                }),
            );
        }
        Err(err) => {
            ctx.log_debug(
                "vector_db_content_test_error",
                json!({ "vector_db_id": vector_db_id, "error": err.to_string() }),
            );
        }
    }
}
