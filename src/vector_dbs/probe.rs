//! Best-effort document listing. The server has no "list documents" call, so
//! broad queries are issued and document names are collected from whatever
//! comes back. The result is indicative only.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::stack::StackApi;

const PREVIEW_CHARS: usize = 200;

static DOCUMENT_ID_PATTERN: OnceLock<Regex> = OnceLock::new();
static FILENAME_PATTERN: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProbedDocument {
    pub name: String,
    pub preview: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProbeStep {
    pub query: String,
    pub found_content: bool,
    pub documents: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DocumentProbe {
    pub vector_db_id: String,
    pub documents: Vec<ProbedDocument>,
    pub trail: Vec<ProbeStep>,
}

/// Guesses a document name from retrieved free text. Lossy: `None` means
/// "filename not detected", not "no document".
pub fn filename_hint(text: &str) -> Option<String> {
    let document_id = DOCUMENT_ID_PATTERN.get_or_init(|| {
        Regex::new(r#"['"]document_id['"]\s*:\s*['"]([^'"]+)['"]"#).expect("Invalid regex")
    });
    if let Some(caps) = document_id.captures(text) {
        return Some(caps[1].to_string());
    }

    let filename = FILENAME_PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b([\w][\w.\-]*\.(?:pdf|txt|md|docx?|json|ya?ml|html?|csv))\b")
            .expect("Invalid regex")
    });
    filename.captures(text).map(|caps| caps[1].to_string())
}

pub fn preview(text: &str) -> String {
    truncate(text, PREVIEW_CHARS)
}

/// First `limit` characters, with `...` appended when anything was cut.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let head: String = text.chars().take(limit).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

pub async fn probe_documents(
    api: &dyn StackApi,
    vector_db_id: &str,
    queries: &[String],
) -> DocumentProbe {
    let mut probe = DocumentProbe {
        vector_db_id: vector_db_id.to_string(),
        ..DocumentProbe::default()
    };
    let ids = [vector_db_id.to_string()];

    for query in queries {
        match api.query(&ids, query).await {
            Ok(result) => {
                let content = result.content.clone().unwrap_or_default();
                let mut names = result.document_ids();
                if names.is_empty() && !content.is_empty() {
                    names.extend(filename_hint(&content));
                }

                let mut added = 0;
                for name in names {
                    if probe.documents.iter().any(|d| d.name == name) {
                        continue;
                    }
                    probe.documents.push(ProbedDocument {
                        name,
                        preview: preview(&content),
                    });
                    added += 1;
                }
                probe.trail.push(ProbeStep {
                    query: query.clone(),
                    found_content: !content.is_empty(),
                    documents: added,
                    error: None,
                });
            }
            Err(err) => {
                tracing::debug!("Document probe '{}' on {} failed: {}", query, vector_db_id, err);
                probe.trail.push(ProbeStep {
                    query: query.clone(),
                    found_content: false,
                    documents: 0,
                    error: Some(err.to_string()),
                });
            }
        }
    }

    probe
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::fake::FakeStack;
    use crate::stack::StackError;
    use serde_json::json;

    #[test]
    fn hint_prefers_document_id_field() {
        let text = "Result 1: {'document_id': 'guide.pdf', 'chunk': 3} mentions notes.txt";
        assert_eq!(filename_hint(text), Some("guide.pdf".to_string()));
    }

    #[test]
    fn hint_falls_back_to_filename_pattern() {
        assert_eq!(
            filename_hint("see waf-policy_v2.yaml for details"),
            Some("waf-policy_v2.yaml".to_string())
        );
        assert_eq!(filename_hint("no file mentioned here"), None);
    }

    #[test]
    fn preview_is_truncated() {
        let long = "a".repeat(250);
        let short = preview(&long);
        assert_eq!(short.len(), 203);
        assert!(short.ends_with("..."));
        assert_eq!(preview("tiny"), "tiny");
    }

    #[tokio::test]
    async fn probe_dedupes_names_across_queries() {
        let stack = FakeStack::new("http://good:8321");
        stack.set_query_result(Ok(json!({
            "content": "chunk text",
            "metadata": { "document_ids": ["a.pdf", "b.txt"] }
        })));
        let queries = vec!["document".to_string(), "file".to_string()];

        let probe = probe_documents(stack.as_ref(), "demo", &queries).await;

        assert_eq!(probe.documents.len(), 2);
        assert_eq!(probe.trail.len(), 2);
        assert_eq!(probe.trail[0].documents, 2);
        assert_eq!(probe.trail[1].documents, 0);
        assert_eq!(stack.state.lock().unwrap().queries[0].0, vec!["demo"]);
    }

    #[tokio::test]
    async fn probe_records_errors_and_continues() {
        let stack = FakeStack::new("http://good:8321");
        stack.set_query_result(Err(StackError::Status {
            status: 404,
            body: "vector db not found".to_string(),
        }));
        let queries = vec!["document".to_string(), "pdf".to_string()];

        let probe = probe_documents(stack.as_ref(), "missing", &queries).await;

        assert!(probe.documents.is_empty());
        assert_eq!(probe.trail.len(), 2);
        assert!(probe.trail[1].error.as_deref().unwrap().contains("vector db not found"));
    }
}
