use crate::core::config::PromptVariant;

/// User message sent to the model. Blank context counts as no context.
pub fn build_prompt(variant: PromptVariant, query: &str, context: Option<&str>) -> String {
    let context = context.map(str::trim).filter(|c| !c.is_empty());

    match (variant, context) {
        (PromptVariant::Documentation, Some(context)) => format!(
            "Please answer the following query using the provided documentation context.\n\n\
             CONTEXT FROM DOCUMENTATION:\n{}\n\n\
             QUERY:\n{}\n\n\
             Please provide a comprehensive answer based on the context above.",
            context, query
        ),
        (PromptVariant::Documentation, None) => query.to_string(),
        (PromptVariant::SecurityAdvisor, Some(context)) => format!(
            "You are advising on application and network security.\n\n\
             CONTEXT FROM SECURITY DOCUMENTATION:\n{}\n\n\
             QUESTION:\n{}\n\n\
             Answer from the context above. Name the relevant security controls or \
             configuration steps, and state clearly when the context does not cover the question.",
            context, query
        ),
        (PromptVariant::SecurityAdvisor, None) => format!(
            "You are advising on application and network security.\n\n\
             QUESTION:\n{}\n\n\
             Name the relevant security controls or configuration steps in your answer.",
            query
        ),
    }
}
