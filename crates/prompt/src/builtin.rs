//! Built-in prompt templates.

use crate::types::PromptDefinition;

/// Keyword extraction prompt ID.
pub const KEYWORDS_PROMPT_ID: &str = "kbot.keywords";

/// Answer synthesis prompt ID.
pub const ANSWER_PROMPT_ID: &str = "kbot.answer";

const KEYWORDS_TEMPLATE: &str = r#"Based on the user's question: "{{question}}"

Extract the most relevant search keywords that would help find information in a knowledge base.
Return only the keywords, separated by spaces, without any explanation.

Question: {{question}}
Keywords:"#;

const ANSWER_TEMPLATE: &str = r#"You are a helpful assistant that answers questions based on the provided context from a Notion database.

Context from Notion pages:
{{context}}

Question: {{question}}

Instructions:
- Answer the question based on the provided context
- If the context doesn't contain enough information, say so clearly
- Provide specific information when available
- If you reference specific pages, mention their titles
- Be concise but comprehensive
- Format your response clearly using markdown when appropriate

Answer:"#;

/// Look up a built-in prompt by ID.
pub fn builtin_prompt(id: &str) -> Option<PromptDefinition> {
    let (title, variables, template) = match id {
        KEYWORDS_PROMPT_ID => ("Keyword Extraction", vec!["question"], KEYWORDS_TEMPLATE),
        ANSWER_PROMPT_ID => (
            "Answer Synthesis",
            vec!["question", "context"],
            ANSWER_TEMPLATE,
        ),
        _ => return None,
    };

    Some(PromptDefinition {
        id: id.to_string(),
        title: title.to_string(),
        api_version: "1.0".to_string(),
        created_by: "kbot".to_string(),
        system: None,
        variables: variables.into_iter().map(String::from).collect(),
        template: template.to_string(),
    })
}
