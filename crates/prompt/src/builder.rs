//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use handlebars::Handlebars;
use kbot_core::{AppError, AppResult};
use std::collections::HashMap;

const TEMPLATE_NAME: &str = "prompt";

/// Build a prompt from a definition and input variables.
///
/// Every variable the definition declares must be supplied; the rendered
/// template becomes the user message and the definition's system text, if
/// any, the system message.
///
/// # Example
/// ```no_run
/// use kbot_prompt::{build_prompt, load_prompt};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = load_prompt(None, "kbot.keywords")?;
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "How do I reset my password?".to_string());
///
/// let built = build_prompt(&def, vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::debug!("Building prompt: {}", definition.id);

    if let Some(missing) = definition
        .variables
        .iter()
        .find(|var| !variables.contains_key(*var))
    {
        return Err(AppError::Prompt(format!(
            "Prompt {} is missing variable '{}'",
            definition.id, missing
        )));
    }

    let user = render_template(&definition.template, &variables)?;

    Ok(BuiltPrompt::new(
        definition.system.clone(),
        user,
        definition.id.clone(),
        variables,
    ))
}

/// Register a template on a fresh plain-text registry.
pub(crate) fn compile_template(template: &str) -> AppResult<Handlebars<'static>> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text; HTML escaping would mangle quotes in questions.
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string(TEMPLATE_NAME, template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    Ok(handlebars)
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    compile_template(template)?
        .render(TEMPLATE_NAME, variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
