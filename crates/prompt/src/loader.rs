//! Prompt loader: YAML overrides with built-in fallbacks.

use crate::builtin::{builtin_prompt, ANSWER_PROMPT_ID, KEYWORDS_PROMPT_ID};
use crate::builder::compile_template;
use crate::types::{PromptDefinition, PromptSet};
use kbot_core::{AppError, AppResult};
use std::path::Path;

/// Load a prompt definition by ID.
///
/// When `prompts_dir` is set and contains `<id>.yml`, that file replaces the
/// built-in template. Otherwise the built-in definition is returned.
///
/// # Example
/// ```no_run
/// use kbot_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Some(Path::new("./prompts")), "kbot.answer")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(prompts_dir: Option<&Path>, prompt_id: &str) -> AppResult<PromptDefinition> {
    if let Some(dir) = prompts_dir {
        let prompt_file = dir.join(format!("{}.yml", prompt_id));

        if prompt_file.exists() {
            tracing::debug!("Loading prompt override from: {:?}", prompt_file);
            let definition = read_prompt_file(&prompt_file)?;

            if definition.id != prompt_id {
                return Err(AppError::Prompt(format!(
                    "Prompt file {:?} declares id '{}', expected '{}'",
                    prompt_file, definition.id, prompt_id
                )));
            }

            validate_prompt(&definition)?;
            tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);
            return Ok(definition);
        }
    }

    builtin_prompt(prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)))
}

/// Load both pipeline prompts.
pub fn load_prompt_set(prompts_dir: Option<&Path>) -> AppResult<PromptSet> {
    Ok(PromptSet {
        keywords: load_prompt(prompts_dir, KEYWORDS_PROMPT_ID)?,
        answer: load_prompt(prompts_dir, ANSWER_PROMPT_ID)?,
    })
}

fn read_prompt_file(path: &Path) -> AppResult<PromptDefinition> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| AppError::Prompt(format!("Failed to read prompt file {:?}: {}", path, e)))?;

    serde_yaml::from_str(&contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {:?}: {}", path, e)))
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    // Overrides must keep every variable the pipeline fills in.
    if let Some(builtin) = builtin_prompt(&def.id) {
        for var in &builtin.variables {
            if !def.variables.contains(var) {
                return Err(AppError::Prompt(format!(
                    "Prompt {} must declare variable '{}'",
                    def.id, var
                )));
            }
        }
    }

    compile_template(&def.template)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, file_id: &str, body: &str) {
        fs::write(dir.join(format!("{}.yml", file_id)), body).unwrap();
    }

    #[test]
    fn test_builtin_without_dir() {
        let prompt = load_prompt(None, KEYWORDS_PROMPT_ID).unwrap();
        assert_eq!(prompt.created_by, "kbot");
    }

    #[test]
    fn test_builtin_when_override_missing() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt(Some(temp_dir.path()), ANSWER_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Answer Synthesis");
    }

    #[test]
    fn test_override_replaces_builtin() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            KEYWORDS_PROMPT_ID,
            r#"
id: kbot.keywords
title: Terse Keywords
apiVersion: "1.1"
variables: [question]
template: "Terms for: {{question}}"
"#,
        );

        let prompt = load_prompt(Some(temp_dir.path()), KEYWORDS_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Terse Keywords");
        assert_eq!(prompt.template, "Terms for: {{question}}");
    }

    #[test]
    fn test_override_missing_variable_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            ANSWER_PROMPT_ID,
            r#"
id: kbot.answer
title: No Context
apiVersion: "1.0"
variables: [question]
template: "{{question}}"
"#,
        );

        assert!(load_prompt(Some(temp_dir.path()), ANSWER_PROMPT_ID).is_err());
    }

    #[test]
    fn test_override_with_mismatched_id_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            KEYWORDS_PROMPT_ID,
            r#"
id: something.else
title: Wrong
apiVersion: "1.0"
variables: [question]
template: "{{question}}"
"#,
        );

        assert!(load_prompt(Some(temp_dir.path()), KEYWORDS_PROMPT_ID).is_err());
    }

    #[test]
    fn test_invalid_yaml_rejected() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), KEYWORDS_PROMPT_ID, "invalid: yaml: content:");

        assert!(load_prompt(Some(temp_dir.path()), KEYWORDS_PROMPT_ID).is_err());
    }

    #[test]
    fn test_unknown_prompt() {
        assert!(load_prompt(None, "nonexistent").is_err());
    }

    #[test]
    fn test_load_prompt_set() {
        let set = load_prompt_set(None).unwrap();
        assert_eq!(set.keywords.id, KEYWORDS_PROMPT_ID);
        assert_eq!(set.answer.id, ANSWER_PROMPT_ID);
    }
}
