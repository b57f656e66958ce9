use std::path::Path;
use xraygen_schema::UserStory;

/// System message for chat-style backends.
pub const SYSTEM_PROMPT: &str =
    "You are an expert QA Automation Engineer. You output strictly valid JSON.";

/// Used when the template file cannot be read.
pub const BUILTIN_TEMPLATE: &str = r#"You are an expert QA Automation Engineer working with Jira and Xray.
Read the user story below and design the tests needed to cover it.

Return a single JSON object with this exact structure:
{
  "tests": [
    {
      "summary": "Short test title",
      "description": "What the test verifies",
      "type": "Cucumber",
      "priority": "Medium",
      "components": ["Component name"],
      "cucumberScenario": "Scenario: ...\n  Given ...\n  When ...\n  Then ...",
      "linkedTestSets": [],
      "linkedUserStories": ["STORY-KEY"]
    }
  ],
  "testSets": [
    { "summary": "Test set title", "description": "What the set groups" }
  ]
}

Rules:
- Use the Given Data values for type, priority and linkedUserStories.
- Cover the happy path, validation errors and edge cases.
- Return ONLY valid JSON, no markdown fences or extra text."#;

/// Read the template at `path`, falling back to [`BUILTIN_TEMPLATE`].
pub fn load_template(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::warn!(path = %path.display(), "prompt template is empty, using built-in template");
            BUILTIN_TEMPLATE.to_string()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "prompt template not readable, using built-in template");
            BUILTIN_TEMPLATE.to_string()
        }
    }
}

/// Append the story block to the template.
pub fn compose(template: &str, story: &UserStory) -> String {
    let linked = serde_json::Value::from(vec![story.id.clone()]);
    format!(
        "{template}\n\n---\n**User:**\n> Given Data:\n  type: Cucumber\n  priority: Medium\n  linkedUserStories: {linked}\n\n> User Story:\n{summary}\n{description}\n",
        template = template.trim_end(),
        summary = story.summary,
        description = story.description,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn story() -> UserStory {
        UserStory {
            id: "XTP-42".into(),
            summary: "Reset password".into(),
            description: "By email link.".into(),
        }
    }

    #[test]
    fn compose_appends_the_story_block() {
        let prompt = compose("TEMPLATE\n", &story());
        assert_eq!(
            prompt,
            "TEMPLATE\n\n---\n**User:**\n> Given Data:\n  type: Cucumber\n  priority: Medium\n  linkedUserStories: [\"XTP-42\"]\n\n> User Story:\nReset password\nBy email link.\n"
        );
    }

    #[test]
    fn missing_template_falls_back_to_builtin() {
        let temp = TempDir::new().unwrap();
        assert_eq!(load_template(&temp.path().join("PROMPT_TEMPLATE.md")), BUILTIN_TEMPLATE);
    }

    #[test]
    fn template_file_is_used_verbatim() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("PROMPT_TEMPLATE.md");
        std::fs::write(&path, "Write tests as JSON.").unwrap();
        assert_eq!(load_template(&path), "Write tests as JSON.");
    }

    #[test]
    fn builtin_template_names_every_document_key() {
        for key in ["\"tests\"", "\"testSets\"", "cucumberScenario", "linkedUserStories"] {
            assert!(BUILTIN_TEMPLATE.contains(key), "missing {key}");
        }
    }
}
