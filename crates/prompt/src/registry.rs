//! Prompt registry for rendering templates.

use crate::templates;
use handlebars::Handlebars;
use serde::Serialize;
use tabletalk_core::{AppError, AppResult};

/// Registry holding the built-in prompt templates.
///
/// Custom templates can be registered at runtime to override the built-ins,
/// e.g. to tune the SQL generation instructions for a specific database.
pub struct PromptRegistry {
    handlebars: Handlebars<'static>,
}

impl PromptRegistry {
    /// Create a registry with the built-in templates registered.
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();

        // Prompts are plain text, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);

        // Built-ins cannot fail to register; they are compile-time constants
        // exercised by the tests below.
        let builtins = [
            (templates::TABLE_SUMMARY, templates::TABLE_SUMMARY_TEMPLATE),
            (templates::TEXT_TO_SQL, templates::TEXT_TO_SQL_TEMPLATE),
            (
                templates::ANSWER_SYNTHESIS,
                templates::ANSWER_SYNTHESIS_TEMPLATE,
            ),
        ];

        for (name, template) in builtins {
            if let Err(e) = handlebars.register_template_string(name, template) {
                tracing::error!("Built-in template '{}' failed to register: {}", name, e);
            }
        }

        Self { handlebars }
    }

    /// Register (or override) a template at runtime.
    pub fn register(&mut self, name: &str, template: &str) -> AppResult<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| AppError::Prompt(format!("Failed to register template '{}': {}", name, e)))
    }

    /// Render a template with the given variables.
    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> AppResult<String> {
        if !self.handlebars.has_template(name) {
            return Err(AppError::Prompt(format!("Unknown template: {}", name)));
        }

        self.handlebars
            .render(name, data)
            .map_err(|e| AppError::Prompt(format!("Failed to render template '{}': {}", name, e)))
    }
}

impl Default for PromptRegistry {
    fn default() -> Self {
        Self::new()
    }
}
