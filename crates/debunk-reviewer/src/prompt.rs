//! Prompt templates via `minijinja`.
//!
//! Two templates are compiled in: `system` (the scoring rubric) and `user`
//! (theme plus message). Operators can replace either one without
//! recompiling by dropping `system.j2` or `user.j2` into `TEMPLATES_DIR`.

use std::path::Path;

use minijinja::{Environment, context};

use crate::error::ReviewerError;

/// Built-in scoring rubric.
pub const SYSTEM_TEMPLATE: &str = include_str!("../templates/system.j2");

/// Built-in user message.
pub const USER_TEMPLATE: &str = include_str!("../templates/user.j2");

const TEMPLATE_NAMES: [&str; 2] = ["system", "user"];

/// The rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// Scoring instructions.
    pub system: String,
    /// The theme and the message under review.
    pub user: String,
}

/// Holds the compiled prompt templates.
#[derive(Debug)]
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    /// Create an engine from the built-in templates only.
    pub fn builtin() -> Result<Self, ReviewerError> {
        let mut env = Environment::new();
        env.add_template("system", SYSTEM_TEMPLATE)
            .map_err(|e| ReviewerError::Template(format!("built-in system template: {e}")))?;
        env.add_template("user", USER_TEMPLATE)
            .map_err(|e| ReviewerError::Template(format!("built-in user template: {e}")))?;
        Ok(Self { env })
    }

    /// Create an engine, overriding built-ins with any `<name>.j2` found in
    /// `templates_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewerError::Template`] if the directory does not exist,
    /// an override cannot be read, or it fails to compile.
    pub fn new(templates_dir: Option<&str>) -> Result<Self, ReviewerError> {
        let mut engine = Self::builtin()?;
        let Some(dir) = templates_dir else {
            return Ok(engine);
        };

        let dir = Path::new(dir);
        if !dir.is_dir() {
            return Err(ReviewerError::Template(format!(
                "templates directory {} does not exist",
                dir.display()
            )));
        }

        for name in TEMPLATE_NAMES {
            let path = dir.join(format!("{name}.j2"));
            if !path.is_file() {
                continue;
            }
            let source = std::fs::read_to_string(&path).map_err(|e| {
                ReviewerError::Template(format!("failed to read {}: {e}", path.display()))
            })?;
            engine
                .env
                .add_template_owned(name, source)
                .map_err(|e| ReviewerError::Template(format!("{}: {e}", path.display())))?;
            tracing::info!(template = name, path = %path.display(), "prompt template overridden");
        }

        Ok(engine)
    }

    /// Render the prompt for one message on one theme.
    pub fn render(&self, theme: &str, input: &str) -> Result<RenderedPrompt, ReviewerError> {
        let ctx = context! { theme => theme, input => input };
        let render = |name: &str| {
            self.env
                .get_template(name)
                .and_then(|template| template.render(&ctx))
                .map_err(|e| ReviewerError::Template(format!("{name} render failed: {e}")))
        };

        Ok(RenderedPrompt {
            system: render("system")?,
            user: render("user")?,
        })
    }
}
