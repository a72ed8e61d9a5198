//! ui::prompts
//!
//! Password input for fetch and push.
//!
//! Prompts only run when stdin is a terminal. Otherwise the password must
//! come from the environment.

use std::io::IsTerminal;

use thiserror::Error;

/// Environment variable read before prompting.
pub const PASSWORD_ENV: &str = "GITBRIDGE_PASSWORD";

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("no password available: set {PASSWORD_ENV} or run interactively")]
    NotInteractive,

    #[error("failed to read password: {0}")]
    IoError(String),
}

/// Resolve the password for `username`.
///
/// Uses `GITBRIDGE_PASSWORD` when set, else prompts without echo.
pub fn password(username: &str) -> Result<String, PromptError> {
    password_from(std::env::var(PASSWORD_ENV).ok(), || {
        if !std::io::stdin().is_terminal() {
            return Err(PromptError::NotInteractive);
        }
        rpassword::prompt_password(format!("Password for '{}': ", username))
            .map_err(|e| PromptError::IoError(e.to_string()))
    })
}

fn password_from(
    env: Option<String>,
    prompt: impl FnOnce() -> Result<String, PromptError>,
) -> Result<String, PromptError> {
    match env {
        Some(value) => Ok(value),
        None => prompt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_skips_prompt() {
        let result = password_from(Some("s3cret".into()), || panic!("prompted"));
        assert_eq!(result.unwrap(), "s3cret");
    }

    #[test]
    fn prompt_used_without_environment() {
        let result = password_from(None, || Ok("typed".into()));
        assert_eq!(result.unwrap(), "typed");
    }

    #[test]
    fn prompt_errors_propagate() {
        let result = password_from(None, || Err(PromptError::NotInteractive));
        assert!(matches!(result, Err(PromptError::NotInteractive)));
    }
}
