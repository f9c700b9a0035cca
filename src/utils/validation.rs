use regex::Regex;

use crate::core::error::{ConfigError, ValidationError};

const MIN_NAME_LENGTH: usize = 6;
const MIN_PASSWORD_LENGTH: usize = 5;
const MAX_UNDERSCORES: usize = 2;

/// Sign-up and sign-in input rules. Checked before any store is touched.
#[derive(Clone)]
pub(crate) struct CredentialRules {
    charset: Regex,
}

impl std::fmt::Debug for CredentialRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRules")
            .field("charset", &self.charset.as_str())
            .finish()
    }
}

impl CredentialRules {
    pub(crate) fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            charset: Regex::new(r"^[a-zA-Z0-9_]+$")?,
        })
    }

    /// Reports the first violated rule, in order: length, character set,
    /// underscore placement, underscore count.
    pub(crate) fn check(&self, name: &str, password: &str) -> Result<(), ValidationError> {
        if name.chars().count() < MIN_NAME_LENGTH || password.chars().count() < MIN_PASSWORD_LENGTH
        {
            return Err(ValidationError::Length);
        }

        if !self.charset.is_match(name) || !self.charset.is_match(password) {
            return Err(ValidationError::Charset);
        }

        if [name, password]
            .iter()
            .any(|value| value.starts_with('_') || value.ends_with('_'))
        {
            return Err(ValidationError::UnderscorePosition);
        }

        if [name, password]
            .iter()
            .any(|value| value.matches('_').count() > MAX_UNDERSCORES)
        {
            return Err(ValidationError::TooManyUnderscores);
        }

        Ok(())
    }
}
