//! Command line generation from configured templates.
//!
//! A template is an ordered list of argument tokens with one `%s` slot that
//! receives the shell-quoted package list at invocation time. Generation is
//! a pure function; running the result is the executor's job.

use crate::error::OsdepsError;

/// Placeholder token replaced by the quoted package list.
pub const PACKAGE_SLOT: &str = "%s";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    tokens: Vec<String>,
}

impl CommandTemplate {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the full command line for the given packages.
    ///
    /// Fixed tokens and packages are quoted independently, so a later
    /// shell-style split recovers every package as its own argument even
    /// when tokens or package names carry embedded spaces.
    pub fn generate(&self, packages: &[&str]) -> String {
        let list = packages
            .iter()
            .map(|pkg| shell_words::quote(pkg).into_owned())
            .collect::<Vec<_>>()
            .join(" ");

        self.tokens
            .iter()
            .map(|token| {
                if token == PACKAGE_SLOT {
                    list.clone()
                } else {
                    shell_words::quote(token).into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// The command variants a manager family may configure.
///
/// The query and automatic install variants are required by the operations
/// that use them; the user-facing variant falls back to the automatic one
/// so a missing display template never breaks the automatic path.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    pub query: Option<CommandTemplate>,
    pub install: Option<CommandTemplate>,
    pub install_user: Option<CommandTemplate>,
}

impl TemplateSet {
    pub fn query_command(&self, manager: &str, packages: &[&str]) -> Result<String, OsdepsError> {
        match &self.query {
            Some(template) => Ok(template.generate(packages)),
            None => Err(OsdepsError::Configuration {
                manager: manager.to_string(),
                variant: "query",
            }),
        }
    }

    pub fn install_command(&self, manager: &str, packages: &[&str]) -> Result<String, OsdepsError> {
        match &self.install {
            Some(template) => Ok(template.generate(packages)),
            None => Err(OsdepsError::Configuration {
                manager: manager.to_string(),
                variant: "install",
            }),
        }
    }

    /// The command line shown to the user in the manual confirmation gate.
    pub fn user_command(&self, manager: &str, packages: &[&str]) -> Result<String, OsdepsError> {
        match &self.install_user {
            Some(template) => Ok(template.generate(packages)),
            None => self.install_command(manager, packages),
        }
    }
}
