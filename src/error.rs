use thiserror::Error;

#[derive(Error, Debug)]
pub enum OsdepsError {
    #[error("no {variant} command configured for {manager}")]
    Configuration {
        manager: String,
        variant: &'static str,
    },

    #[error("failed to acquire package manager lock at {path}: {source}")]
    Lock {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("package query failed: {0}")]
    QueryFailed(String),

    #[error("{manager} install command exited with {status}")]
    InstallFailed { manager: String, status: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
