use thiserror::Error;

#[derive(Debug, Error)]
pub enum DevkitError {
    #[error("missing name: pass the migration name, e.g. 'devkit generate-migration add indexable column'")]
    MissingName,

    #[error("invalid identifier '{0}': must start with a letter or underscore, followed by letters, digits or underscores")]
    InvalidIdentifier(String),

    #[error("name collision: a migration named '{0}' already exists")]
    NameCollision(String),

    #[error("invalid reference '{0}': git references cannot start with '-'")]
    InvalidReference(String),

    #[error("unknown script '{0}': add it under 'scripts' in .devkit/config.yaml")]
    UnknownScript(String),

    #[error("failed to run '{command}': {reason}")]
    CommandSpawn { command: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, DevkitError>;
