//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or a value has the wrong type.
    #[error("could not load hopper configuration: {0}")]
    Figment(#[from] figment::Error),

    /// The selected backend lacks settings it needs to connect.
    #[error(
        "the {section} backend is selected but {} not set (config key {section}.<name> or env {})",
        .missing.join(", "),
        env_names(.section, .missing)
    )]
    MissingSettings {
        section: &'static str,
        missing: Vec<&'static str>,
    },

    /// A setting has a value Hopper cannot use.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// `HOPPER_{SECTION}__{FIELD}` for each missing field.
fn env_names(section: &str, missing: &[&str]) -> String {
    missing
        .iter()
        .map(|field| {
            format!(
                "HOPPER_{}__{}",
                section.to_ascii_uppercase(),
                field.to_ascii_uppercase()
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}
