use thiserror::Error;

/// An environment variable required by the application is not set, or is set to
/// nothing but whitespace.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// A variable that is present but blank counts as missing: every caller in this
/// workspace reads credentials or paths, for which an empty value is never usable.
/// Surrounding whitespace is trimmed from the returned value.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    get_optional_env_var(name).ok_or_else(|| MissingEnvVarError(name.to_string()))
}

/// Reads an environment variable that the caller is prepared to do without.
///
/// Returns `None` when the variable is unset, not valid unicode, or blank.
pub fn get_optional_env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
