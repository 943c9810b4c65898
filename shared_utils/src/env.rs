use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// This is a thin wrapper around `std::env::var` that provides a more
/// ergonomic and specific error type for missing variables. A variable that is
/// set but blank counts as missing.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(MissingEnvVarError(name.to_string())),
    }
}

/// Reads an optional override from the environment.
///
/// Returns `None` when the variable is unset or blank, so callers can layer it
/// over a value that came from a config file.
pub fn env_override(name: &str) -> Option<String> {
    get_env_var(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VAR: &str = "SHARED_UTILS_TEST_VAR";

    #[test]
    #[serial]
    fn missing_variable_is_reported_by_name() {
        unsafe { std::env::remove_var(VAR) };
        let err = get_env_var(VAR).unwrap_err();
        assert_eq!(err.0, VAR);
        assert_eq!(err.to_string(), format!("Missing environment variable: {VAR}"));
    }

    #[test]
    #[serial]
    fn blank_variable_counts_as_missing() {
        unsafe { std::env::set_var(VAR, "   ") };
        assert!(get_env_var(VAR).is_err());
        assert_eq!(env_override(VAR), None);
        unsafe { std::env::remove_var(VAR) };
    }

    #[test]
    #[serial]
    fn present_variable_is_returned() {
        unsafe { std::env::set_var(VAR, "https://example.test") };
        assert_eq!(env_override(VAR).as_deref(), Some("https://example.test"));
        unsafe { std::env::remove_var(VAR) };
    }
}
