/// The trimmed value of the environment variable, if it is set and not blank.
pub fn env_non_empty(env_var: &str) -> Option<String> {
    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => Some(val.trim().to_string()),
        _ => None,
    }
}
