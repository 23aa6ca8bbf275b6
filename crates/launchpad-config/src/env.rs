use std::collections::HashMap;

use crate::keys::{PREFIX_KEY, PROPERTIES_FILE_KEY};

/// Environment variables consulted as lowest-precedence fallbacks, paired
/// with the store key they fill.
pub const ENV_FALLBACKS: &[(&str, &str)] = &[
    ("BOOT_PREFIX", PREFIX_KEY),
    ("BOOT_PROPERTIES_FILE", PROPERTIES_FILE_KEY),
];

/// Snapshot the process environment variables relevant to booting.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    ENV_FALLBACKS
        .iter()
        .filter_map(|(var, _)| std::env::var(var).ok().map(|v| ((*var).to_owned(), v)))
        .collect()
}

/// Map an environment snapshot onto store keys.
///
/// Empty values are treated as unset.
#[must_use]
pub fn env_fallbacks(env_vars: &HashMap<String, String>) -> Vec<(String, String)> {
    ENV_FALLBACKS
        .iter()
        .filter_map(|(var, key)| {
            env_vars
                .get(*var)
                .filter(|v| !v.is_empty())
                .map(|v| ((*key).to_owned(), v.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_variables_only() {
        let env: HashMap<String, String> = [
            ("BOOT_PREFIX".to_owned(), "demo".to_owned()),
            ("BOOT_PROPERTIES_FILE".to_owned(), String::new()),
            ("UNRELATED".to_owned(), "x".to_owned()),
        ]
        .into_iter()
        .collect();

        let pairs = env_fallbacks(&env);
        assert_eq!(pairs, vec![("boot.prefix".to_owned(), "demo".to_owned())]);
    }
}
