// Environment variable loading

use std::collections::HashMap;
use std::env;

/// Prefix shared by every pushwatch environment variable
pub const ENV_PREFIX: &str = "PUSHWATCH";

/// Environment variable loader
pub struct EnvLoader {
    prefix: String,
}

impl EnvLoader {
    /// Create a loader for variables named `<prefix>_<KEY>`
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load matching variables from the process environment
    pub fn load(&self) -> HashMap<String, String> {
        self.collect(env::vars())
    }

    /// Keep prefixed variables, keyed by the lowercased remainder
    pub fn collect<I>(&self, vars: I) -> HashMap<String, String>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(key, value)| {
                let rest = key.strip_prefix(&self.prefix)?.strip_prefix('_')?;
                if rest.is_empty() {
                    return None;
                }
                Some((rest.to_lowercase(), value))
            })
            .collect()
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(ENV_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_collect_strips_prefix() {
        let loader = EnvLoader::default();
        let map = loader.collect(vars(&[
            ("PUSHWATCH_RULES", "rules.txt"),
            ("PUSHWATCH_MAX_CONFIG_LEN", "2000"),
            ("PATH", "/usr/bin"),
            ("PUSHWATCHER_RULES", "nope"),
            ("PUSHWATCH_", "empty"),
        ]));

        assert_eq!(map.len(), 2);
        assert_eq!(map["rules"], "rules.txt");
        assert_eq!(map["max_config_len"], "2000");
    }
}
