// Environment variable loading

use serde_json::{Map, Value};
use std::env;

/// Environment variable loader
///
/// Variables matching the prefix are turned into configuration keys:
/// `CSRFP_TOKEN_LENGTH=20` becomes `tokenLength: 20`. Values that parse as
/// JSON keep their JSON type, anything else is a string.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::new(Some(prefix.into()))
    }

    /// Read the process environment.
    pub fn load(&self) -> Map<String, Value> {
        self.from_vars(env::vars())
    }

    /// Same mapping as [`load`](Self::load) over an explicit variable set.
    pub fn from_vars<I, K, V>(&self, vars: I) -> Map<String, Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Map::new();

        for (key, value) in vars {
            let key = key.as_ref();
            let name = match &self.prefix {
                Some(prefix) => match key.strip_prefix(prefix.as_str()) {
                    Some(rest) if rest.starts_with('_') => &rest[1..],
                    _ => continue,
                },
                None => key,
            };
            if name.is_empty() {
                continue;
            }
            config.insert(to_camel_case(name), parse_value(value.as_ref()));
        }

        config
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

/// `TOKEN_LENGTH` -> `tokenLength`
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, part) in name.split('_').filter(|p| !p.is_empty()).enumerate() {
        let lower = part.to_lowercase();
        if i == 0 {
            out.push_str(&lower);
        } else {
            let mut chars = lower.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
