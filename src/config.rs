use std::env;

/// Process configuration, read from the environment (a `.env` file is
/// loaded first when present).
///
/// `TABLE_PREFIX` namespaces every physical table name; an unset prefix
/// means tables are created under their declared names.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub table_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            table_prefix: env::var("TABLE_PREFIX").unwrap_or_default(),
        }
    }
}
