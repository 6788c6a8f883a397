use serde::{Deserialize, Serialize};

fn default_manager_name() -> String {
    kapply::DEFAULT_FIELD_MANAGER.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub namespace: Option<String>,
    #[serde(default = "default_manager_name")]
    pub name: String,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Config, config::ConfigError> {
        Self::from_environment(config::Environment::with_prefix("KAPPLY"))
    }

    fn from_environment(environment: config::Environment) -> Result<Config, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
