pub mod apply;
pub mod resolve;

use clap::ValueEnum;
use kapply::kube::api::DynamicObject;
use kapply::{ObjectKey, ResourceDescriptor};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn render(self, object: &DynamicObject) -> Result<String, Box<dyn std::error::Error>> {
        Ok(match self {
            Self::Json => serde_json::to_string_pretty(object)?,
            Self::Yaml => serde_yaml::to_string(object)?,
        })
    }
}

/// One line report of an applied object: `applied <apiVersion> <kind> <namespace> <name>`.
pub fn summary(object: &DynamicObject) -> String {
    let key = object
        .types
        .as_ref()
        .and_then(|types| ResourceDescriptor::from_type_meta(types).ok())
        .map(|descriptor| ObjectKey::from_object(descriptor, object));
    match key {
        Some(key) => format!(
            "applied {} {} {} {}",
            key.descriptor.api_version(),
            key.descriptor.kind,
            key.namespace.as_deref().unwrap_or("-"),
            key.name.as_deref().unwrap_or("-"),
        ),
        None => format!(
            "applied {}",
            object.metadata.name.as_deref().unwrap_or("<unnamed>")
        ),
    }
}
