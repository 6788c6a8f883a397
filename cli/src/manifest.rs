use std::io::Read;
use std::path::Path;

use kapply::ResourceDescriptor;
use kapply::kube::api::DynamicObject;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read manifest: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid manifest: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Manifest is empty")]
    Empty,
    #[error("Manifest contains {0} documents, expected exactly one")]
    MultipleDocuments(usize),
    #[error("Manifest must be a mapping")]
    NotAMapping,
    #[error("Manifest is missing {0}")]
    Missing(&'static str),
    #[error(transparent)]
    Kapply(#[from] kapply::Error),
}

/// Reads a single YAML or JSON manifest. `-` reads from stdin.
pub fn read(path: &Path) -> Result<DynamicObject, ManifestError> {
    let source = if path == Path::new("-") {
        let mut source = String::new();
        std::io::stdin().read_to_string(&mut source)?;
        source
    } else {
        std::fs::read_to_string(path)?
    };
    parse(&source)
}

pub fn parse(source: &str) -> Result<DynamicObject, ManifestError> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(source) {
        let value = serde_json::Value::deserialize(document)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    let value = match documents.len() {
        0 => return Err(ManifestError::Empty),
        1 => documents.remove(0),
        count => return Err(ManifestError::MultipleDocuments(count)),
    };
    if !value.is_object() {
        return Err(ManifestError::NotAMapping);
    }
    let api_version = value
        .get("apiVersion")
        .and_then(|v| v.as_str())
        .ok_or(ManifestError::Missing("apiVersion"))?;
    let kind = value
        .get("kind")
        .and_then(|v| v.as_str())
        .ok_or(ManifestError::Missing("kind"))?;
    ResourceDescriptor::parse(api_version, kind)?;
    value
        .pointer("/metadata/name")
        .and_then(|v| v.as_str())
        .filter(|name| !name.is_empty())
        .ok_or(ManifestError::Missing("metadata.name"))?;
    Ok(serde_json::from_value(value)?)
}
