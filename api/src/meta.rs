use std::fmt;

use kube::{
    Resource,
    api::{DynamicObject, ObjectMeta},
};

use crate::{Error, ResourceDescriptor, Result};

pub trait ResourceNameExt: Resource {
    fn name(&self) -> Result<&str> {
        self.meta()
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or(Error::ObjectMetaMissing("name"))
    }

    /// The namespace set on the object, treating an empty string as unset.
    fn namespace_opt(&self) -> Option<&str> {
        self.meta()
            .namespace
            .as_deref()
            .filter(|namespace| !namespace.is_empty())
    }
}

impl<T> ResourceNameExt for T where T: Resource {}

pub trait ObjectMetaExt {
    /// Drops everything the API server populates on its own. Fields owned by
    /// the apply author (name, namespace, labels, ...) are kept.
    fn strip_system(&self) -> Self;
}

impl ObjectMetaExt for ObjectMeta {
    fn strip_system(&self) -> Self {
        ObjectMeta {
            name: self.name.clone(),
            generate_name: self.generate_name.clone(),
            namespace: self.namespace.clone(),
            annotations: self.annotations.clone(),
            labels: self.labels.clone(),
            finalizers: self.finalizers.clone(),
            owner_references: self.owner_references.clone(),
            ..Default::default()
        }
    }
}

/// Identifies the object an operation was about, for error reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectKey {
    pub descriptor: ResourceDescriptor,
    pub namespace: Option<String>,
    pub name: Option<String>,
}

impl ObjectKey {
    pub fn new(descriptor: ResourceDescriptor) -> Self {
        Self {
            descriptor,
            namespace: None,
            name: None,
        }
    }

    pub fn with_namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.map(str::to_string);
        self
    }

    pub fn with_name(mut self, name: impl ToString) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn from_object(descriptor: ResourceDescriptor, object: &DynamicObject) -> Self {
        Self {
            descriptor,
            namespace: object.namespace_opt().map(str::to_string),
            name: object.metadata.name.clone(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptor)?;
        match (&self.namespace, &self.name) {
            (Some(namespace), Some(name)) => write!(f, " {namespace}/{name}"),
            (None, Some(name)) => write!(f, " {name}"),
            (Some(namespace), None) => write!(f, " in {namespace}"),
            (None, None) => Ok(()),
        }
    }
}
