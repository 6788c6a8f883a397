use std::fmt;

use kube::api::{DynamicObject, GroupVersionKind, TypeMeta};

use crate::{Error, Result};

/// Group, version and kind of a resource, as declared by an object's
/// `apiVersion` and `kind`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceDescriptor {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl ResourceDescriptor {
    pub fn new(group: impl ToString, version: impl ToString, kind: impl ToString) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Parses `apps/v1` style api versions. A bare version (`v1`) belongs to
    /// the core group.
    pub fn parse(api_version: &str, kind: &str) -> Result<Self> {
        if kind.is_empty() {
            return Err(Error::ObjectMetaMissing("kind"));
        }
        let invalid = || Error::InvalidApiVersion(api_version.to_string());
        let (group, version) = match api_version.split_once('/') {
            Some(("", _)) => return Err(invalid()),
            Some(parts) => parts,
            None => ("", api_version),
        };
        if version.is_empty() || version.contains('/') {
            return Err(invalid());
        }
        Ok(Self::new(group, version, kind))
    }

    pub fn from_type_meta(types: &TypeMeta) -> Result<Self> {
        Self::parse(&types.api_version, &types.kind)
    }

    pub fn from_object(object: &DynamicObject) -> Result<Self> {
        let types = object
            .types
            .as_ref()
            .ok_or(Error::ObjectMetaMissing("apiVersion"))?;
        Self::from_type_meta(types)
    }

    #[inline]
    pub fn is_core(&self) -> bool {
        self.group.is_empty()
    }

    pub fn api_version(&self) -> String {
        if self.is_core() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_core() {
            write!(f, "{}/{}", self.kind, self.version)
        } else {
            write!(f, "{}.{}/{}", self.kind, self.group, self.version)
        }
    }
}

impl From<GroupVersionKind> for ResourceDescriptor {
    fn from(gvk: GroupVersionKind) -> Self {
        Self {
            group: gvk.group,
            version: gvk.version,
            kind: gvk.kind,
        }
    }
}

impl From<&ResourceDescriptor> for GroupVersionKind {
    fn from(descriptor: &ResourceDescriptor) -> Self {
        GroupVersionKind::gvk(&descriptor.group, &descriptor.version, &descriptor.kind)
    }
}
