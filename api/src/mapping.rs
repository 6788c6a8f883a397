use std::collections::HashMap;
use std::fmt;

use kube::discovery::{ApiCapabilities, ApiResource, Scope};
use tokio::sync::RwLock;

use crate::ResourceDescriptor;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceScope {
    Namespaced,
    Cluster,
}

impl From<&Scope> for ResourceScope {
    fn from(scope: &Scope) -> Self {
        match scope {
            Scope::Namespaced => Self::Namespaced,
            Scope::Cluster => Self::Cluster,
        }
    }
}

impl fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespaced => f.write_str("Namespaced"),
            Self::Cluster => f.write_str("Cluster"),
        }
    }
}

/// Where the objects of one kind live on the API server.
#[derive(Clone, Debug)]
pub struct ResourceMapping {
    pub resource: ApiResource,
    pub scope: ResourceScope,
}

impl ResourceMapping {
    pub fn new(resource: ApiResource, scope: ResourceScope) -> Self {
        Self { resource, scope }
    }

    pub fn from_discovery(resource: ApiResource, capabilities: &ApiCapabilities) -> Self {
        Self::new(resource, ResourceScope::from(&capabilities.scope))
    }

    #[inline]
    pub fn is_namespaced(&self) -> bool {
        self.scope == ResourceScope::Namespaced
    }

    /// REST path of the collection, e.g. `/apis/apps/v1/namespaces/default/deployments`.
    pub fn collection_path(&self, namespace: Option<&str>) -> String {
        let prefix = if self.resource.group.is_empty() {
            format!("/api/{}", self.resource.version)
        } else {
            format!("/apis/{}/{}", self.resource.group, self.resource.version)
        };
        match namespace {
            Some(namespace) => format!("{prefix}/namespaces/{namespace}/{}", self.resource.plural),
            None => format!("{prefix}/{}", self.resource.plural),
        }
    }
}

/// Mappings discovered so far, shared by every resolver built on top of it.
///
/// Readers take the read lock only. Population happens in two steps: the
/// caller discovers the mapping without holding any lock, then [`insert`]
/// takes the write lock and keeps whichever mapping was stored first. The
/// lock is never held while talking to the API server.
///
/// Entries live until [`invalidate`] or [`clear`] is called; changes to the
/// cluster's API surface are not noticed on their own.
///
/// [`insert`]: MappingCache::insert
/// [`invalidate`]: MappingCache::invalidate
/// [`clear`]: MappingCache::clear
#[derive(Debug, Default)]
pub struct MappingCache {
    mappings: RwLock<HashMap<ResourceDescriptor, ResourceMapping>>,
}

impl MappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, descriptor: &ResourceDescriptor) -> Option<ResourceMapping> {
        self.mappings.read().await.get(descriptor).cloned()
    }

    /// Returns the mapping now stored for `descriptor`, which is `mapping`
    /// unless another task got there first.
    pub async fn insert(
        &self,
        descriptor: ResourceDescriptor,
        mapping: ResourceMapping,
    ) -> ResourceMapping {
        self.mappings
            .write()
            .await
            .entry(descriptor)
            .or_insert(mapping)
            .clone()
    }

    pub async fn invalidate(&self, descriptor: &ResourceDescriptor) -> Option<ResourceMapping> {
        self.mappings.write().await.remove(descriptor)
    }

    pub async fn clear(&self) {
        self.mappings.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.mappings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.mappings.read().await.is_empty()
    }
}
