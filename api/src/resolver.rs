use std::sync::Arc;

use kube::api::DynamicObject;

use crate::{
    Discovery, EndpointHandle, Error, MappingCache, ObjectKey, ResourceDescriptor,
    ResourceMapping, ResourceNameExt, Result,
};

pub const DEFAULT_NAMESPACE: &str = "default";

/// Outcome of [`Resolver::resolve`]: the endpoint to send the object to and
/// the object as it should be sent.
#[derive(Clone, Debug)]
pub struct Resolved {
    pub handle: EndpointHandle,
    pub object: DynamicObject,
}

/// Maps objects to the REST collection serving their kind.
///
/// The caller's object is never modified. When a namespace-scoped object has
/// no namespace, [`Resolved::object`] is a copy with the default namespace
/// filled in. Cluster-scoped objects are returned as given and their handle
/// carries no namespace.
pub struct Resolver<D> {
    discovery: D,
    cache: Arc<MappingCache>,
    default_namespace: String,
}

impl<D> Resolver<D> {
    pub fn new(discovery: D, cache: Arc<MappingCache>) -> Self {
        Self {
            discovery,
            cache,
            default_namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    pub fn with_default_namespace(mut self, namespace: impl ToString) -> Self {
        let namespace = namespace.to_string();
        if !namespace.is_empty() {
            self.default_namespace = namespace;
        }
        self
    }

    #[inline]
    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    #[inline]
    pub fn cache(&self) -> &Arc<MappingCache> {
        &self.cache
    }

    #[inline]
    pub fn discovery(&self) -> &D {
        &self.discovery
    }
}

impl<D> Resolver<D>
where
    D: Discovery,
{
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn resolve_descriptor(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> Result<ResourceMapping> {
        if let Some(mapping) = self.cache.get(descriptor).await {
            tracing::debug!("Mapping cache hit");
            return Ok(mapping);
        }
        tracing::debug!("Mapping cache miss, querying discovery");
        let mapping = self
            .discovery
            .discover(descriptor)
            .await?
            .ok_or_else(|| Error::UnknownResourceKind(ObjectKey::new(descriptor.clone())))?;
        Ok(self.cache.insert(descriptor.clone(), mapping).await)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(name = ?object.metadata.name), err)]
    pub async fn resolve(&self, object: &DynamicObject) -> Result<Resolved> {
        let descriptor = ResourceDescriptor::from_object(object)?;
        let key = ObjectKey::from_object(descriptor.clone(), object);
        let mapping = self
            .resolve_descriptor(&descriptor)
            .await
            .map_err(|err| err.for_object(&key))?;
        let mut object = object.clone();
        let namespace = match object.namespace_opt() {
            Some(namespace) => namespace.to_string(),
            None => {
                let namespace = self.default_namespace.clone();
                if mapping.is_namespaced() {
                    tracing::debug!("Defaulting namespace to {namespace}");
                    object.metadata.namespace = Some(namespace.clone());
                }
                namespace
            }
        };
        Ok(Resolved {
            handle: EndpointHandle::new(mapping, &namespace),
            object,
        })
    }
}
