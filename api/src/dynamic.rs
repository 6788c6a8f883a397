use std::sync::Arc;

use kube::api::DynamicObject;
use serde::Serialize;

use crate::applier::with_timeout;
use crate::{
    Applier, ApplyParams, ApplyTransport, Discovery, EndpointHandle, Error, MappingCache,
    ObjectKey, Resolved, Resolver, ResourceDescriptor, Result, to_dynamic,
};

pub const DEFAULT_FIELD_MANAGER: &str = "kapply";

#[derive(Clone, Debug)]
pub struct Applied {
    pub handle: EndpointHandle,
    pub object: DynamicObject,
}

/// Resolves objects and applies them in one call.
pub struct Dynamic<D, T> {
    resolver: Resolver<D>,
    applier: Applier<T>,
}

pub struct DynamicBuilder<D, T> {
    discovery: Option<D>,
    transport: Option<T>,
    manager: Option<String>,
    namespace: Option<String>,
    cache: Option<Arc<MappingCache>>,
}

impl<D, T> Default for DynamicBuilder<D, T> {
    fn default() -> Self {
        Self {
            discovery: None,
            transport: None,
            manager: None,
            namespace: None,
            cache: None,
        }
    }
}

impl<D, T> DynamicBuilder<D, T> {
    pub fn discovery(&mut self, discovery: D) -> &mut Self {
        self.discovery = Some(discovery);
        self
    }

    pub fn transport(&mut self, transport: T) -> &mut Self {
        self.transport = Some(transport);
        self
    }

    pub fn field_manager(&mut self, manager: impl ToString) -> &mut Self {
        self.manager = Some(manager.to_string());
        self
    }

    /// Namespace given to namespace-scoped objects that have none.
    pub fn namespace(&mut self, namespace: impl ToString) -> &mut Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Shares an existing mapping cache instead of starting from an empty one.
    pub fn cache(&mut self, cache: Arc<MappingCache>) -> &mut Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(&mut self) -> Result<Dynamic<D, T>> {
        let discovery = self
            .discovery
            .take()
            .ok_or(Error::NotInitialized("discovery"))?;
        let transport = self
            .transport
            .take()
            .ok_or(Error::NotInitialized("transport"))?;
        let manager = self
            .manager
            .take()
            .unwrap_or_else(|| DEFAULT_FIELD_MANAGER.into());
        let cache = self.cache.take().unwrap_or_default();
        let mut resolver = Resolver::new(discovery, cache);
        if let Some(namespace) = self.namespace.take() {
            resolver = resolver.with_default_namespace(namespace);
        }
        Ok(Dynamic {
            resolver,
            applier: Applier::new(transport, manager)?,
        })
    }
}

impl<D, T> Dynamic<D, T> {
    pub fn new(resolver: Resolver<D>, applier: Applier<T>) -> Self {
        Self { resolver, applier }
    }

    pub fn builder() -> DynamicBuilder<D, T> {
        DynamicBuilder::default()
    }

    #[inline]
    pub fn resolver(&self) -> &Resolver<D> {
        &self.resolver
    }

    #[inline]
    pub fn applier(&self) -> &Applier<T> {
        &self.applier
    }
}

impl<D, T> Dynamic<D, T>
where
    D: Discovery,
    T: ApplyTransport,
{
    pub async fn resolve(&self, object: &DynamicObject) -> Result<Resolved> {
        self.resolver.resolve(object).await
    }

    /// Resolves `object` and applies it. The timeout in `params` covers both
    /// steps. `object` itself is left untouched whatever the outcome.
    #[tracing::instrument(level = "debug", skip_all, fields(name = ?object.metadata.name), err)]
    pub async fn apply(&self, object: &DynamicObject, params: &ApplyParams) -> Result<Applied> {
        let key = ObjectKey::from_object(ResourceDescriptor::from_object(object)?, object);
        with_timeout(params.timeout, &key, async {
            let Resolved { handle, object } = self.resolver.resolve(object).await?;
            let object = self.applier.send(&handle, &object, params).await?;
            Ok(Applied { handle, object })
        })
        .await
    }

    pub async fn apply_resource<K>(&self, resource: &K, params: &ApplyParams) -> Result<Applied>
    where
        K: Serialize,
    {
        self.apply(&to_dynamic(resource)?, params).await
    }
}
