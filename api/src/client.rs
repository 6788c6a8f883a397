use std::sync::Arc;

use hyper_util::{client::legacy::Client as HttpClient, rt::TokioExecutor};
use kube::api::DynamicObject;
use kube::client::ConfigExt as _;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{BoxError, trace::TraceLayer};

use crate::{
    Applied, ApplyParams, ClientBuildError, DEFAULT_FIELD_MANAGER, Dynamic, KubeDiscovery,
    KubeTransport, MappingCache, Resolved, Result,
};

pub type KubeDynamic = Dynamic<KubeDiscovery, KubeTransport>;

/// A cluster connection that resolves and applies dynamic objects.
#[derive(Clone)]
pub struct Client {
    name: String,
    kube: kube::Client,
    dynamic: Arc<KubeDynamic>,
}

#[derive(Default)]
pub struct ClientBuilder {
    name: Option<String>,
    namespace: Option<String>,
    config: Option<kube::Config>,
    cache: Option<Arc<MappingCache>>,
}

impl ClientBuilder {
    /// Field manager the applies are attributed to.
    pub fn name(&mut self, name: impl ToString) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    /// Namespace given to namespace-scoped objects that have none.
    pub fn namespace(&mut self, namespace: impl ToString) -> &mut Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    pub fn config(&mut self, config: kube::Config) -> &mut Self {
        self.config = Some(config);
        self
    }

    pub fn cache(&mut self, cache: Arc<MappingCache>) -> &mut Self {
        self.cache = Some(cache);
        self
    }

    pub async fn build(&mut self) -> Result<Client, ClientBuildError> {
        let config = if let Some(config) = self.config.take() {
            config
        } else {
            kube::Config::infer().await?
        };
        let kube_service = ServiceBuilder::new()
            .layer(config.base_uri_layer())
            .option_layer(config.auth_layer()?)
            .layer(TraceLayer::new_for_http())
            .map_err(BoxError::from)
            .service(
                HttpClient::builder(TokioExecutor::new()).build(config.rustls_https_connector()?),
            );
        let kube_client = kube::Client::new(kube_service, config.default_namespace);
        self.build_with(kube_client)
    }

    /// Builds on top of an existing kube client instead of inferring a
    /// configuration.
    pub fn build_with(&mut self, kube: kube::Client) -> Result<Client, ClientBuildError> {
        let name = self
            .name
            .take()
            .unwrap_or_else(|| DEFAULT_FIELD_MANAGER.into());
        let mut builder = Dynamic::builder();
        builder
            .discovery(KubeDiscovery::new(kube.clone()))
            .transport(KubeTransport::new(kube.clone()))
            .field_manager(&name);
        if let Some(namespace) = self.namespace.take() {
            builder.namespace(namespace);
        }
        if let Some(cache) = self.cache.take() {
            builder.cache(cache);
        }
        Ok(Client {
            name,
            kube,
            dynamic: Arc::new(builder.build()?),
        })
    }
}

impl Client {
    pub async fn infer() -> Result<Client, ClientBuildError> {
        Self::builder().build().await
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kube(&self) -> &kube::Client {
        &self.kube
    }

    #[inline]
    pub fn dynamic(&self) -> &KubeDynamic {
        &self.dynamic
    }

    #[inline]
    pub fn default_namespace(&self) -> &str {
        self.dynamic.resolver().default_namespace()
    }

    pub async fn resolve(&self, object: &DynamicObject) -> Result<Resolved> {
        self.dynamic.resolve(object).await
    }

    pub async fn apply(&self, object: &DynamicObject, params: &ApplyParams) -> Result<Applied> {
        self.dynamic.apply(object, params).await
    }

    pub async fn apply_resource<K>(&self, resource: &K, params: &ApplyParams) -> Result<Applied>
    where
        K: Serialize,
    {
        self.dynamic.apply_resource(resource, params).await
    }
}
