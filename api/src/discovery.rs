use std::future::Future;

use kube::api::GroupVersionKind;

use crate::{Error, ObjectKey, ResourceDescriptor, ResourceMapping, Result};

/// Looks up where a kind is served. `Ok(None)` means the cluster does not
/// know the kind.
pub trait Discovery: Send + Sync {
    fn discover(
        &self,
        descriptor: &ResourceDescriptor,
    ) -> impl Future<Output = Result<Option<ResourceMapping>>> + Send;
}

/// Queries the API server's group/version resource list for one kind at a
/// time.
#[derive(Clone)]
pub struct KubeDiscovery {
    client: kube::Client,
}

impl KubeDiscovery {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

impl Discovery for KubeDiscovery {
    #[tracing::instrument(level = "debug", skip(self), err)]
    async fn discover(&self, descriptor: &ResourceDescriptor) -> Result<Option<ResourceMapping>> {
        let gvk = GroupVersionKind::from(descriptor);
        match kube::discovery::pinned_kind(&self.client, &gvk).await {
            Ok((resource, capabilities)) => Ok(Some(ResourceMapping::from_discovery(
                resource,
                &capabilities,
            ))),
            Err(kube::Error::Api(response)) if response.code == 404 => Ok(None),
            Err(kube::Error::Discovery(err)) => {
                tracing::debug!("{descriptor} not found: {err}");
                Ok(None)
            }
            Err(source) => Err(Error::Transport {
                key: ObjectKey::new(descriptor.clone()),
                source,
            }),
        }
    }
}
