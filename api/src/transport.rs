use std::future::Future;

use kube::api::{DynamicObject, Patch, PatchParams};

use crate::{EndpointHandle, Error, Result};

/// Sends a server-side apply patch for the object `name` to the collection
/// behind `handle` and returns the object as the server stored it.
pub trait ApplyTransport: Send + Sync {
    fn apply(
        &self,
        handle: &EndpointHandle,
        name: &str,
        body: &serde_json::Value,
        params: &PatchParams,
    ) -> impl Future<Output = Result<DynamicObject>> + Send;
}

#[derive(Clone)]
pub struct KubeTransport {
    client: kube::Client,
}

impl KubeTransport {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

impl ApplyTransport for KubeTransport {
    #[tracing::instrument(
        level = "debug",
        skip(self, handle, body),
        fields(endpoint = %handle),
        err
    )]
    async fn apply(
        &self,
        handle: &EndpointHandle,
        name: &str,
        body: &serde_json::Value,
        params: &PatchParams,
    ) -> Result<DynamicObject> {
        handle
            .api(self.client.clone())
            .patch(name, params, &Patch::Apply(body))
            .await
            .map_err(|err| Error::from_apply(handle.object_key(Some(name)), err))
    }
}
