use std::future::Future;
use std::time::Duration;

use kube::api::{DynamicObject, PatchParams};

use crate::{
    ApplyTransport, EndpointHandle, Error, ObjectKey, ObjectMetaExt, ResourceDescriptor,
    ResourceNameExt, Result,
};

#[derive(Clone, Debug, Default)]
pub struct ApplyParams {
    /// Take over fields owned by other managers instead of failing.
    pub force: bool,
    pub dry_run: bool,
    pub timeout: Option<Duration>,
}

impl ApplyParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub(crate) async fn with_timeout<F, T>(
    timeout: Option<Duration>,
    key: &ObjectKey,
    future: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout {
        Some(duration) => tokio::time::timeout(duration, future)
            .await
            .map_err(|_| Error::Timeout {
                key: key.clone(),
                timeout: duration,
            })?,
        None => future.await,
    }
}

/// Server-side applies objects under one field manager.
pub struct Applier<T> {
    transport: T,
    manager: String,
}

impl<T> Applier<T> {
    pub fn new(transport: T, manager: impl ToString) -> Result<Self> {
        let manager = manager.to_string();
        if manager.is_empty() {
            return Err(Error::EmptyFieldManager);
        }
        Ok(Self { transport, manager })
    }

    #[inline]
    pub fn manager(&self) -> &str {
        &self.manager
    }

    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn patch_params(&self, params: &ApplyParams) -> PatchParams {
        let mut patch_params = PatchParams::apply(&self.manager);
        patch_params.dry_run = params.dry_run;
        if params.force {
            patch_params = patch_params.force();
        }
        patch_params
    }
}

/// The JSON sent to the server: system metadata stripped and the namespace
/// matching the handle, absent for cluster-scoped handles.
pub fn wire_body(handle: &EndpointHandle, object: &DynamicObject) -> Result<serde_json::Value> {
    let serialization = |source| Error::Serialization {
        key: handle.object_key(object.metadata.name.as_deref()),
        source,
    };
    let mut json = serde_json::to_value(object).map_err(serialization)?;
    let Some(body) = json.as_object_mut() else {
        return Err(Error::expected_json_type("object", &json));
    };
    let mut metadata = object.metadata.strip_system();
    metadata.namespace = handle.namespace().map(str::to_string);
    body.insert(
        "metadata".to_string(),
        serde_json::to_value(metadata).map_err(serialization)?,
    );
    Ok(json)
}

impl<T> Applier<T>
where
    T: ApplyTransport,
{
    /// Upserts `object` at `handle` and returns the server's view of it
    /// after the merge.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(endpoint = %handle, manager = %self.manager),
        err
    )]
    pub async fn apply(
        &self,
        handle: &EndpointHandle,
        object: &DynamicObject,
        params: &ApplyParams,
    ) -> Result<DynamicObject> {
        let key = handle.object_key(object.metadata.name.as_deref());
        with_timeout(params.timeout, &key, self.send(handle, object, params)).await
    }

    pub(crate) async fn send(
        &self,
        handle: &EndpointHandle,
        object: &DynamicObject,
        params: &ApplyParams,
    ) -> Result<DynamicObject> {
        let name = object.name()?;
        let body = wire_body(handle, object)?;
        let applied = self
            .transport
            .apply(handle, name, &body, &self.patch_params(params))
            .await?;
        let descriptor = ResourceDescriptor::from_object(&applied);
        match descriptor {
            Ok(descriptor) => tracing::info!(
                "Applied {}",
                ObjectKey::from_object(descriptor, &applied)
            ),
            Err(_) => tracing::info!("Applied {name}"),
        }
        Ok(applied)
    }
}
