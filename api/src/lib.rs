mod applier;
mod client;
mod descriptor;
mod discovery;
mod dynamic;
mod error;
mod handle;
mod mapping;
mod meta;
mod object;
mod resolver;
mod transport;

#[cfg(test)]
mod testing;

pub use k8s_openapi;
pub use kube;

pub use applier::{ApplyParams, Applier, wire_body};
pub use client::{Client, ClientBuilder, KubeDynamic};
pub use descriptor::ResourceDescriptor;
pub use discovery::{Discovery, KubeDiscovery};
pub use dynamic::{Applied, DEFAULT_FIELD_MANAGER, Dynamic, DynamicBuilder};
pub use error::{ClientBuildError, Error, Result};
pub use handle::EndpointHandle;
pub use mapping::{MappingCache, ResourceMapping, ResourceScope};
pub use meta::{ObjectKey, ObjectMetaExt, ResourceNameExt};
pub use object::to_dynamic;
pub use resolver::{DEFAULT_NAMESPACE, Resolved, Resolver};
pub use transport::{ApplyTransport, KubeTransport};

pub mod prelude {
    pub use super::{ObjectMetaExt, ResourceNameExt};
    pub use kube::{Resource, ResourceExt};
}
