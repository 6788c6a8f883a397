use std::fmt;

use kube::api::{Api, DynamicObject};

use crate::{ObjectKey, ResourceDescriptor, ResourceMapping, ResourceScope};

/// A resolved collection, ready to receive requests.
#[derive(Clone, Debug)]
pub struct EndpointHandle {
    mapping: ResourceMapping,
    namespace: Option<String>,
}

impl EndpointHandle {
    /// Namespace-scoped mappings are bound to `namespace`; cluster-scoped
    /// mappings never are.
    pub(crate) fn new(mapping: ResourceMapping, namespace: &str) -> Self {
        let namespace = match mapping.scope {
            ResourceScope::Namespaced => Some(namespace.to_string()),
            ResourceScope::Cluster => None,
        };
        Self { mapping, namespace }
    }

    #[inline]
    pub fn mapping(&self) -> &ResourceMapping {
        &self.mapping
    }

    #[inline]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    #[inline]
    pub fn scope(&self) -> ResourceScope {
        self.mapping.scope
    }

    pub fn collection_path(&self) -> String {
        self.mapping.collection_path(self.namespace())
    }

    /// Key of the object `name` in this collection.
    pub fn object_key(&self, name: Option<&str>) -> ObjectKey {
        let resource = &self.mapping.resource;
        let key = ObjectKey::new(ResourceDescriptor::new(
            &resource.group,
            &resource.version,
            &resource.kind,
        ))
        .with_namespace(self.namespace());
        match name {
            Some(name) => key.with_name(name),
            None => key,
        }
    }

    pub fn api(&self, client: kube::Client) -> Api<DynamicObject> {
        match self.namespace() {
            Some(namespace) => Api::namespaced_with(client, namespace, &self.mapping.resource),
            None => Api::all_with(client, &self.mapping.resource),
        }
    }
}

impl fmt::Display for EndpointHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.collection_path())
    }
}
