//! In-memory API server used by the unit tests. It tracks which manager owns
//! which field the way server-side apply does, closely enough to exercise
//! conflicts, forced takeovers and field removal.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kube::api::{DynamicObject, PatchParams};
use kube::discovery::ApiResource;
use serde_json::{Map, Value};

use crate::{
    ApplyTransport, Discovery, EndpointHandle, Error, ObjectKey, ResourceDescriptor,
    ResourceMapping, ResourceScope, Result,
};

pub fn api_resource(group: &str, version: &str, kind: &str, plural: &str) -> ApiResource {
    ApiResource {
        group: group.to_string(),
        version: version.to_string(),
        api_version: ResourceDescriptor::new(group, version, kind).api_version(),
        kind: kind.to_string(),
        plural: plural.to_string(),
    }
}

pub fn deployment(name: &str) -> DynamicObject {
    serde_json::from_value(serde_json::json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": { "name": name },
        "spec": {
            "replicas": 2,
            "selector": { "matchLabels": { "app": "demo" } },
            "template": {
                "metadata": { "labels": { "app": "demo" } },
                "spec": {
                    "containers": [{ "name": "web", "image": "nginx:1.12" }]
                }
            }
        }
    }))
    .unwrap()
}

pub fn cluster_role(name: &str) -> DynamicObject {
    serde_json::from_value(serde_json::json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "ClusterRole",
        "metadata": { "name": name },
        "rules": [{ "apiGroups": [""], "resources": ["pods"], "verbs": ["get"] }]
    }))
    .unwrap()
}

#[derive(Clone, Debug, Default)]
struct Stored {
    object: Value,
    owners: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Clone, Default)]
pub struct FakeCluster {
    mappings: HashMap<ResourceDescriptor, ResourceMapping>,
    objects: Arc<Mutex<HashMap<(String, String), Stored>>>,
    discovery_calls: Arc<AtomicUsize>,
    unavailable: Arc<AtomicBool>,
    latency: Option<Duration>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
            .with_kind("apps", "v1", "Deployment", "deployments", ResourceScope::Namespaced)
            .with_kind("", "v1", "ConfigMap", "configmaps", ResourceScope::Namespaced)
            .with_kind("", "v1", "Namespace", "namespaces", ResourceScope::Cluster)
            .with_kind(
                "rbac.authorization.k8s.io",
                "v1",
                "ClusterRole",
                "clusterroles",
                ResourceScope::Cluster,
            )
    }

    pub fn with_kind(
        mut self,
        group: &str,
        version: &str,
        kind: &str,
        plural: &str,
        scope: ResourceScope,
    ) -> Self {
        self.mappings.insert(
            ResourceDescriptor::new(group, version, kind),
            ResourceMapping::new(api_resource(group, version, kind, plural), scope),
        );
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn discovery_calls(&self) -> usize {
        self.discovery_calls.load(Ordering::SeqCst)
    }

    pub fn object(&self, collection: &str, name: &str) -> Option<Value> {
        self.objects
            .lock()
            .unwrap()
            .get(&(collection.to_string(), name.to_string()))
            .map(|stored| stored.object.clone())
    }

    pub fn owners(&self, collection: &str, name: &str, pointer: &str) -> BTreeSet<String> {
        self.objects
            .lock()
            .unwrap()
            .get(&(collection.to_string(), name.to_string()))
            .and_then(|stored| stored.owners.get(pointer).cloned())
            .unwrap_or_default()
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl Discovery for FakeCluster {
    async fn discover(&self, descriptor: &ResourceDescriptor) -> Result<Option<ResourceMapping>> {
        self.discovery_calls.fetch_add(1, Ordering::SeqCst);
        self.delay().await;
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Transport {
                key: ObjectKey::new(descriptor.clone()),
                source: kube::Error::Service("connection refused".into()),
            });
        }
        Ok(self.mappings.get(descriptor).cloned())
    }
}

impl ApplyTransport for FakeCluster {
    async fn apply(
        &self,
        handle: &EndpointHandle,
        name: &str,
        body: &Value,
        params: &PatchParams,
    ) -> Result<DynamicObject> {
        self.delay().await;
        let key = handle.object_key(Some(name));
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Transport {
                key,
                source: kube::Error::Service("connection refused".into()),
            });
        }
        let manager = params.field_manager.clone().unwrap_or_default();

        let mut applied = BTreeMap::new();
        for (field, value) in body.as_object().into_iter().flatten() {
            if !matches!(field.as_str(), "apiVersion" | "kind" | "metadata") {
                flatten(&format!("/{}", escape(field)), value, &mut applied);
            }
        }

        let mut objects = self.objects.lock().unwrap();
        let id = (handle.collection_path(), name.to_string());
        let stored = objects.get(&id).cloned().unwrap_or_default();

        let conflicts = applied
            .iter()
            .filter(|(pointer, value)| {
                let foreign = stored
                    .owners
                    .get(*pointer)
                    .is_some_and(|owners| owners.iter().any(|owner| *owner != manager));
                foreign && stored.object.pointer(pointer) != Some(*value)
            })
            .map(|(pointer, _)| pointer.clone())
            .collect::<BTreeSet<_>>();
        if !conflicts.is_empty() && !params.force {
            let fields = conflicts.iter().cloned().collect::<Vec<_>>().join(", ");
            return Err(Error::Conflict {
                key,
                message: format!("Apply failed with {} conflicts: {fields}", conflicts.len()),
            });
        }

        let mut next = stored.clone();
        if next.object.is_null() {
            next.object = Value::Object(Map::new());
        }
        for (pointer, owners) in &stored.owners {
            if owners.contains(&manager) && !applied.contains_key(pointer) {
                let remaining = next.owners.entry(pointer.clone()).or_default();
                remaining.remove(&manager);
                if remaining.is_empty() {
                    next.owners.remove(pointer);
                    remove_pointer(&mut next.object, pointer);
                }
            }
        }
        for (pointer, value) in applied {
            set_pointer(&mut next.object, &pointer, value);
            let owners = next.owners.entry(pointer.clone()).or_default();
            if conflicts.contains(&pointer) {
                owners.clear();
            }
            owners.insert(manager.clone());
        }

        let object = next.object.as_object_mut().expect("stored objects are maps");
        for field in ["apiVersion", "kind"] {
            if let Some(value) = body.get(field) {
                object.insert(field.to_string(), value.clone());
            }
        }
        let mut metadata = Map::new();
        metadata.insert("name".to_string(), Value::from(name));
        if let Some(namespace) = handle.namespace() {
            metadata.insert("namespace".to_string(), Value::from(namespace));
        }
        object.insert("metadata".to_string(), Value::Object(metadata));

        let response = next.object.clone();
        if !params.dry_run {
            objects.insert(id, next);
        }
        Ok(serde_json::from_value(response).unwrap())
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn flatten(pointer: &str, value: &Value, out: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (field, value) in map {
                flatten(&format!("{pointer}/{}", escape(field)), value, out);
            }
        }
        value => {
            out.insert(pointer.to_string(), value.clone());
        }
    }
}

fn set_pointer(root: &mut Value, pointer: &str, value: Value) {
    let segments = pointer.split('/').skip(1).map(unescape).collect::<Vec<_>>();
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut current = root;
    for segment in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = current
            .as_object_mut()
            .unwrap()
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    current.as_object_mut().unwrap().insert(last.clone(), value);
}

fn remove_pointer(root: &mut Value, pointer: &str) {
    let Some((parent, last)) = pointer.rsplit_once('/') else {
        return;
    };
    if let Some(Value::Object(map)) = root.pointer_mut(parent) {
        map.remove(&unescape(last));
    }
}
