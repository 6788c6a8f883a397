use kube::api::DynamicObject;
use serde::Serialize;

use crate::{Error, ResourceDescriptor, Result};

/// Converts a typed object (e.g. a `k8s_openapi` `Deployment`) into the
/// dynamic form the resolver works on. The encoding must carry `apiVersion`
/// and `kind`.
pub fn to_dynamic<K>(object: &K) -> Result<DynamicObject>
where
    K: Serialize,
{
    let encode = |source| Error::Encode {
        type_name: std::any::type_name::<K>(),
        source,
    };
    let json = serde_json::to_value(object).map_err(encode)?;
    if !json.is_object() {
        return Err(Error::expected_json_type("object", &json));
    }
    let object: DynamicObject = serde_json::from_value(json).map_err(encode)?;
    ResourceDescriptor::from_object(&object)?;
    Ok(object)
}
