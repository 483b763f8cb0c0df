// restapi-client/src/resource.rs
//! Object-level helpers on top of [`ApiClient::send_request`].
//!
//! These are the consumers of `id_attribute`, `copy_keys`,
//! `create_returns_object` and `write_returns_object`.

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::http::HttpTransport;
use serde::Serialize;
use serde_json::Value;

/// A remote object: the collection path it lives under, its id and its
/// last known state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiObject {
    pub path: String,
    pub id: String,
    pub data: Value,
}

impl ApiObject {
    /// `{path}/{id}`
    pub fn object_path(&self) -> String {
        object_path(&self.path, &self.id)
    }
}

fn object_path(path: &str, id: &str) -> String {
    format!("{}/{}", path, id)
}

/// Look up `id_attribute` (a `/`-separated path) in `value`.
/// Strings and numbers are accepted as ids.
pub fn extract_id(value: &Value, id_attribute: &str) -> Option<String> {
    let mut current = value;
    for key in id_attribute.split('/') {
        current = current.get(key)?;
    }
    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Overwrite `keys` in `target` with their values from `source`.
/// Keys missing from `source` are left alone.
pub fn apply_copy_keys(source: &Value, target: &mut Value, keys: &[String]) {
    let (Some(source), Some(target)) = (source.as_object(), target.as_object_mut()) else {
        return;
    };
    for key in keys {
        if let Some(value) = source.get(key) {
            target.insert(key.clone(), value.clone());
        }
    }
}

fn parse_object(body: &str) -> Result<Value, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::Resource("expected an object but the response body was empty".to_string()));
    }
    serde_json::from_str(body).map_err(|e| ApiError::Resource(format!("response is not valid JSON: {}", e)))
}

fn to_payload(data: &Value) -> Result<String, ApiError> {
    serde_json::to_string(data).map_err(|e| ApiError::Resource(e.to_string()))
}

impl<T: HttpTransport> ApiClient<T> {
    /// POST `data` to `path`.
    ///
    /// When the API returns created objects the response is taken as the
    /// object; otherwise the id must be present in `data` and the object
    /// is read back.
    pub async fn create_object(&self, path: &str, data: &Value) -> Result<ApiObject, ApiError> {
        let config = self.config();
        let body = self.send_request("POST", path, &to_payload(data)?).await?;

        if config.create_returns_object || config.write_returns_object {
            let returned = parse_object(&body)?;
            let id = extract_id(&returned, self.id_attribute())
                .or_else(|| extract_id(data, self.id_attribute()))
                .ok_or_else(|| {
                    ApiError::Resource(format!(
                        "'{}' not found in the created object",
                        self.id_attribute()
                    ))
                })?;
            return Ok(ApiObject {
                path: path.to_string(),
                id,
                data: returned,
            });
        }

        let id = extract_id(data, self.id_attribute()).ok_or_else(|| {
            ApiError::Resource(format!(
                "'{}' must be set in the payload when the API does not return created objects",
                self.id_attribute()
            ))
        })?;
        self.read_object(path, &id).await
    }

    pub async fn read_object(&self, path: &str, id: &str) -> Result<ApiObject, ApiError> {
        let body = self.send_request("GET", &object_path(path, id), "").await?;
        Ok(ApiObject {
            path: path.to_string(),
            id: id.to_string(),
            data: parse_object(&body)?,
        })
    }

    /// PUT `data` over `object`, carrying `copy_keys` across from the
    /// object's current state.
    pub async fn update_object(&self, object: &ApiObject, data: &Value) -> Result<ApiObject, ApiError> {
        let mut payload = data.clone();
        apply_copy_keys(&object.data, &mut payload, self.copy_keys());

        let body = self
            .send_request("PUT", &object.object_path(), &to_payload(&payload)?)
            .await?;

        if self.config().write_returns_object {
            return Ok(ApiObject {
                path: object.path.clone(),
                id: object.id.clone(),
                data: parse_object(&body)?,
            });
        }
        self.read_object(&object.path, &object.id).await
    }

    pub async fn delete_object(&self, object: &ApiObject) -> Result<(), ApiError> {
        self.send_request("DELETE", &object.object_path(), "").await?;
        Ok(())
    }
}
