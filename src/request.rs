//! JSON-RPC envelope construction.

use serde_json::{Map, Value, json};

use crate::client::ClientError;

/// Build a JSON-RPC 2.0 request string.
///
/// `options` entries are merged into the top level of the envelope, letting
/// callers attach engine-directed fields next to the standard ones. Reserved
/// envelope keys cannot be overridden.
pub(crate) fn build(
  id: u64,
  method: &str,
  params: &Value,
  options: Option<&Map<String, Value>>,
) -> Result<String, ClientError> {
  let mut envelope = json!({
    "jsonrpc": "2.0",
    "id": id,
    "method": method,
    "params": params,
  });

  if let Some(options) = options {
    let object = envelope.as_object_mut().expect("envelope is an object");
    for (key, value) in options {
      if object.contains_key(key) {
        return Err(ClientError::ReservedOption { key: key.clone() });
      }
      object.insert(key.clone(), value.clone());
    }
  }

  Ok(serde_json::to_string(&envelope)?)
}
