//! Marshaling between records and host state.
//!
//! Host state is a JSON object keyed by schema attribute names, with every
//! top-level attribute present (`null` when unset). Records are serialised
//! with serde and their keys renamed through the [`Schema`], so one record
//! type serves both the wire and the host.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use servicehooks::ServiceHooksError;

use crate::schema::{Attribute, AttributeKind, Schema};

/// Renders `record` as host state.
pub fn to_state<T: Serialize>(schema: &Schema, record: &T) -> Result<Value, ServiceHooksError> {
    let wire = serde_json::to_value(record).map_err(|e| invalid(schema, e.to_string()))?;
    let Value::Object(wire) = wire else {
        return Err(invalid(schema, "record did not serialise to an object"));
    };
    Ok(Value::Object(wire_to_state(schema.attributes, &wire)))
}

/// Parses host state (or a plan) into a record.
///
/// Unknown attributes are rejected; `null` attributes are treated as unset.
pub fn from_state<T: DeserializeOwned>(
    schema: &Schema,
    state: &Value,
) -> Result<T, ServiceHooksError> {
    let Value::Object(state) = state else {
        return Err(invalid(schema, "expected a JSON object"));
    };
    let wire = state_to_wire(schema, schema.attributes, state, "")?;
    serde_json::from_value(Value::Object(wire)).map_err(|e| invalid(schema, e.to_string()))
}

/// Rejects a plan that leaves required attributes unset.
pub fn check_required(schema: &Schema, plan: &Value) -> Result<(), ServiceHooksError> {
    let missing = schema.missing_required(plan);
    if missing.is_empty() {
        return Ok(());
    }
    Err(invalid(
        schema,
        format!("missing required attribute(s): {}", missing.join(", ")),
    ))
}

fn wire_to_state(attributes: &[Attribute], wire: &Map<String, Value>) -> Map<String, Value> {
    attributes
        .iter()
        .map(|attribute| {
            let value = match (attribute.kind, wire.get(attribute.wire_name)) {
                (AttributeKind::Object(children), Some(Value::Object(nested))) => {
                    Value::Object(wire_to_state(children, nested))
                }
                (_, Some(value)) => value.clone(),
                (_, None) => Value::Null,
            };
            (attribute.name.to_string(), value)
        })
        .collect()
}

fn state_to_wire(
    schema: &Schema,
    attributes: &[Attribute],
    state: &Map<String, Value>,
    path: &str,
) -> Result<Map<String, Value>, ServiceHooksError> {
    if let Some(unknown) = state
        .keys()
        .find(|key| !attributes.iter().any(|a| a.name == key.as_str()))
    {
        return Err(invalid(schema, format!("unknown attribute `{path}{unknown}`")));
    }

    let mut wire = Map::new();
    for attribute in attributes {
        let value = match (attribute.kind, state.get(attribute.name)) {
            (_, None | Some(Value::Null)) => continue,
            (AttributeKind::Object(children), Some(Value::Object(nested))) => {
                let path = format!("{path}{}.", attribute.name);
                Value::Object(state_to_wire(schema, children, nested, &path)?)
            }
            (_, Some(value)) => value.clone(),
        };
        wire.insert(attribute.wire_name.to_string(), value);
    }
    Ok(wire)
}

fn invalid(schema: &Schema, message: impl Into<String>) -> ServiceHooksError {
    ServiceHooksError::InvalidState {
        resource: schema.type_name,
        message: message.into(),
    }
}
