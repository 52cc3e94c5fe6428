//! Query tree -> JSON conversion for `rql parse --json`

use serde_json::{Map, json};

use crate::{QueryNode, SortOrder, Value};

/// Convert a typed literal to JSON, keeping its RQL type name
pub fn value_to_json(v: &Value) -> serde_json::Value {
    let data = match v {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Char(c) => json!(c.to_string()),
        Value::String(s) | Value::Uri(s) => json!(s),
        Value::I8(n) => json!(n),
        Value::I16(n) => json!(n),
        Value::I32(n) => json!(n),
        Value::I64(n) => json!(n),
        Value::U8(n) => json!(n),
        Value::U16(n) => json!(n),
        Value::U32(n) => json!(n),
        Value::U64(n) => json!(n),
        Value::Float(f) => serde_json::Number::from_f64(f64::from(*f))
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Double(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        // Text keeps decimals and instants exact
        Value::Decimal(_) | Value::DateTime(_) | Value::TimeSpan(_) | Value::Binary(_) => {
            json!(v.to_string())
        }
        Value::Guid(g) => json!(g.to_string()),
    };
    json!({ "type": v.type_name(), "value": data })
}

/// Convert a query tree to JSON: one object per node with an `op` tag
pub fn node_to_json(node: &QueryNode) -> serde_json::Value {
    let mut object = Map::new();
    object.insert("op".to_string(), json!(node.operation().as_str()));

    match node {
        QueryNode::Noop | QueryNode::Distinct | QueryNode::First | QueryNode::One => {}
        QueryNode::Limit(limit) => {
            if let Some(start) = limit.start {
                object.insert("start".to_string(), json!(start));
            }
            object.insert("count".to_string(), json!(limit.count));
        }
        QueryNode::Select(properties) => {
            let paths: Vec<String> = properties.iter().map(|p| p.path()).collect();
            object.insert("properties".to_string(), json!(paths));
        }
        QueryNode::Sort(keys) => {
            let keys: Vec<serde_json::Value> = keys
                .iter()
                .map(|k| {
                    let order = match k.order {
                        SortOrder::Ascending => "asc",
                        SortOrder::Descending => "desc",
                    };
                    json!({ "property": k.property.path(), "order": order })
                })
                .collect();
            object.insert("keys".to_string(), json!(keys));
        }
        QueryNode::And(nodes) | QueryNode::Or(nodes) => {
            let nodes: Vec<serde_json::Value> = nodes.iter().map(node_to_json).collect();
            object.insert("nodes".to_string(), json!(nodes));
        }
        QueryNode::Compare {
            property, value, ..
        }
        | QueryNode::Match {
            property,
            pattern: value,
            ..
        } => {
            object.insert("property".to_string(), json!(property.path()));
            object.insert("value".to_string(), value_to_json(value));
        }
        QueryNode::Membership {
            property, values, ..
        } => {
            let values: Vec<serde_json::Value> = values.iter().map(value_to_json).collect();
            object.insert("property".to_string(), json!(property.path()));
            object.insert("values".to_string(), json!(values));
        }
        QueryNode::Count(property) => {
            if let Some(property) = property {
                object.insert("property".to_string(), json!(property.path()));
            }
        }
        QueryNode::Values(property) | QueryNode::Function { property, .. } => {
            object.insert("property".to_string(), json!(property.path()));
        }
        QueryNode::Aggregate { groups, functions } => {
            let groups: Vec<String> = groups.iter().map(|p| p.path()).collect();
            let functions: Vec<serde_json::Value> = functions.iter().map(node_to_json).collect();
            object.insert("groups".to_string(), json!(groups));
            object.insert("functions".to_string(), json!(functions));
        }
    }

    serde_json::Value::Object(object)
}
