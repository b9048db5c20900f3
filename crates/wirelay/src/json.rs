// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversions between [`Value`] and `serde_json::Value`.
//!
//! JSON has no variant or char shape: variants render as
//! `{"discriminant": .., "payload": ..}` (the record form the encoder
//! accepts), chars as one-character strings.

use crate::encode::{DISCRIMINANT_KEY, PAYLOAD_KEY};
use crate::value::{Record, Value};
use serde_json::{Map, Number, Value as Json};

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => number_to_value(&n),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(fields) => Value::Record(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect::<Record>(),
            ),
        }
    }
}

impl From<Value> for Json {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(b),
            Value::Char(c) => Json::String(c.to_string()),
            Value::Int(v) => int_to_json(v),
            Value::Float(v) => Number::from_f64(v).map_or(Json::Null, Json::Number),
            Value::String(s) => Json::String(s),
            Value::List(items) => Json::Array(items.into_iter().map(Json::from).collect()),
            Value::Record(fields) => Json::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Json::from(v)))
                    .collect::<Map<_, _>>(),
            ),
            Value::Variant {
                discriminant,
                payload,
            } => {
                let mut object = Map::new();
                object.insert(
                    DISCRIMINANT_KEY.to_string(),
                    Json::from(discriminant.to_value()),
                );
                object.insert(PAYLOAD_KEY.to_string(), Json::from(*payload));
                Json::Object(object)
            }
        }
    }
}

fn number_to_value(n: &Number) -> Value {
    if let Some(v) = n.as_i64() {
        Value::Int(i128::from(v))
    } else if let Some(v) = n.as_u64() {
        Value::Int(i128::from(v))
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn int_to_json(v: i128) -> Json {
    if let Ok(v) = i64::try_from(v) {
        Json::Number(v.into())
    } else if let Ok(v) = u64::try_from(v) {
        Json::Number(v.into())
    } else {
        // Outside every wire integer; only reachable for hand-built values.
        Number::from_f64(v as f64).map_or(Json::Null, Json::Number)
    }
}
