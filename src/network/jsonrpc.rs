use crate::error::{FactomError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl Request {
    pub fn new(method: &str, id: u64, params: Option<Value>) -> Request {
        Request {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Value::from(id),
            method: method.to_string(),
            params,
        }
    }

    /// Decode `params` into a typed struct; missing params decode from `{}`
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T> {
        let params = self
            .params
            .clone()
            .unwrap_or_else(|| Value::Object(Default::default()));
        serde_json::from_value(params).map_err(|e| FactomError::Rpc {
            code: crate::network::INVALID_PARAMS,
            message: "Invalid params".to_string(),
            data: Some(e.to_string()),
        })
    }
}

/// Error object carried in a failed response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: &str, data: Option<Value>) -> RpcError {
        RpcError {
            code,
            message: message.to_string(),
            data,
        }
    }
}

impl From<RpcError> for FactomError {
    fn from(err: RpcError) -> Self {
        let data = err.data.map(|d| match d {
            Value::String(s) => s,
            other => other.to_string(),
        });
        FactomError::Rpc {
            code: err.code,
            message: err.message,
            data,
        }
    }
}

impl From<&FactomError> for RpcError {
    fn from(err: &FactomError) -> Self {
        match err {
            FactomError::Rpc {
                code,
                message,
                data,
            } => RpcError::new(*code, message, data.clone().map(Value::String)),
            other => RpcError::new(
                other.rpc_code(),
                error_message(other.rpc_code()),
                Some(Value::String(other.to_string())),
            ),
        }
    }
}

/// Standard message for a JSON-RPC error code
pub fn error_message(code: i64) -> &'static str {
    match code {
        crate::network::PARSE_ERROR => "Parse error",
        crate::network::INVALID_REQUEST => "Invalid Request",
        crate::network::METHOD_NOT_FOUND => "Method not found",
        crate::network::INVALID_PARAMS => "Invalid params",
        crate::network::INTERNAL_ERROR => "Internal error",
        _ => "Server error",
    }
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Response {
        Response {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: RpcError) -> Response {
        Response {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// The error object wins; an absent result decodes from `null`
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T> {
        if let Some(err) = self.error {
            return Err(err.into());
        }
        let result = self.result.unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(FactomError::from)
    }
}
