use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SwarmError};

pub type ToolParams = Map<String, Value>;
pub type ToolParameters = BTreeMap<String, ToolParameter>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParameterType {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            ParameterType::String => value.is_string(),
            ParameterType::Number => value.is_number(),
            ParameterType::Boolean => value.is_boolean(),
            ParameterType::Array => value.is_array(),
            ParameterType::Object => value.is_object(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolParameter {
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "enum", skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl ToolParameter {
    pub fn new<D: Into<String>>(kind: ParameterType, description: D) -> Self {
        Self {
            kind,
            description: description.into(),
            required: false,
            allowed: None,
        }
    }

    pub fn string<D: Into<String>>(description: D) -> Self {
        Self::new(ParameterType::String, description)
    }

    pub fn boolean<D: Into<String>>(description: D) -> Self {
        Self::new(ParameterType::Boolean, description)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok<T: Into<String>>(output: T) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    pub fn failure<E: Into<String>>(error: E) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }
}

/// 从回复文本中解析出的工具调用；执行后挂上 `result`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    pub tool_name: String,
    pub parameters: ToolParams,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ToolResult>,
}

impl ToolCall {
    pub fn new<T: Into<String>>(tool_name: T, parameters: ToolParams) -> Self {
        Self {
            tool_name: tool_name.into(),
            parameters,
            result: None,
        }
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn parameters(&self) -> ToolParameters;
    async fn execute(&self, params: &ToolParams) -> Result<ToolResult>;
}

pub type DynTool = Arc<dyn Tool>;

/// 按声明的参数表校验必填项、类型和枚举值
pub fn validate_params(tool: &dyn Tool, params: &ToolParams) -> Result<()> {
    for (name, spec) in tool.parameters() {
        match params.get(&name) {
            None | Some(Value::Null) if spec.required => {
                return Err(SwarmError::tool(
                    tool.name(),
                    format!("missing required parameter `{}`", name),
                ));
            }
            None | Some(Value::Null) => {}
            Some(value) => {
                if !spec.kind.accepts(value) {
                    return Err(SwarmError::tool(
                        tool.name(),
                        format!("parameter `{}` must be of type {:?}", name, spec.kind),
                    ));
                }
                if let (Some(allowed), Some(text)) = (&spec.allowed, value.as_str()) {
                    if !allowed.iter().any(|option| option == text) {
                        return Err(SwarmError::tool(
                            tool.name(),
                            format!("parameter `{}` must be one of {:?}", name, allowed),
                        ));
                    }
                }
            }
        }
    }
    Ok(())
}

type ToolHandler = Arc<dyn Fn(ToolParams) -> BoxFuture<'static, Result<ToolResult>> + Send + Sync>;

/// 以闭包实现的工具
#[derive(Clone)]
pub struct FnTool {
    name: String,
    description: String,
    parameters: ToolParameters,
    handler: ToolHandler,
}

impl FnTool {
    pub fn new<N, D, F, Fut>(name: N, description: D, handler: F) -> Self
    where
        N: Into<String>,
        D: Into<String>,
        F: Fn(ToolParams) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResult>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: ToolParameters::new(),
            handler: Arc::new(move |params| Box::pin(handler(params))),
        }
    }

    pub fn with_parameter<N: Into<String>>(mut self, name: N, parameter: ToolParameter) -> Self {
        self.parameters.insert(name.into(), parameter);
        self
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> ToolParameters {
        self.parameters.clone()
    }

    async fn execute(&self, params: &ToolParams) -> Result<ToolResult> {
        (self.handler)(params.clone()).await
    }
}
