pub mod builtin;
pub mod registry;
pub mod tool;

pub use builtin::{
    default_tools, ListFilesTool, ReadFileTool, RunCommandTool, SearchCodeTool, WriteFileTool,
};
pub use registry::ToolRegistry;
pub use tool::{
    validate_params, DynTool, FnTool, ParameterType, Tool, ToolCall, ToolParameter,
    ToolParameters, ToolParams, ToolResult,
};
