use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, SwarmError};
use crate::tools::builtin::default_tools;
use crate::tools::tool::{DynTool, Tool};

/// 按名称索引的工具表，供配置文件按名称引用工具
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, DynTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for tool in default_tools() {
            registry.register(tool);
        }
        registry
    }

    pub fn register(&mut self, tool: DynTool) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) {
        self.register(Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<DynTool> {
        self.tools.get(name).map(Arc::clone)
    }

    pub fn resolve(&self, names: &[String]) -> Result<Vec<DynTool>> {
        names
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| SwarmError::Configuration(format!("unknown tool `{}`", name)))
            })
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
