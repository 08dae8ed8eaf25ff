use std::env;

use crate::error::{Result, SwarmError};

/// 开启调试输出的环境变量
pub const DEBUG_ENV: &str = "AGENTSWARM_DEBUG";

/// 环境变量配置管理
pub struct EnvConfig;

impl EnvConfig {
    /// 解析 API Key
    ///
    /// 优先级：
    /// 1. 直接传入的非空 key（非 `${VAR}` 形式）
    /// 2. `${VAR}` 形式时读取对应环境变量
    /// 3. 未传入时读取 provider 默认的环境变量
    pub fn resolve_api_key(api_key: Option<&str>, default_env_var: Option<&str>) -> Option<String> {
        match api_key.map(str::trim).filter(|key| !key.is_empty()) {
            Some(key) => match key.strip_prefix("${").and_then(|k| k.strip_suffix('}')) {
                Some(var) => Self::get_env_optional(var),
                None => Some(key.to_string()),
            },
            None => default_env_var.and_then(Self::get_env_optional),
        }
    }

    /// 从环境变量获取值
    pub fn get_env(key: &str) -> Result<String> {
        env::var(key).map_err(|_| {
            SwarmError::Configuration(format!("environment variable '{}' is not set", key))
        })
    }

    /// 获取可选的环境变量，空字符串视为未设置
    pub fn get_env_optional(key: &str) -> Option<String> {
        env::var(key).ok().filter(|value| !value.is_empty())
    }

    /// 检查是否启用调试模式
    pub fn is_debug_mode() -> bool {
        env::var(DEBUG_ENV).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_key_wins() {
        let key = EnvConfig::resolve_api_key(Some("sk-direct"), Some("AGENTSWARM_TEST_UNSET"));
        assert_eq!(key.as_deref(), Some("sk-direct"));
    }

    #[test]
    fn placeholder_reads_named_variable() {
        env::set_var("AGENTSWARM_TEST_KEY", "from-env");
        let key = EnvConfig::resolve_api_key(Some("${AGENTSWARM_TEST_KEY}"), None);
        assert_eq!(key.as_deref(), Some("from-env"));
        env::remove_var("AGENTSWARM_TEST_KEY");
    }

    #[test]
    fn missing_key_falls_back_to_default_variable() {
        env::set_var("AGENTSWARM_TEST_DEFAULT", "fallback");
        assert_eq!(
            EnvConfig::resolve_api_key(None, Some("AGENTSWARM_TEST_DEFAULT")).as_deref(),
            Some("fallback")
        );
        assert_eq!(
            EnvConfig::resolve_api_key(Some("  "), Some("AGENTSWARM_TEST_DEFAULT")).as_deref(),
            Some("fallback")
        );
        env::remove_var("AGENTSWARM_TEST_DEFAULT");
    }

    #[test]
    fn get_env_reports_missing_variable() {
        let err = EnvConfig::get_env("AGENTSWARM_TEST_DEFINITELY_UNSET").unwrap_err();
        assert!(matches!(err, SwarmError::Configuration(_)));
    }
}
