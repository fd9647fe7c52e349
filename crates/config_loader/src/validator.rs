//! 配置校验模块
//!
//! 校验规则：
//! - writer.name 非空且不含空白
//! - documents.base_url 可解析为带主机名的 http(s) URL
//! - documents.timeout_ms > 0
//! - observability.log_level 非空

use contracts::{ContractError, PublisherConfig};
use url::Url;

/// 校验 PublisherConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &PublisherConfig) -> Result<(), ContractError> {
    validate_writer(config)?;
    validate_documents(config)?;
    validate_observability(config)?;
    Ok(())
}

fn validate_writer(config: &PublisherConfig) -> Result<(), ContractError> {
    let name = &config.writer.name;
    if name.is_empty() {
        return Err(ContractError::config_validation(
            "writer.name",
            "writer name cannot be empty",
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ContractError::config_validation(
            "writer.name",
            format!("writer name '{name}' must not contain whitespace"),
        ));
    }
    Ok(())
}

fn validate_documents(config: &PublisherConfig) -> Result<(), ContractError> {
    let documents = &config.documents;

    let url = Url::parse(&documents.base_url).map_err(|e| {
        ContractError::config_validation(
            "documents.base_url",
            format!("base_url '{}' is not a valid URL: {e}", documents.base_url),
        )
    })?;
    let has_host = url.host_str().is_some_and(|host| !host.is_empty());
    if !matches!(url.scheme(), "http" | "https") || !has_host {
        return Err(ContractError::config_validation(
            "documents.base_url",
            format!(
                "base_url '{}' must be an http:// or https:// URL with a host",
                documents.base_url
            ),
        ));
    }

    if documents.timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "documents.timeout_ms",
            "timeout_ms must be > 0",
        ));
    }
    Ok(())
}

fn validate_observability(config: &PublisherConfig) -> Result<(), ContractError> {
    if config.observability.log_level.trim().is_empty() {
        return Err(ContractError::config_validation(
            "observability.log_level",
            "log_level cannot be empty",
        ));
    }
    Ok(())
}
