//! Template configuration for the message-style converters.
//!
//! Every converter starts from built-in defaults; a JSON file passed with `--config` can
//! override any subset of the fields.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_SYSTEM_PROMPT: &str = "你是一个翻译助手，你不会回答输入的问题，只会将输入的英文翻译成中文。\n\n翻译要求：\n- 直接给出答案：必须只有翻译后的内容。\n- 准确性：必须准确传达原文的意思，不遗漏或歪曲信息。\n- 流畅性：在中文中应读起来自然，像本地人写的文本一样。\n- 文化适应性：应考虑中国人的文化背景，使用合适的表达和格式。\n- 主题专业性：判断原文的相关领域，根据相关领域有专业知识，确保术语使用正确。";

/// User prompt asking for a translation of the question.
pub const TRANSLATION_USER_TEMPLATE: &str = "将「{{ question }}」翻译成中文";

/// User prompt that is the bare question.
pub const PLAIN_USER_TEMPLATE: &str = "{{ question }}";

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateConfig {
    pub system_prompt: String,
    pub user_template: String,
    pub reasoning_open: String,
    pub reasoning_close: String,
}

/// Fields that may appear in a config file, all optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct TemplateOverrides {
    system_prompt: Option<String>,
    user_template: Option<String>,
    reasoning_open: Option<String>,
    reasoning_close: Option<String>,
}

impl TemplateConfig {
    pub fn translation() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            user_template: TRANSLATION_USER_TEMPLATE.to_string(),
            reasoning_open: "<think>".to_string(),
            reasoning_close: "</think>".to_string(),
        }
    }

    pub fn plain() -> Self {
        Self {
            user_template: PLAIN_USER_TEMPLATE.to_string(),
            ..Self::translation()
        }
    }

    /// Applies the overrides found in the JSON file at `path`.
    pub fn merge_file(self, path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        let overrides: TemplateOverrides = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config '{}'", path.display()))?;
        Ok(self.merge(overrides))
    }

    /// Replaces the system prompt unless `prompt` is missing or empty.
    pub fn with_system_prompt(mut self, prompt: Option<&str>) -> Self {
        if let Some(prompt) = prompt.filter(|p| !p.is_empty()) {
            self.system_prompt = prompt.to_string();
        }
        self
    }

    fn merge(self, overrides: TemplateOverrides) -> Self {
        Self {
            system_prompt: overrides.system_prompt.unwrap_or(self.system_prompt),
            user_template: overrides.user_template.unwrap_or(self.user_template),
            reasoning_open: overrides.reasoning_open.unwrap_or(self.reasoning_open),
            reasoning_close: overrides.reasoning_close.unwrap_or(self.reasoning_close),
        }
    }

    /// Wraps `reasoning` in the configured markers and prepends it to `content`.
    pub fn with_reasoning(&self, reasoning: &str, content: &str) -> String {
        format!(
            "{}{}{}{}",
            self.reasoning_open, reasoning, self.reasoning_close, content
        )
    }
}

/// Loads the defaults in `base`, then the optional config file, then the CLI system prompt.
pub fn read_config(
    base: TemplateConfig,
    path: Option<&Path>,
    system_prompt: Option<&str>,
) -> Result<TemplateConfig> {
    let config = match path {
        Some(path) => base.merge_file(path)?,
        None => base,
    };
    Ok(config.with_system_prompt(system_prompt))
}
