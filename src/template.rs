// Output shapes of the template converters and rendering of the user prompt
//
use minijinja::{context, Environment, Error, Template};
use serde::{Deserialize, Serialize};

use crate::config::TemplateConfig;

#[derive(Clone, Deserialize, Serialize, Debug, PartialEq)]
pub struct TextMessage {
    pub role: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub loss_weight: Option<f64>,
}

impl TextMessage {
    pub fn new(role: &str, content: String) -> Self {
        Self {
            role: role.to_string(),
            content,
            loss_weight: None,
        }
    }

    pub fn weighted(mut self, loss_weight: f64) -> Self {
        self.loss_weight = Some(loss_weight);
        self
    }
}

/// `{"messages": [...]}` record for chat-style training.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq)]
pub struct Conversation {
    pub messages: Vec<TextMessage>,
}

/// Alpaca-style record with an always-empty history.
#[derive(Clone, Deserialize, Serialize, Debug, PartialEq)]
pub struct AlpacaRecord {
    pub instruction: String,
    pub input: String,
    pub output: String,
    pub system: String,
    pub history: Vec<Vec<String>>,
}

#[derive(Clone)]
pub struct PromptTemplate {
    template: Template<'static, 'static>,
    system_prompt: String,
}

impl PromptTemplate {
    pub fn new(template: String, system_prompt: String) -> Result<Self, Error> {
        let env = Box::new(Environment::new());

        let template_str = template.into_boxed_str();

        // leaking env and template_str as read-only, static resources for the whole run.
        let template = Box::leak(env).template_from_str(Box::leak(template_str))?;

        Ok(Self {
            template,
            system_prompt,
        })
    }

    pub fn from_config(config: &TemplateConfig) -> Result<Self, Error> {
        Self::new(config.user_template.clone(), config.system_prompt.clone())
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Renders the user prompt for `question`.
    pub fn render(&self, question: &str) -> Result<String, Error> {
        self.template.render(context! { question })
    }

    /// Builds the system / user / assistant conversation.
    pub fn conversation(
        &self,
        question: &str,
        answer: String,
        loss_weight: Option<f64>,
    ) -> Result<Conversation, Error> {
        let mut assistant = TextMessage::new("assistant", answer);
        if let Some(weight) = loss_weight {
            assistant = assistant.weighted(weight);
        }
        Ok(Conversation {
            messages: vec![
                TextMessage::new("system", self.system_prompt.clone()),
                TextMessage::new("user", self.render(question)?),
                assistant,
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_SYSTEM_PROMPT, TRANSLATION_USER_TEMPLATE};

    #[test]
    fn test_render_translation_prompt() {
        let template = PromptTemplate::new(
            TRANSLATION_USER_TEMPLATE.to_string(),
            DEFAULT_SYSTEM_PROMPT.to_string(),
        )
        .unwrap();
        let result = template.render("Hello <world> & \"friends\"").unwrap();
        // no html escaping on plain string templates
        assert_eq!(result, "将「Hello <world> & \"friends\"」翻译成中文");
    }

    #[test]
    fn test_invalid_template_is_an_error() {
        assert!(PromptTemplate::new("{{ question ".to_string(), String::new()).is_err());
    }

    #[test]
    fn test_conversation_serialization() {
        let template = PromptTemplate::new("{{ question }}".to_string(), "sys".to_string()).unwrap();
        let conv = template
            .conversation("q", "a".to_string(), Some(1.0))
            .unwrap();
        let json = serde_json::to_string(&conv).unwrap();
        assert_eq!(
            json,
            r#"{"messages":[{"role":"system","content":"sys"},{"role":"user","content":"q"},{"role":"assistant","content":"a","loss_weight":1.0}]}"#
        );
    }

    #[test]
    fn test_alpaca_serialization_order() {
        let record = AlpacaRecord {
            instruction: "i".to_string(),
            input: String::new(),
            output: "o".to_string(),
            system: "s".to_string(),
            history: Vec::new(),
        };
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"instruction":"i","input":"","output":"o","system":"s","history":[]}"#
        );
    }
}
