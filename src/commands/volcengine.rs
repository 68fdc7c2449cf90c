// question/content records -> system/user/assistant messages with a loss weight

use anyhow::{bail, Result};
use log::{info, warn};

use super::{prepare_paths, write_converted};
use crate::args::VolcengineArgs;
use crate::config::{read_config, TemplateConfig};
use crate::records::{read_records, text_field};
use crate::template::PromptTemplate;

/// Loss weight put on every assistant message.
pub const ASSISTANT_LOSS_WEIGHT: f64 = 1.0;

pub fn run(args: &VolcengineArgs) -> Result<usize> {
    let config = read_config(TemplateConfig::plain(), args.template.config.as_deref(), None)?;
    let template = PromptTemplate::from_config(&config)?;
    prepare_paths(&args.io.input, &[&args.io.output])?;

    info!("Reading JSON from {}", args.io.input.display());
    let records = read_records(&args.io.input)?;

    let written = write_converted(&args.io.output, &records, "Template", |i, record| {
        let (Some(question), Some(content)) =
            (text_field(record, "question"), text_field(record, "content"))
        else {
            warn!(
                "Record {} missing required 'question' or 'content' field. Skipping.",
                i + 1
            );
            return Ok(None);
        };
        Ok(Some(template.conversation(
            &question,
            content,
            Some(ASSISTANT_LOSS_WEIGHT),
        )?))
    })?;
    if written == 0 {
        bail!("No records were written to {}", args.io.output.display());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{IoArgs, TemplateArgs};
    use crate::commands::test_support::{read_lines, write};
    use crate::config::DEFAULT_SYSTEM_PROMPT;

    fn args(dir: &std::path::Path) -> VolcengineArgs {
        VolcengineArgs {
            io: IoArgs {
                input: dir.join("in.json"),
                output: dir.join("out.jsonl"),
            },
            template: TemplateArgs { config: None },
        }
    }

    #[test]
    fn test_messages_shape() {
        let dir = tempfile::tempdir().unwrap();
        write(
            &dir.path().join("in.json"),
            r#"[{"question":"Good morning","content":"早上好"},{"question":"orphan"}]"#,
        );
        assert_eq!(run(&args(dir.path())).unwrap(), 1);
        let lines = read_lines(&dir.path().join("out.jsonl"));
        assert_eq!(lines.len(), 1);
        let messages = &lines[0]["messages"];
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], DEFAULT_SYSTEM_PROMPT);
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Good morning");
        assert_eq!(messages[2]["role"], "assistant");
        assert_eq!(messages[2]["content"], "早上好");
        assert_eq!(messages[2]["loss_weight"], 1.0);
        assert!(messages[1].get("loss_weight").is_none());
    }

    #[test]
    fn test_nothing_written_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("in.json"), r#"[{"title":"x"}]"#);
        assert!(run(&args(dir.path())).is_err());
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&args(dir.path())).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
