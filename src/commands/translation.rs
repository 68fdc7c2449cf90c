// question/content/reasoning_content records -> translation messages, optionally split

use anyhow::{bail, Result};
use log::{info, warn};

use super::{prepare_paths, write_split, SplitCounts};
use crate::args::TranslationArgs;
use crate::config::{read_config, TemplateConfig};
use crate::records::{read_records, text_field};
use crate::split::SplitConfig;
use crate::template::PromptTemplate;

pub fn run(args: &TranslationArgs) -> Result<SplitCounts> {
    let split = SplitConfig::new(
        args.split.validation_split,
        args.split.validation_output.clone(),
        args.split.random_seed,
    )?;
    let config = read_config(
        TemplateConfig::translation(),
        args.template.config.as_deref(),
        args.system_prompt.as_deref(),
    )?;
    let template = PromptTemplate::from_config(&config)?;
    let include_reasoning = !args.no_reasoning;

    let mut outputs = vec![args.io.output.as_path()];
    if let Some(split) = &split {
        outputs.push(split.validation_output.as_path());
    }
    prepare_paths(&args.io.input, &outputs)?;

    info!("Reading JSON from {}", args.io.input.display());
    let records = read_records(&args.io.input)?;

    let counts = write_split(&args.io.output, records, split.as_ref(), |label, i, record| {
        let (Some(question), Some(content)) =
            (text_field(record, "question"), text_field(record, "content"))
        else {
            warn!(
                "{} record {} missing required 'question' or 'content' field. Skipping.",
                label,
                i + 1
            );
            return Ok(None);
        };
        let answer = if include_reasoning {
            let reasoning = text_field(record, "reasoning_content").unwrap_or_else(|| {
                warn!(
                    "{} record {} missing 'reasoning_content' field. Using empty reasoning.",
                    label,
                    i + 1
                );
                String::new()
            });
            config.with_reasoning(&reasoning, &content)
        } else {
            content
        };
        Ok(Some(template.conversation(&question, answer, None)?))
    })?;

    if counts.train == 0 {
        bail!("No training records were written to {}", args.io.output.display());
    }
    Ok(counts)
}
