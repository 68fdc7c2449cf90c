// Alpaca or question/content records -> instruction/input/output/system/history template

use anyhow::{bail, Result};
use log::{info, warn};

use super::{prepare_paths, write_split, SplitCounts};
use crate::args::AlpacaArgs;
use crate::config::{read_config, TemplateConfig};
use crate::records::{read_records, text_field, Record};
use crate::split::SplitConfig;
use crate::template::{AlpacaRecord, PromptTemplate};

/// The parts of an input record the template needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub question: String,
    pub content: String,
    pub reasoning: String,
}

/// Reads a record in either QA (`question`/`content`) or Alpaca (`instruction`/`output`) form.
///
/// For Alpaca records the question is `input` when it is non-empty, `instruction` otherwise.
pub fn extract(record: &Record) -> Option<Extracted> {
    if let (Some(question), Some(content)) =
        (text_field(record, "question"), text_field(record, "content"))
    {
        return Some(Extracted {
            question,
            content,
            reasoning: text_field(record, "reasoning_content").unwrap_or_default(),
        });
    }
    if let (Some(instruction), Some(content)) =
        (text_field(record, "instruction"), text_field(record, "output"))
    {
        let question = text_field(record, "input")
            .filter(|input| !input.is_empty())
            .unwrap_or(instruction);
        return Some(Extracted {
            question,
            content,
            reasoning: String::new(),
        });
    }
    None
}

pub fn run(args: &AlpacaArgs) -> Result<SplitCounts> {
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

    info!("Reading from {}", args.io.input.display());
    let records = read_records(&args.io.input)?;

    let counts = write_split(&args.io.output, records, split.as_ref(), |label, i, record| {
        let Some(item) = extract(record) else {
            warn!("{} record {} has an unsupported format. Skipping.", label, i + 1);
            return Ok(None);
        };
        let output = if include_reasoning && !item.reasoning.is_empty() {
            config.with_reasoning(&item.reasoning, &item.content)
        } else {
            item.content
        };
        Ok(Some(AlpacaRecord {
            instruction: template.render(&item.question)?,
            input: String::new(),
            output,
            system: template.system_prompt().to_string(),
            history: Vec::new(),
        }))
    })?;

    if counts.train == 0 {
        bail!("No training records were written to {}", args.io.output.display());
    }
    Ok(counts)
}
