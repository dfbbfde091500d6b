use anyhow::{Context, Result};
use clap::Parser;
use privacy_export::logging::export_span;
use privacy_export::validation::format_messages;
use privacy_export::{
    CliArgs, Command, DirectoryStorage, ExportConfig, ExportRenderer, JsonRenderer, LoggingConfig,
    Validator, init_logging,
};
use serde_json::{Map, Value};
use std::path::Path;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    let logging_config = LoggingConfig::from_env();
    let _guard = init_logging(logging_config)?;

    let cli = CliArgs::parse();
    let command = cli.command.clone();
    let config = ExportConfig::from_args(cli)?;

    match command {
        Command::Validate { data } => {
            let payload = load_payload(&data)?;
            Ok(validate_payload(&config, &payload)?)
        }
        Command::Render {
            data,
            file_name,
            with_json,
        } => {
            let payload = load_payload(&data)?;
            if validate_payload(&config, &payload)? != ExitCode::SUCCESS {
                return Ok(ExitCode::from(2));
            }

            let file_name = match file_name {
                Some(name) => name,
                None => data
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .context("cannot derive an output file name from the payload path")?
                    .to_string(),
            };
            let span = export_span(&file_name);
            let _entered = span.enter();

            let context = config.presentation_context();
            let renderer = config.html_renderer(&context)?;
            let storage = DirectoryStorage::new(&config.output_dir);

            let path = renderer.save_data(&storage, &file_name, &payload)?;
            println!("{}", path.display());
            if with_json {
                let path = JsonRenderer.save_data(&storage, &file_name, &payload)?;
                println!("{}", path.display());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_payload(path: &Path) -> Result<Map<String, Value>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read payload {:?}", path))?;
    match serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse payload {:?}", path))?
    {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("payload must be a JSON object, got {}", kind_of(&other)),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn validate_payload(config: &ExportConfig, payload: &Map<String, Value>) -> Result<ExitCode> {
    let mut validator = config.rules.validator()?;
    let value = Value::Object(payload.clone());
    if validator.is_valid(&value) {
        tracing::info!(validators = validator.len(), "payload is valid");
        return Ok(ExitCode::SUCCESS);
    }

    for line in format_messages(validator.messages()) {
        eprintln!("{line}");
    }
    tracing::warn!(
        message_keys = validator.messages().len(),
        "payload failed validation"
    );
    Ok(ExitCode::from(2))
}
