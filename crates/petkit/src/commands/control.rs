//! Device actions and settings.

use serde_json::Value;

use petkit_core::PetkitClient;

use crate::cli::{ControlArgs, GlobalOpts, SettingArgs};
use crate::error::CliError;
use crate::output;

fn parse_settings(raw: Option<&str>) -> Result<Option<Value>, CliError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(raw)? {
        obj @ Value::Object(_) => Ok(Some(obj)),
        other => Err(CliError::Validation {
            field: "settings".into(),
            reason: format!("expected a JSON object, got {other}"),
        }),
    }
}

/// JSON when it parses, otherwise the literal string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()))
}

pub async fn handle(
    client: &PetkitClient,
    args: ControlArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let settings = parse_settings(args.settings.as_deref())?;
    let result = client
        .control_device(args.id, &args.action, settings)
        .await?;
    output::print_output(&output::render_value(&global.output, &result), global.quiet);
    Ok(())
}

pub async fn handle_setting(
    client: &PetkitClient,
    args: SettingArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = client
        .update_device_setting(args.id, &args.key, parse_value(&args.value))
        .await?;
    output::print_output(&output::render_value(&global.output, &result), global.quiet);
    Ok(())
}
