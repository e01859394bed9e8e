//! Action catalogue. Needs no account.

use serde::Serialize;
use strum::IntoEnumIterator;
use tabled::Tabled;

use petkit_core::Action;

use crate::cli::{ActionsArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ActionEntry {
    action: Action,
    types: &'static [&'static str],
}

#[derive(Tabled)]
struct ActionRow {
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Device types")]
    types: String,
}

pub fn handle(args: &ActionsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let code = args.type_code.as_deref().map(str::to_ascii_lowercase);
    let entries: Vec<ActionEntry> = Action::iter()
        .filter(|a| code.as_deref().is_none_or(|c| a.supports(c)))
        .map(|action| ActionEntry {
            action,
            types: action.supported_types(),
        })
        .collect();

    if entries.is_empty() {
        return Err(CliError::Validation {
            field: "type_code".into(),
            reason: format!("no actions for device type '{}'", code.unwrap_or_default()),
        });
    }

    let out = output::render_list(
        &global.output,
        &entries,
        |e| ActionRow {
            action: e.action.to_string(),
            types: e.types.join(", "),
        },
        |e| e.action.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
