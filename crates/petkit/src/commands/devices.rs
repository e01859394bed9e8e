//! Device command handlers.

use std::sync::Arc;

use tabled::Tabled;

use petkit_core::{Device, DeviceKind, PetkitClient};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Type")]
    type_code: String,
    #[tabled(rename = "Firmware")]
    firmware: String,
    #[tabled(rename = "MAC")]
    mac: String,
}

impl From<&Arc<Device>> for DeviceRow {
    fn from(d: &Arc<Device>) -> Self {
        let info = d.info.as_ref();
        Self {
            id: d.id.to_string(),
            name: d.name().unwrap_or_default().to_owned(),
            kind: d.kind.to_string(),
            type_code: d.type_code().unwrap_or_default().to_owned(),
            firmware: info.and_then(|i| i.firmware.clone()).unwrap_or_default(),
            mac: info.and_then(|i| i.mac.clone()).unwrap_or_default(),
        }
    }
}

fn detail(d: &Arc<Device>) -> String {
    let info = d.info.as_ref();
    let field = |f: Option<&String>| f.map_or("-", String::as_str).to_owned();
    let mut lines = vec![
        format!("ID:       {}", d.id),
        format!("Name:     {}", d.name().unwrap_or("-")),
        format!("Kind:     {}", d.kind),
        format!("Type:     {}", d.type_code().unwrap_or("-")),
        format!("Firmware: {}", field(info.and_then(|i| i.firmware.as_ref()))),
        format!("Hardware: {}", field(info.and_then(|i| i.hardware.as_ref()))),
        format!("MAC:      {}", field(info.and_then(|i| i.mac.as_ref()))),
        format!("Serial:   {}", field(info.and_then(|i| i.serial.as_ref()))),
    ];
    if let Some(family) = info.and_then(|i| i.family_id) {
        lines.push(format!("Family:   {family}"));
    }
    if let Some(ref feed) = d.live_feed {
        lines.push(format!("Live:     {}", feed.url.as_deref().unwrap_or("-")));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    client: &PetkitClient,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { kind } => {
            let wanted = kind
                .map(|k| {
                    k.parse::<DeviceKind>().map_err(|_| CliError::Validation {
                        field: "kind".into(),
                        reason: format!("unknown device kind '{k}'"),
                    })
                })
                .transpose()?;

            let devices: Vec<Arc<Device>> = client
                .get_devices()
                .await?
                .into_iter()
                .filter(|d| wanted.is_none_or(|k| d.kind == k))
                .collect();

            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { id, raw } => {
            let device = client.get_device(id).await?;
            let out = if raw {
                let value = serde_json::to_value(&*device)?;
                output::render_value(&global.output, &value)
            } else {
                output::render_single(&global.output, &device, detail, |d| d.id.to_string())
            };
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
