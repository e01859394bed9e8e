//! Typed status for one device.

use petkit_core::{DeviceStatus, PetkitClient};

use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output;

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

fn detail(status: &DeviceStatus) -> String {
    let lines = match status {
        DeviceStatus::Litter(s) => vec![
            "Family:      litter box".to_owned(),
            format!("Waste level: {}", s.waste_level),
            format!("Litter:      {}%", s.litter_percent),
            format!("Deodorant:   {}%", s.deodorant_left),
            format!("Used today:  {}", s.used_times),
            format!("Box full:    {}", yes_no(s.box_full)),
            format!("Litter low:  {}", yes_no(s.sand_lack)),
            format!("Working:     {}", yes_no(s.working)),
            format!("Error:       {}", s.error.as_deref().unwrap_or("-")),
        ],
        DeviceStatus::Feeder(s) => vec![
            "Family:      feeder".to_owned(),
            format!("Food level:  {}", s.food_level),
            format!("Food (2nd):  {}", s.food_level_2),
            format!("Desiccant:   {} days", s.desiccant_left_days),
            format!("Feeding:     {}", yes_no(s.feeding)),
            format!("Battery:     {}", s.battery_power),
            format!("Error:       {}", s.error.as_deref().unwrap_or("-")),
        ],
        DeviceStatus::Fountain(s) => vec![
            "Family:      water fountain".to_owned(),
            format!("Water level: {}", s.water_level),
            format!("Filter:      {}%", s.filter_percent),
            format!("Mode:        {}", s.mode),
            format!("Power:       {}", yes_no(s.power)),
            format!("Pump:        {}", yes_no(s.pump_running)),
            format!("Water low:   {}", yes_no(s.lack_warning)),
        ],
        DeviceStatus::Purifier(s) => vec![
            "Family:      purifier".to_owned(),
            format!("Mode:        {}", s.mode),
            format!("Power:       {}", yes_no(s.power)),
            format!("Liquid:      {}%", s.liquid),
            format!("Humidity:    {}%", s.humidity),
            format!("Temperature: {:.1}", s.temperature),
            format!("Light:       {}", yes_no(s.light)),
        ],
    };
    lines.join("\n")
}

pub async fn handle(
    client: &PetkitClient,
    args: StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let status = client.get_device_status(args.id).await?;
    let out = output::render_single(&global.output, &status, detail, |_| args.id.to_string());
    output::print_output(&out, global.quiet);
    Ok(())
}
