//! Pet listing.

use tabled::Tabled;

use petkit_core::{Pet, PetkitClient};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct PetRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Family")]
    family: String,
}

impl From<&Pet> for PetRow {
    fn from(p: &Pet) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name.clone(),
            family: p.family_id.map(|f| f.to_string()).unwrap_or_default(),
        }
    }
}

pub async fn handle(client: &PetkitClient, global: &GlobalOpts) -> Result<(), CliError> {
    let pets = client.get_pets_list().await?;
    let out = output::render_list(&global.output, &pets, |p| PetRow::from(p), |p| p.id.to_string());
    output::print_output(&out, global.quiet);
    Ok(())
}
