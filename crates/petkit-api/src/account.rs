// Account endpoints: families and pets.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Family, Params};

impl ApiClient {
    /// List every family group with its device and pet stubs.
    ///
    /// `GET group/family/list`
    pub async fn family_list(&self) -> Result<Vec<Family>, Error> {
        let families: Vec<Family> = self.get("group/family/list", &Params::new()).await?;
        debug!(count = families.len(), "fetched families");
        Ok(families)
    }

    /// Full profile of a single pet.
    ///
    /// `GET pet/petDetail?petId={id}`
    pub async fn pet_detail(&self, pet_id: i64) -> Result<serde_json::Value, Error> {
        let mut params = Params::new();
        params.insert("petId".into(), pet_id.to_string());
        self.get("pet/petDetail", &params).await
    }
}
