// Device endpoints
//
// Every device call is scoped by its lowercase type code as the first path
// segment: `t4/owndevices`, `d4s/getDeviceRecord`, and so on.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{Params, into_list};

fn device_params(device_id: i64) -> Params {
    let mut params = Params::new();
    params.insert("deviceId".into(), device_id.to_string());
    params
}

impl ApiClient {
    /// Detailed records for every device of one type code on the account.
    ///
    /// `POST {code}/owndevices`
    pub async fn device_details(&self, code: &str) -> Result<Vec<serde_json::Value>, Error> {
        let raw: serde_json::Value = self
            .post(&format!("{code}/owndevices"), &Params::new())
            .await?;
        let list = into_list(raw);
        debug!(code, count = list.len(), "fetched device details");
        Ok(list)
    }

    /// Event history for one day (`YYYYMMDD`).
    ///
    /// `POST {code}/getDeviceRecord`
    pub async fn device_records(
        &self,
        code: &str,
        device_id: i64,
        day: &str,
    ) -> Result<serde_json::Value, Error> {
        let mut params = device_params(device_id);
        params.insert("day".into(), day.to_owned());
        self.post(&format!("{code}/getDeviceRecord"), &params).await
    }

    /// Recorded clips and snapshots (camera models).
    ///
    /// `POST {code}/getMediaList`
    pub async fn media_list(&self, code: &str, device_id: i64) -> Result<serde_json::Value, Error> {
        self.post(&format!("{code}/getMediaList"), &device_params(device_id))
            .await
    }

    /// Live stream descriptor (camera models).
    ///
    /// `POST {code}/getLiveFeed`
    pub async fn live_feed(&self, code: &str, device_id: i64) -> Result<serde_json::Value, Error> {
        self.post(&format!("{code}/getLiveFeed"), &device_params(device_id))
            .await
    }

    /// Usage statistics for one day (`YYYYMMDD`).
    ///
    /// `POST {code}/statistic`
    pub async fn device_statistics(
        &self,
        code: &str,
        device_id: i64,
        day: &str,
    ) -> Result<serde_json::Value, Error> {
        let mut params = device_params(device_id);
        params.insert("startDate".into(), day.to_owned());
        params.insert("endDate".into(), day.to_owned());
        self.post(&format!("{code}/statistic"), &params).await
    }

    /// Pet visit graph for a litter box.
    ///
    /// `POST {code}/getPetOutGraph`
    pub async fn pet_out_graph(
        &self,
        code: &str,
        device_id: i64,
    ) -> Result<serde_json::Value, Error> {
        self.post(&format!("{code}/getPetOutGraph"), &device_params(device_id))
            .await
    }

    /// Send a prepared command: `POST {code}/{endpoint}` with a flat form.
    pub async fn send_device_command(
        &self,
        code: &str,
        endpoint: &str,
        params: &Params,
    ) -> Result<serde_json::Value, Error> {
        debug!(code, endpoint, "sending device command");
        self.post(&format!("{code}/{endpoint}"), params).await
    }
}
