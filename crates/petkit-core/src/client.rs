// ── PetKit client facade ──
//
// The single entry point consumers hold. Owns one `ApiClient` (session,
// region, transport) and one `DeviceRegistry`, populates the registry on
// first read, and routes commands through the dispatcher.

use std::sync::Arc;

use chrono::Local;
use serde_json::{Value, json};
use tracing::{debug, info};

use petkit_api::{ApiClient, Method, Params, Session};

use crate::command::{Action, PreparedCommand, parse_action};
use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::model::{
    Device, DeviceId, DeviceStatus, FeederStatus, FountainStatus, LitterStatus, Pet,
    PurifierStatus,
};
use crate::store::DeviceRegistry;

/// Client for one PetKit account.
///
/// Cheaply cloneable via `Arc<ClientInner>`; clones share the session and
/// the registry.
#[derive(Clone)]
pub struct PetkitClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    api: ApiClient,
    registry: DeviceRegistry,
}

impl PetkitClient {
    /// Create a client. Does not touch the network.
    pub fn new(config: &ClientConfig) -> Result<Self, CoreError> {
        let api = ApiClient::new(
            config.credentials()?,
            config.endpoints()?,
            config.transport(),
        )?;
        Ok(Self::from_api(api))
    }

    /// Wrap an already-built `ApiClient`.
    pub fn from_api(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                api,
                registry: DeviceRegistry::new(),
            }),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.inner.registry
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Password login. Any request also logs in on demand.
    pub async fn login(&self) -> Result<(), CoreError> {
        self.inner.api.login(None).await?;
        info!(username = %self.inner.api.credentials().username, "logged in");
        Ok(())
    }

    /// Login with a code obtained through `request_login_code`.
    pub async fn login_with_code(&self, code: &str) -> Result<(), CoreError> {
        self.inner.api.login(Some(code)).await?;
        Ok(())
    }

    pub async fn request_login_code(&self) -> Result<(), CoreError> {
        self.inner.api.request_login_code().await?;
        Ok(())
    }

    /// Exchange the current session for a fresh one.
    pub async fn refresh_session(&self) -> Result<(), CoreError> {
        self.inner.api.refresh_session().await?;
        Ok(())
    }

    pub async fn is_logged_in(&self) -> bool {
        self.inner.api.is_logged_in().await
    }

    pub async fn session(&self) -> Option<Session> {
        self.inner.api.session().await
    }

    /// Forget the session. Registry contents are kept.
    pub async fn logout(&self) {
        self.inner.api.logout().await;
    }

    // ── Registry ─────────────────────────────────────────────────────

    /// Run a population pass against the cached account snapshot.
    pub async fn populate(&self) -> Result<(), CoreError> {
        self.inner.registry.populate(&self.inner.api).await
    }

    /// Refetch the account snapshot and repopulate.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.inner.registry.refresh(&self.inner.api).await
    }

    async fn ensure_populated(&self) -> Result<(), CoreError> {
        if self.inner.registry.is_populated() {
            return Ok(());
        }
        debug!("registry empty, populating");
        self.populate().await
    }

    /// Every entity with an info block, pets included.
    pub async fn get_devices(&self) -> Result<Vec<Arc<Device>>, CoreError> {
        self.ensure_populated().await?;
        Ok(self.inner.registry.devices())
    }

    pub async fn get_device(&self, id: DeviceId) -> Result<Arc<Device>, CoreError> {
        self.ensure_populated().await?;
        self.inner.registry.device(id)
    }

    pub async fn get_device_status(&self, id: DeviceId) -> Result<DeviceStatus, CoreError> {
        self.ensure_populated().await?;
        self.inner.registry.device_status(id)
    }

    pub async fn get_litter_status(&self, id: DeviceId) -> Result<LitterStatus, CoreError> {
        self.ensure_populated().await?;
        self.inner.registry.litter_status(id)
    }

    pub async fn get_feeder_status(&self, id: DeviceId) -> Result<FeederStatus, CoreError> {
        self.ensure_populated().await?;
        self.inner.registry.feeder_status(id)
    }

    pub async fn get_fountain_status(&self, id: DeviceId) -> Result<FountainStatus, CoreError> {
        self.ensure_populated().await?;
        self.inner.registry.fountain_status(id)
    }

    pub async fn get_purifier_status(&self, id: DeviceId) -> Result<PurifierStatus, CoreError> {
        self.ensure_populated().await?;
        self.inner.registry.purifier_status(id)
    }

    pub async fn get_pets_list(&self) -> Result<Vec<Pet>, CoreError> {
        self.ensure_populated().await?;
        Ok(self.inner.registry.pets())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Validate and send `action` to a device, returning the vendor result.
    ///
    /// Lookup and validation failures are returned as-is without any HTTP
    /// traffic. Failures of the request itself are wrapped in
    /// `CoreError::Command`.
    pub async fn send_command(
        &self,
        id: DeviceId,
        action: Action,
        settings: Option<Value>,
    ) -> Result<Value, CoreError> {
        let device = self.get_device(id).await?;
        let prepared = PreparedCommand::new(&device, action, settings.as_ref())?;
        self.dispatch(id, &prepared).await
    }

    /// Send an action given by its snake_case name.
    pub async fn control_device(
        &self,
        id: DeviceId,
        action: &str,
        settings: Option<Value>,
    ) -> Result<Value, CoreError> {
        let device = self.get_device(id).await?;
        let action = parse_action(&device, action)?;
        let prepared = PreparedCommand::new(&device, action, settings.as_ref())?;
        self.dispatch(id, &prepared).await
    }

    /// Change a single device setting.
    pub async fn update_device_setting(
        &self,
        id: DeviceId,
        key: &str,
        value: Value,
    ) -> Result<Value, CoreError> {
        let mut settings = serde_json::Map::new();
        settings.insert(key.to_owned(), value);
        self.send_command(id, Action::UpdateSetting, Some(Value::Object(settings)))
            .await
    }

    /// Authenticated passthrough to any vendor path.
    pub async fn send_api_request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
    ) -> Result<Value, CoreError> {
        Ok(self.inner.api.request_value(method, path, params).await?)
    }

    async fn dispatch(&self, id: DeviceId, cmd: &PreparedCommand) -> Result<Value, CoreError> {
        debug!(
            device_id = id,
            action = %cmd.action,
            path = %cmd.path(),
            "dispatching command"
        );
        self.inner
            .api
            .send_device_command(&cmd.type_code, cmd.endpoint, &cmd.params)
            .await
            .map_err(|e| CoreError::Command {
                action: cmd.action.to_string(),
                device_id: id,
                source: Box::new(e.into()),
            })
    }

    // ── Litter boxes ─────────────────────────────────────────────────

    pub async fn start_cleaning(&self, id: DeviceId) -> Result<Value, CoreError> {
        self.send_command(id, Action::Clean, None).await
    }

    pub async fn start_dumping(&self, id: DeviceId) -> Result<Value, CoreError> {
        self.send_command(id, Action::Dump, None).await
    }

    pub async fn deodorize(&self, id: DeviceId) -> Result<Value, CoreError> {
        self.send_command(id, Action::Deodorize, None).await
    }

    pub async fn reset_litter(&self, id: DeviceId) -> Result<Value, CoreError> {
        self.send_command(id, Action::Reset, None).await
    }

    pub async fn calibrate_litter(&self, id: DeviceId) -> Result<Value, CoreError> {
        self.send_command(id, Action::Calibrate, None).await
    }

    pub async fn level_litter(&self, id: DeviceId) -> Result<Value, CoreError> {
        self.send_command(id, Action::Level, None).await
    }

    /// Pause the running cycle. `mode` overrides the reported work mode.
    pub async fn pause_cycle(&self, id: DeviceId, mode: Option<i64>) -> Result<Value, CoreError> {
        self.send_command(id, Action::Pause, mode_settings(mode)).await
    }

    pub async fn resume_cycle(&self, id: DeviceId, mode: Option<i64>) -> Result<Value, CoreError> {
        self.send_command(id, Action::Resume, mode_settings(mode)).await
    }

    pub async fn stop_cycle(&self, id: DeviceId, mode: Option<i64>) -> Result<Value, CoreError> {
        self.send_command(id, Action::Stop, mode_settings(mode)).await
    }

    // ── Switches ─────────────────────────────────────────────────────

    pub async fn set_light(&self, id: DeviceId, on: bool) -> Result<Value, CoreError> {
        let action = if on { Action::LightOn } else { Action::LightOff };
        self.send_command(id, action, None).await
    }

    pub async fn set_power(&self, id: DeviceId, on: bool) -> Result<Value, CoreError> {
        let action = if on { Action::PowerOn } else { Action::PowerOff };
        self.send_command(id, action, None).await
    }

    pub async fn set_purifier_mode(&self, id: DeviceId, mode: i64) -> Result<Value, CoreError> {
        self.send_command(id, Action::SetPurifierMode, mode_settings(Some(mode)))
            .await
    }

    pub async fn set_fountain_mode(&self, id: DeviceId, mode: i64) -> Result<Value, CoreError> {
        self.send_command(id, Action::SetFountainMode, mode_settings(Some(mode)))
            .await
    }

    pub async fn reset_fountain_filter(&self, id: DeviceId) -> Result<Value, CoreError> {
        self.send_command(id, Action::ResetFilter, None).await
    }

    // ── Feeders ──────────────────────────────────────────────────────

    /// Dispense `amount` grams now.
    pub async fn feed(&self, id: DeviceId, amount: u32) -> Result<Value, CoreError> {
        let settings = json!({ "day": today(), "amount": amount });
        self.send_command(id, Action::Feed, Some(settings)).await
    }

    /// Dispense from both hoppers of a dual-hopper feeder.
    pub async fn feed_dual(
        &self,
        id: DeviceId,
        amount1: u32,
        amount2: u32,
    ) -> Result<Value, CoreError> {
        let settings = json!({ "day": today(), "amount1": amount1, "amount2": amount2 });
        self.send_command(id, Action::Feed, Some(settings)).await
    }

    pub async fn cancel_feed(&self, id: DeviceId) -> Result<Value, CoreError> {
        let settings = json!({ "day": today() });
        self.send_command(id, Action::CancelFeed, Some(settings)).await
    }

    pub async fn call_pet(&self, id: DeviceId) -> Result<Value, CoreError> {
        self.send_command(id, Action::CallPet, None).await
    }

    pub async fn reset_desiccant(&self, id: DeviceId) -> Result<Value, CoreError> {
        self.send_command(id, Action::ResetDesiccant, None).await
    }

    pub async fn food_replenished(&self, id: DeviceId) -> Result<Value, CoreError> {
        self.send_command(id, Action::FoodReplenished, None).await
    }
}

/// Local calendar day in the vendor's `YYYYMMDD` form.
fn today() -> String {
    Local::now().format("%Y%m%d").to_string()
}

fn mode_settings(mode: Option<i64>) -> Option<Value> {
    mode.map(|m| json!({ "mode": m }))
}
