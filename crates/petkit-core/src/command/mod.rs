// ── Command dispatch ──
//
// Resolves a logical action against a registry entity into the final
// wire request. Validation happens here, before any HTTP traffic.

mod actions;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use petkit_api::Params;

use crate::error::CoreError;
use crate::model::Device;

/// A logical device action.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    UpdateSetting,
    // Litter cycles
    Clean,
    Dump,
    Deodorize,
    Reset,
    Calibrate,
    Level,
    Pause,
    Resume,
    Stop,
    // Switches
    LightOn,
    LightOff,
    PowerOn,
    PowerOff,
    SetPurifierMode,
    SetFountainMode,
    ResetFilter,
    // Feeders
    Feed,
    CancelFeed,
    CallPet,
    ResetDesiccant,
    FoodReplenished,
}

impl Action {
    /// Type codes this action may be sent to.
    pub fn supported_types(self) -> &'static [&'static str] {
        actions::config(self).supported
    }

    pub fn supports(self, type_code: &str) -> bool {
        self.supported_types().contains(&type_code)
    }
}

/// A validated request ready for `{type_code}/{endpoint}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommand {
    pub action: Action,
    pub type_code: String,
    pub endpoint: &'static str,
    pub params: Params,
}

impl PreparedCommand {
    /// Build the wire request for `action` on `device`.
    ///
    /// Fails without side effects when the device has no info block, the
    /// action is not legal for its type code, or the settings are unusable.
    pub fn new(
        device: &Device,
        action: Action,
        settings: Option<&Value>,
    ) -> Result<Self, CoreError> {
        let type_code = device
            .type_code()
            .ok_or(CoreError::DeviceInfoMissing {
                device_id: device.id,
            })?;

        let config = actions::config(action);
        if !config.supported.contains(&type_code) {
            return Err(CoreError::UnsupportedAction {
                action: action.to_string(),
                device_type: type_code.to_owned(),
                allowed: config.supported.iter().map(|c| (*c).to_owned()).collect(),
            });
        }

        Ok(Self {
            action,
            type_code: type_code.to_owned(),
            endpoint: config.endpoint.resolve(type_code),
            params: (config.params)(device, settings)?,
        })
    }

    /// Path relative to the regional base URL.
    pub fn path(&self) -> String {
        format!("{}/{}", self.type_code, self.endpoint)
    }
}

/// Parse a snake_case action name for `device`.
///
/// Unknown names fail as unsupported with an empty allowed list.
pub fn parse_action(device: &Device, name: &str) -> Result<Action, CoreError> {
    let type_code = device.type_code().ok_or(CoreError::DeviceInfoMissing {
        device_id: device.id,
    })?;
    name.parse().map_err(|_| CoreError::UnsupportedAction {
        action: name.to_owned(),
        device_type: type_code.to_owned(),
        allowed: Vec::new(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DeviceInfo, DeviceKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn device(id: i64, code: &str) -> Device {
        let mut d = Device::stub(id, DeviceKind::from_type_code(code));
        d.info = Some(DeviceInfo {
            name: "test".into(),
            type_code: code.into(),
            type_number: None,
            hardware: None,
            firmware: None,
            mac: None,
            serial: None,
            family_id: None,
        });
        d
    }

    #[test]
    fn action_names_are_snake_case() {
        assert_eq!("set_purifier_mode".parse::<Action>().unwrap(), Action::SetPurifierMode);
        assert_eq!(Action::FoodReplenished.to_string(), "food_replenished");
        assert!("explode".parse::<Action>().is_err());
    }

    #[test]
    fn prepares_litter_clean() {
        let cmd = PreparedCommand::new(&device(100, "t4"), Action::Clean, None).unwrap();
        assert_eq!(cmd.path(), "t4/controlDevice");
        assert_eq!(cmd.params["type"], "start");
    }

    #[test]
    fn disallowed_type_names_type_and_allowed_list() {
        let err = PreparedCommand::new(&device(7, "d4"), Action::Clean, None).unwrap_err();
        match err {
            CoreError::UnsupportedAction {
                action,
                device_type,
                allowed,
            } => {
                assert_eq!(action, "clean");
                assert_eq!(device_type, "d4");
                assert!(allowed.contains(&"t4".to_owned()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn stub_without_info_is_rejected() {
        let stub = Device::stub(5, DeviceKind::Litter);
        assert!(matches!(
            PreparedCommand::new(&stub, Action::Clean, None),
            Err(CoreError::DeviceInfoMissing { device_id: 5 })
        ));
    }

    #[test]
    fn unknown_action_name_has_empty_allowed_list() {
        let err = parse_action(&device(100, "t4"), "explode").unwrap_err();
        assert!(matches!(
            err,
            CoreError::UnsupportedAction { ref allowed, .. } if allowed.is_empty()
        ));
    }

    #[test]
    fn settings_errors_surface_before_dispatch() {
        let err = PreparedCommand::new(
            &device(9, "k2"),
            Action::SetPurifierMode,
            Some(&json!({ "speed": 2 })),
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }
}
