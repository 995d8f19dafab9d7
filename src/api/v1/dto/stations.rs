/*
 * Responsibility
 * - Stations の request/response DTO (+ validate())
 * - id は sqids で encode して返す (生の bigint は出さない)
 */
use serde::{Deserialize, Serialize};

use crate::repos::station_repo::StationSettings;

const MAX_NAME_LEN: usize = 120;
const MAX_DURATION_MINUTES: i32 = 24 * 60;
const MAX_SLOTS: i32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StationSettingsDto {
    /// minutes per slot
    pub duration: i32,
    pub max_slots: i32,
}

impl Default for StationSettingsDto {
    fn default() -> Self {
        StationSettings::default().into()
    }
}

impl From<StationSettings> for StationSettingsDto {
    fn from(s: StationSettings) -> Self {
        Self {
            duration: s.duration_minutes,
            max_slots: s.max_slots,
        }
    }
}

impl From<StationSettingsDto> for StationSettings {
    fn from(s: StationSettingsDto) -> Self {
        Self {
            duration_minutes: s.duration,
            max_slots: s.max_slots,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateStationRequest {
    pub name: String,
    #[serde(default)]
    pub settings: StationSettingsDto,
}

impl CreateStationRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("name is required");
        }
        if name.len() > MAX_NAME_LEN {
            return Err("name must be <= 120 chars");
        }
        if !(1..=MAX_DURATION_MINUTES).contains(&self.settings.duration) {
            return Err("settings.duration must be between 1 and 1440 minutes");
        }
        if !(1..=MAX_SLOTS).contains(&self.settings.max_slots) {
            return Err("settings.maxSlots must be between 1 and 500");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct StationResponse {
    pub id: String, // encoded
    pub name: String,
    pub settings: StationSettingsDto,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> CreateStationRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn settings_default_when_omitted() {
        let req = parse(r#"{"name": "North"}"#);
        assert_eq!(req.settings, StationSettingsDto { duration: 60, max_slots: 10 });
        assert!(req.validate().is_ok());
    }

    #[test]
    fn partial_settings_keep_the_other_default() {
        let req = parse(r#"{"name": "North", "settings": {"maxSlots": 4}}"#);
        assert_eq!(req.settings, StationSettingsDto { duration: 60, max_slots: 4 });
    }

    #[test]
    fn rejects_blank_name_and_zero_grid() {
        assert!(parse(r#"{"name": "  "}"#).validate().is_err());
        assert!(parse(r#"{"name": "a", "settings": {"duration": 0}}"#).validate().is_err());
        assert!(parse(r#"{"name": "a", "settings": {"maxSlots": 0}}"#).validate().is_err());
    }
}
