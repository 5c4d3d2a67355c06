//! Support for library configuration options

use std::error::Error;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;
use url::Url;

use crate::task::FieldId;

/// The `User-Agent` header sent with every request.
/// Feel free to override it when initing this library.
pub static USER_AGENT: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new(format!("aoi-planner/{}", env!("CARGO_PKG_VERSION")))));

pub const API_URL_VAR: &str = "AOI_API_URL";
pub const FIELD_ID_VAR: &str = "AOI_FIELD_ID";
pub const DEV_UID_VAR: &str = "AOI_DEV_UID";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_DEV_UID: &str = "U_DEV_DEFAULT";

/// Where the API lives, and which field to display
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub api_url: Url,
    /// The field whose schedule is displayed. Unset until a field has been created
    pub field_id: Option<FieldId>,
    /// The user ID used for development logins
    pub dev_uid: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).unwrap(/* this cannot panic since this is a constant valid URL */),
            field_id: None,
            dev_uid: DEFAULT_DEV_UID.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from the `AOI_*` environment variables, using defaults for the missing ones
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings from any key/value source (the environment, in [`Self::from_env`])
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| v.is_empty() == false);

        if let Some(raw) = get(API_URL_VAR) {
            settings.api_url = match Url::parse(&raw) {
                Err(err) => return Err(format!("Invalid {} {:?}: {}", API_URL_VAR, raw, err).into()),
                Ok(url) => url,
            };
        }
        if let Some(raw) = get(FIELD_ID_VAR) {
            settings.field_id = match raw.parse::<FieldId>() {
                Err(err) => return Err(format!("Invalid {} {:?}: {}", FIELD_ID_VAR, raw, err).into()),
                Ok(id) => Some(id),
            };
        }
        if let Some(uid) = get(DEV_UID_VAR) {
            settings.dev_uid = uid;
        }

        log::debug!("Settings: {:?}", settings);
        Ok(settings)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let settings = Settings::from_lookup(lookup_in(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.api_url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn overrides() {
        let settings = Settings::from_lookup(lookup_in(&[
            (API_URL_VAR, "https://planner.example.com/"),
            (FIELD_ID_VAR, " 12 "),
            (DEV_UID_VAR, ""),
        ])).unwrap();
        assert_eq!(settings.api_url.host_str(), Some("planner.example.com"));
        assert_eq!(settings.field_id, Some(12));
        assert_eq!(settings.dev_uid, DEFAULT_DEV_UID);
    }

    #[test]
    fn invalid_values_are_errors() {
        assert!(Settings::from_lookup(lookup_in(&[(FIELD_ID_VAR, "twelve")])).is_err());
        assert!(Settings::from_lookup(lookup_in(&[(API_URL_VAR, "not a url")])).is_err());
    }
}
