use crate::{PushPayload, SharePayload};

/// Value shape of the durable key-value store.
///
/// A cleared entry is written as an empty, non-null string so readers never
/// have to distinguish "missing" from "reset".
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ConfigValue {
    #[serde(rename = "isNull")]
    pub is_null: bool,
    pub s: String,
}

impl ConfigValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self {
            is_null: false,
            s: s.into(),
        }
    }

    pub fn empty() -> Self {
        Self::text(String::new())
    }

    pub fn null() -> Self {
        Self {
            is_null: true,
            s: String::new(),
        }
    }

    pub fn as_text(&self) -> &str {
        if self.is_null { "" } else { &self.s }
    }

    pub fn into_text(self) -> String {
        if self.is_null { String::new() } else { self.s }
    }
}

pub trait KeyValueStore: Send + Sync {
    /// Missing keys read back as [`ConfigValue::null`].
    fn get_value(&self, key: &str) -> Result<ConfigValue, String>;

    fn set_value(&self, key: &str, value: ConfigValue) -> Result<(), String>;
}

pub trait PushSource: Send + Sync {
    /// The notification payload the process was launched from, if any.
    fn initial_push(&self) -> Result<Option<PushPayload>, String>;
}

pub trait LinkSource: Send + Sync {
    fn initial_url(&self) -> Result<Option<String>, String>;
}

pub trait ShareSource: Send + Sync {
    fn share_data(&self) -> Result<Option<SharePayload>, String>;
}

/// Share source for platforms without a share extension.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoShareSupport;

impl ShareSource for NoShareSupport {
    fn share_data(&self) -> Result<Option<SharePayload>, String> {
        Ok(None)
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Platform {
    #[default]
    Android,
    Ios,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("android") {
            return Some(Platform::Android);
        }
        if raw.eq_ignore_ascii_case("ios") {
            return Some(Platform::Ios);
        }
        None
    }

    pub fn supports_share_extension(self) -> bool {
        matches!(self, Platform::Android)
    }
}
