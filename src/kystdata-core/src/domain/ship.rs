use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder shown for any ship attribute the provider did not supply.
pub const UNKNOWN: &str = "Unknown";

/// Ship metadata as returned by the provider. The provider's schema is loose, so the raw
/// object is kept and the known attributes are looked up by name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ShipInfo(Map<String, Value>);

const NAME_KEYS: &[&str] = &["shipname", "name"];
const FLAG_KEYS: &[&str] = &["flagcode", "flag"];
const IMO_KEYS: &[&str] = &["imono", "imonumber", "imo"];
const CALL_SIGN_KEYS: &[&str] = &["callsign", "ircs"];
const TYPE_GROUP_KEYS: &[&str] = &["shiptypegroupnor", "shiptypegroup", "shiptypegroupen"];

impl ShipInfo {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn name(&self) -> Option<String> {
        self.lookup(NAME_KEYS)
    }

    pub fn flag_code(&self) -> Option<String> {
        self.lookup(FLAG_KEYS)
    }

    pub fn imo(&self) -> Option<String> {
        self.lookup(IMO_KEYS)
    }

    pub fn call_sign(&self) -> Option<String> {
        self.lookup(CALL_SIGN_KEYS)
    }

    pub fn ship_type_group(&self) -> Option<String> {
        self.lookup(TYPE_GROUP_KEYS)
    }

    pub fn display_name(&self) -> String {
        self.name().unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Descriptive properties for a rendered layer, `Unknown` where absent.
    pub fn properties(&self) -> Vec<(&'static str, String)> {
        [
            ("name", self.name()),
            ("flag", self.flag_code()),
            ("imo", self.imo()),
            ("call_sign", self.call_sign()),
            ("type_group", self.ship_type_group()),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.unwrap_or_else(|| UNKNOWN.to_string())))
        .collect()
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.0
    }

    fn lookup(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| {
            self.0
                .iter()
                .find(|(k, _)| normalize(k) == *key)
                .and_then(|(_, v)| value_to_string(v))
        })
    }
}

fn normalize(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(v) => {
            let v = v.trim();
            (!v.is_empty()).then(|| v.to_string())
        }
        Value::Number(v) => Some(v.to_string()),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}
