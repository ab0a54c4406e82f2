//! Input Documents - Zone, Fan, Event and Condition YAML
//!
//! These are loaded verbatim. Nothing is resolved here; names stay names
//! until the catalog lookups in the assemblers.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{GenError, Result};

/// Load a YAML document. An empty file yields the type's default, like a
/// document with every section left out.
pub fn load_document<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
    parse_document(&content).map_err(|source| GenError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_document<T: DeserializeOwned + Default>(
    content: &str,
) -> std::result::Result<T, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(T::default());
    }
    serde_yaml::from_str(content)
}

/// Text of a YAML value as it appears in generated source.
///
/// Sequences and mappings become brace literals: `[{27000: 85}]` is
/// `{{27000, 85}}`. Strings nested inside a literal are quoted.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(_) | Value::Mapping(_) => brace_literal(value),
        Value::Tagged(tagged) => value_text(&tagged.value),
    }
}

fn brace_literal(value: &Value) -> String {
    match value {
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(brace_literal).collect();
            format!("{{{}}}", items.join(", "))
        }
        Value::Mapping(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{}, {}", brace_literal(k), brace_literal(v)))
                .collect();
            format!("{{{}}}", entries.join(", "))
        }
        Value::String(s) => format!("\"{}\"", s),
        other => value_text(other),
    }
}

// --- Zone document ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneDocument {
    #[serde(default)]
    pub manager_configuration: ManagerConfiguration,
    #[serde(default)]
    pub zone_configuration: Vec<ZoneGroupSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerConfiguration {
    #[serde(default)]
    pub power_on_delay: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneGroupSpec {
    #[serde(default)]
    pub zone_conditions: Option<Vec<NameRef>>,
    #[serde(default)]
    pub zones: Vec<ZoneSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneSpec {
    /// Required, but checked at assembly time so the error names the document.
    #[serde(default)]
    pub zone: Option<u64>,
    pub full_speed: u64,
    pub default_floor: u64,
    #[serde(default)]
    pub increase_delay: u64,
    #[serde(default)]
    pub decrease_interval: u64,
    #[serde(default)]
    pub cooling_profiles: Option<Vec<String>>,
}

impl ZoneSpec {
    pub fn profiles(&self) -> Vec<String> {
        self.cooling_profiles
            .clone()
            .unwrap_or_else(|| vec![DEFAULT_PROFILE.to_string()])
    }
}

pub const DEFAULT_PROFILE: &str = "all";

// --- Fan document ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FanDocument {
    #[serde(default)]
    pub fans: Vec<FanSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FanSpec {
    pub inventory: String,
    pub cooling_zone: u64,
    #[serde(default)]
    pub cooling_profile: Option<String>,
    #[serde(default)]
    pub sensors: Vec<String>,
}

impl FanSpec {
    pub fn profile(&self) -> &str {
        self.cooling_profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }
}

// --- Zone conditions document ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionsDocument {
    #[serde(default)]
    pub conditions: Vec<ConditionSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub properties: Vec<ConditionPropertySpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionPropertySpec {
    pub property: String,
    pub interface: String,
    pub path: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub value: Value,
}

// --- Events document ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsDocument {
    #[serde(default)]
    pub groups: Vec<GroupDef>,
    #[serde(default)]
    pub actions: Vec<TemplateDef>,
    #[serde(default)]
    pub matches: Vec<MatchDef>,
    #[serde(default)]
    pub signals: Vec<SignalDef>,
    #[serde(default)]
    pub handlers: Vec<TemplateDef>,
    #[serde(default)]
    pub preconditions: Vec<TemplateDef>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDef {
    pub name: String,
    /// Object path prefix shared by every member.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub members: Vec<String>,
}

/// An action, handler or precondition: a name plus its declared parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDef {
    pub name: String,
    #[serde(default)]
    pub parameters: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchDef {
    pub name: String,
    #[serde(default)]
    pub parameters: Option<Vec<String>>,
    pub signal: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalDef {
    pub name: String,
    #[serde(default)]
    pub parameters: Option<Vec<String>>,
    pub handler: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerSpec {
    pub interval: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneCondition {
    #[serde(default)]
    pub zones: Option<Vec<u64>>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A reference to an action plus the values for its declared parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRef {
    pub name: String,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub group: String,
    #[serde(default)]
    pub interface: String,
    #[serde(default)]
    pub property: Option<PropertyDescriptor>,
    #[serde(default)]
    pub actions: Vec<ActionRef>,
    #[serde(default)]
    pub matches: Vec<NameRef>,
    #[serde(default)]
    pub timer: Option<TimerSpec>,
    #[serde(default)]
    pub zone_conditions: Option<Vec<ZoneCondition>>,
    #[serde(default)]
    pub precondition: Option<Box<PreconditionBlock>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreconditionGroupRef {
    pub name: String,
    pub interface: String,
    pub property: PropertyDescriptor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreconditionBlock {
    pub name: String,
    #[serde(default)]
    pub groups: Vec<PreconditionGroupRef>,
    #[serde(default)]
    pub matches: Vec<NameRef>,
    #[serde(default)]
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub timer: Option<TimerSpec>,
    /// Values for any declared precondition parameters other than `groups`.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_defaults() {
        let doc: ZoneDocument = parse_document(
            r#"
zone_configuration:
  - zones:
      - zone: 0
        full_speed: 10500
        default_floor: 8000
"#,
        )
        .unwrap();

        let zone = &doc.zone_configuration[0].zones[0];
        assert_eq!(zone.zone, Some(0));
        assert_eq!(zone.increase_delay, 0);
        assert_eq!(zone.decrease_interval, 0);
        assert_eq!(zone.profiles(), vec!["all".to_string()]);
        assert!(doc.manager_configuration.power_on_delay.is_none());
    }

    #[test]
    fn test_fan_profile_defaults_to_all() {
        let doc: FanDocument = parse_document(
            r#"
fans:
  - inventory: /system/chassis/motherboard/fan0
    cooling_zone: 0
    sensors:
      - fan0
"#,
        )
        .unwrap();
        assert_eq!(doc.fans[0].profile(), "all");
    }

    #[test]
    fn test_empty_document_is_default() {
        let doc: EventsDocument = parse_document("  \n").unwrap();
        assert!(doc.groups.is_empty());
        assert!(doc.events.is_empty());
    }

    #[test]
    fn test_value_text_literals() {
        let scalar: Value = serde_yaml::from_str("true").unwrap();
        assert_eq!(value_text(&scalar), "true");

        let list: Value = serde_yaml::from_str("[{27000: 85}, {32000: 100}]").unwrap();
        assert_eq!(value_text(&list), "{{27000, 85}, {32000, 100}}");

        let map: Value = serde_yaml::from_str("{a: 1, b: 2}").unwrap();
        assert_eq!(value_text(&map), "{\"a\", 1, \"b\", 2}");
    }

    #[test]
    fn test_action_ref_keeps_extra_fields() {
        let action: ActionRef = serde_yaml::from_str(
            r#"
name: set_floor_from_average_sensor_value
map:
  type: "std::map<int64_t, uint64_t>"
  value:
    - 27000: 3500
speed: 50
"#,
        )
        .unwrap();
        assert_eq!(action.name, "set_floor_from_average_sensor_value");
        assert!(action.fields.contains_key("map"));
        assert!(action.fields.contains_key("speed"));
        assert!(!action.fields.contains_key("name"));
    }
}
