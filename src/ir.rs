//! Resolved IR - Reference-Free Zone Layout
//!
//! Built once, bottom-up, then only read by the renderer.

use serde::Serialize;

/// One concrete object/interface/property binding produced from a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub object: String,
    pub interface: String,
    pub property: String,
    #[serde(rename = "type")]
    pub ty: String,
    /// Only precondition group members carry a value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Member {
    /// Look up a member field by the name used in match/signal/handler
    /// parameter lists.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "object" => Some(&self.object),
            "interface" => Some(&self.interface),
            "property" => Some(&self.property),
            "type" => Some(&self.ty),
            "value" => self.value.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    /// Rendered as `static_cast<type>(value)`.
    Scalar(String),
    /// A brace literal rendered directly after its type, e.g. `std::map<..>{{1, 2}}`.
    Literal(String),
    /// Precondition group list, rendered as `PrecondGroup{...}` entries.
    PrecondGroups(Vec<Member>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub ty: String,
    pub value: ParamValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub name: String,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CallArg {
    /// A member field, emitted quoted.
    Field(String),
    /// The whole expanded group inlined as a `Group{...}` literal.
    Group(Vec<Member>),
}

/// A signal or handler invocation with an optional template argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Call {
    pub name: String,
    pub type_arg: Option<String>,
    pub args: Vec<CallArg>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signal {
    pub match_name: String,
    pub match_params: Vec<String>,
    pub signal: Call,
    pub handler: Call,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Timer {
    pub interval: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetSpeedEvent {
    pub group: Vec<Member>,
    pub actions: Vec<Action>,
    pub timer: Timer,
    pub signals: Vec<Signal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardedEvent {
    pub group: Vec<Member>,
    pub actions: Vec<Action>,
    pub timer: Timer,
    pub signals: Vec<Signal>,
    pub nested: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Plain(SetSpeedEvent),
    Guarded(GuardedEvent),
}

impl Event {
    /// Number of plain events in this tree, counting nested ones.
    pub fn leaf_count(&self) -> usize {
        match self {
            Event::Plain(_) => 1,
            Event::Guarded(guarded) => guarded.nested.iter().map(Event::leaf_count).sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fan {
    pub name: String,
    pub sensors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Zone {
    pub num: u64,
    pub full_speed: u64,
    pub default_floor: u64,
    pub increase_delay: u64,
    pub decrease_interval: u64,
    pub fans: Vec<Fan>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionProperty {
    pub property: String,
    pub interface: String,
    pub path: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub properties: Vec<ConditionProperty>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneGroup {
    pub conditions: Vec<Condition>,
    pub zones: Vec<Zone>,
}

/// The whole generated table plus the manager's power-on delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneLayout {
    pub power_on_delay: u64,
    pub zone_groups: Vec<ZoneGroup>,
}

impl ZoneLayout {
    pub fn zone_count(&self) -> usize {
        self.zone_groups.iter().map(|g| g.zones.len()).sum()
    }

    pub fn event_count(&self) -> usize {
        self.zone_groups
            .iter()
            .flat_map(|g| &g.zones)
            .map(|z| z.events.len())
            .sum()
    }
}
