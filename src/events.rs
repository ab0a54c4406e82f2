//! Event Assembly - Raw Event Definitions to Resolved Events
//!
//! Each raw event is filtered against the zone, its group expanded, its
//! actions and signals resolved through the catalogs. A precondition block
//! wraps its own nested events, which go through the same assembly.

use serde_yaml::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::catalog::Catalogs;
use crate::documents::{
    value_text, ActionRef, NameRef, PreconditionBlock, RawEvent, TemplateDef, TimerSpec,
    ZoneCondition,
};
use crate::error::{GenError, Result};
use crate::group::expand;
use crate::ir::{
    Action, Call, CallArg, Event, GuardedEvent, Member, ParamValue, Parameter, SetSpeedEvent,
    Signal, Timer,
};

/// Type given to untyped action parameters.
pub const DEFAULT_PARAM_TYPE: &str = "size_t";

/// Type of a precondition's `groups` parameter.
pub const PRECOND_GROUPS_TYPE: &str = "std::vector<PrecondGroup>";

/// Whether an event applies to a zone.
///
/// An event is skipped only when every zone condition entry fails: its zone
/// list is given and excludes `zone`, or its name is given and is not one of
/// `active_conditions`. No entries at all means the event always applies.
pub fn is_applicable(
    zone: u64,
    active_conditions: &[String],
    zone_conditions: Option<&[ZoneCondition]>,
) -> bool {
    let entries = match zone_conditions {
        Some(entries) if !entries.is_empty() => entries,
        _ => return true,
    };

    entries.iter().any(|entry| {
        let zone_ok = entry.zones.as_ref().map_or(true, |zones| zones.contains(&zone));
        let name_ok = entry
            .name
            .as_ref()
            .map_or(true, |name| active_conditions.contains(name));
        zone_ok && name_ok
    })
}

pub fn timer(spec: Option<&TimerSpec>) -> Timer {
    Timer {
        interval: spec.map_or(0, |t| t.interval),
    }
}

/// Derive one typed parameter from the value an event gives for it.
fn derive_parameter(name: &str, value: &Value, property_type: &str) -> Parameter {
    if let Value::Mapping(typed) = value {
        let ty = typed
            .get("type")
            .map(|t| value_text(t).to_lowercase())
            .unwrap_or_else(|| DEFAULT_PARAM_TYPE.to_string());
        let value = match typed.get("value") {
            Some(inner @ (Value::Sequence(_) | Value::Mapping(_))) => {
                ParamValue::Literal(value_text(inner))
            }
            Some(inner) => ParamValue::Scalar(value_text(inner).to_lowercase()),
            None => ParamValue::Scalar(String::new()),
        };
        return Parameter { ty, value };
    }

    let ty = if name == "property" {
        property_type.to_lowercase()
    } else {
        DEFAULT_PARAM_TYPE.to_string()
    };
    Parameter {
        ty,
        value: ParamValue::Scalar(value_text(value).to_lowercase()),
    }
}

/// Instantiate an action or precondition template with the given field values.
pub fn resolve_action(
    owner: &'static str,
    def: &TemplateDef,
    fields: &BTreeMap<String, Value>,
    property_type: &str,
) -> Result<Action> {
    let declared = def.parameters.as_deref().unwrap_or_default();
    let parameters = declared
        .iter()
        .map(|param| {
            let value = fields.get(param).ok_or_else(|| GenError::MissingParameter {
                owner,
                name: def.name.clone(),
                parameter: param.clone(),
            })?;
            Ok(derive_parameter(param, value, property_type))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Action {
        name: def.name.clone(),
        parameters,
    })
}

fn member_field(member: &Member, field: &str, context: impl FnOnce() -> String) -> Result<String> {
    member
        .field(field)
        .map(str::to_string)
        .ok_or_else(|| GenError::UnknownMemberField {
            field: field.to_string(),
            context: context(),
        })
}

fn build_call(
    kind: &str,
    name: &str,
    params: Option<&[String]>,
    member: &Member,
    group: &[Member],
) -> Result<Call> {
    let mut call = Call {
        name: name.to_string(),
        type_arg: None,
        args: vec![],
    };

    for param in params.unwrap_or_default() {
        match param.as_str() {
            "type" => call.type_arg = Some(member.ty.clone()),
            "group" => call.args.push(CallArg::Group(group.to_vec())),
            field => {
                let value = member_field(member, field, || format!("{} '{}'", kind, name))?;
                call.args.push(CallArg::Field(value));
            }
        }
    }

    Ok(call)
}

/// One signal per (member, match) pair, members outermost.
pub fn build_signals(
    catalogs: &Catalogs,
    group: &[Member],
    matches: &[NameRef],
) -> Result<Vec<Signal>> {
    let mut signals = Vec::with_capacity(group.len() * matches.len());

    for member in group {
        for match_ref in matches {
            let match_def = catalogs.match_def(&match_ref.name)?;
            let match_params = match_def
                .parameters
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|p| member_field(member, p, || format!("match '{}'", match_def.name)))
                .collect::<Result<Vec<_>>>()?;

            let signal_def = catalogs.signal(&match_def.signal)?;
            let handler_def = catalogs.handler(&signal_def.handler)?;

            signals.push(Signal {
                match_name: match_def.name.clone(),
                match_params,
                signal: build_call(
                    "signal",
                    &signal_def.name,
                    signal_def.parameters.as_deref(),
                    member,
                    group,
                )?,
                handler: build_call(
                    "handler",
                    &handler_def.name,
                    handler_def.parameters.as_deref(),
                    member,
                    group,
                )?,
            });
        }
    }

    Ok(signals)
}

/// Resolves raw events against one set of catalogs.
pub struct EventAssembler<'a> {
    catalogs: &'a Catalogs,
}

impl<'a> EventAssembler<'a> {
    pub fn new(catalogs: &'a Catalogs) -> Self {
        Self { catalogs }
    }

    /// Assemble one raw event for a zone, or `None` when it does not apply.
    pub fn assemble(
        &self,
        zone: u64,
        active_conditions: &[String],
        raw: &RawEvent,
    ) -> Result<Option<Event>> {
        if !is_applicable(zone, active_conditions, raw.zone_conditions.as_deref()) {
            debug!(zone, group = %raw.group, "event skipped by zone conditions");
            return Ok(None);
        }

        let event = match &raw.precondition {
            Some(block) => Event::Guarded(self.assemble_guarded(zone, active_conditions, block)?),
            None => Event::Plain(self.assemble_plain(raw)?),
        };
        Ok(Some(event))
    }

    fn assemble_plain(&self, raw: &RawEvent) -> Result<SetSpeedEvent> {
        let property = raw
            .property
            .as_ref()
            .ok_or_else(|| GenError::MissingParameter {
                owner: "event",
                name: raw.group.clone(),
                parameter: "property".to_string(),
            })?;

        let group_def = self.catalogs.group(&raw.group)?;
        let group = expand(group_def, &raw.interface, property);

        let actions = raw
            .actions
            .iter()
            .map(|action_ref: &ActionRef| {
                let def = self.catalogs.action(&action_ref.name)?;
                resolve_action("action", def, &action_ref.fields, &property.ty)
            })
            .collect::<Result<Vec<_>>>()?;

        let signals = build_signals(self.catalogs, &group, &raw.matches)?;

        debug!(
            group = %raw.group,
            members = group.len(),
            actions = actions.len(),
            signals = signals.len(),
            "assembled event"
        );

        Ok(SetSpeedEvent {
            group,
            actions,
            timer: timer(raw.timer.as_ref()),
            signals,
        })
    }

    fn assemble_guarded(
        &self,
        zone: u64,
        active_conditions: &[String],
        block: &PreconditionBlock,
    ) -> Result<GuardedEvent> {
        let mut group = vec![];
        for group_ref in &block.groups {
            let def = self.catalogs.group(&group_ref.name)?;
            group.extend(expand(def, &group_ref.interface, &group_ref.property));
        }

        let def = self.catalogs.precondition(&block.name)?;
        let action = self.precondition_action(def, block, &group)?;
        let signals = build_signals(self.catalogs, &group, &block.matches)?;

        let mut nested = vec![];
        for raw in &block.events {
            if let Some(event) = self.assemble(zone, active_conditions, raw)? {
                nested.push(event);
            }
        }

        debug!(
            precondition = %block.name,
            members = group.len(),
            nested = nested.len(),
            "assembled guarded event"
        );

        Ok(GuardedEvent {
            group,
            actions: vec![action],
            timer: timer(block.timer.as_ref()),
            signals,
            nested,
        })
    }

    fn precondition_action(
        &self,
        def: &TemplateDef,
        block: &PreconditionBlock,
        group: &[Member],
    ) -> Result<Action> {
        let property_type = block
            .groups
            .first()
            .map(|g| g.property.ty.as_str())
            .unwrap_or(DEFAULT_PARAM_TYPE);

        let declared = def.parameters.as_deref().unwrap_or_default();
        let mut parameters = Vec::with_capacity(declared.len());
        for param in declared {
            if param == "groups" {
                parameters.push(Parameter {
                    ty: PRECOND_GROUPS_TYPE.to_string(),
                    value: ParamValue::PrecondGroups(group.to_vec()),
                });
                continue;
            }
            let value = block.fields.get(param).ok_or_else(|| GenError::MissingParameter {
                owner: "precondition",
                name: def.name.clone(),
                parameter: param.clone(),
            })?;
            parameters.push(derive_parameter(param, value, property_type));
        }

        Ok(Action {
            name: def.name.clone(),
            parameters,
        })
    }
}
