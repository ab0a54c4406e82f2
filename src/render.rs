//! Rendering - Zone Layout to Initializer Source
//!
//! Output order is exactly IR order. Nothing is sorted or deduplicated, so
//! identical layouts always render to identical bytes.

use crate::ir::{
    Action, Call, CallArg, Condition, Event, Fan, Member, ParamValue, Parameter, Signal, Timer,
    Zone, ZoneGroup, ZoneLayout,
};

const INDENT: &str = "    ";

const HEADER: &str = r#"/* This is a generated file. */
#include "manager.hpp"
#include "functor.hpp"
#include "actions.hpp"
#include "handlers.hpp"
#include "preconditions.hpp"
#include "matches.hpp"

using namespace phosphor::fan::control;
"#;

/// Indentation-aware line writer.
struct SourceWriter {
    out: String,
    depth: usize,
}

impl SourceWriter {
    fn new() -> Self {
        Self {
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn open(&mut self, text: &str) {
        self.line(text);
        self.depth += 1;
    }

    fn close(&mut self, text: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    /// Append a comma to the last written line unless it ends a list.
    fn separator(&mut self, is_last: bool) {
        if is_last {
            return;
        }
        if self.out.ends_with('\n') {
            self.out.pop();
            self.out.push_str(",\n");
        }
    }
}

pub fn render(layout: &ZoneLayout) -> String {
    let mut w = SourceWriter::new();

    w.out.push_str(HEADER);
    w.out.push('\n');
    w.line(&format!(
        "const unsigned int Manager::_powerOnDelay{{{}}};",
        layout.power_on_delay
    ));
    w.out.push('\n');
    w.line("const std::vector<ZoneGroup> Manager::_zoneLayouts");
    w.open("{");
    for group in &layout.zone_groups {
        write_zone_group(&mut w, group);
    }
    w.close("};");

    w.out
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", text)
}

fn static_cast(ty: &str, value: &str) -> String {
    format!("static_cast<{}>({})", ty, value)
}

fn write_zone_group(w: &mut SourceWriter, group: &ZoneGroup) {
    w.open("ZoneGroup{");
    w.open("std::vector<Condition>{");
    for condition in &group.conditions {
        write_condition(w, condition);
    }
    w.close("},");
    w.open("std::vector<ZoneDefinition>{");
    for zone in &group.zones {
        write_zone(w, zone);
    }
    w.close("}");
    w.close("},");
}

fn write_condition(w: &mut SourceWriter, condition: &Condition) {
    w.open("Condition{");
    w.line(&format!("{},", quoted(&condition.ty)));
    w.open("std::vector<ConditionProperty>{");
    for property in &condition.properties {
        w.open("ConditionProperty{");
        w.line(&format!("{},", quoted(&property.property)));
        w.line(&format!("{},", quoted(&property.interface)));
        w.line(&format!("{},", quoted(&property.path)));
        w.line(&format!("{},", static_cast(&property.ty, &property.value)));
        w.close("},");
    }
    w.close("},");
    w.close("},");
}

fn write_zone(w: &mut SourceWriter, zone: &Zone) {
    w.open("ZoneDefinition{");
    w.line(&format!("{},", zone.num));
    w.line(&format!("{},", zone.full_speed));
    w.line(&format!("{},", zone.default_floor));
    w.line(&format!("{},", zone.increase_delay));
    w.line(&format!("{},", zone.decrease_interval));
    w.open("std::vector<FanDefinition>{");
    for fan in &zone.fans {
        write_fan(w, fan);
    }
    w.close("},");
    w.open("std::vector<SetSpeedEvent>{");
    for event in &zone.events {
        write_event(w, event);
    }
    w.close("}");
    w.close("},");
}

fn write_fan(w: &mut SourceWriter, fan: &Fan) {
    w.open("FanDefinition{");
    w.line(&format!("{},", quoted(&fan.name)));
    w.open("std::vector<std::string>{");
    for sensor in &fan.sensors {
        w.line(&format!("{},", quoted(sensor)));
    }
    w.close("}");
    w.close("},");
}

fn write_event(w: &mut SourceWriter, event: &Event) {
    w.open("SetSpeedEvent{");
    match event {
        Event::Plain(e) => {
            write_group(w, &e.group);
            write_actions(w, "action", &e.actions, None);
            write_timer(w, e.timer);
            write_signals(w, &e.signals);
        }
        Event::Guarded(e) => {
            write_group(w, &e.group);
            write_actions(w, "precondition", &e.actions, Some(e.nested.as_slice()));
            write_timer(w, e.timer);
            write_signals(w, &e.signals);
        }
    }
    w.close("},");
}

fn member_literal(member: &Member) -> String {
    format!(
        "{{{}, {{{}, {}}}}}",
        quoted(&member.object),
        quoted(&member.interface),
        quoted(&member.property)
    )
}

fn write_group_literal(w: &mut SourceWriter, group: &[Member]) {
    w.open("Group{");
    for member in group {
        w.line(&format!("{},", member_literal(member)));
    }
    w.close("}");
}

fn write_group(w: &mut SourceWriter, group: &[Member]) {
    write_group_literal(w, group);
    w.separator(false);
}

fn precond_group_literal(member: &Member) -> String {
    let value = member.value.as_deref().unwrap_or_default().to_lowercase();
    format!(
        "PrecondGroup{{{},{},{},{}}}",
        quoted(&member.object),
        quoted(&member.interface),
        quoted(&member.property),
        static_cast(&member.ty.to_lowercase(), &value)
    )
}

fn write_parameter(w: &mut SourceWriter, param: &Parameter) {
    match &param.value {
        ParamValue::Scalar(value) => w.line(&static_cast(&param.ty, value)),
        ParamValue::Literal(literal) => w.line(&format!("{}{}", param.ty, literal)),
        ParamValue::PrecondGroups(members) => {
            w.open(&format!("{}{{", param.ty));
            for member in members {
                w.line(&format!("{},", precond_group_literal(member)));
            }
            w.close("}");
        }
    }
}

/// Actions of an event. For a guarded event the nested event list is the
/// final argument of the last precondition action.
fn write_actions(w: &mut SourceWriter, namespace: &str, actions: &[Action], nested: Option<&[Event]>) {
    w.open("std::vector<Action>{");
    for (i, action) in actions.iter().enumerate() {
        let is_last = i + 1 == actions.len();
        let nested = nested.filter(|_| is_last);
        let arg_count = action.parameters.len() + usize::from(nested.is_some());

        if arg_count == 0 {
            w.line(&format!("make_action({}::{}),", namespace, action.name));
            continue;
        }

        w.open(&format!("make_action({}::{}(", namespace, action.name));
        for (j, param) in action.parameters.iter().enumerate() {
            write_parameter(w, param);
            w.separator(j + 1 == arg_count);
        }
        if let Some(events) = nested {
            w.open("std::vector<SetSpeedEvent>{");
            for event in events {
                write_event(w, event);
            }
            w.close("}");
        }
        w.close(")),");
    }
    w.close("},");
}

fn write_timer(w: &mut SourceWriter, timer: Timer) {
    w.open("Timer{");
    w.line(&static_cast("std::chrono::seconds", &timer.interval.to_string()));
    w.close("},");
}

fn write_call(w: &mut SourceWriter, prefix: &str, call: &Call, tail: Option<&Call>) {
    let head = match &call.type_arg {
        Some(ty) => format!("{}{}<{}>(", prefix, call.name, ty),
        None => format!("{}{}(", prefix, call.name),
    };
    w.open(&head);

    let arg_count = call.args.len() + usize::from(tail.is_some());
    for (i, arg) in call.args.iter().enumerate() {
        match arg {
            CallArg::Field(value) => w.line(&quoted(value)),
            CallArg::Group(members) => write_group_literal(w, members),
        }
        w.separator(i + 1 == arg_count);
    }
    if let Some(handler) = tail {
        write_call(w, "handler::", handler, None);
    }
    w.close(")");
}

fn write_signals(w: &mut SourceWriter, signals: &[Signal]) {
    w.open("std::vector<Signal>{");
    for signal in signals {
        w.open("Signal{");
        w.open(&format!("match::{}(", signal.match_name));
        for (i, param) in signal.match_params.iter().enumerate() {
            w.line(&quoted(param));
            w.separator(i + 1 == signal.match_params.len());
        }
        w.close("),");
        w.open("make_handler(");
        write_call(w, "", &signal.signal, Some(&signal.handler));
        w.close(")");
        w.close("},");
    }
    w.close("}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{GuardedEvent, SetSpeedEvent};

    fn member(suffix: &str) -> Member {
        Member {
            object: format!("/xyz/openbmc_project/sensors/temperature/{}", suffix),
            interface: "xyz.openbmc_project.Sensor.Value".to_string(),
            property: "Value".to_string(),
            ty: "int64_t".to_string(),
            value: None,
        }
    }

    fn plain_event(speed: &str) -> Event {
        Event::Plain(SetSpeedEvent {
            group: vec![member("ambient")],
            actions: vec![Action {
                name: "set_speed".to_string(),
                parameters: vec![Parameter {
                    ty: "size_t".to_string(),
                    value: ParamValue::Scalar(speed.to_string()),
                }],
            }],
            timer: Timer { interval: 0 },
            signals: vec![Signal {
                match_name: "propertiesChanged".to_string(),
                match_params: vec![
                    "/xyz/openbmc_project/sensors/temperature/ambient".to_string(),
                    "xyz.openbmc_project.Sensor.Value".to_string(),
                ],
                signal: Call {
                    name: "propertySignal".to_string(),
                    type_arg: Some("int64_t".to_string()),
                    args: vec![CallArg::Field("xyz.openbmc_project.Sensor.Value".to_string())],
                },
                handler: Call {
                    name: "setProperty".to_string(),
                    type_arg: None,
                    args: vec![CallArg::Group(vec![member("ambient")])],
                },
            }],
        })
    }

    fn layout(events: Vec<Event>) -> ZoneLayout {
        ZoneLayout {
            power_on_delay: 20,
            zone_groups: vec![ZoneGroup {
                conditions: vec![],
                zones: vec![Zone {
                    num: 0,
                    full_speed: 10500,
                    default_floor: 8000,
                    increase_delay: 0,
                    decrease_interval: 0,
                    fans: vec![Fan {
                        name: "/system/chassis/motherboard/fan0".to_string(),
                        sensors: vec!["fan0".to_string()],
                    }],
                    events,
                }],
            }],
        }
    }

    #[test]
    fn test_render_header_and_delay() {
        let text = render(&layout(vec![]));
        assert!(text.starts_with("/* This is a generated file. */"));
        assert!(text.contains("const unsigned int Manager::_powerOnDelay{20};"));
        assert!(text.contains("const std::vector<ZoneGroup> Manager::_zoneLayouts\n{\n"));
        assert!(text.ends_with("};\n"));
    }

    #[test]
    fn test_render_plain_event() {
        let text = render(&layout(vec![plain_event("50")]));
        assert!(text.contains("make_action(action::set_speed(\n"));
        assert!(text.contains("static_cast<size_t>(50)\n"));
        assert!(text.contains("static_cast<std::chrono::seconds>(0)"));
        assert!(text.contains("match::propertiesChanged(\n"));
        assert!(text.contains("propertySignal<int64_t>(\n"));
        assert!(text.contains("\"xyz.openbmc_project.Sensor.Value\",\n"));
        assert!(text.contains("handler::setProperty(\n"));
        assert!(text.contains(
            "{\"/xyz/openbmc_project/sensors/temperature/ambient\", {\"xyz.openbmc_project.Sensor.Value\", \"Value\"}},"
        ));
    }

    #[test]
    fn test_render_guarded_event_nests_events_in_action() {
        let mut guard_member = member("ambient");
        guard_member.ty = "Bool".to_string();
        guard_member.value = Some("TRUE".to_string());

        let guarded = Event::Guarded(GuardedEvent {
            group: vec![guard_member.clone()],
            actions: vec![Action {
                name: "property_states_match".to_string(),
                parameters: vec![Parameter {
                    ty: "std::vector<PrecondGroup>".to_string(),
                    value: ParamValue::PrecondGroups(vec![guard_member]),
                }],
            }],
            timer: Timer { interval: 0 },
            signals: vec![],
            nested: vec![plain_event("1"), plain_event("2")],
        });
        let text = render(&layout(vec![guarded]));

        assert!(text.contains("make_action(precondition::property_states_match(\n"));
        assert!(text.contains(
            "PrecondGroup{\"/xyz/openbmc_project/sensors/temperature/ambient\",\"xyz.openbmc_project.Sensor.Value\",\"Value\",static_cast<bool>(true)},"
        ));
        let first = text.find("static_cast<size_t>(1)").unwrap();
        let second = text.find("static_cast<size_t>(2)").unwrap();
        assert!(first < second);
        assert_eq!(text.matches("SetSpeedEvent{").count(), 3);
    }

    #[test]
    fn test_render_literal_and_empty_action() {
        let event = Event::Plain(SetSpeedEvent {
            group: vec![],
            actions: vec![
                Action {
                    name: "set_floor_from_average_sensor_value".to_string(),
                    parameters: vec![Parameter {
                        ty: "std::map<int64_t, uint64_t>".to_string(),
                        value: ParamValue::Literal("{{27000, 3500}}".to_string()),
                    }],
                },
                Action {
                    name: "default_floor_on_missing_owner".to_string(),
                    parameters: vec![],
                },
            ],
            timer: Timer { interval: 30 },
            signals: vec![],
        });
        let text = render(&layout(vec![event]));
        assert!(text.contains("std::map<int64_t, uint64_t>{{27000, 3500}}\n"));
        assert!(text.contains("make_action(action::default_floor_on_missing_owner),"));
        assert!(text.contains("static_cast<std::chrono::seconds>(30)"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let l = layout(vec![plain_event("50")]);
        assert_eq!(render(&l), render(&l.clone()));
    }
}
