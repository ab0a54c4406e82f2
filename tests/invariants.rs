//! Contract Invariant Tests
//!
//! These tests verify the guarantees end to end, from YAML to rendered text.

use std::fs;
use std::path::Path;

use fanzone_gen::{
    ir::{ParamValue, Parameter},
    CatalogKind, Event, GenError, GenerationPipeline, GeneratorConfig, Inputs, OUTPUT_FILE_NAME,
    render,
};

const ZONES: &str = r#"
manager_configuration:
  power_on_delay: 20
zone_configuration:
  - zones:
      - zone: 1
        full_speed: 10500
        default_floor: 8000
        cooling_profiles:
          - all
"#;

const FANS: &str = r#"
fans:
  - inventory: /system/chassis/motherboard/fan0
    cooling_zone: 1
    sensors:
      - fan0
  - inventory: /system/chassis/motherboard/fan1
    cooling_zone: 1
    cooling_profile: all
    sensors:
      - fan1
"#;

const EVENTS: &str = r#"
groups:
  - name: G
    type: /xyz/openbmc_project/sensors/temperature/
    members:
      - ambient
      - cpu0
actions:
  - name: A
    parameters:
      - speed
matches:
  - name: propertiesChanged
    parameters:
      - object
      - interface
    signal: propertySignal
  - name: interfacesAdded
    parameters:
      - object
    signal: propertySignal
signals:
  - name: propertySignal
    parameters:
      - type
      - interface
      - property
    handler: setProperty
handlers:
  - name: setProperty
    parameters:
      - type
      - object
      - interface
      - property
preconditions:
  - name: property_states_match
    parameters:
      - groups
events:
  - group: G
    interface: xyz.openbmc_project.Sensor.Value
    property:
      name: Value
      type: int64_t
    actions:
      - name: A
        speed: 50
    matches:
      - name: propertiesChanged
      - name: interfacesAdded
"#;

const GUARDED_EVENTS: &str = r#"
  - precondition:
      name: property_states_match
      groups:
        - name: G
          interface: xyz.openbmc_project.State.Decorator.OperationalStatus
          property:
            name: Functional
            type: bool
            value: true
      matches:
        - name: propertiesChanged
      events:
        - group: G
          interface: xyz.openbmc_project.Sensor.Value
          property:
            name: Value
            type: int64_t
          actions:
            - name: A
              speed: 11
          matches: []
          zone_conditions: []
        - group: G
          interface: xyz.openbmc_project.Sensor.Value
          property:
            name: Value
            type: int64_t
          actions:
            - name: A
              speed: 22
          matches: []
  - group: G
    interface: xyz.openbmc_project.Sensor.Value
    property:
      name: Value
      type: int64_t
    actions:
      - name: A
        speed: 99
    matches: []
    zone_conditions:
      - zones:
          - 0
          - 2
"#;

fn write_inputs(dir: &Path, events: &str) -> GeneratorConfig {
    let zone_yaml = dir.join("zones.yaml");
    let fan_yaml = dir.join("fans.yaml");
    let events_yaml = dir.join("events.yaml");
    fs::write(&zone_yaml, ZONES).unwrap();
    fs::write(&fan_yaml, FANS).unwrap();
    fs::write(&events_yaml, events).unwrap();

    let out = dir.join("out");
    fs::create_dir(&out).unwrap();

    GeneratorConfig {
        zone_yaml: Some(zone_yaml),
        fan_yaml: Some(fan_yaml),
        events_yaml: Some(events_yaml),
        zone_conditions_yaml: None,
        output_dir: out,
    }
}

#[test]
fn invariant_example_zone_with_one_event() {
    let inputs = Inputs::from_yaml(ZONES, FANS, Some(EVENTS), None).unwrap();
    let layout = inputs.build().unwrap();

    let zone = &layout.zone_groups[0].zones[0];
    assert_eq!(zone.num, 1);
    assert_eq!(zone.fans.len(), 2);
    assert_eq!(zone.events.len(), 1);

    let event = match &zone.events[0] {
        Event::Plain(e) => e,
        other => panic!("expected plain event, got {:?}", other),
    };
    assert_eq!(
        event.actions[0].parameters,
        vec![Parameter {
            ty: "size_t".to_string(),
            value: ParamValue::Scalar("50".to_string()),
        }]
    );
    // 2 members x 2 matches
    assert_eq!(event.signals.len(), 4);
    assert_eq!(event.timer.interval, 0);
}

#[test]
fn invariant_guarded_event_keeps_nested_order() {
    let events = format!("{}{}", EVENTS, GUARDED_EVENTS);
    let inputs = Inputs::from_yaml(ZONES, FANS, Some(&events), None).unwrap();
    let layout = inputs.build().unwrap();
    let zone = &layout.zone_groups[0].zones[0];

    // the last event only applies to zones 0 and 2
    assert_eq!(zone.events.len(), 2);

    let guarded = match &zone.events[1] {
        Event::Guarded(g) => g,
        other => panic!("expected guarded event, got {:?}", other),
    };
    assert_eq!(guarded.nested.len(), 2);
    assert_eq!(guarded.signals.len(), 2);
    let speeds: Vec<_> = guarded
        .nested
        .iter()
        .map(|e| match e {
            Event::Plain(p) => p.actions[0].parameters[0].value.clone(),
            Event::Guarded(_) => panic!("unexpected nested guard"),
        })
        .collect();
    assert_eq!(
        speeds,
        vec![
            ParamValue::Scalar("11".to_string()),
            ParamValue::Scalar("22".to_string()),
        ]
    );
}

#[test]
fn invariant_rendering_is_deterministic() {
    let events = format!("{}{}", EVENTS, GUARDED_EVENTS);
    let first = Inputs::from_yaml(ZONES, FANS, Some(&events), None)
        .unwrap()
        .build()
        .unwrap();
    let second = Inputs::from_yaml(ZONES, FANS, Some(&events), None)
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(render(&first), render(&second));
}

#[test]
fn invariant_two_runs_write_identical_files() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_inputs(dir.path(), EVENTS);

    let first = GenerationPipeline::new(config.clone()).generate().unwrap();
    let first_text = fs::read_to_string(&first.output_path).unwrap();
    let second = GenerationPipeline::new(config).generate().unwrap();
    let second_text = fs::read_to_string(&second.output_path).unwrap();

    assert_eq!(first_text, second_text);
    assert_eq!(first.digest, second.digest);
    assert_eq!(first.ir_digest, second.ir_digest);
    assert!(first.output_path.ends_with(OUTPUT_FILE_NAME));
    assert_eq!(first.zones, 1);
    assert_eq!(first.events, 1);
    assert!(first_text.contains("const unsigned int Manager::_powerOnDelay{20};"));
}

#[test]
fn invariant_failed_build_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let broken = EVENTS.replace("handler: setProperty", "handler: missingHandler");
    let config = write_inputs(dir.path(), &broken);
    let output = config.output_path();

    let err = GenerationPipeline::new(config).generate().unwrap_err();
    assert!(matches!(
        err,
        GenError::UnresolvedReference { kind: CatalogKind::Handler, ref name } if name == "missingHandler"
    ));
    assert!(!output.exists());
}

#[test]
fn invariant_missing_required_input_reads_nothing() {
    let config = GeneratorConfig {
        zone_yaml: Some("/nonexistent/zones.yaml".into()),
        ..GeneratorConfig::default()
    };
    let err = GenerationPipeline::new(config).generate().unwrap_err();
    assert!(matches!(err, GenError::MissingRequiredInput(_)));
}

#[test]
fn invariant_optional_documents_default_to_empty() {
    let inputs = Inputs::from_yaml(ZONES, FANS, None, None).unwrap();
    let layout = inputs.build().unwrap();
    assert!(layout.zone_groups[0].zones[0].events.is_empty());
}

#[test]
fn invariant_zone_without_fans_fails() {
    let zones = ZONES.replace("zone: 1", "zone: 4");
    let err = Inputs::from_yaml(&zones, FANS, Some(EVENTS), None)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(err, GenError::EmptyFanSelection { zone: 4 }));
    assert_eq!(err.to_string(), "Didn't find any fans in zone 4");
}

#[test]
fn invariant_unresolved_group_fails() {
    let events = EVENTS.replace("  - group: G\n", "  - group: H\n");
    let err = Inputs::from_yaml(ZONES, FANS, Some(&events), None)
        .unwrap()
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        GenError::UnresolvedReference { kind: CatalogKind::Group, ref name } if name == "H"
    ));
}
