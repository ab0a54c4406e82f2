//! Zone Assembly - Fans, Parameters and Events per Zone

use tracing::{debug, info};

use crate::catalog::{Catalogs, ConditionCatalog};
use crate::documents::{
    value_text, ConditionSpec, FanSpec, RawEvent, ZoneDocument, ZoneGroupSpec, ZoneSpec,
};
use crate::error::{GenError, Result};
use crate::events::EventAssembler;
use crate::ir::{Condition, ConditionProperty, Event, Fan, Zone, ZoneGroup, ZoneLayout};

/// Fans in `zone` whose cooling profile is one of `profiles`, in document order.
pub fn select_fans(zone: u64, profiles: &[String], fans: &[FanSpec]) -> Vec<Fan> {
    fans.iter()
        .filter(|f| f.cooling_zone == zone)
        .filter(|f| profiles.iter().any(|p| p == f.profile()))
        .map(|f| Fan {
            name: f.inventory.clone(),
            sensors: f.sensors.clone(),
        })
        .collect()
}

fn to_condition(spec: &ConditionSpec) -> Condition {
    Condition {
        name: spec.name.clone(),
        ty: spec.ty.clone(),
        properties: spec
            .properties
            .iter()
            .map(|p| ConditionProperty {
                property: p.property.clone(),
                interface: p.interface.clone(),
                path: p.path.clone(),
                ty: p.ty.to_lowercase(),
                value: value_text(&p.value).to_lowercase(),
            })
            .collect(),
    }
}

/// Everything a zone needs resolved against: catalogs, fans, events, conditions.
pub struct ZoneAssembler<'a> {
    events: EventAssembler<'a>,
    raw_events: &'a [RawEvent],
    fans: &'a [FanSpec],
    conditions: &'a ConditionCatalog,
    /// Names the zone document in diagnostics.
    document: String,
}

impl<'a> ZoneAssembler<'a> {
    pub fn new(
        catalogs: &'a Catalogs,
        raw_events: &'a [RawEvent],
        fans: &'a [FanSpec],
        conditions: &'a ConditionCatalog,
        document: impl Into<String>,
    ) -> Self {
        Self {
            events: EventAssembler::new(catalogs),
            raw_events,
            fans,
            conditions,
            document: document.into(),
        }
    }

    /// Build one zone. `active_conditions` are the condition names of the
    /// zone's group, used to filter events.
    pub fn assemble_zone(&self, spec: &ZoneSpec, active_conditions: &[String]) -> Result<Zone> {
        let num = spec.zone.ok_or_else(|| GenError::MissingZoneNumber {
            document: self.document.clone(),
        })?;

        let fans = select_fans(num, &spec.profiles(), self.fans);
        if fans.is_empty() {
            return Err(GenError::EmptyFanSelection { zone: num });
        }

        let mut events = vec![];
        for raw in self.raw_events {
            if let Some(event) = self.events.assemble(num, active_conditions, raw)? {
                events.push(event);
            }
        }

        debug!(
            zone = num,
            fans = fans.len(),
            events = events.len(),
            leaf_events = events.iter().map(Event::leaf_count).sum::<usize>(),
            "assembled zone"
        );

        Ok(Zone {
            num,
            full_speed: spec.full_speed,
            default_floor: spec.default_floor,
            increase_delay: spec.increase_delay,
            decrease_interval: spec.decrease_interval,
            fans,
            events,
        })
    }

    /// Resolve a group's conditions and build each of its zones.
    pub fn assemble_group(&self, group: &ZoneGroupSpec) -> Result<ZoneGroup> {
        let names: Vec<String> = group
            .zone_conditions
            .iter()
            .flatten()
            .map(|c| c.name.clone())
            .collect();

        let conditions = names
            .iter()
            .map(|name| self.conditions.resolve(name).map(to_condition))
            .collect::<Result<Vec<_>>>()?;

        let zones = group
            .zones
            .iter()
            .map(|zone| self.assemble_zone(zone, &names))
            .collect::<Result<Vec<_>>>()?;

        Ok(ZoneGroup { conditions, zones })
    }

    /// Build the complete layout. Zone groups with the same ordered
    /// condition list are merged at the position of the first one.
    pub fn build_layout(&self, zone_doc: &ZoneDocument) -> Result<ZoneLayout> {
        let mut zone_groups: Vec<ZoneGroup> = vec![];

        for spec in &zone_doc.zone_configuration {
            let group = self.assemble_group(spec)?;
            match zone_groups
                .iter_mut()
                .find(|existing| existing.conditions == group.conditions)
            {
                Some(existing) => existing.zones.extend(group.zones),
                None => zone_groups.push(group),
            }
        }

        let layout = ZoneLayout {
            power_on_delay: zone_doc.manager_configuration.power_on_delay.unwrap_or(0),
            zone_groups,
        };

        info!(
            zone_groups = layout.zone_groups.len(),
            zones = layout.zone_count(),
            events = layout.event_count(),
            "built zone layout"
        );

        Ok(layout)
    }
}
