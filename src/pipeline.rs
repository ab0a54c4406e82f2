//! Generation Pipeline - Single Entry Point
//!
//! load → resolve → assemble → render → write. The output file is only
//! created after the whole layout has been built and rendered, so a failed
//! run leaves nothing behind.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::catalog::{Catalogs, ConditionCatalog};
use crate::config::GeneratorConfig;
use crate::documents::{
    load_document, parse_document, ConditionsDocument, EventsDocument, FanDocument, RawEvent,
    ZoneDocument,
};
use crate::error::{GenError, Result};
use crate::hashing::{compute_ir_digest, sha256_hex};
use crate::ir::ZoneLayout;
use crate::render::render;
use crate::zones::ZoneAssembler;

/// All loaded documents, split into catalogs and raw records.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub zones: ZoneDocument,
    pub fans: FanDocument,
    pub catalogs: Catalogs,
    pub events: Vec<RawEvent>,
    pub conditions: ConditionCatalog,
    /// Names the zone document in diagnostics.
    pub zone_source: String,
}

impl Inputs {
    pub fn new(
        zones: ZoneDocument,
        fans: FanDocument,
        events: Option<EventsDocument>,
        conditions: Option<ConditionsDocument>,
        zone_source: impl Into<String>,
    ) -> Self {
        let (catalogs, events) = Catalogs::from_document(events.unwrap_or_default());
        Self {
            zones,
            fans,
            catalogs,
            events,
            conditions: ConditionCatalog::new(conditions),
            zone_source: zone_source.into(),
        }
    }

    /// Parse documents held in memory.
    pub fn from_yaml(
        zones: &str,
        fans: &str,
        events: Option<&str>,
        conditions: Option<&str>,
    ) -> Result<Self> {
        let parse_err = |name: &str| {
            let path = PathBuf::from(name);
            move |source: serde_yaml::Error| GenError::Parse { path, source }
        };

        let zones: ZoneDocument = parse_document(zones).map_err(parse_err("<zones>"))?;
        let fans: FanDocument = parse_document(fans).map_err(parse_err("<fans>"))?;
        let events: Option<EventsDocument> = events
            .map(|e| parse_document(e).map_err(parse_err("<events>")))
            .transpose()?;
        let conditions: Option<ConditionsDocument> = conditions
            .map(|c| parse_document(c).map_err(parse_err("<zone conditions>")))
            .transpose()?;

        Ok(Self::new(zones, fans, events, conditions, "<zones>"))
    }

    /// Read every document the config names. Optional documents that are
    /// not configured yield empty catalogs.
    pub fn load(config: &GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let zone_path = required(&config.zone_yaml, "zone YAML")?;
        let fan_path = required(&config.fan_yaml, "fan YAML")?;

        let zones: ZoneDocument = load_document(zone_path)?;
        let fans: FanDocument = load_document(fan_path)?;
        let events = config
            .events_yaml
            .as_deref()
            .map(load_document::<EventsDocument>)
            .transpose()?;
        let conditions = config
            .zone_conditions_yaml
            .as_deref()
            .map(load_document::<ConditionsDocument>)
            .transpose()?;

        debug!(
            zone_groups = zones.zone_configuration.len(),
            fans = fans.fans.len(),
            events = events.as_ref().map_or(0, |e| e.events.len()),
            "loaded documents"
        );

        Ok(Self::new(
            zones,
            fans,
            events,
            conditions,
            zone_path.display().to_string(),
        ))
    }

    /// Resolve everything into the zone layout.
    pub fn build(&self) -> Result<ZoneLayout> {
        ZoneAssembler::new(
            &self.catalogs,
            &self.events,
            &self.fans.fans,
            &self.conditions,
            self.zone_source.clone(),
        )
        .build_layout(&self.zones)
    }
}

fn required<'a>(path: &'a Option<PathBuf>, what: &'static str) -> Result<&'a Path> {
    path.as_deref().ok_or(GenError::MissingRequiredInput(what))
}

/// Summary of one successful run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub output_path: PathBuf,
    pub zone_groups: usize,
    pub zones: usize,
    pub events: usize,
    /// SHA-256 of the written text.
    pub digest: String,
    /// SHA-256 of the layout's canonical JSON.
    pub ir_digest: String,
}

/// Load, build, render and write in one call.
pub struct GenerationPipeline {
    config: GeneratorConfig,
}

impl GenerationPipeline {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Build and render without touching the output directory.
    pub fn compile(&self) -> Result<(ZoneLayout, String)> {
        let inputs = Inputs::load(&self.config)?;
        let layout = inputs.build()?;
        let text = render(&layout);
        Ok((layout, text))
    }

    pub fn generate(&self) -> Result<GenerationReport> {
        let (layout, text) = self.compile()?;
        let ir_digest = compute_ir_digest(&layout)?;

        let output_path = self.config.output_path();
        fs::write(&output_path, &text).map_err(|e| GenError::io(&output_path, e))?;

        let report = GenerationReport {
            output_path,
            zone_groups: layout.zone_groups.len(),
            zones: layout.zone_count(),
            events: layout.event_count(),
            digest: sha256_hex(text.as_bytes()),
            ir_digest,
        };

        info!(
            path = %report.output_path.display(),
            digest = %report.digest,
            "wrote zone definitions"
        );

        Ok(report)
    }
}
