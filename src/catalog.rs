//! Catalogs - Name-Keyed Definition Tables
//!
//! Every cross-reference in the event document goes through [`resolve`].
//! Catalogs keep document order and are never mutated after load.

use std::collections::HashSet;
use tracing::warn;

use crate::documents::{
    ConditionSpec, ConditionsDocument, EventsDocument, GroupDef, MatchDef, RawEvent, SignalDef,
    TemplateDef,
};
use crate::error::{CatalogKind, GenError, Result};

/// Anything that can be looked up by name.
pub trait Named {
    fn name(&self) -> &str;
}

macro_rules! impl_named {
    ($($ty:ty),* $(,)?) => {
        $(impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

impl_named!(GroupDef, TemplateDef, MatchDef, SignalDef, ConditionSpec);

/// Return the first entry named `name`, in document order.
///
/// Duplicates are not rejected; the first one shadows the rest.
pub fn resolve<'a, T: Named>(entries: &'a [T], kind: CatalogKind, name: &str) -> Result<&'a T> {
    entries
        .iter()
        .find(|entry| entry.name() == name)
        .ok_or_else(|| GenError::unresolved(kind, name))
}

/// Names that appear more than once, in order of their second appearance.
pub fn duplicate_names<T: Named>(entries: &[T]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut duplicates = vec![];
    for entry in entries {
        if !seen.insert(entry.name()) && !duplicates.contains(&entry.name()) {
            duplicates.push(entry.name());
        }
    }
    duplicates
}

fn warn_duplicates<T: Named>(entries: &[T], kind: CatalogKind) {
    for name in duplicate_names(entries) {
        warn!(%kind, name, "duplicate catalog entry, first definition wins");
    }
}

/// The six reusable definition tables of the event document.
#[derive(Debug, Clone, Default)]
pub struct Catalogs {
    pub groups: Vec<GroupDef>,
    pub actions: Vec<TemplateDef>,
    pub matches: Vec<MatchDef>,
    pub signals: Vec<SignalDef>,
    pub handlers: Vec<TemplateDef>,
    pub preconditions: Vec<TemplateDef>,
}

impl Catalogs {
    /// Split an events document into its catalogs and its raw event list.
    pub fn from_document(doc: EventsDocument) -> (Self, Vec<RawEvent>) {
        let catalogs = Self {
            groups: doc.groups,
            actions: doc.actions,
            matches: doc.matches,
            signals: doc.signals,
            handlers: doc.handlers,
            preconditions: doc.preconditions,
        };
        catalogs.report_duplicates();
        (catalogs, doc.events)
    }

    fn report_duplicates(&self) {
        warn_duplicates(&self.groups, CatalogKind::Group);
        warn_duplicates(&self.actions, CatalogKind::Action);
        warn_duplicates(&self.matches, CatalogKind::Match);
        warn_duplicates(&self.signals, CatalogKind::Signal);
        warn_duplicates(&self.handlers, CatalogKind::Handler);
        warn_duplicates(&self.preconditions, CatalogKind::Precondition);
    }

    pub fn group(&self, name: &str) -> Result<&GroupDef> {
        resolve(&self.groups, CatalogKind::Group, name)
    }

    pub fn action(&self, name: &str) -> Result<&TemplateDef> {
        resolve(&self.actions, CatalogKind::Action, name)
    }

    pub fn match_def(&self, name: &str) -> Result<&MatchDef> {
        resolve(&self.matches, CatalogKind::Match, name)
    }

    pub fn signal(&self, name: &str) -> Result<&SignalDef> {
        resolve(&self.signals, CatalogKind::Signal, name)
    }

    pub fn handler(&self, name: &str) -> Result<&TemplateDef> {
        resolve(&self.handlers, CatalogKind::Handler, name)
    }

    pub fn precondition(&self, name: &str) -> Result<&TemplateDef> {
        resolve(&self.preconditions, CatalogKind::Precondition, name)
    }
}

/// Zone conditions, or the knowledge that no conditions document was given.
#[derive(Debug, Clone, Default)]
pub struct ConditionCatalog {
    conditions: Option<Vec<ConditionSpec>>,
}

impl ConditionCatalog {
    pub fn new(doc: Option<ConditionsDocument>) -> Self {
        let conditions = doc.map(|d| d.conditions);
        if let Some(conditions) = &conditions {
            warn_duplicates(conditions, CatalogKind::Condition);
        }
        Self { conditions }
    }

    pub fn resolve(&self, name: &str) -> Result<&ConditionSpec> {
        let conditions = self
            .conditions
            .as_ref()
            .ok_or(GenError::MissingConditionsDocument)?;
        resolve(conditions, CatalogKind::Condition, name)
    }
}
