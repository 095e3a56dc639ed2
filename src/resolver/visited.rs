use crate::document::EntityKind;
use crate::location::Location;
use std::collections::HashSet;

/// Per-call bookkeeping that keeps the walk finite.
///
/// Three independent sets:
/// - node identities already entered (cycle break)
/// - resolved value identities already walked, per entity kind, so a value
///   reached through several wrappers has its children resolved once
/// - `(document location, path template)` pairs already expanded
#[derive(Debug, Default)]
pub(crate) struct VisitedSet {
    nodes: HashSet<usize>,
    values: HashSet<(EntityKind, usize)>,
    paths: HashSet<(String, String)>,
}

/// Key used for path items of a document that has no location.
const NO_LOCATION: &str = "_";

impl VisitedSet {
    /// Marks a node as entered. Returns `false` if it already was.
    pub(crate) fn enter_node(&mut self, id: usize) -> bool {
        self.nodes.insert(id)
    }

    pub(crate) fn has_value(&self, kind: EntityKind, id: usize) -> bool {
        self.values.contains(&(kind, id))
    }

    /// Records a value as walked. Returns `false` if it already was.
    pub(crate) fn record_value(&mut self, kind: EntityKind, id: usize) -> bool {
        self.values.insert((kind, id))
    }

    /// Marks a path template of the document at `location` as expanded.
    /// Returns `false` if it already was.
    pub(crate) fn enter_path(&mut self, location: Option<&Location>, template: &str) -> bool {
        let key = location.map_or_else(|| NO_LOCATION.to_string(), Location::to_string);
        self.paths.insert((key, template.to_string()))
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }
}
