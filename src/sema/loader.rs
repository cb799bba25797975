use std::collections::HashMap;

use crate::parser::ast::DeclarationBlock;

/// Resolves a `uses`-clause name to the unit's interface declarations.
/// The unit-file loader itself is an external collaborator per the data
/// model's component boundary (§6) — this trait is the seam the analyzer
/// calls through, never a concrete filesystem implementation.
pub trait UnitLoader {
    fn load(&self, unit_name: &str) -> Option<DeclarationBlock>;
}

/// A loader that resolves nothing, for driving the analyzer over a
/// program with no `uses` clause, or one whose units are intentionally
/// left unresolved (each reports [`super::error::SemaErrorKind::UnknownUnit`]).
#[derive(Debug, Default)]
pub struct NullLoader;

impl UnitLoader for NullLoader {
    fn load(&self, _unit_name: &str) -> Option<DeclarationBlock> {
        None
    }
}

/// An in-memory loader for tests and embedding callers that already have
/// parsed interface blocks on hand (e.g. having run the parser over a
/// unit file themselves).
#[derive(Debug, Default)]
pub struct MapLoader {
    units: HashMap<String, DeclarationBlock>,
}

impl MapLoader {
    pub fn new() -> Self {
        MapLoader::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, block: DeclarationBlock) {
        self.units.insert(name.into(), block);
    }
}

impl UnitLoader for MapLoader {
    fn load(&self, unit_name: &str) -> Option<DeclarationBlock> {
        self.units.get(unit_name).cloned()
    }
}
