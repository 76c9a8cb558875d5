//! A set of parsed compilation units with their resolved symbols.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use unstable_lint_core::{SymbolTable, Usage};

use crate::error::AnalyzerError;
use crate::index::Index;
use crate::link::link;
use crate::syntax::{self, SourceUnit};
use crate::usages;

/// Parsed and indexed sources.
///
/// Building a program runs declaration indexing and type linking over every
/// unit, since names resolve across files. Usage extraction runs per unit on
/// demand.
pub struct Program {
    units: Vec<SourceUnit>,
    index: Index,
    table: SymbolTable,
}

impl Program {
    /// Parses `(path, source)` pairs and indexes them.
    ///
    /// Units with syntax errors are kept; tree-sitter recovers and the
    /// well-formed parts still resolve.
    ///
    /// # Errors
    ///
    /// Returns an error if the Java grammar cannot be loaded.
    pub fn parse(sources: Vec<(PathBuf, String)>) -> Result<Self, AnalyzerError> {
        let mut parser = syntax::new_parser()?;
        let units = sources
            .into_iter()
            .map(|(path, source)| syntax::parse(&mut parser, path, source))
            .collect::<Result<Vec<_>, _>>()?;

        for unit in units.iter().filter(|u| u.has_errors()) {
            warn!("Syntax errors in {}", unit.path.display());
        }

        let mut table = SymbolTable::new();
        let mut index = Index::build(&units, &mut table);
        link(&mut index, &mut table);
        debug!(
            units = units.len(),
            symbols = table.len(),
            types = index.types.len(),
            "Indexed program"
        );

        Ok(Self {
            units,
            index,
            table,
        })
    }

    /// Number of compilation units.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Path of a unit.
    #[must_use]
    pub fn path(&self, unit: usize) -> Option<&Path> {
        self.units.get(unit).map(|u| u.path.as_path())
    }

    /// Paths of the units that contain syntax errors.
    #[must_use]
    pub fn units_with_errors(&self) -> Vec<&Path> {
        self.units
            .iter()
            .filter(|u| u.has_errors())
            .map(|u| u.path.as_path())
            .collect()
    }

    /// The resolved symbols; usage targets point into this table.
    #[must_use]
    pub fn table(&self) -> &SymbolTable {
        &self.table
    }

    /// Extracts the usages of one unit.
    ///
    /// Locals declared in the unit are added to the symbol table.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError::NestingTooDeep`] if the unit nests deeper
    /// than the walk follows.
    pub fn usages(&mut self, unit: usize) -> Result<Vec<Usage>, AnalyzerError> {
        let Some(source) = self.units.get(unit) else {
            return Ok(Vec::new());
        };
        usages::collect(&self.index, &mut self.table, unit, source)
    }
}
