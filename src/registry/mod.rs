//! Command resolution table.
//!
//! Maps every asset name named by a directive to either its own conversion
//! command or a shared combine aggregator.
//!
//! # Example
//!
//! ```ignore
//! use mpq_minify::parser::parse_directives;
//! use mpq_minify::registry::{CommandTable, Resolution};
//!
//! let table = CommandTable::from_directives(parse_directives(source.lines())?)?;
//! match table.resolve("towners/smith/smithn.cl2") {
//!     Some(Resolution::Combined(id)) => println!("{:?}", table.aggregator(id).files),
//!     Some(Resolution::Direct(command)) => println!("{}", command.kind()),
//!     None => println!("copied as is"),
//! }
//! ```

mod aggregator;

use std::collections::HashMap;

use crate::error::{MinifyError, Result};
use crate::parser::Directive;
use crate::types::{normalize_name, CommandKind, ConversionCommand};

pub use aggregator::{Aggregator, AggregatorId, AggregatorState, AggregatorStates};

/// How an asset name resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Convert this file on its own.
    Direct(&'a ConversionCommand),
    /// Convert this file together with the other members of an aggregator.
    Combined(AggregatorId),
}

#[derive(Debug, Clone)]
enum Entry {
    Direct(ConversionCommand),
    Combined(AggregatorId),
}

/// Immutable lookup table from normalized asset name to its command.
///
/// Use `CommandTableBuilder` or `CommandTable::from_directives` to create one.
#[derive(Debug, Default)]
pub struct CommandTable {
    aggregators: Vec<Aggregator>,
    per_file: HashMap<String, Entry>,
}

impl CommandTable {
    /// Build a table from parsed directives.
    pub fn from_directives(directives: impl IntoIterator<Item = Directive>) -> Result<Self> {
        let mut builder = CommandTableBuilder::new();
        for directive in directives {
            builder.add_directive(directive)?;
        }
        Ok(builder.build())
    }

    /// Resolve an asset name. Either slash form finds the same entry.
    pub fn resolve(&self, name: &str) -> Option<Resolution<'_>> {
        let entry = if name.contains('\\') {
            self.per_file.get(&normalize_name(name))
        } else {
            self.per_file.get(name)
        };
        entry.map(|entry| match entry {
            Entry::Direct(command) => Resolution::Direct(command),
            Entry::Combined(id) => Resolution::Combined(*id),
        })
    }

    /// Get an aggregator by id.
    pub fn aggregator(&self, id: AggregatorId) -> &Aggregator {
        &self.aggregators[id.index()]
    }

    /// All aggregators in declaration order.
    pub fn aggregators(&self) -> &[Aggregator] {
        &self.aggregators
    }

    /// Fresh `Pending` states for every aggregator of this table.
    pub fn new_states(&self) -> AggregatorStates {
        AggregatorStates::new(self.aggregators.len())
    }

    /// Number of registered file names.
    pub fn len(&self) -> usize {
        self.per_file.len()
    }

    /// Check if the table has no registrations.
    pub fn is_empty(&self) -> bool {
        self.per_file.is_empty()
    }
}

/// Builder for constructing a `CommandTable`.
#[derive(Debug, Default)]
pub struct CommandTableBuilder {
    aggregators: Vec<Aggregator>,
    per_file: HashMap<String, Entry>,
}

impl CommandTableBuilder {
    /// Create a new, empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every file of a directive.
    ///
    /// Fails if any file already has a registration, or if a non-CL2 command
    /// asks to be combined.
    pub fn add_directive(&mut self, directive: Directive) -> Result<&mut Self> {
        let Directive {
            command,
            files,
            combine,
        } = directive;

        let entry = if combine {
            if command.kind() != CommandKind::Cl2ToClx {
                return Err(MinifyError::Config {
                    message: format!(
                        "Only CL2 files can be combined, got {} for {}",
                        command.kind(),
                        files.join(" ")
                    ),
                    help: Some("Remove --combine or use cl22clx".to_string()),
                });
            }
            let id = AggregatorId::new(self.aggregators.len());
            self.aggregators.push(Aggregator {
                command,
                files: files.iter().map(|f| normalize_name(f)).collect(),
            });
            Entry::Combined(id)
        } else {
            Entry::Direct(command)
        };

        for file in files {
            self.register(normalize_name(&file), entry.clone())?;
        }
        Ok(self)
    }

    fn register(&mut self, name: String, entry: Entry) -> Result<()> {
        if self.per_file.contains_key(&name) {
            return Err(MinifyError::Config {
                message: format!("More than 1 CLX conversion command for {}", name),
                help: Some("Each file may appear in only one directive".to_string()),
            });
        }
        self.per_file.insert(name, entry);
        Ok(())
    }

    /// Finish building the table.
    pub fn build(self) -> CommandTable {
        CommandTable {
            aggregators: self.aggregators,
            per_file: self.per_file,
        }
    }
}
