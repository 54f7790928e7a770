//! Combine aggregators and their processing state.

use crate::types::ConversionCommand;

/// Index of an aggregator within its `CommandTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AggregatorId(usize);

impl AggregatorId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Several source files converted into one combined sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregator {
    /// Always `ConversionCommand::Cl2ToClx`.
    pub command: ConversionCommand,
    /// Normalized member names in declaration order.
    pub files: Vec<String>,
}

/// Processing state of one aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggregatorState {
    #[default]
    Pending,
    Processed,
}

/// Per-archive processing state for every aggregator of a table.
///
/// Kept apart from the table so the table stays immutable during a walk.
#[derive(Debug, Clone, Default)]
pub struct AggregatorStates {
    states: Vec<AggregatorState>,
}

impl AggregatorStates {
    pub fn new(count: usize) -> Self {
        Self {
            states: vec![AggregatorState::Pending; count],
        }
    }

    pub fn get(&self, id: AggregatorId) -> AggregatorState {
        self.states[id.index()]
    }

    pub fn is_processed(&self, id: AggregatorId) -> bool {
        self.get(id) == AggregatorState::Processed
    }

    /// Transition `Pending` to `Processed`.
    ///
    /// Returns `false` if the aggregator was already processed.
    pub fn mark_processed(&mut self, id: AggregatorId) -> bool {
        let state = &mut self.states[id.index()];
        match state {
            AggregatorState::Pending => {
                *state = AggregatorState::Processed;
                true
            }
            AggregatorState::Processed => false,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
