// Commit Invariant Framework
//
// Invariants are pure rules checked against a commit before it is
// serialized. Action constructors accept anything; these rules catch
// cross-field inconsistencies (partitioning vs. schema, partition values
// vs. partition columns) before a reader ever sees them.

use std::collections::BTreeSet;

use crate::log::{AddAction, MetadataAction, ProtocolAction};
use crate::schema::TableSchema;

/// Everything an invariant may inspect.
#[derive(Debug, Clone, Copy)]
pub struct CommitCandidate<'a> {
    pub schema: &'a TableSchema,
    pub metadata: &'a MetadataAction,
    pub protocol: &'a ProtocolAction,
    pub adds: &'a [AddAction],
}

/// Result of invariant evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantResult {
    Pass,
    Fail(String),
}

/// Trait implemented by all invariants.
///
/// Invariants must be:
/// - Pure
/// - Deterministic
/// - Side-effect free
pub trait Invariant: Send + Sync {
    fn name(&self) -> &'static str;

    fn validate(&self, candidate: &CommitCandidate<'_>) -> InvariantResult;
}

/// Evaluates a set of invariants in registration order.
#[derive(Default)]
pub struct InvariantEngine {
    invariants: Vec<Box<dyn Invariant>>,
}

impl std::fmt::Debug for InvariantEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.invariants.iter().map(|i| i.name()))
            .finish()
    }
}

impl InvariantEngine {
    /// Create an engine with no invariants.
    pub fn new() -> Self {
        Self {
            invariants: Vec::new(),
        }
    }

    /// Engine with every built-in commit invariant registered.
    pub fn standard() -> Self {
        let mut engine = Self::new();
        engine.register(AtLeastOneFile);
        engine.register(NonEmptyColumnNames);
        engine.register(PositiveProtocolVersions);
        engine.register(UniquePartitionColumns);
        engine.register(PartitionColumnsInSchema);
        engine.register(PartitionValuesMatchColumns);
        engine
    }

    /// Register an invariant.
    pub fn register<I: Invariant + 'static>(&mut self, invariant: I) {
        self.invariants.push(Box::new(invariant));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.invariants.iter().map(|i| i.name()).collect()
    }

    /// Evaluate all invariants.
    ///
    /// Stops at the first failure.
    pub fn evaluate(&self, candidate: &CommitCandidate<'_>) -> Result<(), InvariantViolation> {
        for invariant in &self.invariants {
            match invariant.validate(candidate) {
                InvariantResult::Pass => continue,
                InvariantResult::Fail(reason) => {
                    return Err(InvariantViolation {
                        invariant: invariant.name(),
                        reason,
                    })
                }
            }
        }
        Ok(())
    }
}

/// Returned when an invariant is violated.
#[derive(Debug, thiserror::Error)]
#[error("invariant `{invariant}` violated: {reason}")]
pub struct InvariantViolation {
    pub invariant: &'static str,
    pub reason: String,
}

pub struct AtLeastOneFile;

impl Invariant for AtLeastOneFile {
    fn name(&self) -> &'static str {
        "at-least-one-file"
    }

    fn validate(&self, candidate: &CommitCandidate<'_>) -> InvariantResult {
        if candidate.adds.is_empty() {
            InvariantResult::Fail("commit adds no data files".into())
        } else {
            InvariantResult::Pass
        }
    }
}

pub struct NonEmptyColumnNames;

impl Invariant for NonEmptyColumnNames {
    fn name(&self) -> &'static str {
        "non-empty-column-names"
    }

    fn validate(&self, candidate: &CommitCandidate<'_>) -> InvariantResult {
        match candidate
            .schema
            .columns()
            .iter()
            .position(|c| c.name.is_empty())
        {
            Some(index) => InvariantResult::Fail(format!("column at position {index} has no name")),
            None => InvariantResult::Pass,
        }
    }
}

pub struct PositiveProtocolVersions;

impl Invariant for PositiveProtocolVersions {
    fn name(&self) -> &'static str {
        "positive-protocol-versions"
    }

    fn validate(&self, candidate: &CommitCandidate<'_>) -> InvariantResult {
        let protocol = candidate.protocol;
        if protocol.min_reader_version < 1 || protocol.min_writer_version < 1 {
            InvariantResult::Fail(format!(
                "protocol versions must be positive (reader {}, writer {})",
                protocol.min_reader_version, protocol.min_writer_version
            ))
        } else {
            InvariantResult::Pass
        }
    }
}

pub struct UniquePartitionColumns;

impl Invariant for UniquePartitionColumns {
    fn name(&self) -> &'static str {
        "unique-partition-columns"
    }

    fn validate(&self, candidate: &CommitCandidate<'_>) -> InvariantResult {
        let mut seen = BTreeSet::new();
        for column in &candidate.metadata.partition_columns {
            if !seen.insert(column.as_str()) {
                return InvariantResult::Fail(format!("partition column `{column}` listed twice"));
            }
        }
        InvariantResult::Pass
    }
}

pub struct PartitionColumnsInSchema;

impl Invariant for PartitionColumnsInSchema {
    fn name(&self) -> &'static str {
        "partition-columns-in-schema"
    }

    fn validate(&self, candidate: &CommitCandidate<'_>) -> InvariantResult {
        match candidate
            .metadata
            .partition_columns
            .iter()
            .find(|name| candidate.schema.column(name).is_none())
        {
            Some(missing) => {
                InvariantResult::Fail(format!("partition column `{missing}` is not in the schema"))
            }
            None => InvariantResult::Pass,
        }
    }
}

pub struct PartitionValuesMatchColumns;

impl Invariant for PartitionValuesMatchColumns {
    fn name(&self) -> &'static str {
        "partition-values-match-columns"
    }

    fn validate(&self, candidate: &CommitCandidate<'_>) -> InvariantResult {
        let expected: BTreeSet<&str> = candidate
            .metadata
            .partition_columns
            .iter()
            .map(String::as_str)
            .collect();

        for add in candidate.adds {
            let actual: BTreeSet<&str> = add.partition_values.keys().map(String::as_str).collect();
            if actual != expected {
                return InvariantResult::Fail(format!(
                    "file `{}` has partition values for {:?}, expected {:?}",
                    add.path, actual, expected
                ));
            }
        }
        InvariantResult::Pass
    }
}
