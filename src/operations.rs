//! Primitive data-generation operations and the artifact cache-key contract.
//!
//! Lowering translates each structural node into zero or more operations.
//! The closed [`OperationKind`] set is the entire vocabulary an external
//! executor has to implement; everything else about execution (scheduling,
//! payload passing between operations, retries) is the executor's contract,
//! not this crate's.
//!
//! [`Marker`](OperationKind::Marker) operations carry no computation of
//! their own. They are structural sentinels that keep lineages well-formed:
//! an extraction boundary between an archive and its contents, the
//! convergence point of a multi-source file set, or a nested field group on
//! the way up to its record set.

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::path::PathBuf;

/// Why a [`OperationKind::Marker`] sentinel was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerReason {
    /// Archive contents must be extracted before dependents can read them.
    Extraction,
    /// Multiple source lineages converge into one file set.
    Merge,
    /// A nested field group between a leaf field and its record set.
    FieldGroup,
}

/// Closed set of executable operation variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OperationKind {
    /// Bookkeeping root of the operation graph; always the sole entry point.
    Init,
    /// Fetch `url` into the shared artifact cache.
    Download { url: String },
    /// Parse the cached artifact for `url` as a table of rows.
    ReadTable { url: String },
    /// Project one named column out of the predecessor's table.
    ReadField { column: String },
    /// Assemble a mapping of field name to value for one record set.
    GroupRecordSet { name: String },
    /// Structural sentinel with no attached computation.
    Marker { reason: MarkerReason },
}

impl OperationKind {
    fn label(&self) -> &'static str {
        match self {
            OperationKind::Init => "Init",
            OperationKind::Download { .. } => "Download",
            OperationKind::ReadTable { .. } => "ReadTable",
            OperationKind::ReadField { .. } => "ReadField",
            OperationKind::GroupRecordSet { .. } => "GroupRecordSet",
            OperationKind::Marker {
                reason: MarkerReason::Extraction,
            } => "Extract",
            OperationKind::Marker {
                reason: MarkerReason::Merge,
            } => "Merge",
            OperationKind::Marker {
                reason: MarkerReason::FieldGroup,
            } => "GroupFields",
        }
    }
}

/// One node of the operation graph.
///
/// Besides its executable [`kind`](Self::kind), every operation names the
/// structural node it was lowered from, for context in diagnostics and
/// display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    /// uid of the originating structural node.
    pub node_uid: String,
}

impl Operation {
    pub fn new(kind: OperationKind, node_uid: impl Into<String>) -> Self {
        Self {
            kind,
            node_uid: node_uid.into(),
        }
    }

    #[must_use]
    pub fn is_init(&self) -> bool {
        matches!(self.kind, OperationKind::Init)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind.label(), self.node_uid)
    }
}

/// Deterministic cache key for an artifact fetched from `url`.
///
/// Two graphs compiled from the same input must resolve a URL to the same
/// key so that repeated compilations reuse cached downloads. SHA-256 keeps
/// the key collision-resistant and stable across runs.
#[must_use]
pub fn cache_key(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// Well-known on-disk location for the cached artifact of `url`.
///
/// Executors persisting fetched artifacts are expected to serialize
/// concurrent writes per key or write atomically; the compiler only
/// guarantees the key derivation is deterministic.
#[must_use]
pub fn cached_artifact_path(url: &str) -> PathBuf {
    std::env::temp_dir().join(format!("harvestgraph-{}", cache_key(url)))
}
