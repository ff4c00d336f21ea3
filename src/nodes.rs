//! Dataset metadata records consumed by the graph builders.
//!
//! A dataset description arrives as a flat, ordered collection of typed
//! records. The closed [`Node`] sum type mirrors that record set exactly:
//! lowering rules in [`crate::graphs`] are exhaustive matches over it, so an
//! unhandled variant is a compile error rather than a silent skip.
//!
//! Every record carries a `uid` intended to be globally unique and, except
//! for the dataset root [`Metadata`], a `parent_uid` pointing at the record
//! it is declared under. Relationship rules beyond plain parenthood are
//! expressed by [`FileObject::contained_in`]/[`FileSet::contained_in`]
//! (containment/extraction) and [`Field::source`] (column or sub-field
//! provenance).
//!
//! # Examples
//!
//! ```
//! use harvestgraph::nodes::{FileObject, Metadata, Node};
//!
//! let root = Node::from(Metadata::new("movielens"));
//! let file = Node::from(FileObject {
//!     uid: "ratings".into(),
//!     parent_uid: Some("movielens".into()),
//!     name: "ratings".into(),
//!     content_url: "https://example.com/ratings.csv".into(),
//!     encoding_format: "text/csv".into(),
//!     contained_in: vec![],
//! });
//!
//! assert_eq!(root.uid(), "movielens");
//! assert_eq!(file.parent_uid(), Some("movielens"));
//! assert_eq!(file.encoding_format(), Some("text/csv"));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known encoding formats and classification helpers.
///
/// The lowering rules only care about two classes: archives (which trigger an
/// extraction step when a differently-encoded resource is contained in them)
/// and tabular text files (which trigger a table read).
pub mod encoding {
    pub const TAR: &str = "application/x-tar";
    pub const ZIP: &str = "application/zip";
    pub const CSV: &str = "text/csv";
    pub const TSV: &str = "text/tab-separated-values";

    /// Whether `format` denotes an archive that contained resources are
    /// extracted from.
    #[must_use]
    pub fn is_archive(format: &str) -> bool {
        matches!(format, TAR | ZIP)
    }

    /// Whether `format` denotes a tabular text file that can be parsed into
    /// rows and columns.
    #[must_use]
    pub fn is_tabular(format: &str) -> bool {
        matches!(format, CSV | TSV)
    }
}

/// Join a source reference path into the uid it would name.
///
/// Field sources address their origin as a path of identifiers; the
/// concatenation of the whole path is the uid of a nested field
/// (`["ratings", "user_id"]` → `"ratings/user_id"`).
#[must_use]
pub fn concatenate_uid(reference: &[String]) -> String {
    reference.join("/")
}

/// Provenance path of a [`Field`]: where its values come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Ordered path to the originating column or sub-field. For a leaf
    /// field this must be exactly `[table identifier, column name]`.
    pub reference: Vec<String>,
}

impl Source {
    pub fn new<I, S>(reference: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reference: reference.into_iter().map(Into::into).collect(),
        }
    }

    /// The uid the whole reference path would name, see [`concatenate_uid`].
    #[must_use]
    pub fn concatenated_uid(&self) -> String {
        concatenate_uid(&self.reference)
    }
}

/// The dataset root. Exactly one must exist in any valid input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub uid: String,
    pub name: String,
}

impl Metadata {
    /// Convenience constructor using the uid as display name.
    pub fn new(uid: impl Into<String>) -> Self {
        let uid = uid.into();
        Self {
            name: uid.clone(),
            uid,
        }
    }
}

/// A single remote or local file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObject {
    pub uid: String,
    pub parent_uid: Option<String>,
    pub name: String,
    /// Where the file contents are fetched from.
    pub content_url: String,
    /// MIME-style format, see [`encoding`].
    pub encoding_format: String,
    /// uids of containers this file is extracted or selected from.
    pub contained_in: Vec<String>,
}

/// A logical grouping of files, typically the contents of an archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    pub uid: String,
    pub parent_uid: Option<String>,
    pub name: String,
    pub encoding_format: String,
    pub contained_in: Vec<String>,
}

/// A named logical record type aggregating fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSet {
    pub uid: String,
    pub parent_uid: Option<String>,
    pub name: String,
}

/// A named scalar or nested value inside a [`RecordSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub uid: String,
    pub parent_uid: Option<String>,
    pub name: String,
    /// Where the field values originate, absent for purely structural
    /// grouping fields.
    pub source: Option<Source>,
    /// Whether this field is a group of nested sub-fields rather than a
    /// leaf value.
    pub has_sub_fields: bool,
}

/// Closed set of dataset metadata record variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Metadata(Metadata),
    FileObject(FileObject),
    FileSet(FileSet),
    RecordSet(RecordSet),
    Field(Field),
}

impl Node {
    /// Globally unique identifier of the underlying record.
    #[must_use]
    pub fn uid(&self) -> &str {
        match self {
            Node::Metadata(n) => &n.uid,
            Node::FileObject(n) => &n.uid,
            Node::FileSet(n) => &n.uid,
            Node::RecordSet(n) => &n.uid,
            Node::Field(n) => &n.uid,
        }
    }

    /// uid of the record this one is declared under. `None` for the root.
    #[must_use]
    pub fn parent_uid(&self) -> Option<&str> {
        match self {
            Node::Metadata(_) => None,
            Node::FileObject(n) => n.parent_uid.as_deref(),
            Node::FileSet(n) => n.parent_uid.as_deref(),
            Node::RecordSet(n) => n.parent_uid.as_deref(),
            Node::Field(n) => n.parent_uid.as_deref(),
        }
    }

    /// Display name of the record.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Node::Metadata(n) => &n.name,
            Node::FileObject(n) => &n.name,
            Node::FileSet(n) => &n.name,
            Node::RecordSet(n) => &n.name,
            Node::Field(n) => &n.name,
        }
    }

    /// Declared encoding format; only file-bearing variants have one.
    #[must_use]
    pub fn encoding_format(&self) -> Option<&str> {
        match self {
            Node::FileObject(n) => Some(&n.encoding_format),
            Node::FileSet(n) => Some(&n.encoding_format),
            _ => None,
        }
    }

    /// Declared containment relations; empty for non-file variants.
    #[must_use]
    pub fn contained_in(&self) -> &[String] {
        match self {
            Node::FileObject(n) => &n.contained_in,
            Node::FileSet(n) => &n.contained_in,
            _ => &[],
        }
    }

    /// Returns `true` if this is the dataset root.
    #[must_use]
    pub fn is_metadata(&self) -> bool {
        matches!(self, Node::Metadata(_))
    }

    /// Returns `true` for file-bearing variants (FileObject or FileSet).
    #[must_use]
    pub fn is_resource(&self) -> bool {
        matches!(self, Node::FileObject(_) | Node::FileSet(_))
    }

    fn variant_label(&self) -> &'static str {
        match self {
            Node::Metadata(_) => "Metadata",
            Node::FileObject(_) => "FileObject",
            Node::FileSet(_) => "FileSet",
            Node::RecordSet(_) => "RecordSet",
            Node::Field(_) => "Field",
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.variant_label(), self.uid())
    }
}

impl From<Metadata> for Node {
    fn from(n: Metadata) -> Self {
        Node::Metadata(n)
    }
}

impl From<FileObject> for Node {
    fn from(n: FileObject) -> Self {
        Node::FileObject(n)
    }
}

impl From<FileSet> for Node {
    fn from(n: FileSet) -> Self {
        Node::FileSet(n)
    }
}

impl From<RecordSet> for Node {
    fn from(n: RecordSet) -> Self {
        Node::RecordSet(n)
    }
}

impl From<Field> for Node {
    fn from(n: Field) -> Self {
        Node::Field(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concatenate_uid_joins_with_slash() {
        let reference = vec!["ratings".to_string(), "user_id".to_string()];
        assert_eq!(concatenate_uid(&reference), "ratings/user_id");
        assert_eq!(concatenate_uid(&[]), "");
    }

    #[test]
    fn encoding_classification() {
        assert!(encoding::is_archive(encoding::TAR));
        assert!(encoding::is_archive(encoding::ZIP));
        assert!(!encoding::is_archive(encoding::CSV));
        assert!(encoding::is_tabular(encoding::CSV));
        assert!(encoding::is_tabular(encoding::TSV));
        assert!(!encoding::is_tabular(encoding::TAR));
    }

    #[test]
    fn display_names_variant_and_uid() {
        let node = Node::from(Metadata::new("movielens"));
        assert_eq!(node.to_string(), "Metadata(movielens)");
    }

    #[test]
    fn serde_round_trip_is_tagged() {
        let node = Node::from(RecordSet {
            uid: "ratings_records".into(),
            parent_uid: Some("movielens".into()),
            name: "ratings_records".into(),
        });
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "RecordSet");
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }
}
