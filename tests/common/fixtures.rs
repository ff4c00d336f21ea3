//! Shared record fixtures for integration tests.

#![allow(dead_code)]

use harvestgraph::nodes::{Field, FileObject, FileSet, Metadata, Node, RecordSet, Source};

fn short_name(uid: &str) -> String {
    uid.rsplit('/').next().unwrap_or(uid).to_string()
}

pub fn metadata(uid: &str) -> Node {
    Node::from(Metadata::new(uid))
}

pub fn file_object(uid: &str, parent: Option<&str>, url: &str, format: &str) -> Node {
    Node::from(FileObject {
        uid: uid.into(),
        parent_uid: parent.map(Into::into),
        name: short_name(uid),
        content_url: url.into(),
        encoding_format: format.into(),
        contained_in: vec![],
    })
}

pub fn file_set(uid: &str, parent: Option<&str>, format: &str, containers: &[&str]) -> Node {
    Node::from(FileSet {
        uid: uid.into(),
        parent_uid: parent.map(Into::into),
        name: short_name(uid),
        encoding_format: format.into(),
        contained_in: containers.iter().map(|c| (*c).to_string()).collect(),
    })
}

pub fn record_set(uid: &str, parent: &str) -> Node {
    Node::from(RecordSet {
        uid: uid.into(),
        parent_uid: Some(parent.into()),
        name: short_name(uid),
    })
}

pub fn leaf_field(uid: &str, parent: &str, reference: &[&str]) -> Node {
    Node::from(Field {
        uid: uid.into(),
        parent_uid: Some(parent.into()),
        name: short_name(uid),
        source: Some(Source::new(reference.iter().copied())),
        has_sub_fields: false,
    })
}

pub fn group_field(uid: &str, parent: &str) -> Node {
    Node::from(Field {
        uid: uid.into(),
        parent_uid: Some(parent.into()),
        name: short_name(uid),
        source: None,
        has_sub_fields: true,
    })
}
