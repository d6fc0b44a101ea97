//! Declarative schema definitions.
//!
//! A [`SchemaDef`] describes one source database as an ordered list of
//! [`TableSpec`]s: which columns to project, what kind of node each row
//! becomes, where the node attaches in the tree, and which cross-references
//! it contributes. The materializer walks the list in order, so every table
//! only depends on indices built by earlier tables.

mod results;
mod specification;

use serde::Deserialize;

use crate::kind::EntityKind;

pub use results::RESULTS;
pub use specification::SPECIFICATION;

/// Which of the two source databases to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    Specification,
    Results,
}

impl SchemaKind {
    pub fn definition(self) -> &'static SchemaDef {
        match self {
            SchemaKind::Specification => &SPECIFICATION,
            SchemaKind::Results => &RESULTS,
        }
    }
}

/// The engine hosting the database. Table and column names are declared in
/// Postgres spelling; H2 stores the same identifiers uppercased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[default]
    Postgres,
    H2,
}

impl Engine {
    /// The physical spelling of a declared identifier in this engine.
    pub fn identifier(self, name: &str) -> String {
        match self {
            Engine::Postgres => name.to_string(),
            Engine::H2 => name.to_uppercase(),
        }
    }
}

/// One projected column: a stable logical key and its declared column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub key: &'static str,
    pub column: &'static str,
}

/// How the rows of a table enter the tree.
#[derive(Debug, Clone, Copy)]
pub enum Attachment {
    /// Each row becomes a `kind` node under the named category root.
    Category {
        kind: EntityKind,
        category: &'static str,
    },
    /// Each row becomes a `kind` node under the indexed `parent` node the
    /// `fk` field resolves to. An unresolvable parent skips the row.
    Parent {
        kind: EntityKind,
        parent: EntityKind,
        fk: &'static str,
    },
    /// Join table: each row becomes a reference node under the `left` node,
    /// pointing at the `right` node. Either side missing skips the row.
    Association {
        left: EntityKind,
        left_fk: &'static str,
        right: EntityKind,
        right_fk: &'static str,
    },
    /// Subtype table: rows only validate against the `parent` index and
    /// produce no node of their own.
    Marker {
        parent: EntityKind,
        fk: &'static str,
    },
}

/// Where a secondary cross-reference lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// A reference node under the row's own node, pointing at the target.
    ChildRef,
    /// A reference slot set on the row's own node.
    NodeRef,
    /// A reference node under the target, pointing back at the row's node.
    UnderTarget,
}

/// A secondary cross-reference contributed by a row, resolved after the
/// row's node exists. An unresolvable target skips the link, not the row.
#[derive(Debug, Clone, Copy)]
pub struct Link {
    pub target: EntityKind,
    pub fk: &'static str,
    pub placement: Placement,
}

/// One source table: projection, attachment, indexing and links.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub table: &'static str,
    pub fields: &'static [Field],
    pub attachment: Attachment,
    /// Register created nodes in the primary-key registry under this field's
    /// raw value.
    pub index_by: Option<&'static str>,
    pub links: &'static [Link],
}

impl TableSpec {
    /// The kind of node this table creates, if any.
    pub fn kind(&self) -> Option<EntityKind> {
        match self.attachment {
            Attachment::Category { kind, .. } | Attachment::Parent { kind, .. } => Some(kind),
            Attachment::Association { .. } => Some(EntityKind::Reference),
            Attachment::Marker { .. } => None,
        }
    }
}

/// An ordered schema: category roots plus the table load order.
#[derive(Debug, Clone, Copy)]
pub struct SchemaDef {
    pub name: &'static str,
    /// Document element of the XML export.
    pub root: &'static str,
    pub categories: &'static [&'static str],
    pub tables: &'static [TableSpec],
}

impl SchemaDef {
    pub fn table(&self, name: &str) -> Option<&TableSpec> {
        self.tables.iter().find(|t| t.table == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_engine_identifier_case() {
        assert_eq!(Engine::Postgres.identifier("test_area"), "test_area");
        assert_eq!(Engine::H2.identifier("test_area"), "TEST_AREA");
        assert_eq!(Engine::H2.identifier("perfmeasurementonly"), "PERFMEASUREMENTONLY");
    }

    #[test]
    fn test_schema_lookup_by_kind() {
        assert_eq!(SchemaKind::Specification.definition().name, "specification");
        assert_eq!(SchemaKind::Results.definition().name, "results");
    }

    /// Every fk in the load order must resolve through an index registered
    /// by an earlier table.
    fn check_load_order(schema: &SchemaDef) {
        let mut indexed: HashSet<EntityKind> = HashSet::new();
        for spec in schema.tables {
            match spec.attachment {
                Attachment::Parent { parent, .. } | Attachment::Marker { parent, .. } => {
                    assert!(
                        indexed.contains(&parent),
                        "{}: parent {:?} not yet indexed",
                        spec.table,
                        parent
                    );
                }
                Attachment::Association { left, right, .. } => {
                    assert!(
                        indexed.contains(&left) && indexed.contains(&right),
                        "{}: association side not yet indexed",
                        spec.table
                    );
                }
                Attachment::Category { .. } => {}
            }
            for link in spec.links {
                assert!(
                    indexed.contains(&link.target),
                    "{}: link target {:?} not yet indexed",
                    spec.table,
                    link.target
                );
            }
            if spec.index_by.is_some() {
                let kind = spec.kind().expect("only node-creating tables are indexed");
                indexed.insert(kind);
            }
        }
    }

    #[test]
    fn test_specification_load_order_is_consistent() {
        check_load_order(&SPECIFICATION);
        assert_eq!(SPECIFICATION.tables.len(), 28);
    }

    #[test]
    fn test_results_load_order_is_consistent() {
        check_load_order(&RESULTS);
        assert_eq!(RESULTS.tables.len(), 10);
    }

    #[test]
    fn test_category_roots_cover_all_category_tables() {
        for schema in [&SPECIFICATION, &RESULTS] {
            for spec in schema.tables {
                if let Attachment::Category { category, .. } = spec.attachment {
                    assert!(
                        schema.categories.contains(&category),
                        "{}: category {} not declared",
                        spec.table,
                        category
                    );
                }
            }
        }
    }

    #[test]
    fn test_index_fields_are_projected() {
        for schema in [&SPECIFICATION, &RESULTS] {
            for spec in schema.tables {
                if let Some(key) = spec.index_by {
                    assert!(
                        spec.fields.iter().any(|f| f.key == key),
                        "{}: index field {} not projected",
                        spec.table,
                        key
                    );
                }
            }
        }
    }
}
