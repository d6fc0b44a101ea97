//! Entity-graph materialization.
//!
//! Walks a [`SchemaDef`]'s tables in declaration order, projecting each table
//! through a [`TableReader`] and attaching the rows to the [`Tree`] according
//! to the table's [`Attachment`]. Nodes of indexed tables are registered in a
//! per-kind primary-key registry; later tables resolve their foreign keys
//! against it. An unresolvable reference skips that row (or link) with a
//! warning and a [`RefMiss`] record returned alongside the tree; SQL
//! failures abort the whole run.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::db::{FieldBinding, Row, TableReader};
use crate::error::Result;
use crate::kind::EntityKind;
use crate::schema::{Attachment, Engine, Placement, SchemaDef, TableSpec};
use crate::tree::{NodeId, Tree};
use crate::value::{PkKey, Value};

type PkIndex = HashMap<EntityKind, HashMap<PkKey, NodeId>>;

/// One reference that failed to resolve; the offending row or link was
/// skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefMiss {
    /// Table the offending row came from.
    pub table: &'static str,
    /// Kind the foreign key should have resolved to.
    pub kind: EntityKind,
    /// Display form of the unresolved key; `"null"` for an absent value.
    pub key: String,
}

/// The finished tree together with every skipped reference.
#[derive(Debug)]
pub struct Materialized {
    pub tree: Tree,
    pub misses: Vec<RefMiss>,
}

/// Materializes one schema from one source into a fresh [`Tree`].
pub struct Materializer<'a, R: TableReader> {
    reader: &'a R,
    engine: Engine,
    schema: &'static SchemaDef,
}

impl<'a, R: TableReader> Materializer<'a, R> {
    pub fn new(reader: &'a R, engine: Engine, schema: &'static SchemaDef) -> Self {
        Materializer {
            reader,
            engine,
            schema,
        }
    }

    /// Load every table of the schema in order and return the finished tree
    /// with the references that failed to resolve along the way.
    pub async fn run(&self) -> Result<Materialized> {
        let mut tree = Tree::new();
        let mut categories: HashMap<&'static str, NodeId> = HashMap::new();
        for name in self.schema.categories {
            categories.insert(name, tree.add_category(name));
        }
        let mut index: PkIndex = HashMap::new();
        let mut misses: Vec<RefMiss> = Vec::new();
        for spec in self.schema.tables {
            self.load_table(spec, &mut tree, &categories, &mut index, &mut misses)
                .await?;
        }
        info!(
            schema = self.schema.name,
            nodes = tree.len(),
            misses = misses.len(),
            "materialization complete"
        );
        Ok(Materialized { tree, misses })
    }

    async fn load_table(
        &self,
        spec: &'static TableSpec,
        tree: &mut Tree,
        categories: &HashMap<&'static str, NodeId>,
        index: &mut PkIndex,
        misses: &mut Vec<RefMiss>,
    ) -> Result<()> {
        let table = self.engine.identifier(spec.table);
        let fields: Vec<FieldBinding> = spec
            .fields
            .iter()
            .map(|f| FieldBinding::new(f.key, self.engine.identifier(f.column)))
            .collect();
        let rows = self.reader.project(&table, &fields).await?;
        debug!(table = spec.table, rows = rows.len(), "loaded");

        for row in rows {
            match spec.attachment {
                Attachment::Category { kind, category } => {
                    let Some(&parent) = categories.get(category) else {
                        warn!(table = spec.table, category, "category root missing");
                        continue;
                    };
                    let node = attach(tree, index, parent, kind, spec, row);
                    apply_links(tree, index, spec, node, misses);
                }
                Attachment::Parent { kind, parent, fk } => {
                    let Some(parent_node) = resolve(index, parent, row.get(fk)) else {
                        record_miss(misses, spec, parent, row.get(fk));
                        continue;
                    };
                    let node = attach(tree, index, parent_node, kind, spec, row);
                    apply_links(tree, index, spec, node, misses);
                }
                Attachment::Association {
                    left,
                    left_fk,
                    right,
                    right_fk,
                } => {
                    let Some(left_node) = resolve(index, left, row.get(left_fk)) else {
                        record_miss(misses, spec, left, row.get(left_fk));
                        continue;
                    };
                    let Some(right_node) = resolve(index, right, row.get(right_fk)) else {
                        record_miss(misses, spec, right, row.get(right_fk));
                        continue;
                    };
                    let reference = tree.add_entity(left_node, EntityKind::Reference);
                    tree.set_ref(reference, right.tag(), right_node);
                }
                Attachment::Marker { parent, fk } => {
                    if resolve(index, parent, row.get(fk)).is_none() {
                        record_miss(misses, spec, parent, row.get(fk));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Create the row's node, copy its properties and register it in the index.
fn attach(
    tree: &mut Tree,
    index: &mut PkIndex,
    parent: NodeId,
    kind: EntityKind,
    spec: &TableSpec,
    row: Row,
) -> NodeId {
    let node = tree.add_entity(parent, kind);
    for (key, value) in row {
        tree.set(node, key, value);
    }
    if let Some(key) = spec.index_by {
        if let Some(value) = tree.get(node, key) {
            index
                .entry(kind)
                .or_default()
                .insert(PkKey(value.clone()), node);
        }
    }
    node
}

fn apply_links(
    tree: &mut Tree,
    index: &PkIndex,
    spec: &'static TableSpec,
    node: NodeId,
    misses: &mut Vec<RefMiss>,
) {
    for link in spec.links {
        let fk_value = tree.get(node, link.fk).cloned();
        let Some(target) = resolve(index, link.target, fk_value.as_ref()) else {
            record_miss(misses, spec, link.target, fk_value.as_ref());
            continue;
        };
        match link.placement {
            Placement::ChildRef => {
                let reference = tree.add_entity(node, EntityKind::Reference);
                tree.set_ref(reference, link.target.tag(), target);
            }
            Placement::NodeRef => {
                tree.set_ref(node, link.target.tag(), target);
            }
            Placement::UnderTarget => {
                let reference = tree.add_entity(target, EntityKind::Reference);
                if let Some(kind) = tree.kind(node) {
                    tree.set_ref(reference, kind.tag(), node);
                }
            }
        }
    }
}

fn resolve(index: &PkIndex, kind: EntityKind, value: Option<&Value>) -> Option<NodeId> {
    let value = value?;
    index.get(&kind)?.get(&PkKey(value.clone())).copied()
}

fn record_miss(
    misses: &mut Vec<RefMiss>,
    spec: &TableSpec,
    kind: EntityKind,
    value: Option<&Value>,
) {
    let key = value.map(Value::to_string).unwrap_or_else(|| "null".into());
    warn!(
        table = spec.table,
        kind = kind.tag(),
        key = %key,
        "unresolved reference"
    );
    misses.push(RefMiss {
        table: spec.table,
        kind,
        key,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RESULTS, SPECIFICATION};
    use async_trait::async_trait;
    use std::collections::BTreeMap;

    struct FakeReader {
        tables: HashMap<String, Vec<Row>>,
    }

    impl FakeReader {
        fn new() -> Self {
            FakeReader {
                tables: HashMap::new(),
            }
        }

        fn insert(&mut self, table: &str, rows: Vec<Row>) {
            self.tables.insert(table.to_string(), rows);
        }
    }

    #[async_trait]
    impl TableReader for FakeReader {
        async fn project(&self, table: &str, _fields: &[FieldBinding]) -> Result<Vec<Row>> {
            Ok(self.tables.get(table).cloned().unwrap_or_default())
        }

        async fn count(&self, table: &str) -> Result<i64> {
            Ok(self.tables.get(table).map(|r| r.len() as i64).unwrap_or(0))
        }
    }

    fn row(pairs: &[(&'static str, Value)]) -> Row {
        let mut row = BTreeMap::new();
        for (key, value) in pairs {
            row.insert(*key, value.clone());
        }
        row
    }

    fn find_by_id(tree: &Tree, id: &str) -> Option<NodeId> {
        tree.nodes().find(|&n| tree.unique_id(n) == id)
    }

    fn specification_reader() -> FakeReader {
        let mut reader = FakeReader::new();
        reader.insert(
            "project",
            vec![row(&[
                ("pk", Value::Integer(1)),
                ("id", Value::from("P1")),
                ("version", Value::from("1.0")),
            ])],
        );
        reader.insert(
            "test_area",
            vec![row(&[
                ("pk", Value::Integer(10)),
                ("id", Value::from("A1")),
                ("project_pk", Value::Integer(1)),
            ])],
        );
        reader.insert(
            "feature",
            vec![
                row(&[
                    ("pk", Value::Integer(100)),
                    ("id", Value::from("F1")),
                    ("testarea_pk", Value::Integer(10)),
                ]),
                // dangling parent, must be skipped
                row(&[
                    ("pk", Value::Integer(101)),
                    ("id", Value::from("F9")),
                    ("testarea_pk", Value::Integer(99)),
                ]),
            ],
        );
        reader.insert(
            "test_case",
            vec![row(&[
                ("pk", Value::Integer(1000)),
                ("id", Value::from("P1-A1-F1-TC1")),
                ("feature_pk", Value::Integer(100)),
            ])],
        );
        reader.insert(
            "requirement",
            vec![row(&[
                ("id", Value::from("R-1")),
                ("name", Value::from("first requirement")),
            ])],
        );
        reader.insert(
            "project_requirement",
            vec![row(&[
                ("pk", Value::Integer(50)),
                ("requirement_id", Value::from("R-1")),
                ("project_pk", Value::Integer(1)),
            ])],
        );
        reader.insert(
            "scenario",
            vec![row(&[
                ("pk", Value::Integer(20)),
                ("id", Value::from("S1")),
                ("testarea_pk", Value::Integer(10)),
                ("project_pk", Value::Integer(1)),
            ])],
        );
        reader.insert(
            "procedure",
            vec![row(&[
                ("pk", Value::Integer(30)),
                ("id", Value::from("PR1")),
                ("scenario_pk", Value::Integer(20)),
            ])],
        );
        reader.insert(
            "procedure_test_case",
            vec![row(&[
                ("procedure_pk", Value::Integer(30)),
                ("testcases_pk", Value::Integer(1000)),
            ])],
        );
        reader.insert(
            "automated_procedure",
            vec![
                row(&[("pk", Value::Integer(30))]),
                row(&[("pk", Value::Integer(31))]), // unknown procedure
            ],
        );
        reader
    }

    #[tokio::test]
    async fn test_specification_identifier_chain() {
        let reader = specification_reader();
        let tree = Materializer::new(&reader, Engine::Postgres, &SPECIFICATION)
            .run()
            .await
            .unwrap()
            .tree;

        let feature = find_by_id(&tree, "P1-A1-F1").unwrap();
        assert_eq!(tree.kind(feature), Some(EntityKind::Feature));
        assert!(find_by_id(&tree, "P1-A1-F1-TC1").is_some());
        assert!(find_by_id(&tree, "P1-S1").is_some());
        assert!(find_by_id(&tree, "P1-S1-PR1").is_some());
    }

    #[tokio::test]
    async fn test_dangling_parent_skips_row_and_records_the_miss() {
        let reader = specification_reader();
        let out = Materializer::new(&reader, Engine::Postgres, &SPECIFICATION)
            .run()
            .await
            .unwrap();
        let tree = &out.tree;

        // F9 pointed at a test area that does not exist
        assert!(find_by_id(tree, "P1-A1-F9").is_none());
        assert!(!tree
            .nodes()
            .any(|n| tree.get(n, "id").map(|v| v.to_string()) == Some("F9".into())));
        // the valid sibling still loaded
        assert!(find_by_id(tree, "P1-A1-F1").is_some());
        // the skip is reported with the table and the key that missed
        assert!(out.misses.contains(&RefMiss {
            table: "feature",
            kind: EntityKind::TestArea,
            key: "99".to_string(),
        }));
    }

    #[tokio::test]
    async fn test_scenario_keeps_a_slot_to_its_test_area() {
        let reader = specification_reader();
        let tree = Materializer::new(&reader, Engine::Postgres, &SPECIFICATION)
            .run()
            .await
            .unwrap()
            .tree;

        let scenario = find_by_id(&tree, "P1-S1").unwrap();
        let area = tree.reference(scenario, "TestArea").unwrap();
        assert_eq!(tree.unique_id(area), "P1-A1");
        // a slot, not a child
        assert!(!tree.children(scenario).contains(&area));
    }

    #[tokio::test]
    async fn test_project_requirement_gets_a_reference_child() {
        let reader = specification_reader();
        let tree = Materializer::new(&reader, Engine::Postgres, &SPECIFICATION)
            .run()
            .await
            .unwrap()
            .tree;

        let pr = find_by_id(&tree, "P1-R-1").unwrap();
        let children = tree.children(pr);
        assert_eq!(children.len(), 1);
        let reference = children[0];
        assert_eq!(tree.kind(reference), Some(EntityKind::Reference));
        assert_eq!(tree.unique_id(reference), "P1-R-1=R-1");
    }

    #[tokio::test]
    async fn test_association_creates_reference_under_left_side() {
        let reader = specification_reader();
        let tree = Materializer::new(&reader, Engine::Postgres, &SPECIFICATION)
            .run()
            .await
            .unwrap()
            .tree;

        let procedure = find_by_id(&tree, "P1-S1-PR1").unwrap();
        let reference = tree
            .children(procedure)
            .iter()
            .copied()
            .find(|&c| tree.kind(c) == Some(EntityKind::Reference))
            .unwrap();
        assert_eq!(tree.unique_id(reference), "P1-S1-PR1=P1-A1-F1-TC1");
        let target = tree.reference(reference, "TestCase").unwrap();
        assert_eq!(tree.kind(target), Some(EntityKind::TestCase));
    }

    #[tokio::test]
    async fn test_marker_tables_create_no_nodes_but_report_misses() {
        let reader = specification_reader();
        let out = Materializer::new(&reader, Engine::Postgres, &SPECIFICATION)
            .run()
            .await
            .unwrap();
        let tree = &out.tree;

        assert!(!tree.nodes().any(|n| tree.tag(n) == Some("AutomatedProcedure")));
        // pk 31 named a procedure that was never loaded
        assert!(out
            .misses
            .iter()
            .any(|m| m.table == "automated_procedure" && m.key == "31"));
    }

    #[tokio::test]
    async fn test_null_property_is_absent() {
        let reader = specification_reader();
        let tree = Materializer::new(&reader, Engine::Postgres, &SPECIFICATION)
            .run()
            .await
            .unwrap()
            .tree;

        let project = find_by_id(&tree, "P1").unwrap();
        assert!(tree.get(project, "version").is_some());
        assert!(tree.get(project, "basefolder").is_none());
    }

    #[tokio::test]
    async fn test_h2_reads_uppercase_tables() {
        let mut reader = FakeReader::new();
        reader.insert(
            "PROJECT",
            vec![row(&[
                ("pk", Value::Integer(1)),
                ("id", Value::from("P1")),
            ])],
        );
        let tree = Materializer::new(&reader, Engine::H2, &SPECIFICATION)
            .run()
            .await
            .unwrap()
            .tree;
        assert!(find_by_id(&tree, "P1").is_some());
    }

    fn results_reader() -> FakeReader {
        let mut reader = FakeReader::new();
        reader.insert(
            "scenario_execution",
            vec![row(&[
                ("pk", Value::Integer(1)),
                ("project_id", Value::from("P1")),
                ("scenario_id", Value::from("SC1")),
            ])],
        );
        reader.insert(
            "performance_measurement_execution",
            vec![row(&[
                ("pk", Value::Integer(7)),
                ("key", Value::from("LATENCY")),
                ("value", Value::from("12.5")),
            ])],
        );
        reader.insert(
            "scenario_execution_performance_measurement_execution",
            vec![row(&[
                ("scenario_execution_pk", Value::Integer(1)),
                ("performance_measurement_executions_pk", Value::Integer(7)),
            ])],
        );
        reader.insert(
            "procedure_execution",
            vec![row(&[
                ("pk", Value::Integer(2)),
                ("project_id", Value::from("P1")),
                ("procedure_id", Value::from("PR1")),
                ("scenario_execution_pk", Value::Integer(1)),
            ])],
        );
        reader.insert(
            "manual_procedure_step_execution",
            vec![row(&[
                ("pk", Value::Integer(3)),
                ("step_number", Value::Integer(4)),
                ("manual_procedure_execution_pk", Value::Integer(2)),
            ])],
        );
        reader.insert(
            "test_case_verdict",
            vec![row(&[
                ("pk", Value::Integer(5)),
                ("project_id", Value::from("P1")),
                ("testcase_id", Value::from("TC1")),
                ("verdict", Value::from("PASS")),
                ("procedure_execution_pk", Value::Integer(2)),
            ])],
        );
        reader
    }

    #[tokio::test]
    async fn test_results_execution_chain() {
        let reader = results_reader();
        let tree = Materializer::new(&reader, Engine::Postgres, &RESULTS)
            .run()
            .await
            .unwrap()
            .tree;

        assert!(find_by_id(&tree, "P1-SC1").is_some());
        assert!(find_by_id(&tree, "P1-PR1").is_some());
        assert!(find_by_id(&tree, "P1-PR1-4").is_some());
    }

    #[tokio::test]
    async fn test_measurement_link_resolves_through_its_own_index() {
        let reader = results_reader();
        let tree = Materializer::new(&reader, Engine::Postgres, &RESULTS)
            .run()
            .await
            .unwrap()
            .tree;

        let execution = find_by_id(&tree, "P1-SC1").unwrap();
        let reference = tree
            .children(execution)
            .iter()
            .copied()
            .find(|&c| tree.kind(c) == Some(EntityKind::Reference))
            .unwrap();
        let target = tree
            .reference(reference, "PerformanceMeasurementExecution")
            .unwrap();
        assert_eq!(
            tree.kind(target),
            Some(EntityKind::PerformanceMeasurementExecution)
        );
        assert_eq!(tree.unique_id(reference), "P1-SC1=LATENCY");
    }

    #[tokio::test]
    async fn test_verdict_is_echoed_under_its_procedure_execution() {
        let reader = results_reader();
        let tree = Materializer::new(&reader, Engine::Postgres, &RESULTS)
            .run()
            .await
            .unwrap()
            .tree;

        let verdict = find_by_id(&tree, "P1-TC1").unwrap();
        assert_eq!(tree.kind(verdict), Some(EntityKind::TestCaseVerdict));
        let categories: HashMap<_, _> = tree.categories().collect();
        assert_eq!(tree.parent(verdict), Some(categories["verdicts"]));

        let execution = find_by_id(&tree, "P1-PR1").unwrap();
        let reference = tree
            .children(execution)
            .iter()
            .copied()
            .find(|&c| {
                tree.kind(c) == Some(EntityKind::Reference)
                    && tree.reference(c, "TestCaseVerdict").is_some()
            })
            .unwrap();
        assert_eq!(tree.reference(reference, "TestCaseVerdict"), Some(verdict));
    }
}
