//! The results database: scenario and procedure executions with their
//! measurements, collected information and verdicts.

use crate::kind::EntityKind;

use super::{Attachment, Field, Link, Placement, SchemaDef, TableSpec};

pub static RESULTS: SchemaDef = SchemaDef {
    name: "results",
    root: "TestResults",
    categories: &["information", "measurements", "verdicts", "scenarios"],
    tables: &[
        TableSpec {
            table: "additional_information_execution",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "key", column: "key" },
                Field { key: "value", column: "value" },
            ],
            attachment: Attachment::Category {
                kind: EntityKind::AdditionalInformationExecution,
                category: "information",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "performance_measurement_execution",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "key", column: "key" },
                Field { key: "value", column: "value" },
            ],
            attachment: Attachment::Category {
                kind: EntityKind::PerformanceMeasurementExecution,
                category: "measurements",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "scenario_execution",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "deployment_name", column: "deploymentname" },
                Field { key: "end_time", column: "endtime" },
                Field { key: "start_time", column: "starttime" },
                Field { key: "project_id", column: "projectid" },
                Field { key: "scenario_id", column: "scenarioid" },
                Field { key: "specification_revision", column: "specificationrevision" },
                Field { key: "test_log_path", column: "testlogpath" },
                Field { key: "test_log_revision", column: "testlogrevision" },
                Field { key: "version", column: "version" },
                Field { key: "comment", column: "comment" },
            ],
            attachment: Attachment::Category {
                kind: EntityKind::ScenarioExecution,
                category: "scenarios",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "scenario_execution_additional_information_execution",
            fields: &[
                Field { key: "scenario_execution_pk", column: "scenario_execution_pk" },
                Field {
                    key: "additional_information_executions_pk",
                    column: "additionalinformationexecutions_pk",
                },
            ],
            attachment: Attachment::Association {
                left: EntityKind::ScenarioExecution,
                left_fk: "scenario_execution_pk",
                right: EntityKind::AdditionalInformationExecution,
                right_fk: "additional_information_executions_pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "scenario_execution_performance_measurement_execution",
            fields: &[
                Field { key: "scenario_execution_pk", column: "scenario_execution_pk" },
                Field {
                    key: "performance_measurement_executions_pk",
                    column: "performancemeasurementexecutions_pk",
                },
            ],
            attachment: Attachment::Association {
                left: EntityKind::ScenarioExecution,
                left_fk: "scenario_execution_pk",
                right: EntityKind::PerformanceMeasurementExecution,
                right_fk: "performance_measurement_executions_pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "procedure_execution",
            fields: &[
                Field { key: "type", column: "procedure_execution_type" },
                Field { key: "pk", column: "pk" },
                Field { key: "comment", column: "comment" },
                Field { key: "end_time", column: "endtime" },
                Field { key: "procedure_id", column: "procedureid" },
                Field { key: "procedure_verdict", column: "procedureverdict" },
                Field { key: "project_id", column: "projectid" },
                Field { key: "start_time", column: "starttime" },
                Field { key: "test_execution", column: "testexecution" },
                Field { key: "scenario_execution_pk", column: "scenarioexecution_pk" },
                Field { key: "deployment_name", column: "deploymentname" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::ProcedureExecution,
                parent: EntityKind::ScenarioExecution,
                fk: "scenario_execution_pk",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "automatedprocedureexecution",
            fields: &[Field { key: "pk", column: "pk" }],
            attachment: Attachment::Marker {
                parent: EntityKind::ProcedureExecution,
                fk: "pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "manualprocedureexecution",
            fields: &[Field { key: "pk", column: "pk" }],
            attachment: Attachment::Marker {
                parent: EntityKind::ProcedureExecution,
                fk: "pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "manual_procedure_step_execution",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "deviations", column: "deviations" },
                // The source table carries this misspelling.
                Field { key: "manual_procedure_step_pk", column: "manualproceduuresteppk" },
                Field { key: "results", column: "results" },
                Field { key: "step_verdict", column: "stepverdict" },
                Field {
                    key: "manual_procedure_execution_pk",
                    column: "manualprocedureexecution_pk",
                },
                Field { key: "step_number", column: "stepnumber" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::ManualProcedureStepExecution,
                parent: EntityKind::ProcedureExecution,
                fk: "manual_procedure_execution_pk",
            },
            index_by: None,
            links: &[],
        },
        // Verdicts are listed under their own category root and echoed as a
        // reference under the procedure execution they came from.
        TableSpec {
            table: "test_case_verdict",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "project_id", column: "projectid" },
                Field { key: "testcase_id", column: "testcaseid" },
                Field { key: "verdict", column: "verdict" },
                Field { key: "procedure_execution_pk", column: "procedureexecution_pk" },
            ],
            attachment: Attachment::Category {
                kind: EntityKind::TestCaseVerdict,
                category: "verdicts",
            },
            index_by: Some("pk"),
            links: &[Link {
                target: EntityKind::ProcedureExecution,
                fk: "procedure_execution_pk",
                placement: Placement::UnderTarget,
            }],
        },
    ],
};
