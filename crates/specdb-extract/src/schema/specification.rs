//! The specification database: projects, requirements and the test
//! specification tree down to procedures and manual steps.

use crate::kind::EntityKind;

use super::{Attachment, Field, Link, Placement, SchemaDef, TableSpec};

pub static SPECIFICATION: SchemaDef = SchemaDef {
    name: "specification",
    root: "TestSpecification",
    categories: &[
        "information",
        "baselines",
        "deployments",
        "locks",
        "requirements",
        "projects",
    ],
    tables: &[
        TableSpec {
            table: "additional_information",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "key", column: "key" },
                Field { key: "description", column: "description" },
            ],
            attachment: Attachment::Category {
                kind: EntityKind::AdditionalInformation,
                category: "information",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "baseline",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "name", column: "name" },
                Field { key: "description", column: "description" },
            ],
            attachment: Attachment::Category {
                kind: EntityKind::Baseline,
                category: "baselines",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "baseline_item",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "id", column: "id" },
                Field { key: "version", column: "version" },
                Field { key: "baseline_pk", column: "baseline_pk" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::BaselineItem,
                parent: EntityKind::Baseline,
                fk: "baseline_pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "deployment",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "name", column: "name" },
                Field { key: "description", column: "description" },
                Field { key: "measurement_only", column: "perfmeasurementonly" },
            ],
            attachment: Attachment::Category {
                kind: EntityKind::Deployment,
                category: "deployments",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "editing_lock",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "id", column: "id" },
                Field { key: "owner", column: "owner" },
                Field { key: "type", column: "type" },
            ],
            attachment: Attachment::Category {
                kind: EntityKind::EditingLock,
                category: "locks",
            },
            index_by: Some("pk"),
            links: &[],
        },
        // Requirements key on their textual id; dependent tables join on it.
        TableSpec {
            table: "requirement",
            fields: &[
                Field { key: "type", column: "requirement_type" },
                Field { key: "id", column: "id" },
                Field { key: "name", column: "name" },
                Field { key: "description", column: "description" },
                Field { key: "import_date", column: "importdate" },
                Field { key: "import_file", column: "importfile" },
                Field { key: "priority", column: "priority" },
                Field { key: "verification", column: "verification" },
                Field { key: "version", column: "version" },
            ],
            attachment: Attachment::Category {
                kind: EntityKind::Requirement,
                category: "requirements",
            },
            index_by: Some("id"),
            links: &[],
        },
        TableSpec {
            table: "requirement_deployment",
            fields: &[
                Field { key: "requirement_id", column: "requirement_id" },
                Field { key: "deployments_pk", column: "deployments_pk" },
            ],
            attachment: Attachment::Association {
                left: EntityKind::Requirement,
                left_fk: "requirement_id",
                right: EntityKind::Deployment,
                right_fk: "deployments_pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "user_requirement",
            fields: &[
                Field { key: "id", column: "id" },
                Field { key: "note", column: "additionalnote" },
                Field { key: "justification", column: "justification" },
                Field { key: "last_changed", column: "lastchangedin" },
                Field { key: "level", column: "requirementlevel" },
                Field { key: "type", column: "requirementtype" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::UserRequirement,
                parent: EntityKind::Requirement,
                fk: "id",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "software_requirement",
            fields: &[
                Field { key: "id", column: "id" },
                Field { key: "comment", column: "comment" },
                Field { key: "stability", column: "stability" },
                Field { key: "structure", column: "structure" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::SoftwareRequirement,
                parent: EntityKind::Requirement,
                fk: "id",
            },
            index_by: Some("id"),
            links: &[],
        },
        // The trace from a software requirement to the user requirement it
        // refines; the target is the requirement node itself.
        TableSpec {
            table: "software_requirement_user_requirement",
            fields: &[
                Field { key: "software_requirement_id", column: "software_requirement_id" },
                Field { key: "user_requirement_id", column: "userrequirements_id" },
            ],
            attachment: Attachment::Association {
                left: EntityKind::SoftwareRequirement,
                left_fk: "software_requirement_id",
                right: EntityKind::Requirement,
                right_fk: "user_requirement_id",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "project",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "type", column: "projecttype" },
                Field { key: "id", column: "id" },
                Field { key: "version", column: "version" },
                Field { key: "artifact", column: "artifactid" },
                Field { key: "package", column: "packagename" },
                Field { key: "basefolder", column: "basefolder" },
                Field { key: "targetfolder", column: "codegenerationtargetfolder" },
            ],
            attachment: Attachment::Category {
                kind: EntityKind::Project,
                category: "projects",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "project_requirement",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "requirement_id", column: "requirement_id" },
                Field { key: "status", column: "implementationstatus" },
                Field { key: "rfw", column: "requestforwaiver" },
                Field { key: "verificationstage", column: "verificationstage" },
                Field { key: "comment", column: "comment" },
                Field { key: "project_pk", column: "project_pk" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::ProjectRequirement,
                parent: EntityKind::Project,
                fk: "project_pk",
            },
            index_by: Some("pk"),
            links: &[Link {
                target: EntityKind::Requirement,
                fk: "requirement_id",
                placement: Placement::ChildRef,
            }],
        },
        TableSpec {
            table: "project_requirement_deployment",
            fields: &[
                Field { key: "project_requirement_pk", column: "project_requirement_pk" },
                Field { key: "deployments_pk", column: "deployments_pk" },
            ],
            attachment: Attachment::Association {
                left: EntityKind::ProjectRequirement,
                left_fk: "project_requirement_pk",
                right: EntityKind::Deployment,
                right_fk: "deployments_pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "performance_measurement",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "key", column: "key" },
                Field { key: "description", column: "description" },
                Field { key: "basevalue", column: "basevalue" },
                Field { key: "targetvalue", column: "targetvalue" },
                Field { key: "project_pk", column: "project_pk" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::PerformanceMeasurement,
                parent: EntityKind::Project,
                fk: "project_pk",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "test_area",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "id", column: "id" },
                Field { key: "title", column: "title" },
                Field { key: "description", column: "description" },
                Field { key: "approach", column: "approach" },
                Field { key: "project_pk", column: "project_pk" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::TestArea,
                parent: EntityKind::Project,
                fk: "project_pk",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "feature",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "id", column: "id" },
                Field { key: "title", column: "title" },
                Field { key: "description", column: "description" },
                Field { key: "testarea_pk", column: "testarea_pk" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::Feature,
                parent: EntityKind::TestArea,
                fk: "testarea_pk",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "test_case",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "id", column: "id" },
                Field { key: "title", column: "title" },
                Field { key: "specification", column: "specification" },
                Field { key: "scope", column: "scope" },
                Field { key: "criteria", column: "criteria" },
                Field { key: "comment", column: "comment" },
                Field { key: "feature_pk", column: "feature_pk" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::TestCase,
                parent: EntityKind::Feature,
                fk: "feature_pk",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "test_case_project_requirement",
            fields: &[
                Field { key: "test_case_pk", column: "test_case_pk" },
                Field { key: "project_requirements_pk", column: "projectrequirements_pk" },
            ],
            attachment: Attachment::Association {
                left: EntityKind::TestCase,
                left_fk: "test_case_pk",
                right: EntityKind::ProjectRequirement,
                right_fk: "project_requirements_pk",
            },
            index_by: None,
            links: &[],
        },
        // Scenarios hang off their project; the test-area link is a slot on
        // the scenario node, not a child.
        TableSpec {
            table: "scenario",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "type", column: "scenariotype" },
                Field { key: "id", column: "id" },
                Field { key: "title", column: "title" },
                Field { key: "description", column: "description" },
                Field { key: "resources", column: "resources" },
                Field { key: "testarea_pk", column: "testarea_pk" },
                Field { key: "project_pk", column: "project_pk" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::Scenario,
                parent: EntityKind::Project,
                fk: "project_pk",
            },
            index_by: Some("pk"),
            links: &[Link {
                target: EntityKind::TestArea,
                fk: "testarea_pk",
                placement: Placement::NodeRef,
            }],
        },
        TableSpec {
            table: "scenario_additional_information",
            fields: &[
                Field { key: "scenario_pk", column: "scenario_pk" },
                Field { key: "additional_information_pk", column: "additionalinformation_pk" },
            ],
            attachment: Attachment::Association {
                left: EntityKind::Scenario,
                left_fk: "scenario_pk",
                right: EntityKind::AdditionalInformation,
                right_fk: "additional_information_pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "scenario_deployment",
            fields: &[
                Field { key: "scenario_pk", column: "scenario_pk" },
                Field { key: "deployments_pk", column: "deployments_pk" },
            ],
            attachment: Attachment::Association {
                left: EntityKind::Scenario,
                left_fk: "scenario_pk",
                right: EntityKind::Deployment,
                right_fk: "deployments_pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "scenario_performance_measurement",
            fields: &[
                Field { key: "scenario_pk", column: "scenario_pk" },
                Field { key: "performance_measurements_pk", column: "performancemeasurements_pk" },
            ],
            attachment: Attachment::Association {
                left: EntityKind::Scenario,
                left_fk: "scenario_pk",
                right: EntityKind::PerformanceMeasurement,
                right_fk: "performance_measurements_pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "procedure",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "type", column: "procedure_type" },
                Field { key: "id", column: "id" },
                Field { key: "title", column: "title" },
                Field { key: "description", column: "description" },
                Field { key: "scenario_pk", column: "scenario_pk" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::Procedure,
                parent: EntityKind::Scenario,
                fk: "scenario_pk",
            },
            index_by: Some("pk"),
            links: &[],
        },
        TableSpec {
            table: "procedure_test_case",
            fields: &[
                Field { key: "procedure_pk", column: "procedure_pk" },
                Field { key: "testcases_pk", column: "testcases_pk" },
            ],
            attachment: Attachment::Association {
                left: EntityKind::Procedure,
                left_fk: "procedure_pk",
                right: EntityKind::TestCase,
                right_fk: "testcases_pk",
            },
            index_by: None,
            links: &[],
        },
        // Subtype tables share the procedure primary key.
        TableSpec {
            table: "automated_procedure",
            fields: &[Field { key: "pk", column: "pk" }],
            attachment: Attachment::Marker {
                parent: EntityKind::Procedure,
                fk: "pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "manual_procedure",
            fields: &[Field { key: "pk", column: "pk" }],
            attachment: Attachment::Marker {
                parent: EntityKind::Procedure,
                fk: "pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "manual_procedure_step",
            fields: &[
                Field { key: "pk", column: "pk" },
                Field { key: "step_number", column: "stepnumber" },
                Field { key: "action", column: "action" },
                Field { key: "expected_results", column: "expectedresults" },
                Field { key: "comments", column: "comments" },
                Field { key: "manual_procedure_pk", column: "manualprocedure_pk" },
            ],
            attachment: Attachment::Parent {
                kind: EntityKind::ManualProcedureStep,
                parent: EntityKind::Procedure,
                fk: "manual_procedure_pk",
            },
            index_by: None,
            links: &[],
        },
        TableSpec {
            table: "auxiliaryroutine",
            fields: &[Field { key: "pk", column: "pk" }],
            attachment: Attachment::Marker {
                parent: EntityKind::Procedure,
                fk: "pk",
            },
            index_by: None,
            links: &[],
        },
    ],
};
