//! Entity kinds and their identifier rules.
//!
//! Every materialized node carries one [`EntityKind`] tag; association link
//! rows all share [`EntityKind::Reference`]. The kind also fixes how a
//! node's human-readable identifier is derived from its properties and its
//! parent's identifier.

/// The label identifying what a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    // Specification schema
    AdditionalInformation,
    Baseline,
    BaselineItem,
    Deployment,
    EditingLock,
    Requirement,
    UserRequirement,
    SoftwareRequirement,
    Project,
    ProjectRequirement,
    PerformanceMeasurement,
    TestArea,
    Feature,
    TestCase,
    Scenario,
    Procedure,
    ManualProcedureStep,
    // Results schema
    AdditionalInformationExecution,
    PerformanceMeasurementExecution,
    ScenarioExecution,
    ProcedureExecution,
    ManualProcedureStepExecution,
    TestCaseVerdict,
    // Association / cross-reference link
    Reference,
}

/// How a kind derives its unique identifier.
///
/// Identifiers are pure functions of the node's own properties and the
/// parent's identifier; `-` joins a child to its parent, `=` joins an
/// association to its target.
#[derive(Debug, Clone, Copy)]
pub enum IdRule {
    /// A single own property.
    Prop(&'static str),
    /// Parent identifier, `-`, own property.
    ParentProp(&'static str),
    /// Parent identifier, `-`, the segment of the property after its
    /// last `-` (the property repeats the parent chain in the source).
    ParentPropTail(&'static str),
    /// Two own properties joined with `-`.
    Pair(&'static str, &'static str),
    /// Owner identifier, `=`, target identifier.
    Reference,
}

impl EntityKind {
    pub fn tag(self) -> &'static str {
        match self {
            EntityKind::AdditionalInformation => "AdditionalInformation",
            EntityKind::Baseline => "Baseline",
            EntityKind::BaselineItem => "BaselineItem",
            EntityKind::Deployment => "Deployment",
            EntityKind::EditingLock => "EditingLock",
            EntityKind::Requirement => "Requirement",
            EntityKind::UserRequirement => "UserRequirement",
            EntityKind::SoftwareRequirement => "SoftwareRequirement",
            EntityKind::Project => "Project",
            EntityKind::ProjectRequirement => "ProjectRequirement",
            EntityKind::PerformanceMeasurement => "PerformanceMeasurement",
            EntityKind::TestArea => "TestArea",
            EntityKind::Feature => "Feature",
            EntityKind::TestCase => "TestCase",
            EntityKind::Scenario => "Scenario",
            EntityKind::Procedure => "Procedure",
            EntityKind::ManualProcedureStep => "ManualProcedureStep",
            EntityKind::AdditionalInformationExecution => "AdditionalInformationExecution",
            EntityKind::PerformanceMeasurementExecution => "PerformanceMeasurementExecution",
            EntityKind::ScenarioExecution => "ScenarioExecution",
            EntityKind::ProcedureExecution => "ProcedureExecution",
            EntityKind::ManualProcedureStepExecution => "ManualProcedureStepExecution",
            EntityKind::TestCaseVerdict => "TestCaseVerdict",
            EntityKind::Reference => "reference",
        }
    }

    pub fn id_rule(self) -> IdRule {
        match self {
            EntityKind::Project => IdRule::Prop("id"),
            EntityKind::TestArea => IdRule::ParentProp("id"),
            EntityKind::Feature => IdRule::ParentProp("id"),
            EntityKind::TestCase => IdRule::ParentPropTail("id"),
            EntityKind::Scenario => IdRule::ParentProp("id"),
            EntityKind::Procedure => IdRule::ParentProp("id"),
            EntityKind::ManualProcedureStep => IdRule::ParentProp("step_number"),
            EntityKind::BaselineItem => IdRule::ParentProp("id"),
            EntityKind::PerformanceMeasurement => IdRule::ParentProp("key"),
            EntityKind::ProjectRequirement => IdRule::ParentProp("requirement_id"),
            EntityKind::AdditionalInformation => IdRule::Prop("key"),
            EntityKind::Baseline => IdRule::Prop("name"),
            EntityKind::Deployment => IdRule::Prop("name"),
            EntityKind::EditingLock => IdRule::Prop("id"),
            EntityKind::Requirement => IdRule::Prop("id"),
            EntityKind::UserRequirement => IdRule::Prop("id"),
            EntityKind::SoftwareRequirement => IdRule::Prop("id"),
            EntityKind::AdditionalInformationExecution => IdRule::Prop("key"),
            EntityKind::PerformanceMeasurementExecution => IdRule::Prop("key"),
            EntityKind::ScenarioExecution => IdRule::Pair("project_id", "scenario_id"),
            EntityKind::ProcedureExecution => IdRule::Pair("project_id", "procedure_id"),
            EntityKind::ManualProcedureStepExecution => IdRule::ParentProp("step_number"),
            EntityKind::TestCaseVerdict => IdRule::Pair("project_id", "testcase_id"),
            EntityKind::Reference => IdRule::Reference,
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}
