//! Raw results → assessment plan + assessment results.
//!
//! A single pass over the input. Every product in the caller's list becomes one
//! [`AssessmentResult`], in list order; every control either becomes an
//! observation/finding pair or an exclusion. Back-matter and locations are
//! left to [`crate::link`].

use tracing::{debug, trace};

use crate::classify::{ControlClass, classify};
use crate::config::ConversionOptions;
use crate::enums::*;
use crate::error::{ConvertError, Result};
use crate::ids::{Identifier, WellKnownSubject, fragment_href, new_id, well_known_id};
use crate::normalize::{normalize_or, normalize_requirement};
use crate::raw::{Control, DEFAULT_TOOL, RawResults, RunMetadata};
use crate::types::*;

const SCRIPTING_ENGINE_TITLE: &str = "PowerShell";
const POLICY_ENGINE_TITLE: &str = "Open Policy Agent";
const MISSING_REQUIREMENT: &str = "No requirement text provided.";

/// The two generated documents plus the identifier of the system security
/// plan they both point at.
#[derive(Clone, Debug)]
pub struct DocumentPair {
    pub plan: AssessmentPlan,
    pub results: AssessmentResults,
    /// Referenced by the plan's `import-ssp`; the plan itself is never generated.
    pub ssp_id: Identifier,
}

impl DocumentPair {
    pub fn plan_document(&self) -> AssessmentPlanDocument {
        AssessmentPlanDocument {
            assessment_plan: self.plan.clone(),
        }
    }

    pub fn results_document(&self) -> AssessmentResultsDocument {
        AssessmentResultsDocument {
            assessment_results: self.results.clone(),
        }
    }
}

/// Per-product output of the control walk.
struct ProductAssessment {
    result: AssessmentResult,
    excluded: ExcludedControls,
}

/// Build the plan and results documents for `products`.
///
/// The plan and results identifiers are minted before any product is walked
/// so each document can reference the other. Fails on the first product that
/// has no abbreviation or no entry in `Results`; no partial pair is returned.
pub fn assemble(
    raw: &RawResults,
    products: &[String],
    options: &ConversionOptions,
) -> Result<DocumentPair> {
    let plan_id = new_id();
    let results_id = new_id();
    let ssp_id = new_id();
    let meta = &raw.metadata;

    let mut results = Vec::with_capacity(products.len());
    let mut plan_selections = Vec::with_capacity(products.len());

    for product in products {
        let assessed = assess_product(raw, product, options)?;
        plan_selections.push(ControlSelection {
            description: Some(selection_description(product, &meta.tool)),
            include_all: Some(IncludeAll {}),
            exclude_controls: assessed.excluded,
        });
        results.push(assessed.result);
    }

    let plan = AssessmentPlan {
        uuid: plan_id,
        metadata: document_metadata(meta, "Plan", options),
        import_ssp: ImportRef {
            href: fragment_href(ssp_id),
        },
        local_definitions: Some(PlanLocalDefinitions {
            components: tool_components(meta, options),
        }),
        reviewed_controls: ReviewedControls {
            control_selections: plan_selections,
            control_objective_selections: Some(vec![ObjectiveSelection {
                include_all: Some(IncludeAll {}),
            }]),
        },
        assessment_subjects: Some(vec![AssessmentSubject {
            kind: SubjectType::Component,
            description: Some(format!(
                "The {} services of the {} tenant.",
                products.join(", "),
                meta.tenant_label()
            )),
            include_all: Some(IncludeAll {}),
        }]),
        assessment_assets: Some(AssessmentAssets {
            components: None,
            assessment_platforms: vec![assessment_platform(meta, options)],
        }),
        back_matter: None,
    };

    let results = AssessmentResults {
        uuid: results_id,
        metadata: document_metadata(meta, "Results", options),
        import_ap: ImportRef {
            href: fragment_href(plan_id),
        },
        results,
        back_matter: None,
    };

    debug!(
        plan = %plan_id,
        results = %results_id,
        products = products.len(),
        "assembled assessment documents"
    );

    Ok(DocumentPair {
        plan,
        results,
        ssp_id,
    })
}

fn assess_product(
    raw: &RawResults,
    product: &str,
    options: &ConversionOptions,
) -> Result<ProductAssessment> {
    let meta = &raw.metadata;
    let abbr = meta
        .product_abbreviation_mapping
        .get(product)
        .ok_or_else(|| ConvertError::MissingAbbreviation {
            product: product.to_string(),
        })?;
    let groups = raw
        .results
        .get(abbr)
        .ok_or_else(|| ConvertError::missing(format!("Results.{}", abbr)))?;

    let mut observations = Vec::new();
    let mut findings = Vec::new();
    let mut excluded = ExcludedControls::default();

    for control in groups.iter().flat_map(|group| group.controls.iter()) {
        match classify(control) {
            ControlClass::Included => {
                let observation = observe(control, &meta.timestamp_zulu);
                findings.push(find(control, observation.uuid, options));
                observations.push(observation);
            }
            ControlClass::Excluded => {
                trace!(control = %control.control_id, "excluded control");
                excluded.push(control.control_id.clone());
            }
        }
    }

    debug!(
        product,
        abbr = %abbr,
        observations = observations.len(),
        excluded = excluded.len(),
        "assessed product"
    );

    let ts = &meta.timestamp_zulu;
    let result = AssessmentResult {
        uuid: new_id(),
        title: format!("SCuBA M365 {} Baseline Assessment Results", product),
        description: format!(
            "Results of assessment performed by {} for the {} baseline",
            meta.tool, product
        ),
        start: ts.clone(),
        end: Some(ts.clone()),
        local_definitions: Some(ResultLocalDefinitions {
            assessment_assets: Some(AssessmentAssets {
                components: None,
                assessment_platforms: vec![assessment_platform(meta, options)],
            }),
        }),
        reviewed_controls: ReviewedControls {
            control_selections: vec![ControlSelection {
                description: Some(selection_description(product, &meta.tool)),
                include_all: Some(IncludeAll {}),
                exclude_controls: excluded.clone(),
            }],
            control_objective_selections: Some(vec![ObjectiveSelection {
                include_all: Some(IncludeAll {}),
            }]),
        },
        assessment_log: Some(AssessmentLog {
            entries: vec![LogEntry {
                uuid: new_id(),
                title: Some(format!("Run {}", meta.tool)),
                start: ts.clone(),
                end: Some(ts.clone()),
            }],
        }),
        observations,
        findings,
    };

    Ok(ProductAssessment { result, excluded })
}

fn observe(control: &Control, collected: &str) -> Observation {
    Observation {
        uuid: new_id(),
        title: Some(format!("Test {}", control.control_id)),
        description: control.details.clone(),
        methods: vec![ObservationMethod::Test],
        types: Some(vec![ObservationType::ControlObjective]),
        collected: collected.to_string(),
    }
}

fn find(control: &Control, observation: Identifier, options: &ConversionOptions) -> Finding {
    let state = if control.passed() {
        ObjectiveState::Satisfied
    } else {
        ObjectiveState::NotSatisfied
    };
    Finding {
        uuid: new_id(),
        title: control.control_id.clone(),
        description: control.details.clone(),
        target: FindingTarget {
            kind: FindingTargetType::StatementId,
            target_id: control.control_id.clone(),
            props: Some(vec![Property::namespaced(
                "requirement",
                &options.namespace,
                normalize_or(&control.requirement, MISSING_REQUIREMENT),
            )]),
            status: ObjectiveStatus { state },
        },
        related_observations: Some(vec![RelatedObservation {
            observation_uuid: observation,
        }]),
    }
}

fn selection_description(product: &str, tool: &str) -> String {
    format!(
        "Include all controls in the {} baseline, except those that cannot be checked via {}.",
        product, tool
    )
}

fn document_metadata(meta: &RunMetadata, kind: &str, options: &ConversionOptions) -> Metadata {
    let tenant = meta.tenant_label();
    let mut props = Vec::with_capacity(4);
    if let Some(marking) = options.marking.as_deref().and_then(non_blank) {
        props.push(Property::new("marking", marking));
    }
    for (name, value) in [
        ("TenantId", &meta.tenant_id),
        ("DisplayName", &meta.display_name),
        ("DomainName", &meta.domain_name),
    ] {
        if let Some(value) = non_blank(value) {
            props.push(Property::namespaced(name, &options.namespace, value));
        }
    }

    Metadata {
        title: format!("{} SCuBA M365 Baseline Assessment {}", tenant, kind),
        published: Some(meta.timestamp_zulu.clone()),
        last_modified: meta.timestamp_zulu.clone(),
        version: format!("{} {}", meta.tool, meta.tool_version),
        oscal_version: options.oscal_version.clone(),
        props: Some(props),
        roles: Some(vec![
            Role {
                id: "prepared-for".to_string(),
                title: tenant,
                description: Some(format!(
                    "The display name of the M365 tenant being assessed by {}.",
                    meta.tool
                )),
            },
            Role {
                id: "prepared-by".to_string(),
                title: preparer(meta),
                description: Some(format!("The entity that ran {}.", meta.tool)),
            },
        ]),
        locations: None,
        parties: None,
        responsible_parties: None,
    }
}

/// `"Agency, Office"` from whichever agency names are set, else the tool.
fn preparer(meta: &RunMetadata) -> String {
    let agency: Vec<String> = [&meta.agency_name, &meta.sub_agency_name]
        .into_iter()
        .filter_map(|name| non_blank(name))
        .collect();
    normalize_or(&agency.join(", "), &normalize_or(&meta.tool, DEFAULT_TOOL))
}

fn non_blank(value: &str) -> Option<String> {
    Some(normalize_requirement(value)).filter(|v| !v.is_empty())
}

/// The tooling components, keyed by their run-independent identifiers.
fn tool_components(meta: &RunMetadata, options: &ConversionOptions) -> Vec<Component> {
    let software = |subject, title: &str, description: String, props| Component {
        uuid: well_known_id(subject),
        kind: "software".to_string(),
        title: title.to_string(),
        description,
        props,
        status: ComponentStatus {
            state: ComponentState::Operational,
        },
    };

    vec![
        software(
            WellKnownSubject::AssessmentTool,
            &meta.tool,
            "Assessment tool that collects tenant configuration and evaluates it against the SCuBA M365 baselines.".to_string(),
            Some(vec![Property::namespaced(
                "version",
                &options.namespace,
                &meta.tool_version,
            )]),
        ),
        software(
            WellKnownSubject::ScriptingEngine,
            SCRIPTING_ENGINE_TITLE,
            format!("Scripting engine that hosts {}.", meta.tool),
            None,
        ),
        software(
            WellKnownSubject::PolicyEngine,
            POLICY_ENGINE_TITLE,
            "Policy engine that evaluates collected configuration against baseline policies.".to_string(),
            None,
        ),
    ]
}

fn assessment_platform(meta: &RunMetadata, options: &ConversionOptions) -> AssessmentPlatform {
    let uses = [
        WellKnownSubject::AssessmentTool,
        WellKnownSubject::ScriptingEngine,
        WellKnownSubject::PolicyEngine,
    ];
    AssessmentPlatform {
        uuid: new_id(),
        title: Some(meta.tool.clone()),
        uses_components: Some(
            uses.into_iter()
                .map(|subject| UsesComponent {
                    component_uuid: well_known_id(subject),
                })
                .collect(),
        ),
        props: Some(vec![Property::namespaced(
            "version",
            &options.namespace,
            &meta.tool_version,
        )]),
    }
}
