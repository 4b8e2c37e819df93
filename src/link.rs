//! Cross-document references.
//!
//! Fills in what [`crate::assemble`] leaves empty: the tenant location in both
//! documents' metadata, and back-matter resources that let each document be
//! resolved against its sibling, the (ungenerated) system security plan, the
//! tool repository and the raw input file.

use std::path::{Component as PathComponent, Path, PathBuf};
use tracing::debug;

use crate::assemble::DocumentPair;
use crate::config::ConversionOptions;
use crate::enums::AddressType;
use crate::error::{ConvertError, Result};
use crate::ids::{Identifier, new_id};
use crate::raw::{RawResults, TenantRecord};
use crate::types::*;

const RAW_MEDIA_TYPE: &str = "application/json";
const REPOSITORY_MEDIA_TYPE: &str = "text/html";

/// Where the input was read from and where the documents will be written.
#[derive(Clone, Debug)]
pub struct LinkContext {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
}

/// Attach locations and back-matter to both documents, in place.
pub fn link(
    pair: &mut DocumentPair,
    raw: &RawResults,
    context: &LinkContext,
    options: &ConversionOptions,
) -> Result<()> {
    let meta = &raw.metadata;
    let label = meta.tenant_label();
    let tenant = resolve_tenant(&meta.display_name, &raw.raw.tenant_details)?;
    pair.plan.metadata.locations = Some(vec![tenant_location(tenant, &label)]);
    pair.results.metadata.locations = Some(vec![tenant_location(tenant, &label)]);

    let raw_href = relative_href(&context.input_path, &context.output_dir)?;
    debug!(href = %raw_href, "raw input reference");

    let plan_resource = sibling_resource(
        pair.plan.uuid,
        &pair.plan.metadata,
        "security-assessment-plan",
    );
    let results_resource = sibling_resource(
        pair.results.uuid,
        &pair.results.metadata,
        "security-assessment-results",
    );
    let ssp_resource = Resource {
        uuid: pair.ssp_id,
        title: Some(format!("{} System Security Plan", label)),
        description: Some(format!(
            "System security plan for the {} tenant. Maintained outside of {}.",
            label, meta.tool
        )),
        props: Some(vec![Property::new("type", "system-security-plan")]),
        rlinks: None,
    };

    pair.plan.back_matter = Some(BackMatter {
        resources: vec![
            results_resource,
            ssp_resource,
            repository_resource(&meta.tool, options),
            raw_input_resource(&meta.tool, &raw_href),
        ],
    });
    pair.results.back_matter = Some(BackMatter {
        resources: vec![
            plan_resource,
            repository_resource(&meta.tool, options),
            raw_input_resource(&meta.tool, &raw_href),
        ],
    });

    Ok(())
}

/// The single tenant record whose display name equals `display_name` exactly.
pub fn resolve_tenant<'a>(
    display_name: &str,
    tenants: &'a [TenantRecord],
) -> Result<&'a TenantRecord> {
    let matches: Vec<&TenantRecord> = tenants
        .iter()
        .filter(|t| t.display_name == display_name)
        .collect();
    match matches.as_slice() {
        [] => Err(ConvertError::MissingTenantRecord {
            display_name: display_name.to_string(),
        }),
        [only] => Ok(*only),
        many => Err(ConvertError::AmbiguousTenantRecord {
            display_name: display_name.to_string(),
            count: many.len(),
        }),
    }
}

fn tenant_location(tenant: &TenantRecord, label: &str) -> Location {
    let addr = &tenant.aad_additional_data;
    let address = Address {
        kind: Some(AddressType::Work),
        addr_lines: present(&addr.street).map(|street| vec![street]),
        city: present(&addr.city),
        state: present(&addr.state),
        country: present(&addr.country_letter_code),
        postal_code: present(&addr.postal_code),
    };
    Location {
        uuid: new_id(),
        title: Some(label.to_string()),
        address: Some(address),
        remarks: Some("The location of the M365 tenant.".to_string()),
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn sibling_resource(id: Identifier, metadata: &Metadata, kind: &str) -> Resource {
    let mut props = vec![Property::new("type", kind)];
    if let Some(published) = &metadata.published {
        props.push(Property::new("published", published));
    }
    props.push(Property::new("version", &metadata.version));
    Resource {
        uuid: id,
        title: Some(metadata.title.clone()),
        description: None,
        props: Some(props),
        rlinks: None,
    }
}

fn repository_resource(tool: &str, options: &ConversionOptions) -> Resource {
    Resource {
        uuid: new_id(),
        title: Some(format!("{} GitHub repository", tool)),
        description: None,
        props: None,
        rlinks: Some(vec![Rlink {
            href: options.repository_url.clone(),
            media_type: Some(REPOSITORY_MEDIA_TYPE.to_string()),
        }]),
    }
}

fn raw_input_resource(tool: &str, href: &str) -> Resource {
    Resource {
        uuid: new_id(),
        title: Some(format!("Raw {} output", tool)),
        description: None,
        props: None,
        rlinks: Some(vec![Rlink {
            href: href.to_string(),
            media_type: Some(RAW_MEDIA_TYPE.to_string()),
        }]),
    }
}

/// Path of `target` as seen from the directory `base_dir`, always with `/`
/// separators. Relative arguments are resolved against the current directory.
pub fn relative_href(target: &Path, base_dir: &Path) -> Result<String> {
    let target_abs = std::path::absolute(target).map_err(|e| ConvertError::io(target, e))?;
    let base_abs = std::path::absolute(base_dir).map_err(|e| ConvertError::io(base_dir, e))?;
    Ok(relative_between(&target_abs, &base_abs))
}

/// Lexical relative path between two absolute paths. When they share no root
/// (different drives) the cleaned target is returned as-is.
pub fn relative_between(target: &Path, base_dir: &Path) -> String {
    let target = clean(target);
    let base = clean(base_dir);

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let shares_root = common > 0
        && matches!(
            target.first(),
            Some(PathComponent::RootDir | PathComponent::Prefix(_))
        );
    if !shares_root {
        return join_slash(&target);
    }

    let mut parts: Vec<String> = base[common..].iter().map(|_| "..".to_string()).collect();
    parts.extend(target[common..].iter().map(component_str));
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

fn clean(path: &Path) -> Vec<PathComponent<'_>> {
    let mut out: Vec<PathComponent<'_>> = Vec::new();
    for component in path.components() {
        match component {
            PathComponent::CurDir => {}
            PathComponent::ParentDir => match out.last() {
                Some(PathComponent::Normal(_)) => {
                    out.pop();
                }
                Some(PathComponent::RootDir | PathComponent::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out
}

fn component_str(component: &PathComponent<'_>) -> String {
    component.as_os_str().to_string_lossy().replace('\\', "/")
}

fn join_slash(components: &[PathComponent<'_>]) -> String {
    let mut out = String::new();
    for (i, component) in components.iter().enumerate() {
        match component {
            PathComponent::RootDir => out.push('/'),
            PathComponent::Prefix(_) => out.push_str(&component_str(component)),
            _ => {
                if i > 0 && !out.ends_with('/') {
                    out.push('/');
                }
                out.push_str(&component_str(component));
            }
        }
    }
    out
}
