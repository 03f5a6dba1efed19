//! Change impact analysis.
//!
//! Groups a set of changed paths by owning service. Paths with no owner go to
//! the unmapped bucket; paths matched by more than one rule are recorded as
//! overlaps with the services of every candidate.

use crate::ownership::OwnershipIndex;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// The services affected by a set of changed paths.
///
/// Every list is sorted and free of duplicates, so two reports computed from
/// the same paths compare equal regardless of input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImpactReport {
    /// Owning service to the changed paths it owns.
    pub services_to_files: BTreeMap<String, Vec<String>>,
    /// Changed paths no rule matched.
    pub unmapped_files: Vec<String>,
    /// Path to the services of all candidate rules, in rule order.
    ///
    /// Only paths with more than one candidate appear here.
    pub overlaps: BTreeMap<String, Vec<String>>,
}

impl ImpactReport {
    /// Returns the impacted services, sorted.
    pub fn impacted_services(&self) -> Vec<&str> {
        self.services_to_files.keys().map(String::as_str).collect()
    }

    /// Returns how many changed paths `service` owns.
    pub fn file_count_for(&self, service: &str) -> usize {
        self.services_to_files.get(service).map_or(0, Vec::len)
    }

    /// Returns the number of distinct changed paths, mapped or not.
    pub fn total_files(&self) -> usize {
        self.services_to_files.values().map(Vec::len).sum::<usize>() + self.unmapped_files.len()
    }

    /// Returns true if any changed path has no owner.
    pub fn has_unmapped(&self) -> bool {
        !self.unmapped_files.is_empty()
    }
}

/// Computes the impact of `paths` against `index`.
///
/// Paths should already be normalized. Repeated paths are counted once.
pub fn compute_impact<I>(index: &OwnershipIndex, paths: I) -> ImpactReport
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut services: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    let mut unmapped: BTreeSet<String> = BTreeSet::new();
    let mut overlaps: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for path in paths {
        let path = path.as_ref();
        let m = index.match_path(path);

        let Some(service) = m.service() else {
            unmapped.insert(path.to_string());
            continue;
        };

        services
            .entry(service.to_string())
            .or_default()
            .insert(path.to_string());

        if m.candidates.len() > 1 {
            overlaps.insert(
                path.to_string(),
                m.candidate_services().into_iter().map(String::from).collect(),
            );
        }
    }

    let report = ImpactReport {
        services_to_files: services
            .into_iter()
            .map(|(service, files)| (service, files.into_iter().collect()))
            .collect(),
        unmapped_files: unmapped.into_iter().collect(),
        overlaps,
    };

    debug!(
        "Impact: {} service(s), {} unmapped, {} overlap(s)",
        report.services_to_files.len(),
        report.unmapped_files.len(),
        report.overlaps.len()
    );
    report
}
