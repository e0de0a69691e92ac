// Chart index model and the one-directional diff between two indices.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A single entry of a chart's version list. ChartMuseum returns many
/// more fields (urls, digest, created, ...); only `version` matters here.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    pub version: String,
}

/// Chart name -> versions, as returned by `GET /api/charts`.
pub type ChartIndex = BTreeMap<String, Vec<VersionRecord>>;

/// Versions present on the source but missing on the destination,
/// grouped by chart name. Charts with nothing missing are not present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    charts: BTreeMap<String, Vec<String>>,
}

impl DiffResult {
    /// Number of (chart, version) pairs to transfer.
    pub fn total(&self) -> usize {
        self.charts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn charts(&self) -> &BTreeMap<String, Vec<String>> {
        &self.charts
    }

    pub fn versions(&self, chart: &str) -> Option<&[String]> {
        self.charts.get(chart).map(Vec::as_slice)
    }

    /// Every missing pair exactly once: charts by name, versions in
    /// source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.charts
            .iter()
            .flat_map(|(chart, versions)| versions.iter().map(move |v| (chart.as_str(), v.as_str())))
    }
}

/// Compute which source versions are absent on the destination.
///
/// Versions are compared by exact string equality; `v1.0.0` and `1.0.0`
/// are different versions. Charts that only exist on the destination are
/// ignored.
pub fn diff(source: &ChartIndex, destination: &ChartIndex) -> DiffResult {
    let mut charts = BTreeMap::new();

    for (chart, source_versions) in source {
        let present: HashSet<&str> = destination
            .get(chart)
            .map(|records| records.iter().map(|r| r.version.as_str()).collect())
            .unwrap_or_default();

        let mut seen = HashSet::new();
        let missing: Vec<String> = source_versions
            .iter()
            .map(|r| r.version.as_str())
            .filter(|v| !present.contains(v) && seen.insert(*v))
            .map(str::to_string)
            .collect();

        if !missing.is_empty() {
            charts.insert(chart.clone(), missing);
        }
    }

    DiffResult { charts }
}
