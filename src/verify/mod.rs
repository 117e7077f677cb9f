//! Parsers for the tabular output of machinectl and kubectl
//!
//! Both are pure functions of their input so that format drift in either
//! tool can be pinned down by unit tests without running a cluster.

/// Prefix of machine names created by kube-spawn
pub const INSTANCE_PREFIX: &str = "kube-spawn-";

/// Columns a machine listing row must have to be considered
const MIN_LISTING_FIELDS: usize = 3;

/// Extract cluster machine names from `machinectl list --no-legend` output
///
/// An example row:
///
/// ```text
/// kube-spawn-0 container systemd-nspawn coreos 1478.0.0 10.22.0.130...
/// ```
///
/// Rows with fewer than three columns are headers or noise and are skipped.
/// Names not starting with `prefix` belong to other machines and are
/// ignored. Names are returned in encounter order without deduplication.
pub fn parse_instance_listing(text: &str, prefix: &str) -> Vec<String> {
    text.trim()
        .lines()
        .filter_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() < MIN_LISTING_FIELDS {
                return None;
            }
            let name = fields[0].trim();
            name.starts_with(prefix).then(|| name.to_string())
        })
        .collect()
}

/// Count the rows of a `kubectl get nodes` listing
///
/// Lines that are empty or whitespace-only do not count.
pub fn count_non_blank_lines(text: &str) -> usize {
    text.trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count()
}
