/// Domain-to-label mapping and site resolution for PDF Renamer
use std::collections::HashMap;

use url::Url;

/// Label used when the source URL cannot be parsed at all, or when the
/// default derivation yields nothing usable.
pub const UNKNOWN_SITE: &str = "UnknownSite";

/// Ordered domain → label table, built once from the bundled
/// `domain_map.csv` resource and replaced wholesale on reload.
///
/// Keys are normalized (lowercase, leading "www." stripped). Entries keep
/// the insertion order of the resource file because the substring tier of
/// [`resolve`] is first-match-wins over that order; the index is only a
/// shortcut for exact and suffix lookups.
#[derive(Debug, Clone, Default)]
pub struct DomainMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl DomainMap {
    pub fn new() -> Self {
        DomainMap::default()
    }

    /// Parse a two-column `domain,label` resource into a map.
    ///
    /// One record per line, both fields trimmed. Blank lines, lines starting
    /// with `#`, and lines missing either field are skipped. A repeated key
    /// overwrites the stored label but keeps its original position. Parsing
    /// never fails: garbage in the resource degrades to fewer entries, not
    /// to an error.
    pub fn parse(text: &str) -> Self {
        let mut map = DomainMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((domain, label)) = line.split_once(',') else {
                log::warn!("skipping malformed domain map line: {line:?}");
                continue;
            };
            let key = normalize_host(domain.trim());
            let label = label.trim();
            if key.is_empty() || label.is_empty() {
                log::warn!("skipping empty-field domain map line: {line:?}");
                continue;
            }
            map.insert(key, label.to_string());
        }
        map
    }

    fn insert(&mut self, key: String, label: String) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = label,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, label));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index.get(key).map(|&i| self.entries[i].1.as_str())
    }

    /// Entries in resource insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve a URL or raw hostname to a site label.
///
/// Matching tiers, first hit wins:
/// 1. Exact match of the normalized hostname against the map
/// 2. Hierarchical suffix match: strip leftmost labels one at a time
///    (a.b.c.tld → b.c.tld → c.tld) while at least two segments remain
/// 3. Substring fallback: first map key contained in the hostname,
///    in resource order
/// 4. Default: capitalized second-to-last dot-segment of the hostname
///    with non-alphanumerics stripped
///
/// Unparsable input, or a default derivation that strips down to nothing,
/// yields the `UnknownSite` sentinel. Never panics.
pub fn resolve(map: &DomainMap, hostname_or_url: &str) -> String {
    let Some(host) = extract_hostname(hostname_or_url) else {
        return UNKNOWN_SITE.to_string();
    };
    let host = normalize_host(&host);
    if host.is_empty() {
        return UNKNOWN_SITE.to_string();
    }

    if let Some(label) = map.get(&host) {
        return label.to_string();
    }

    // Suffix tier: sub.fidelity.com should hit a fidelity.com entry
    let mut suffix = host.as_str();
    while let Some(dot) = suffix.find('.') {
        suffix = &suffix[dot + 1..];
        if !suffix.contains('.') {
            break;
        }
        if let Some(label) = map.get(suffix) {
            return label.to_string();
        }
    }

    for (key, label) in map.iter() {
        if host.contains(key) {
            return label.to_string();
        }
    }

    default_label(&host)
}

/// Extract the hostname from a URL string, or accept a bare hostname.
///
/// Absolute URLs go through the URL parser; anything without a scheme is
/// treated as a raw hostname with any path or port stripped off.
fn extract_hostname(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.contains("://") {
        let parsed = Url::parse(input).ok()?;
        return parsed.host_str().map(|h| h.to_string());
    }

    let hostname = input.split('/').next()?.split(':').next()?.to_lowercase();
    if hostname.is_empty() {
        None
    } else {
        Some(hostname)
    }
}

/// Lowercase and strip a leading "www." — the normal form for both map keys
/// and hostnames being resolved.
fn normalize_host(host: &str) -> String {
    let host = host.trim().to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Default derivation when nothing in the map matches: the second-to-last
/// dot-segment (or the whole hostname when it has fewer than two segments),
/// non-alphanumerics stripped, first letter capitalized.
fn default_label(host: &str) -> String {
    let parts: Vec<&str> = host.split('.').collect();
    let segment = if parts.len() >= 2 {
        parts[parts.len() - 2]
    } else {
        parts[0]
    };

    let cleaned: String = segment.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    let mut chars = cleaned.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => UNKNOWN_SITE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> DomainMap {
        DomainMap::parse(
            "# brokerage sites\n\
             fidelity.com,FID\n\
             vanguard.com,VAN\n\
             schwab.com,SCHW\n\
             bank,BANKY\n",
        )
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let map = DomainMap::parse("# header\n\nfidelity.com,FID\n\n# tail\n");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("fidelity.com"), Some("FID"));
    }

    #[test]
    fn test_parse_trims_fields_and_normalizes_keys() {
        let map = DomainMap::parse("  WWW.Fidelity.COM ,  FID  \n");
        assert_eq!(map.get("fidelity.com"), Some("FID"));
    }

    #[test]
    fn test_parse_skips_malformed_lines() {
        let map = DomainMap::parse("no-comma-here\nfidelity.com,FID\n,\nx,\n,y\n");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_parse_duplicate_key_overwrites_in_place() {
        let map = DomainMap::parse("a.com,ONE\nb.com,TWO\na.com,THREE\n");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("a.com"), Some("THREE"));
        let order: Vec<&str> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["a.com", "b.com"]);
    }

    #[test]
    fn test_resolve_exact_match() {
        let map = sample_map();
        assert_eq!(resolve(&map, "fidelity.com"), "FID");
        assert_eq!(resolve(&map, "https://www.fidelity.com/x.pdf"), "FID");
        assert_eq!(resolve(&map, "WWW.VANGUARD.COM"), "VAN");
    }

    #[test]
    fn test_resolve_hierarchical_suffix() {
        let map = sample_map();
        assert_eq!(resolve(&map, "docs.fidelity.com"), "FID");
        assert_eq!(resolve(&map, "https://a.b.schwab.com/statements"), "SCHW");
    }

    #[test]
    fn test_resolve_substring_fallback_in_insertion_order() {
        let map = DomainMap::parse("fid,FIRST\nfidelity,SECOND\n");
        // both keys are substrings of the host; the earlier entry wins
        assert_eq!(resolve(&map, "myfidelity.example"), "FIRST");
    }

    #[test]
    fn test_resolve_substring_single_word_key() {
        let map = sample_map();
        assert_eq!(resolve(&map, "ebanking.example.net"), "BANKY");
    }

    #[test]
    fn test_resolve_default_second_to_last_segment() {
        let map = sample_map();
        assert_eq!(resolve(&map, "https://unknown-broker.example.org"), "Example");
        assert_eq!(resolve(&map, "portal.acme-corp.co"), "Acmecorp");
    }

    #[test]
    fn test_resolve_single_segment_host() {
        let map = DomainMap::new();
        assert_eq!(resolve(&map, "localhost"), "Localhost");
    }

    #[test]
    fn test_resolve_unparsable_input() {
        let map = sample_map();
        assert_eq!(resolve(&map, ""), UNKNOWN_SITE);
        assert_eq!(resolve(&map, "https://"), UNKNOWN_SITE);
        assert_eq!(resolve(&map, ":::"), UNKNOWN_SITE);
        assert_eq!(resolve(&map, "%%%"), UNKNOWN_SITE);
    }

    #[test]
    fn test_resolve_empty_map_degrades_to_default() {
        let empty = DomainMap::new();
        assert!(empty.is_empty());
        assert_eq!(resolve(&empty, "https://www.fidelity.com"), "Fidelity");
    }

    #[test]
    fn test_resolve_host_with_port_and_path() {
        let map = sample_map();
        assert_eq!(resolve(&map, "fidelity.com:8443/download"), "FID");
    }
}
