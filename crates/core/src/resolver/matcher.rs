//! Matching cloud-side names against a torrent's display name.

/// Default number of characters compared in each direction.
pub const DEFAULT_PREFIX_LEN: usize = 20;

/// Decides whether a transfer or file belongs to the torrent being resolved.
pub trait FileMatcher: Send + Sync {
    /// Matcher name for logging.
    fn name(&self) -> &str;

    /// Whether `candidate` (a transfer or file name) is the `target` title.
    fn matches(&self, candidate: &str, target: &str) -> bool;

    /// Whether any candidate could ever match `target`.
    fn can_match(&self, _target: &str) -> bool {
        true
    }
}

/// Lossy prefix-containment matcher.
///
/// Both names are lower-cased and have `.`, `_` and whitespace runs folded
/// to a single space. A match is either the target's prefix appearing in
/// the candidate, or the extension-stripped candidate's prefix appearing
/// in the target. Two different titles sharing a prefix will match.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    prefix_len: usize,
}

impl PrefixMatcher {
    pub fn new() -> Self {
        Self {
            prefix_len: DEFAULT_PREFIX_LEN,
        }
    }

    /// Compare a different number of characters.
    pub fn with_prefix_len(mut self, prefix_len: usize) -> Self {
        self.prefix_len = prefix_len.max(1);
        self
    }

    fn prefix(&self, s: &str) -> String {
        s.chars().take(self.prefix_len).collect()
    }
}

impl Default for PrefixMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FileMatcher for PrefixMatcher {
    fn name(&self) -> &str {
        "prefix"
    }

    fn matches(&self, candidate: &str, target: &str) -> bool {
        let target = normalize(target);
        let candidate_full = normalize(candidate);
        let candidate_stem = normalize(strip_extension(candidate));

        // An empty side would be a substring of everything.
        if target.is_empty() || candidate_stem.is_empty() {
            return false;
        }

        candidate_full.contains(&self.prefix(&target))
            || target.contains(&self.prefix(&candidate_stem))
    }

    fn can_match(&self, target: &str) -> bool {
        !normalize(target).is_empty()
    }
}

/// Remove a trailing `.ext` (a dot followed by non-dot characters).
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos + 1 < name.len() && !name[pos + 1..].contains('/') => &name[..pos],
        _ => name,
    }
}

fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;

    for c in lowered.chars() {
        if c == '.' || c == '_' || c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_targets_cannot_match() {
        let matcher = PrefixMatcher::new();
        assert!(!matcher.can_match(""));
        assert!(!matcher.can_match(" ._ "));
        assert!(matcher.can_match("Inception"));
    }

    #[test]
    fn test_release_file_matches_title() {
        let matcher = PrefixMatcher::new();
        assert!(matcher.matches("Inception.2010.1080p.BluRay.mkv", "Inception 2010"));
    }

    #[test]
    fn test_different_titles_do_not_match() {
        let matcher = PrefixMatcher::new();
        assert!(!matcher.matches("The Matrix", "Inception"));
        assert!(!matcher.matches("The.Matrix.1999.mkv", "Inception 2010"));
    }

    #[test]
    fn test_case_insensitive() {
        let matcher = PrefixMatcher::new();
        assert!(matcher.matches("INCEPTION 2010.mp4", "inception 2010"));
    }

    #[test]
    fn test_reverse_direction_uses_stripped_candidate() {
        let matcher = PrefixMatcher::new();
        // Target carries release tags the short file name lacks.
        assert!(matcher.matches("Inception.mkv", "Inception 2010 1080p BluRay x264"));
    }

    #[test]
    fn test_long_names_compare_prefix_only() {
        let matcher = PrefixMatcher::new();
        assert!(matcher.matches(
            "A Very Long Movie Title Part One.mkv",
            "A Very Long Movie Title Part Two"
        ));
    }

    #[test]
    fn test_shorter_prefix_len() {
        let matcher = PrefixMatcher::new().with_prefix_len(5);
        assert!(matcher.matches("Incep-something-else", "Inception"));
        assert!(!PrefixMatcher::new().matches("Incep-something-else", "Inception"));
    }

    #[test]
    fn test_empty_names_never_match() {
        let matcher = PrefixMatcher::new();
        assert!(!matcher.matches("Inception.mkv", ""));
        assert!(!matcher.matches("", "Inception"));
        assert!(!matcher.matches(".mkv", "Inception"));
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("movie.mkv"), "movie");
        assert_eq!(strip_extension("movie.2010.mkv"), "movie.2010");
        assert_eq!(strip_extension("movie"), "movie");
        assert_eq!(strip_extension("movie."), "movie.");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Inception.2010_1080p  BluRay"), "inception 2010 1080p bluray");
        assert_eq!(normalize("  .Leading"), "leading");
        assert_eq!(normalize("Trailing. "), "trailing");
    }
}
