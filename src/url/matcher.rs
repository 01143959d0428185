/// Checks if a domain matches an allow-list pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "scholar.google.com" matches only "scholar.google.com"
/// 2. Wildcard match: "*.google.com" matches "google.com" and any subdomain
///
/// # Examples
///
/// ```
/// use scholar_scrape::url::matches_wildcard;
///
/// assert!(matches_wildcard("scholar.google.com", "scholar.google.com"));
/// assert!(!matches_wildcard("scholar.google.com", "google.com"));
///
/// assert!(matches_wildcard("*.google.com", "google.com"));
/// assert!(matches_wildcard("*.google.com", "scholar.google.com"));
/// assert!(!matches_wildcard("*.google.com", "google.org"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    if let Some(base) = pattern.strip_prefix("*.") {
        candidate == base || candidate.ends_with(&format!(".{}", base))
    } else {
        candidate == pattern
    }
}

/// Checks if a domain matches a limit-rule glob
///
/// `*` matches any run of characters (including none) anywhere in the
/// pattern, so "*scholar.google.com*" also covers hosts with a port suffix.
///
/// # Examples
///
/// ```
/// use scholar_scrape::url::matches_glob;
///
/// assert!(matches_glob("*scholar.google.com*", "scholar.google.com"));
/// assert!(matches_glob("*scholar.google.com*", "scholar.google.com:443"));
/// assert!(matches_glob("127.0.0.*", "127.0.0.1"));
/// assert!(!matches_glob("*scholar.google.com*", "google.com"));
/// ```
pub fn matches_glob(pattern: &str, candidate: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let candidate: Vec<char> = candidate.chars().collect();

    let (mut p, mut c) = (0, 0);
    // Position of the last '*' seen and the candidate index it was tried at
    let mut backtrack: Option<(usize, usize)> = None;

    while c < candidate.len() {
        if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, c));
            p += 1;
        } else if p < pattern.len() && pattern[p] == candidate[c] {
            p += 1;
            c += 1;
        } else if let Some((star, tried)) = backtrack {
            p = star + 1;
            c = tried + 1;
            backtrack = Some((star, tried + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&ch| ch == '*')
}
