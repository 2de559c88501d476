// Rule table and scorer for URL scam heuristics.
//
// Every rule runs against the lowercased input and can both append a red
// flag and subtract from a running score that starts at 100. Rules that set
// a category or description overwrite what earlier rules set, so the last
// matching rule wins those fields.

use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::debug;

use super::verdict::{Verdict, DEFAULT_CATEGORY, DEFAULT_DESCRIPTION};

pub const FLAG_INVALID_FORMAT: &str = "Invalid URL format";
pub const FLAG_SCAM_KEYWORD: &str = "Suspicious keyword detected";
pub const FLAG_UNUSUAL_EXTENSION: &str = "Unusual domain extension";
pub const FLAG_FAKE_GOVERNMENT: &str = "Pretending to be a government domain";
pub const FLAG_FAKE_INSTITUTION: &str = "Possible impersonation of SA services";

pub const CATEGORY_PHISHING: &str = "Phishing";
pub const CATEGORY_IMPERSONATION: &str = "Impersonation";

static URL_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://").expect("URL format pattern is valid"));

/// Points subtracted by each rule.
#[derive(Debug, Clone)]
pub struct Penalties {
    pub invalid_format: i32,
    pub scam_keyword: i32,
    pub unusual_extension: i32,
    pub fake_government: i32,
    pub fake_institution: i32,
}

impl Default for Penalties {
    fn default() -> Self {
        Self {
            invalid_format: 20,
            scam_keyword: 30,
            unusual_extension: 20,
            fake_government: 25,
            fake_institution: 30,
        }
    }
}

/// A protected institution name and, where it has one, the domain it
/// legitimately serves from.
#[derive(Debug, Clone)]
pub struct Institution {
    pub term: String,
    pub genuine_domain: Option<String>,
}

impl Institution {
    fn new(term: &str, genuine_domain: Option<&str>) -> Self {
        Self {
            term: term.to_string(),
            genuine_domain: genuine_domain.map(str::to_string),
        }
    }
}

/// The full rule table. `Default` is the canonical table served by the API.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub scam_keywords: Vec<String>,
    /// Matched against the end of the host, so each entry carries its leading dot.
    pub suspicious_extensions: Vec<String>,
    pub government_term: String,
    pub government_domain: String,
    pub institutions: Vec<Institution>,
    pub penalties: Penalties,
}

impl Default for RuleSet {
    fn default() -> Self {
        let owned =
            |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            scam_keywords: owned(&[
                "free", "win", "login", "verify", "claim", "bonus", "prize", "reward", "gift",
                "urgent",
            ]),
            suspicious_extensions: owned(&[".xyz", ".top", ".tk", ".click"]),
            government_term: "gov".to_string(),
            government_domain: "gov.za".to_string(),
            institutions: vec![
                Institution::new("tender", Some("etenders.gov.za")),
                Institution::new("capitec", Some("capitecbank.co.za")),
                Institution::new("sassa", Some("sassa.gov.za")),
                Institution::new("nsfas", Some("nsfas.org.za")),
                Institution::new("govza-", None),
                Institution::new("gov-za", None),
            ],
            penalties: Penalties::default(),
        }
    }
}

/// Score a URL against the rule table.
///
/// Never fails: malformed input is scored lower, not rejected. The input is
/// not trimmed, so leading whitespace fails the format check.
pub fn analyze_url(url: &str, rules: &RuleSet) -> Verdict {
    let url = url.to_lowercase();
    let host = extract_host(&url);

    let mut score: i32 = 100;
    let mut red_flags = Vec::new();
    let mut category = DEFAULT_CATEGORY.to_string();
    let mut description = DEFAULT_DESCRIPTION.to_string();

    if !URL_FORMAT.is_match(&url) {
        red_flags.push(FLAG_INVALID_FORMAT.to_string());
        score -= rules.penalties.invalid_format;
    }

    if rules.scam_keywords.iter().any(|k| url.contains(k.as_str())) {
        red_flags.push(FLAG_SCAM_KEYWORD.to_string());
        score -= rules.penalties.scam_keyword;
        category = CATEGORY_PHISHING.to_string();
        description = "Contains common scam-related terms.".to_string();
    }

    if rules
        .suspicious_extensions
        .iter()
        .any(|ext| host.ends_with(ext.as_str()))
    {
        red_flags.push(FLAG_UNUSUAL_EXTENSION.to_string());
        score -= rules.penalties.unusual_extension;
    }

    if url.contains(rules.government_term.as_str())
        && !host_within(host, &rules.government_domain)
    {
        red_flags.push(FLAG_FAKE_GOVERNMENT.to_string());
        score -= rules.penalties.fake_government;
        category = CATEGORY_IMPERSONATION.to_string();
        description = "May be impersonating official government site.".to_string();
    }

    let impersonates = rules.institutions.iter().any(|inst| {
        url.contains(inst.term.as_str())
            && !inst
                .genuine_domain
                .as_deref()
                .is_some_and(|domain| host_within(host, domain))
    });
    if impersonates {
        red_flags.push(FLAG_FAKE_INSTITUTION.to_string());
        score -= rules.penalties.fake_institution;
        category = CATEGORY_IMPERSONATION.to_string();
        description = "Suspicious attempt to mimic South African institutions.".to_string();
    }

    let verdict = Verdict::from_running(score, red_flags, category, description);
    debug!(
        url = %url,
        score = verdict.score,
        status = %verdict.status,
        flags = verdict.red_flags.len(),
        "Scored URL"
    );
    verdict
}

/// Pull the host out of a URL-ish string.
///
/// Takes what follows `scheme://` (or the whole string when there is no
/// scheme) up to the first `/`, `?` or `#`, then drops userinfo and port.
pub fn extract_host(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, h)| h);
    host_port.split(':').next().unwrap_or("")
}

/// True when `host` is `domain` itself or one of its subdomains.
fn host_within(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
