//! Query matching tuned for speech-to-text input.
//!
//! Callers speak their questions, so queries arrive lower-fidelity than
//! typed ones: company names split into several words, abbreviations
//! spelled out. Matching runs in three tiers:
//!
//! 1. keyword routing to known articles ([`PRIORITY_KEYWORDS`]);
//! 2. substring matching over query variations ([`TRANSCRIPTION_ALIASES`]
//!    and joined word runs);
//! 3. compound-word matching with punctuation and spacing removed.

use crate::entry::KnowledgeEntry;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Keywords that route straight to specific articles, in priority order.
pub const PRIORITY_KEYWORDS: &[(&str, &[&str])] = &[
    ("services", &["key_services.mdx", "industries_served.mdx"]),
    ("solutions", &["key_services.mdx", "industries_served.mdx"]),
    ("what services", &["key_services.mdx"]),
    ("offer", &["key_services.mdx", "industries_served.mdx"]),
    ("services-offered", &["key_services.mdx"]),
    ("data-services", &["key_services.mdx", "industries_served.mdx"]),
    ("company", &["company_overview.mdx"]),
    ("overview", &["company_overview.mdx"]),
    ("about", &["company_overview.mdx"]),
    ("history", &["company_overview.mdx"]),
    ("founder", &["company_overview.mdx", "leadership_team.mdx"]),
    ("leadership", &["leadership_team.mdx", "board_of_directors.mdx"]),
    ("team", &["leadership_team.mdx"]),
    ("ceo", &["leadership_team.mdx"]),
    ("coo", &["leadership_team.mdx"]),
    ("chief operating officer", &["leadership_team.mdx"]),
    ("chief executive officer", &["leadership_team.mdx"]),
    ("cfo", &["leadership_team.mdx"]),
    ("chief financial officer", &["leadership_team.mdx"]),
    ("cto", &["leadership_team.mdx"]),
    ("chief technology officer", &["leadership_team.mdx"]),
    ("vp", &["leadership_team.mdx"]),
    ("vice president", &["leadership_team.mdx"]),
    ("executive", &["leadership_team.mdx"]),
    ("executives", &["leadership_team.mdx"]),
    ("management", &["leadership_team.mdx"]),
    ("board", &["board_of_directors.mdx", "leadership_team.mdx"]),
    ("directors", &["board_of_directors.mdx"]),
    ("faq", &["faqs.mdx"]),
    ("faqs", &["faqs.mdx"]),
    ("question", &["faqs.mdx"]),
    ("questions", &["faqs.mdx"]),
    ("workforce", &["workforce_capacity.mdx"]),
    ("employees", &["workforce_capacity.mdx"]),
    ("capacity", &["workforce_capacity.mdx"]),
    ("staff", &["workforce_capacity.mdx"]),
    ("location", &["where_we_operate.mdx"]),
    ("locations", &["where_we_operate.mdx"]),
    ("where", &["where_we_operate.mdx"]),
    ("operate", &["where_we_operate.mdx"]),
    ("centers", &["where_we_operate.mdx"]),
    ("yemmiganur", &["where_we_operate.mdx"]),
    ("clients", &["client_collaborations.mdx"]),
    ("collaborations", &["client_collaborations.mdx"]),
    ("partnerships", &["client_collaborations.mdx"]),
    ("swiggy", &["client_collaborations.mdx"]),
    ("healthifyme", &["client_collaborations.mdx"]),
    ("contact", &["contact_information.mdx"]),
    ("support", &["contact_information.mdx"]),
    ("website", &["contact_information.mdx"]),
    ("demo", &["contact_information.mdx"]),
    ("social", &["social_impact.mdx"]),
    ("impact", &["social_impact.mdx"]),
    ("foundation", &["social_impact.mdx"]),
    ("community", &["social_impact.mdx"]),
    ("awards", &["recognition_awards.mdx"]),
    ("recognition", &["recognition_awards.mdx"]),
    ("iaop", &["recognition_awards.mdx"]),
    ("rockefeller", &["recognition_awards.mdx"]),
    (
        "credibility",
        &[
            "recognition_awards.mdx",
            "why_choose_indivillage.mdx",
            "leadership_team.mdx",
        ],
    ),
    ("trust", &["why_choose_indivillage.mdx", "recognition_awards.mdx"]),
    ("reputation", &["recognition_awards.mdx", "why_choose_indivillage.mdx"]),
    ("certifications", &["leadership_team.mdx", "why_choose_indivillage.mdx"]),
    ("standards", &["leadership_team.mdx", "why_choose_indivillage.mdx"]),
    ("quality", &["why_choose_indivillage.mdx", "client_collaborations.mdx"]),
    ("reliable", &["why_choose_indivillage.mdx", "client_collaborations.mdx"]),
    ("why", &["why_choose_indivillage.mdx"]),
    ("choose", &["why_choose_indivillage.mdx"]),
    ("differentiation", &["why_choose_indivillage.mdx"]),
    ("value", &["why_choose_indivillage.mdx"]),
];

/// Canonical terms and the ways speech recognition tends to render them.
/// At most one group applies to a query.
pub const TRANSCRIPTION_ALIASES: &[(&str, &[&str])] = &[
    (
        "indivillage",
        &["in the village", "india village", "indie village", "in village"],
    ),
    (
        "machine learning",
        &["machine learning", "machinelearning", "ml", "machine learn"],
    ),
    ("data science", &["data science", "datascience", "data scientist"]),
    ("python", &["python", "python programming", "python language"]),
    (
        "social enterprise",
        &["social enterprise", "socialenterprise", "social enterprises"],
    ),
    (
        "leadership",
        &["leadership", "management", "executives", "ceo", "coo", "founder"],
    ),
    ("services", &["services", "solutions", "data services", "ai services"]),
    (
        "faqs",
        &["faqs", "questions", "frequently asked", "common questions"],
    ),
    (
        "workforce",
        &["workforce", "employees", "staff", "team", "capacity"],
    ),
    (
        "locations",
        &["locations", "centers", "where we operate", "geographic presence"],
    ),
];

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]").expect("valid non-alphanumeric regex"));

/// Filenames routed to by keywords in `query`, deduplicated in priority order.
pub fn priority_files(query: &str) -> Vec<&'static str> {
    let mut files: Vec<&'static str> = Vec::new();
    for (keyword, targets) in PRIORITY_KEYWORDS {
        if query.contains(keyword) {
            for target in *targets {
                if !files.contains(target) {
                    files.push(*target);
                }
            }
        }
    }
    files
}

/// The query plus alias expansions, or joined word runs when no alias
/// group applies.
pub fn query_variations(query: &str) -> HashSet<String> {
    let mut variations = HashSet::from([query.to_string()]);

    let alias_group = TRANSCRIPTION_ALIASES
        .iter()
        .find(|(canonical, aliases)| {
            query.contains(canonical) || aliases.iter().any(|alias| query.contains(alias))
        });

    match alias_group {
        Some((canonical, aliases)) => {
            variations.extend(aliases.iter().map(|alias| alias.to_string()));
            variations.insert(canonical.to_string());
        }
        None => {
            let words: Vec<&str> = query.split_whitespace().collect();
            if words.len() > 1 {
                variations.extend(word_runs(&words));
            }
        }
    }

    variations
}

/// Every contiguous run of words, concatenated without spaces.
fn word_runs(words: &[&str]) -> Vec<String> {
    let mut runs = Vec::new();
    for start in 0..words.len() {
        for end in start + 1..=words.len() {
            runs.push(words[start..end].concat());
        }
    }
    runs
}

fn strip_non_alphanumeric(text: &str) -> String {
    NON_ALPHANUMERIC.replace_all(text, "").into_owned()
}

/// Matches compound words across spacing and punctuation differences,
/// such as "indie village" against "IndiVillage".
pub fn partial_match(query: &str, searchable: &str) -> bool {
    if query.contains("village")
        && searchable.contains("indivillage")
        && (searchable.contains("social enterprise") || searchable.contains("tech solutions"))
    {
        return true;
    }

    let query_clean = strip_non_alphanumeric(query);
    let text_clean = strip_non_alphanumeric(searchable);
    if query_clean.is_empty() || text_clean.is_empty() {
        return false;
    }
    if text_clean.contains(&query_clean) || query_clean.contains(&text_clean) {
        return true;
    }

    let words: Vec<&str> = query.split_whitespace().collect();
    words.len() >= 2 && word_runs(&words).iter().any(|run| text_clean.contains(run))
}

/// Ranks `entries` against `query`.
///
/// When any priority keyword occurs in the query, the result is exactly the
/// routed articles that exist, in routing order. Otherwise every entry that
/// matches a variation or a compound word is returned in input order.
pub fn search(entries: &[KnowledgeEntry], query: &str) -> Vec<KnowledgeEntry> {
    let query = query.to_lowercase();

    let routed = priority_files(&query);
    if !routed.is_empty() {
        let mut hits: Vec<(usize, &KnowledgeEntry)> = entries
            .iter()
            .filter_map(|entry| {
                routed
                    .iter()
                    .position(|file| *file == entry.filename)
                    .map(|rank| (rank, entry))
            })
            .collect();
        hits.sort_by_key(|(rank, _)| *rank);
        return hits.into_iter().map(|(_, entry)| entry.clone()).collect();
    }

    let variations = query_variations(&query);
    entries
        .iter()
        .filter(|entry| {
            let text = entry.searchable_text();
            variations.iter().any(|v| text.contains(v.as_str())) || partial_match(&query, &text)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn entry(filename: &str, title: &str, body: &str) -> KnowledgeEntry {
        let content = format!("---\ntitle: {}\n---\n\n{}", title, body);
        KnowledgeEntry::parse(Path::new(filename), &content)
    }

    #[test]
    fn priority_files_dedupe_in_order() {
        assert_eq!(
            priority_files("who is on the leadership board"),
            ["leadership_team.mdx", "board_of_directors.mdx"]
        );
        assert!(priority_files("tell me a joke").is_empty());
    }

    #[test]
    fn priority_routing_orders_by_rank() {
        let entries = vec![
            entry("industries_served.mdx", "Industries", "retail"),
            entry("company_overview.mdx", "Overview", "history"),
            entry("key_services.mdx", "Key Services", "labelling"),
        ];
        let hits = search(&entries, "What SERVICES do you have?");
        let names: Vec<&str> = hits.iter().map(|e| e.filename.as_str()).collect();
        assert_eq!(names, ["key_services.mdx", "industries_served.mdx"]);
    }

    #[test]
    fn routed_query_without_matching_files_is_empty() {
        let entries = vec![entry("misc.mdx", "Misc", "services everywhere")];
        assert!(search(&entries, "services").is_empty());
    }

    #[test]
    fn alias_group_expands_transcriptions() {
        let variations = query_variations("tell me about india village");
        assert!(variations.contains("indivillage"));
        assert!(variations.contains("in the village"));
    }

    #[test]
    fn word_runs_are_added_without_alias() {
        let variations = query_variations("deep learn ing");
        assert!(variations.contains("deeplearning"));
        assert!(variations.contains("learning"));
    }

    #[test]
    fn fallback_matches_compound_words() {
        let entries = vec![
            entry("ml.mdx", "Pipelines", "We run ImageNet benchmarks."),
            entry("other.mdx", "Other", "Nothing relevant."),
        ];
        let hits = search(&entries, "image net");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "ml");
    }

    #[test]
    fn village_heuristic() {
        let text = "indivillage tech solutions overview";
        assert!(partial_match("indie village", text));
        assert!(!partial_match("", text));
    }
}
