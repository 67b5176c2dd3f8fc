//! Keyword detector: mode-intent extraction, conflict resolution, the
//! size-guard, and the ralplan gate (spec.md §4.5).

use crate::sanitize::sanitize;
use crate::size::{classify_task_size, count_words, is_heavy_mode, SizeThresholds, TaskSize};
use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Keyword {
    // Lower discriminant = higher priority; derive(Ord) sorts ascending.
    Cancel,
    Ralph,
    Team,
    Ultrapilot,
    Swarm,
    Autopilot,
    Ecomode,
    Ultrawork,
    Pipeline,
    Ralplan,
    Tdd,
    Ultrathink,
    Deepsearch,
    Analyze,
    Codex,
    Gemini,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cancel => "cancel",
            Self::Ralph => "ralph",
            Self::Autopilot => "autopilot",
            Self::Ultrapilot => "ultrapilot",
            Self::Team => "team",
            Self::Swarm => "swarm",
            Self::Ultrawork => "ultrawork",
            Self::Ecomode => "ecomode",
            Self::Pipeline => "pipeline",
            Self::Ralplan => "ralplan",
            Self::Tdd => "tdd",
            Self::Ultrathink => "ultrathink",
            Self::Deepsearch => "deepsearch",
            Self::Analyze => "analyze",
            Self::Codex => "codex",
            Self::Gemini => "gemini",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureFlags {
    pub team_enabled: bool,
    pub ecomode_enabled: bool,
}

lazy_static! {
    static ref CANCEL_RE: Regex = Regex::new(r"(?i)\b(cancelomc|stopomc)\b").unwrap();
    static ref RALPH_RE: Regex = Regex::new(r"(?i)\bralph\b(?!-)").unwrap();
    static ref AUTOPILOT_RE: Regex =
        Regex::new(r"(?i)\b(autopilot|auto[\s-]pilot|fullsend|full auto)\b").unwrap();
    static ref ULTRAPILOT_RE: Regex = Regex::new(r"(?i)\bultrapilot\b").unwrap();
    static ref TEAM_RE: Regex = Regex::new(r"(?i)\bteam\b").unwrap();
    static ref SWARM_RE: Regex = Regex::new(r"(?i)\bswarm\b").unwrap();
    static ref ULTRAWORK_RE: Regex = Regex::new(r"(?i)\b(ultrawork|ulw)\b").unwrap();
    static ref ECOMODE_RE: Regex = Regex::new(r"(?i)\becomode\b").unwrap();
    static ref PIPELINE_RE: Regex = Regex::new(r"(?i)\bpipeline\b").unwrap();
    static ref RALPLAN_RE: Regex = Regex::new(r"(?i)\bralplan\b").unwrap();
    static ref TDD_RE: Regex = Regex::new(r"(?i)\btdd\b").unwrap();
    static ref ULTRATHINK_RE: Regex = Regex::new(r"(?i)\bultrathink\b").unwrap();
    static ref DEEPSEARCH_RE: Regex = Regex::new(r"(?i)\bdeepsearch\b").unwrap();
    static ref ANALYZE_RE: Regex = Regex::new(r"(?i)\banalyze\b").unwrap();
    static ref CODEX_RE: Regex = Regex::new(r"(?i)\bcodex\b").unwrap();
    static ref GEMINI_RE: Regex = Regex::new(r"(?i)\bgemini\b").unwrap();
}

/// Matches every keyword pattern over sanitized text, in priority order.
fn match_all(sanitized: &str, features: FeatureFlags) -> Vec<Keyword> {
    let mut hits = Vec::new();

    if CANCEL_RE.is_match(sanitized) {
        return vec![Keyword::Cancel];
    }
    if RALPH_RE.is_match(sanitized) {
        hits.push(Keyword::Ralph);
    }
    if AUTOPILOT_RE.is_match(sanitized) {
        hits.push(Keyword::Autopilot);
    }
    if features.team_enabled && ULTRAPILOT_RE.is_match(sanitized) {
        hits.push(Keyword::Ultrapilot);
    }
    if features.team_enabled && TEAM_RE.is_match(sanitized) {
        hits.push(Keyword::Team);
    }
    if features.team_enabled && SWARM_RE.is_match(sanitized) {
        hits.push(Keyword::Swarm);
    }
    if ULTRAWORK_RE.is_match(sanitized) {
        hits.push(Keyword::Ultrawork);
    }
    if features.ecomode_enabled && ECOMODE_RE.is_match(sanitized) {
        hits.push(Keyword::Ecomode);
    }
    if PIPELINE_RE.is_match(sanitized) {
        hits.push(Keyword::Pipeline);
    }
    if RALPLAN_RE.is_match(sanitized) {
        hits.push(Keyword::Ralplan);
    }
    if TDD_RE.is_match(sanitized) {
        hits.push(Keyword::Tdd);
    }
    if ULTRATHINK_RE.is_match(sanitized) {
        hits.push(Keyword::Ultrathink);
    }
    if DEEPSEARCH_RE.is_match(sanitized) {
        hits.push(Keyword::Deepsearch);
    }
    if ANALYZE_RE.is_match(sanitized) {
        hits.push(Keyword::Analyze);
    }
    if CODEX_RE.is_match(sanitized) {
        hits.push(Keyword::Codex);
    }
    if GEMINI_RE.is_match(sanitized) {
        hits.push(Keyword::Gemini);
    }

    hits
}

/// Conflict resolution: `team`/`ultrapilot`/`swarm` beat `autopilot`;
/// `ecomode` beats `ultrawork`. `cancel` is already exclusive by the time
/// this runs (see `match_all`).
fn resolve_conflicts(mut hits: Vec<Keyword>) -> Vec<Keyword> {
    let has_team_tier = hits
        .iter()
        .any(|k| matches!(k, Keyword::Team | Keyword::Ultrapilot | Keyword::Swarm));
    if has_team_tier {
        hits.retain(|k| *k != Keyword::Autopilot);
    }
    if hits.contains(&Keyword::Ecomode) {
        hits.retain(|k| *k != Keyword::Ultrawork);
    }
    hits.sort();
    hits.dedup();
    hits
}

/// Extracts the mode-intent keyword list from `prompt`, sorted by
/// priority. `cancel` in the result implies the result is exactly
/// `[cancel]`.
pub fn get_all_keywords(prompt: &str, features: FeatureFlags) -> Vec<Keyword> {
    let sanitized = sanitize(prompt);
    resolve_conflicts(match_all(&sanitized, features))
}

const EXECUTION_KEYWORDS: &[Keyword] = &[
    Keyword::Ralph,
    Keyword::Autopilot,
    Keyword::Team,
    Keyword::Ultrawork,
    Keyword::Ultrapilot,
];

lazy_static! {
    static ref FILE_REF_RE: Regex = Regex::new(
        r"(?i)\b[\w./-]+\.(ts|tsx|js|jsx|py|rs|go|java|rb|php|c|cpp|h|hpp|cs|swift|kt|scala|sh|yml|yaml|json|toml|md|sql|html|css)\b"
    )
    .unwrap();
    static ref REPO_PATH_RE: Regex = Regex::new(r"\b[\w-]+(?:/[\w-]+){1,}\b").unwrap();
    static ref FUNCTION_DECL_RE: Regex =
        Regex::new(r"(?i)\b(function|def|fn|class|method)\s+[A-Za-z_][\w]*").unwrap();
    static ref IDENTIFIER_RE: Regex =
        Regex::new(r"\b([a-z][a-zA-Z0-9]*[A-Z][a-zA-Z0-9]*|[A-Z][a-z0-9]+[A-Z][a-zA-Z0-9]*|[a-zA-Z][a-zA-Z0-9]*_[a-zA-Z0-9_]+)\b").unwrap();
    static ref ISSUE_REF_RE: Regex = Regex::new(r"#\d+\b").unwrap();
    static ref LIST_RE: Regex = Regex::new(r"(?m)^\s*(\d+[.)]|[-*])\s+\S").unwrap();
    static ref SPEC_PHRASE_RE: Regex =
        Regex::new(r"(?i)(acceptance criteria|test spec|should (return|throw|render|equal|contain|fail))").unwrap();
    static ref ERROR_REF_RE: Regex =
        Regex::new(r"(?i)(error:|exception|traceback|stack trace)").unwrap();
    static ref FENCED_CODE_BODY_RE: Regex = Regex::new(r"(?s)```(?:\w*\n)?(.*?)```").unwrap();
    static ref COMMIT_SHA_RE: Regex = Regex::new(r"\b[0-9a-f]{7,40}\b").unwrap();
    static ref IN_PATH_RE: Regex = Regex::new(r"(?i)\bin\s+\S+\.\w+").unwrap();
    static ref TEST_RUNNER_RE: Regex =
        Regex::new(r"(?i)\b(npm test|pytest|cargo test|go test|jest|mocha)\b").unwrap();
}

/// Any match means the prompt is well-specified enough to skip ralplan.
fn has_well_specified_signal(prompt: &str) -> bool {
    FILE_REF_RE.is_match(prompt)
        || REPO_PATH_RE.is_match(prompt)
        || FUNCTION_DECL_RE.is_match(prompt)
        || IDENTIFIER_RE.is_match(prompt)
        || ISSUE_REF_RE.is_match(prompt)
        || LIST_RE.is_match(prompt)
        || SPEC_PHRASE_RE.is_match(prompt)
        || ERROR_REF_RE.is_match(prompt)
        || FENCED_CODE_BODY_RE
            .captures(prompt)
            .map(|c| c[1].trim().len() >= 20)
            .unwrap_or(false)
        || COMMIT_SHA_RE.is_match(prompt)
        || IN_PATH_RE.is_match(prompt)
        || TEST_RUNNER_RE.is_match(prompt)
}

lazy_static! {
    static ref MODE_KEYWORD_STRIP_RE: Regex = Regex::new(
        r"(?i)\b(ralph|autopilot|auto[\s-]pilot|fullsend|full auto|ultrapilot|team|swarm|ultrawork|ulw|ecomode|pipeline|ralplan|tdd|ultrathink|deepsearch|analyze|codex|gemini|force|cancelomc|stopomc)\b"
    )
    .unwrap();
    static ref ESCAPE_HATCH_RE: Regex = Regex::new(r"^\s*(force:|!)").unwrap();
}

/// A prompt is underspecified when no well-specified signal matches, the
/// effective word count (after stripping mode keywords) is `<= 15`, and
/// there is no escape-hatch prefix.
pub fn is_underspecified_for_execution(prompt: &str) -> bool {
    if has_well_specified_signal(prompt) {
        return false;
    }
    if ESCAPE_HATCH_RE.is_match(prompt) {
        return false;
    }
    let stripped = MODE_KEYWORD_STRIP_RE.replace_all(prompt, " ");
    count_words(&stripped) <= 15
}

/// Result of the full pipeline: sanitize → match → conflicts → size-guard
/// → ralplan gate.
#[derive(Debug, Clone, Default)]
pub struct KeywordResult {
    pub keywords: Vec<Keyword>,
    pub suppressed_keywords: Vec<Keyword>,
}

/// Runs the size-guard: when `suppress_heavy_modes_for_small_tasks` is
/// set and the task classifies as small, strips all heavy-mode keywords.
pub fn apply_size_guard(
    keywords: Vec<Keyword>,
    prompt: &str,
    suppress_heavy_modes_for_small_tasks: bool,
) -> KeywordResult {
    if !suppress_heavy_modes_for_small_tasks {
        return KeywordResult { keywords, suppressed_keywords: Vec::new() };
    }
    let size = classify_task_size(prompt, SizeThresholds::default()).size;
    if size != TaskSize::Small {
        return KeywordResult { keywords, suppressed_keywords: Vec::new() };
    }
    let (kept, suppressed): (Vec<_>, Vec<_>) =
        keywords.into_iter().partition(|k| !is_heavy_mode(k.as_str()));
    KeywordResult { keywords: kept, suppressed_keywords: suppressed }
}

/// Runs the ralplan gate: if the list contains any execution keyword and
/// the prompt is underspecified, replaces every execution keyword with
/// `ralplan`.
pub fn apply_ralplan_gate(keywords: Vec<Keyword>, prompt: &str) -> Vec<Keyword> {
    let has_execution_keyword = keywords.iter().any(|k| EXECUTION_KEYWORDS.contains(k));
    if !has_execution_keyword || !is_underspecified_for_execution(prompt) {
        return keywords;
    }
    let mut out: Vec<Keyword> = keywords
        .into_iter()
        .filter(|k| !EXECUTION_KEYWORDS.contains(k))
        .collect();
    if !out.contains(&Keyword::Ralplan) {
        out.push(Keyword::Ralplan);
    }
    out.sort();
    out.dedup();
    out
}

/// Full pipeline entry point, combining detection, the size-guard, and
/// the ralplan gate.
pub fn get_all_keywords_with_size_check(
    prompt: &str,
    features: FeatureFlags,
    suppress_heavy_modes_for_small_tasks: bool,
) -> KeywordResult {
    let detected = get_all_keywords(prompt, features);
    let guarded = apply_size_guard(detected, prompt, suppress_heavy_modes_for_small_tasks);
    let gated = apply_ralplan_gate(guarded.keywords, prompt);
    KeywordResult { keywords: gated, suppressed_keywords: guarded.suppressed_keywords }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_exclusive() {
        let keywords = get_all_keywords("cancelomc now, also ralph", FeatureFlags::default());
        assert_eq!(keywords, vec![Keyword::Cancel]);
    }

    #[test]
    fn test_team_tier_beats_autopilot() {
        let features = FeatureFlags { team_enabled: true, ecomode_enabled: false };
        let keywords = get_all_keywords("run autopilot with the team", features);
        assert!(keywords.contains(&Keyword::Team));
        assert!(!keywords.contains(&Keyword::Autopilot));
    }

    #[test]
    fn test_team_tier_gated_off_by_feature_flag() {
        let keywords = get_all_keywords("run autopilot with the team", FeatureFlags::default());
        assert!(!keywords.contains(&Keyword::Team));
        assert!(keywords.contains(&Keyword::Autopilot));
    }

    #[test]
    fn test_ecomode_beats_ultrawork() {
        let features = FeatureFlags { team_enabled: false, ecomode_enabled: true };
        let keywords = get_all_keywords("ecomode ultrawork please", features);
        assert!(keywords.contains(&Keyword::Ecomode));
        assert!(!keywords.contains(&Keyword::Ultrawork));
    }

    #[test]
    fn test_ralplan_gate_fires_on_underspecified_prompt() {
        let result =
            get_all_keywords_with_size_check("ralph fix it", FeatureFlags::default(), false);
        assert_eq!(result.keywords, vec![Keyword::Ralplan]);
    }

    #[test]
    fn test_well_specified_bypasses_ralplan_gate() {
        let prompt =
            "ralph fix the bug in src/auth/login.ts where getUserById returns undefined";
        let result = get_all_keywords_with_size_check(prompt, FeatureFlags::default(), false);
        assert_eq!(result.keywords, vec![Keyword::Ralph]);
    }

    #[test]
    fn test_task_size_suppression() {
        let result = get_all_keywords_with_size_check(
            "quick: ralph fix the typo",
            FeatureFlags::default(),
            true,
        );
        assert!(result.keywords.is_empty());
        assert_eq!(result.suppressed_keywords, vec![Keyword::Ralph]);
    }

    #[test]
    fn test_is_underspecified_with_issue_number_is_false() {
        assert!(!is_underspecified_for_execution("ralph fix #123"));
    }

    #[test]
    fn test_is_underspecified_with_escape_hatch_is_false() {
        assert!(!is_underspecified_for_execution("force: ralph go"));
    }

    #[test]
    fn test_is_underspecified_short_vague_prompt_is_true() {
        assert!(is_underspecified_for_execution("ralph fix it"));
    }

    #[test]
    fn test_result_is_subset_of_declared_keywords_and_sorted() {
        let features = FeatureFlags { team_enabled: true, ecomode_enabled: true };
        let keywords = get_all_keywords("ralph autopilot tdd ultrathink", features);
        let mut sorted = keywords.clone();
        sorted.sort();
        assert_eq!(keywords, sorted);
    }
}
