//! Static lookup table of known operator/enemy titles with bilingual
//! aliases, built once at startup and never mutated.

use serde::{Deserialize, Serialize};

use crate::text_utils::{normalized, title_match_score};
use crate::{EntityKind, MatchCandidate};

/// Candidates scoring below this are treated as noise and dropped.
const MIN_SCORE: f32 = 0.3;

/// Practical cap on fuzzy-lookup results.
pub const DEFAULT_LOOKUP_LIMIT: usize = 50;

/// One canonical title plus its alias strings. Aliases carry the secondary
/// language name and common alternate spellings; all are equally valid
/// match targets.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TitleEntry {
    pub title: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl TitleEntry {
    pub fn new(title: impl Into<String>, aliases: &[&str]) -> Self {
        TitleEntry {
            title: title.into(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct TitleData {
    operators: Vec<TitleEntry>,
    enemies: Vec<TitleEntry>,
}

/// Read-only title/alias index, one entry list per entity kind.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    operators: Vec<TitleEntry>,
    enemies: Vec<TitleEntry>,
}

impl TitleIndex {
    pub fn from_entries(operators: Vec<TitleEntry>, enemies: Vec<TitleEntry>) -> Self {
        TitleIndex { operators, enemies }
    }

    /// Parse an index from its JSON form:
    /// `{"operators": [{"title": "...", "aliases": ["..."]}], "enemies": [...]}`.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let data: TitleData = serde_json::from_str(json)?;
        Ok(TitleIndex {
            operators: data.operators,
            enemies: data.enemies,
        })
    }

    /// The title listing bundled with the crate. A deployment with a fuller
    /// listing loads it through [`TitleIndex::from_json_str`] instead.
    pub fn bundled() -> Self {
        Self::from_json_str(include_str!("../data/titles.json"))
            .expect("bundled title data is valid JSON")
    }

    pub fn entries(&self, kind: EntityKind) -> &[TitleEntry] {
        match kind {
            EntityKind::Operator => &self.operators,
            EntityKind::Enemy => &self.enemies,
            EntityKind::Unknown => &[],
        }
    }

    /// Resolve an inexact name to a canonical title.
    ///
    /// An exact (normalized) match on a title or alias wins outright;
    /// otherwise the top fuzzy candidate is taken. `None` means the index
    /// knows nothing close enough, which is not proof the page is absent.
    pub fn resolve(&self, kind: EntityKind, name: &str) -> Option<String> {
        let nq = normalized(name);
        if nq.is_empty() {
            return None;
        }
        for e in self.entries(kind) {
            if normalized(&e.title) == nq
                || e.aliases.iter().any(|a| normalized(a) == nq)
            {
                return Some(e.title.clone());
            }
        }
        self.lookup(kind, name, 1).into_iter().next().map(|c| c.title)
    }

    /// Fuzzy lookup: candidates of `kind` matching `fragment`, best first.
    ///
    /// Order is deterministic: descending score, then shorter title, then
    /// lexicographic. An empty fragment returns no results rather than the
    /// whole index.
    pub fn lookup(&self, kind: EntityKind, fragment: &str, limit: usize) -> Vec<MatchCandidate> {
        if normalized(fragment).is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<MatchCandidate> = self
            .entries(kind)
            .iter()
            .map(|e| MatchCandidate {
                title: e.title.clone(),
                score: title_match_score(&e.title, &e.aliases, fragment),
            })
            .filter(|c| c.score >= MIN_SCORE)
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.title.chars().count().cmp(&b.title.chars().count()))
                .then_with(|| a.title.cmp(&b.title))
        });
        scored.truncate(limit);
        scored
    }
}
