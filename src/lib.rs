//! Retrieval-and-extraction core for prts.wiki, the fan-maintained
//! Arknights encyclopedia.
//!
//! The crate resolves an approximate operator or enemy name to a canonical
//! page title, fetches the page HTML, verifies the page is the requested
//! kind, extracts its named sections, filters them against a caller-supplied
//! section list, and renders the survivors as stable markdown. The transport
//! layer that exposes these operations to an agent lives outside this crate;
//! it calls the four operations on [`QueryPipeline`].

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

pub mod classifier;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod pipeline;
pub mod render;
pub mod sections;
pub mod text_utils;
pub mod title_index;

pub use error::WikiError;
pub use fetcher::{FetchConfig, HttpFetcher, PageSource};
pub use pipeline::QueryPipeline;
pub use sections::{Section, SectionMap, SectionQuery};
pub use title_index::{TitleEntry, TitleIndex};

/// The two classifiable page kinds, plus the fallback for pages that are
/// structurally neither (disambiguation pages, items, lore articles).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Operator,
    Enemy,
    Unknown,
}

impl EntityKind {
    /// Label used in rendered output, matching how prts.wiki names the kinds.
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Operator => "干员",
            EntityKind::Enemy => "敌人",
            EntityKind::Unknown => "未知",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Operator => "operator",
            EntityKind::Enemy => "enemy",
            EntityKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Immutable fetched page content. Owned by the pipeline invocation that
/// fetched it; nothing here is cached across invocations.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Canonical title the page was fetched under.
    pub title: String,
    /// The kind the caller asked for, carried for diagnostics. The classifier
    /// decides the actual kind from page structure.
    pub kind_hint: EntityKind,
    /// Raw page HTML as served.
    pub html: String,
    pub fetched_at: SystemTime,
}

/// A fuzzy-lookup hit: candidate title plus similarity score in `[0, 1]`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub title: String,
    pub score: f32,
}

/// Success payload of a `search_*` operation.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResult {
    /// Canonical title the query resolved to.
    pub title: String,
    pub kind: EntityKind,
    /// Deterministic markdown; byte-identical for identical inputs.
    pub markdown: String,
    /// True when extraction could not confidently parse the whole page.
    pub partial: bool,
}
