//! Deterministic markdown rendering of extraction results.
//!
//! Output is byte-stable for identical inputs: no timestamps, no
//! randomness, bodies verbatim apart from trailing-whitespace trimming.

use crate::sections::SectionMap;
use crate::{EntityKind, MatchCandidate};

/// Render a page's surviving sections as a markdown document.
pub fn render(title: &str, kind: EntityKind, sections: &SectionMap) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", title));
    out.push_str(&format!("**类型**: {}\n", kind.label()));
    for section in sections.iter() {
        out.push_str(&format!("\n## {}\n\n", section.name));
        out.push_str(section.body.trim_end());
        out.push('\n');
    }
    out
}

/// Render a `list_*` result as an enumerated title list.
///
/// `QueryPipeline::list_*` hands back the structured candidates; the
/// transport layer calls this when it wants them as text.
pub fn render_candidate_list(
    kind: EntityKind,
    query: &str,
    candidates: &[MatchCandidate],
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}搜索：{}\n\n", kind.label(), query));
    if candidates.is_empty() {
        out.push_str("未找到匹配的名称。\n");
        return out;
    }
    for (i, c) in candidates.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, c.title));
    }
    out
}
