//! Structural page classification.
//!
//! prts.wiki has no machine-readable page type; operator and enemy pages
//! are told apart by characteristic section names. The rules live in one
//! ordered list so the classifier survives wiki format drift by editing
//! data, not control flow: first marker found in rule order decides the
//! kind. Definitive enemy markers are listed ahead of operator markers, so
//! a page carrying both (an enemy page quoting a 技能 block) classifies
//! Enemy.

use tracing::debug;

use crate::sections::SectionMap;
use crate::text_utils::normalized;
use crate::EntityKind;

pub struct MarkerRule {
    /// Normalized fragment looked for inside a section name.
    pub marker: &'static str,
    pub kind: EntityKind,
}

/// Ordered, first match wins. Markers come from the section inventory of
/// real operator and enemy pages.
pub const MARKER_RULES: &[MarkerRule] = &[
    // definitive enemy structure: the level stat progression and the model
    // viewer exist on every enemy page and on nothing else
    MarkerRule { marker: "敌人模型", kind: EntityKind::Enemy },
    MarkerRule { marker: "级别0", kind: EntityKind::Enemy },
    MarkerRule { marker: "级别1", kind: EntityKind::Enemy },
    MarkerRule { marker: "级别2", kind: EntityKind::Enemy },
    // operator structure
    MarkerRule { marker: "干员信息", kind: EntityKind::Operator },
    MarkerRule { marker: "天赋", kind: EntityKind::Operator },
    MarkerRule { marker: "潜能提升", kind: EntityKind::Operator },
    MarkerRule { marker: "精英化材料", kind: EntityKind::Operator },
    MarkerRule { marker: "后勤技能", kind: EntityKind::Operator },
    MarkerRule { marker: "技能", kind: EntityKind::Operator },
];

/// Classify a page from its extracted sections.
pub fn classify(map: &SectionMap) -> EntityKind {
    let kind = classify_names(map.names());
    debug!(%kind, "classified page structure");
    kind
}

/// Pure rule evaluation over section names, exposed for testability.
pub fn classify_names<'a>(names: impl Iterator<Item = &'a str>) -> EntityKind {
    let names: Vec<String> = names.map(normalized).collect();
    for rule in MARKER_RULES {
        let marker = normalized(rule.marker);
        if names.iter().any(|n| n.contains(&marker)) {
            return rule.kind;
        }
    }
    EntityKind::Unknown
}
