//! Ordered section storage and the permissive section filter.

use crate::text_utils::normalized;

/// One named sub-block of a page, body kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub body: String,
}

/// Ordered mapping from section name to section body.
///
/// Insertion order equals document order; names are unique within one map
/// (first occurrence wins). The `partial` flag records that extraction
/// could not confidently parse everything it saw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMap {
    sections: Vec<Section>,
    partial: bool,
}

impl SectionMap {
    pub fn new() -> Self {
        SectionMap::default()
    }

    /// Append a section. A duplicate name (after trimming) is skipped and
    /// marks the map partial instead of clobbering the earlier body.
    pub fn push(&mut self, name: &str, body: String) {
        let name = name.trim();
        if name.is_empty() {
            self.partial = true;
            return;
        }
        if self.sections.iter().any(|s| s.name == name) {
            self.partial = true;
            return;
        }
        self.sections.push(Section {
            name: name.to_string(),
            body,
        });
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        let wanted = normalized(name);
        self.sections
            .iter()
            .find(|s| normalized(&s.name) == wanted)
            .map(|s| s.body.as_str())
    }

    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn mark_partial(&mut self) {
        self.partial = true;
    }

    /// Keep only the sections the query asks for, in document order.
    /// An empty query keeps everything. Requested names with no match are
    /// dropped silently; callers probe section names speculatively.
    pub fn filter(&self, query: &SectionQuery) -> SectionMap {
        if query.is_empty() {
            return self.clone();
        }
        let filtered: Vec<Section> = self
            .sections
            .iter()
            .filter(|s| query.matches(&s.name))
            .cloned()
            .collect();
        SectionMap {
            sections: filtered,
            partial: self.partial,
        }
    }
}

/// Caller-supplied set of desired section names. Matching against section
/// names is case-insensitive and tolerant of punctuation and whitespace
/// differences.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionQuery {
    wanted: Vec<String>,
}

impl SectionQuery {
    /// All sections.
    pub fn all() -> Self {
        SectionQuery::default()
    }

    /// Parse a comma-separated list as passed by the tool layer, e.g.
    /// `"技能,天赋"`. `None`, an empty string, or a string of separators
    /// all mean "all sections". Full-width commas are accepted.
    pub fn parse(raw: Option<&str>) -> Self {
        let wanted = raw
            .unwrap_or("")
            .split([',', '，'])
            .map(normalized)
            .filter(|s| !s.is_empty())
            .collect();
        SectionQuery { wanted }
    }

    pub fn is_empty(&self) -> bool {
        self.wanted.is_empty()
    }

    pub fn matches(&self, section_name: &str) -> bool {
        let n = normalized(section_name);
        self.wanted.iter().any(|w| *w == n)
    }
}
