//! Orchestration of the four public operations.
//!
//! A `search_*` call resolves the name against the title index, fetches the
//! page, extracts its sections, verifies the page kind, filters, and
//! renders. A `list_*` call consults the index only and never touches the
//! network. Invocations are independent and share no mutable state; the
//! pipeline can be called concurrently from multiple threads.

use tracing::debug;

use crate::classifier::classify;
use crate::extractor::extract;
use crate::fetcher::PageSource;
use crate::render::render;
use crate::sections::SectionQuery;
use crate::title_index::{TitleIndex, DEFAULT_LOOKUP_LIMIT};
use crate::{EntityKind, MatchCandidate, RenderedResult, WikiError};

pub struct QueryPipeline<S: PageSource> {
    index: TitleIndex,
    source: S,
}

impl<S: PageSource> QueryPipeline<S> {
    pub fn new(index: TitleIndex, source: S) -> Self {
        QueryPipeline { index, source }
    }

    /// Fetch, verify, and render an operator page.
    pub fn search_operator(
        &self,
        name: &str,
        sections: Option<&str>,
    ) -> Result<RenderedResult, WikiError> {
        self.search(EntityKind::Operator, name, sections)
    }

    /// Fetch, verify, and render an enemy page.
    pub fn search_enemy(
        &self,
        name: &str,
        sections: Option<&str>,
    ) -> Result<RenderedResult, WikiError> {
        self.search(EntityKind::Enemy, name, sections)
    }

    /// Fuzzy-match operator titles; no fetch.
    pub fn list_operators(&self, name: &str) -> Result<Vec<MatchCandidate>, WikiError> {
        self.list(EntityKind::Operator, name)
    }

    /// Fuzzy-match enemy titles; no fetch.
    pub fn list_enemies(&self, name: &str) -> Result<Vec<MatchCandidate>, WikiError> {
        self.list(EntityKind::Enemy, name)
    }

    fn search(
        &self,
        kind: EntityKind,
        name: &str,
        sections: Option<&str>,
    ) -> Result<RenderedResult, WikiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WikiError::InvalidInput("名称为空".to_string()));
        }

        // the index is best effort: an unknown name may still be a live
        // page, so fall through to a direct fetch of the literal name
        let title = self
            .index
            .resolve(kind, name)
            .unwrap_or_else(|| name.to_string());
        debug!(%kind, query = %name, resolved = %title, "resolved title");

        let page = self.source.fetch(&title, kind)?;
        let map = extract(&page);
        if map.is_empty() {
            return Err(WikiError::NotParseable(title));
        }
        let actual = classify(&map);
        if actual != kind {
            return Err(WikiError::WrongKind {
                title,
                requested: kind,
                actual,
            });
        }

        let filtered = map.filter(&SectionQuery::parse(sections));
        Ok(RenderedResult {
            markdown: render(&title, kind, &filtered),
            partial: filtered.is_partial(),
            title,
            kind,
        })
    }

    fn list(&self, kind: EntityKind, name: &str) -> Result<Vec<MatchCandidate>, WikiError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WikiError::InvalidInput("名称为空".to_string()));
        }
        Ok(self.index.lookup(kind, name, DEFAULT_LOOKUP_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::title_index::TitleEntry;
    use crate::RawPage;
    use std::collections::HashMap;
    use std::time::SystemTime;

    /// In-memory page source: title -> page HTML.
    struct FakeSource {
        pages: HashMap<String, String>,
    }

    impl FakeSource {
        fn new(pages: &[(&str, &str)]) -> Self {
            FakeSource {
                pages: pages
                    .iter()
                    .map(|(t, h)| (t.to_string(), h.to_string()))
                    .collect(),
            }
        }
    }

    impl PageSource for FakeSource {
        fn fetch(&self, title: &str, kind_hint: EntityKind) -> Result<RawPage, WikiError> {
            match self.pages.get(title) {
                Some(html) => Ok(RawPage {
                    title: title.to_string(),
                    kind_hint,
                    html: html.clone(),
                    fetched_at: SystemTime::now(),
                }),
                None => Err(WikiError::NotFound(title.to_string())),
            }
        }
    }

    const SILVERASH_PAGE: &str = r#"<div class="mw-parser-output">
      <h2><span class="mw-headline">基础属性</span></h2>
      <table><tr><td>生命上限</td><td>1800</td></tr></table>
      <h2><span class="mw-headline">技能</span></h2>
      <p>真银斩</p>
      <h2><span class="mw-headline">天赋</span></h2>
      <p>领袖</p>
      <h2><span class="mw-headline">精英化</span></h2>
      <p>材料</p>
    </div>"#;

    const SLUG_PAGE: &str = r#"<div class="mw-parser-output">
      <h2><span class="mw-headline">级别0</span></h2>
      <table><tr><td>生命值</td><td>550</td></tr></table>
      <h2><span class="mw-headline">敌人模型</span></h2>
      <p>模型数据</p>
    </div>"#;

    const LORE_PAGE: &str = r#"<div class="mw-parser-output">
      <h2><span class="mw-headline">简介</span></h2>
      <p>一段背景设定</p>
    </div>"#;

    fn pipeline() -> QueryPipeline<FakeSource> {
        let index = TitleIndex::from_entries(
            vec![
                TitleEntry::new("银灰", &["SilverAsh"]),
                TitleEntry::new("阿米娅", &["Amiya"]),
            ],
            vec![TitleEntry::new("源石虫", &["Originium Slug"])],
        );
        let source = FakeSource::new(&[
            ("银灰", SILVERASH_PAGE),
            ("源石虫", SLUG_PAGE),
            ("泰拉大陆", LORE_PAGE),
            ("空白页", "<div class=\"mw-parser-output\"></div>"),
        ]);
        QueryPipeline::new(index, source)
    }

    #[test]
    fn search_operator_end_to_end_with_section_filter() {
        let p = pipeline();
        let res = p.search_operator("银灰", Some("技能,天赋")).unwrap();
        assert_eq!(res.title, "银灰");
        assert_eq!(res.kind, EntityKind::Operator);
        // exactly the two requested sections, in document order
        assert_eq!(
            res.markdown,
            "# 银灰\n\n**类型**: 干员\n\n## 技能\n\n真银斩\n\n## 天赋\n\n领袖\n"
        );
    }

    #[test]
    fn alias_query_resolves_to_canonical_title() {
        let p = pipeline();
        let res = p.search_operator("silverash", None).unwrap();
        assert_eq!(res.title, "银灰");
        assert!(res.markdown.contains("## 基础属性"));
    }

    #[test]
    fn nonexistent_requested_sections_are_dropped_not_errors() {
        let p = pipeline();
        let res = p.search_operator("银灰", Some("技能,不存在")).unwrap();
        assert!(res.markdown.contains("## 技能"));
        assert!(!res.markdown.contains("不存在"));
    }

    #[test]
    fn enemy_page_through_operator_search_is_wrong_kind() {
        let p = pipeline();
        let err = p.search_operator("源石虫", None).unwrap_err();
        match err {
            WikiError::WrongKind {
                requested, actual, ..
            } => {
                assert_eq!(requested, EntityKind::Operator);
                assert_eq!(actual, EntityKind::Enemy);
            }
            other => panic!("expected WrongKind, got {other:?}"),
        }
    }

    #[test]
    fn search_enemy_succeeds_on_enemy_page() {
        let p = pipeline();
        let res = p.search_enemy("源石虫", None).unwrap();
        assert_eq!(res.kind, EntityKind::Enemy);
        assert!(res.markdown.contains("## 级别0"));
        assert!(res.markdown.contains("生命值 | 550"));
    }

    #[test]
    fn unmarked_page_is_wrong_kind_not_parse_failure() {
        // kind precedence: a page that parses but carries no markers fails
        // the kind check; NotParseable is reserved for empty section maps
        let p = pipeline();
        let err = p.search_enemy("泰拉大陆", None).unwrap_err();
        assert!(matches!(
            err,
            WikiError::WrongKind {
                actual: EntityKind::Unknown,
                ..
            }
        ));
    }

    #[test]
    fn empty_section_map_is_not_parseable() {
        let p = pipeline();
        let err = p.search_operator("空白页", None).unwrap_err();
        assert!(matches!(err, WikiError::NotParseable(_)));
    }

    #[test]
    fn unknown_title_falls_through_to_not_found() {
        let p = pipeline();
        let err = p.search_operator("不存在的干员", None).unwrap_err();
        assert!(matches!(err, WikiError::NotFound(_)));
    }

    #[test]
    fn empty_name_is_invalid_input_for_search_and_list() {
        let p = pipeline();
        assert!(matches!(
            p.search_operator("  ", None),
            Err(WikiError::InvalidInput(_))
        ));
        assert!(matches!(
            p.list_operators(""),
            Err(WikiError::InvalidInput(_))
        ));
        assert!(matches!(
            p.list_enemies(" "),
            Err(WikiError::InvalidInput(_))
        ));
    }

    #[test]
    fn list_returns_all_candidates_for_disambiguation() {
        let p = pipeline();
        let hits = p.list_operators("阿米娅").unwrap();
        assert_eq!(hits[0].title, "阿米娅");
        let enemies = p.list_enemies("originium").unwrap();
        assert_eq!(enemies[0].title, "源石虫");
    }

    #[test]
    fn search_results_are_deterministic() {
        let p = pipeline();
        let a = p.search_operator("银灰", Some("技能")).unwrap();
        let b = p.search_operator("银灰", Some("技能")).unwrap();
        assert_eq!(a.markdown, b.markdown);
    }
}
