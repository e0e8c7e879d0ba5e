use crate::EntityKind;

/// Typed failures surfaced by the query pipeline.
///
/// Every variant renders to a human-readable message that distinguishes
/// "no such title", "wrong kind of page", and "source unreachable"; callers
/// never see a raw transport error or an empty success.
#[derive(Debug, thiserror::Error)]
pub enum WikiError {
    /// The title does not resolve to any page.
    #[error("未找到页面：{0}")]
    NotFound(String),

    /// The page exists but its structure is the other kind, or neither.
    #[error("页面「{title}」是{actual}页面，不是{requested}页面", requested = .requested.label(), actual = .actual.label())]
    WrongKind {
        title: String,
        requested: EntityKind,
        actual: EntityKind,
    },

    /// Fetched content yielded no parseable sections at all.
    #[error("页面「{0}」无法解析出任何章节")]
    NotParseable(String),

    /// Network failure that persisted through the retry budget.
    #[error("暂时无法访问 prts.wiki（尝试 {attempts} 次）：{reason}")]
    Transient { attempts: u32, reason: String },

    /// Empty or malformed query name.
    #[error("查询名称无效：{0}")]
    InvalidInput(String),
}

impl WikiError {
    /// Stable machine-readable code, one per variant.
    pub fn code(&self) -> &'static str {
        match self {
            WikiError::NotFound(_) => "NOT_FOUND",
            WikiError::WrongKind { .. } => "WRONG_KIND",
            WikiError::NotParseable(_) => "NOT_PARSEABLE",
            WikiError::Transient { .. } => "TRANSIENT",
            WikiError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_kind_message_names_both_kinds() {
        let e = WikiError::WrongKind {
            title: "源石虫".into(),
            requested: EntityKind::Operator,
            actual: EntityKind::Enemy,
        };
        let msg = e.to_string();
        assert!(msg.contains("源石虫"));
        assert!(msg.contains("干员"));
        assert!(msg.contains("敌人"));
    }

    #[test]
    fn codes_are_distinct() {
        let errs = [
            WikiError::NotFound("x".into()),
            WikiError::WrongKind {
                title: "x".into(),
                requested: EntityKind::Operator,
                actual: EntityKind::Unknown,
            },
            WikiError::NotParseable("x".into()),
            WikiError::Transient {
                attempts: 3,
                reason: "timeout".into(),
            },
            WikiError::InvalidInput("x".into()),
        ];
        let codes: std::collections::HashSet<_> = errs.iter().map(|e| e.code()).collect();
        assert_eq!(codes.len(), errs.len());
    }
}
