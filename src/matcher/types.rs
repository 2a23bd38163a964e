use crate::strategy::MatchStrategy;
use artwork_match_common::{MatchOutcome, MatchResult, TagMatch};
use serde::Serialize;

/// 1枚の画像に対する判定結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub strategy: MatchStrategy,
    pub outcome: MatchOutcome,
    /// 判定に使ったサービス応答（前後空白除去済み）
    pub raw_response: String,
    /// Describe方式の画像説明
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Tags方式の観測タグとスコア
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_match: Option<TagMatch>,
    /// Classify方式の表示ラベル（応答がカタログ名ならそのまま、それ以外は "wall"）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier_label: Option<String>,
}

impl Identification {
    pub fn new(strategy: MatchStrategy, outcome: MatchOutcome, raw_response: impl Into<String>) -> Self {
        Self {
            strategy,
            outcome,
            raw_response: raw_response.into(),
            description: None,
            tag_match: None,
            classifier_label: None,
        }
    }

    pub fn result(&self) -> MatchResult {
        MatchResult::from(&self.outcome)
    }

    /// 表示ラベル（作品名、または方式ごとの該当なしラベル）
    pub fn label(&self) -> &str {
        self.outcome
            .matched_name()
            .unwrap_or_else(|| self.strategy.no_match_label())
    }
}
