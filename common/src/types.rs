//! 判定結果の型定義
//!
//! - MatchOutcome: サービス応答（またはローカル判定）を検証した結果
//! - MatchResult: 最終出力（一致した作品名のみ）

use serde::{Deserialize, Serialize};

/// 説明文ベース判定で「該当なし」を表す応答
pub const NO_MATCH_SENTINEL: &str = "None";

/// 画像分類で「該当なし」を表す応答
pub const WALL_SENTINEL: &str = "wall";

/// タグ判定で「該当なし」を表す応答
pub const NOTHING_FOUND_SENTINEL: &str = "nothing found";

/// 判定結果
///
/// サービスに到達できなかった場合はここに含めず、呼び出し側のエラーとして扱う
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum MatchOutcome {
    /// カタログ上の作品に一致（正式名称）
    Matched { name: String },
    /// 該当なし
    NoMatch,
    /// 候補外の応答
    Unexpected { raw: String },
}

impl MatchOutcome {
    pub fn matched(name: impl Into<String>) -> Self {
        Self::Matched { name: name.into() }
    }

    pub fn matched_name(&self) -> Option<&str> {
        match self {
            Self::Matched { name } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Matched { .. })
    }
}

/// 最終的な判定結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub matched_name: Option<String>,
}

impl From<&MatchOutcome> for MatchResult {
    fn from(outcome: &MatchOutcome) -> Self {
        Self {
            matched_name: outcome.matched_name().map(str::to_string),
        }
    }
}
