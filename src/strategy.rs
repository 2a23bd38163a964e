use artwork_match_common::{NOTHING_FOUND_SENTINEL, NO_MATCH_SENTINEL, WALL_SENTINEL};
use clap::ValueEnum;
use serde::Serialize;

/// 判定方式
///
/// 正式な判定方式は Tags（タグ重複数をローカルで計算）。
/// Describe / Classify はモデルの判断に委ねる
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// 画像からタグを抽出し、重複数で判定
    #[default]
    Tags,
    /// 画像説明文から候補を選ばせる
    Describe,
    /// タグ一覧付きのシステム指示で画像を直接分類させる
    Classify,
}

impl MatchStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            MatchStrategy::Tags => "tags",
            MatchStrategy::Describe => "describe",
            MatchStrategy::Classify => "classify",
        }
    }

    /// 該当なし時の表示ラベル
    pub fn no_match_label(&self) -> &'static str {
        match self {
            MatchStrategy::Tags => NOTHING_FOUND_SENTINEL,
            MatchStrategy::Describe => NO_MATCH_SENTINEL,
            MatchStrategy::Classify => WALL_SENTINEL,
        }
    }
}

impl std::fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
