//! タグ重複数による作品判定
//!
//! 観測タグ集合 Q と各作品のタグ集合の共通部分の大きさを数え、
//! 最大のものが閾値以上なら一致とする。同数の場合はカタログの宣言順で先の作品を採用。

use crate::catalog::{normalize_tag, ArtworkEntry, Catalog};
use serde::Serialize;
use std::collections::HashSet;

/// 一致と判定するのに必要な最小タグ重複数
pub const DEFAULT_TAG_THRESHOLD: usize = 5;

/// 各作品の重複数
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagScore {
    pub name: String,
    pub overlap: usize,
    pub shared_tags: Vec<String>,
}

/// タグ照合結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagMatch {
    /// 閾値を満たした作品名（なければ None = "nothing found"）
    pub matched_name: Option<String>,
    /// 最大重複数
    pub best_overlap: usize,
    pub threshold: usize,
    /// カタログ宣言順の全スコア
    pub scores: Vec<TagScore>,
}

/// 観測タグを正規化済み集合に変換
pub fn observed_set<S: AsRef<str>>(tags: &[S]) -> HashSet<String> {
    tags.iter()
        .map(|t| normalize_tag(t.as_ref()))
        .filter(|t| !t.is_empty())
        .collect()
}

/// |Q ∩ tags(entry)|
pub fn overlap(observed: &HashSet<String>, entry: &ArtworkEntry) -> usize {
    shared_tags(observed, entry).len()
}

fn shared_tags(observed: &HashSet<String>, entry: &ArtworkEntry) -> Vec<String> {
    let mut seen = HashSet::new();
    entry
        .tags
        .iter()
        .filter(|t| {
            let key = normalize_tag(t);
            observed.contains(&key) && seen.insert(key)
        })
        .cloned()
        .collect()
}

/// タグ重複数で作品を判定
pub fn match_tags<S: AsRef<str>>(tags: &[S], catalog: &Catalog, threshold: usize) -> TagMatch {
    let observed = observed_set(tags);

    let scores: Vec<TagScore> = catalog
        .entries()
        .iter()
        .map(|entry| {
            let shared_tags = shared_tags(&observed, entry);
            TagScore {
                name: entry.name.clone(),
                overlap: shared_tags.len(),
                shared_tags,
            }
        })
        .collect();

    // 同数なら宣言順で先の作品
    let best = scores
        .iter()
        .fold(None::<&TagScore>, |best, score| match best {
            Some(b) if b.overlap >= score.overlap => Some(b),
            _ => Some(score),
        });

    let best_overlap = best.map(|s| s.overlap).unwrap_or(0);
    let matched_name = best
        .filter(|s| s.overlap >= threshold && s.overlap > 0)
        .map(|s| s.name.clone());

    TagMatch {
        matched_name,
        best_overlap,
        threshold,
        scores,
    }
}
