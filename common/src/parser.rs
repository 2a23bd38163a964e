//! サービス応答パーサー
//!
//! モデルの応答は信頼せず、必ずカタログの候補集合と照合してから判定に使う

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::types::{MatchOutcome, NOTHING_FOUND_SENTINEL, NO_MATCH_SENTINEL, WALL_SENTINEL};

/// APIレスポンスからJSON配列部分を抽出
///
/// 抽出優先順位:
/// 1. ```json ... ``` ブロック
/// 2. 生の [...] 配列
/// 3. エラー
///
/// # Examples
/// ```
/// use artwork_match_common::extract_json;
///
/// let response = "Tags: [\"moon\", \"blue-sky\"]";
/// assert_eq!(extract_json(response).unwrap(), "[\"moon\", \"blue-sky\"]");
/// ```
pub fn extract_json(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" の長さ
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find('[') {
        if let Some(end) = response.rfind(']') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSONが見つかりません".into()))
}

/// 応答の前後の空白・引用符・末尾ピリオドを除去
pub fn clean_label(raw: &str) -> &str {
    let quotes = |c: char| c == '"' || c == '\'' || c == '`';
    raw.trim()
        .trim_end_matches('.')
        .trim_matches(quotes)
        .trim_end_matches('.')
        .trim()
}

/// 説明文ベース判定の応答を検証
///
/// - カタログ名（大文字小文字無視）→ Matched（正式名称）
/// - "None" → NoMatch
/// - それ以外 → Unexpected
pub fn parse_choice_response(raw: &str, catalog: &Catalog) -> MatchOutcome {
    let label = clean_label(raw);

    if let Some(entry) = catalog.find(label) {
        return MatchOutcome::matched(entry.name.clone());
    }
    if label.eq_ignore_ascii_case(NO_MATCH_SENTINEL) {
        return MatchOutcome::NoMatch;
    }

    MatchOutcome::Unexpected {
        raw: raw.trim().to_string(),
    }
}

/// 画像分類の応答を検証
///
/// "wall" と "nothing found" はどちらも該当なしとして扱う
pub fn parse_classifier_response(raw: &str, catalog: &Catalog) -> MatchOutcome {
    let label = clean_label(raw);

    if let Some(entry) = catalog.find(label) {
        return MatchOutcome::matched(entry.name.clone());
    }
    if label.eq_ignore_ascii_case(WALL_SENTINEL) || label.eq_ignore_ascii_case(NOTHING_FOUND_SENTINEL) {
        return MatchOutcome::NoMatch;
    }

    MatchOutcome::Unexpected {
        raw: raw.trim().to_string(),
    }
}

/// 画像分類の応答を表示用ラベルに変換
///
/// 前後の空白・引用符・末尾ピリオドを除いた応答がカタログ名（大文字小文字無視）なら
/// その文字列、それ以外はすべて "wall"。`parse_classifier_response` と同じ整形を使う
pub fn coerce_classifier_label(raw: &str, catalog: &Catalog) -> String {
    let label = clean_label(raw);
    if catalog.find(label).is_some() {
        label.to_string()
    } else {
        WALL_SENTINEL.to_string()
    }
}

/// タグ抽出の応答をパース
///
/// JSON配列を優先し、見つからなければカンマ・改行区切りとして読む。
/// 文中の `[...]` が文字列配列でなければ注記とみなして除き、区切り読みに切り替える。
/// 応答全体が配列（または ```json ブロック）で中身が文字列でない場合だけエラー
pub fn parse_tags_response(raw: &str) -> Result<Vec<String>> {
    if let Ok(json) = extract_json(raw) {
        match serde_json::from_str::<Vec<String>>(json.trim()) {
            Ok(tags) => {
                return Ok(tags
                    .into_iter()
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect())
            }
            Err(e) if is_whole_json_reply(raw, json) => {
                return Err(Error::Parse(format!("タグJSONパースエラー: {}", e)));
            }
            Err(_) => return split_tags(&strip_bracketed(raw)),
        }
    }

    split_tags(raw)
}

fn is_whole_json_reply(raw: &str, json: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.starts_with("```") || trimmed == json.trim()
}

/// `[...]` で囲まれた部分を取り除く
fn strip_bracketed(raw: &str) -> String {
    let mut depth = 0usize;
    raw.chars()
        .filter(|&c| match c {
            '[' => {
                depth += 1;
                false
            }
            ']' => {
                depth = depth.saturating_sub(1);
                false
            }
            _ => depth == 0,
        })
        .collect()
}

fn split_tags(raw: &str) -> Result<Vec<String>> {
    let tags: Vec<String> = raw
        .split([',', '\n'])
        .map(|t| clean_label(t.trim().trim_start_matches(['-', '*'])).to_string())
        .filter(|t| !t.is_empty())
        .collect();

    if tags.is_empty() {
        return Err(Error::Parse("タグが見つかりません".into()));
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================
    // parse_choice_response テスト
    // =============================================

    #[test]
    fn test_choice_exact_name() {
        let outcome = parse_choice_response("Mona Lisa", &Catalog::builtin());
        assert_eq!(outcome, MatchOutcome::matched("Mona Lisa"));
    }

    #[test]
    fn test_choice_trims_and_canonicalizes() {
        let outcome = parse_choice_response("  \"the scream\".\n", &Catalog::builtin());
        assert_eq!(outcome, MatchOutcome::matched("The Scream"));
    }

    #[test]
    fn test_choice_none() {
        assert_eq!(parse_choice_response("None", &Catalog::builtin()), MatchOutcome::NoMatch);
        assert_eq!(parse_choice_response(" none ", &Catalog::builtin()), MatchOutcome::NoMatch);
    }

    #[test]
    fn test_choice_unexpected() {
        let outcome = parse_choice_response("Probably the Mona Lisa", &Catalog::builtin());
        assert_eq!(
            outcome,
            MatchOutcome::Unexpected {
                raw: "Probably the Mona Lisa".into()
            }
        );
    }

    // =============================================
    // 画像分類応答テスト
    // =============================================

    #[test]
    fn test_classifier_sentinels() {
        let catalog = Catalog::builtin();
        assert_eq!(parse_classifier_response("wall", &catalog), MatchOutcome::NoMatch);
        assert_eq!(parse_classifier_response("WALL", &catalog), MatchOutcome::NoMatch);
        assert_eq!(parse_classifier_response("nothing found", &catalog), MatchOutcome::NoMatch);
    }

    #[test]
    fn test_classifier_match_any_case() {
        let catalog = Catalog::builtin();
        assert_eq!(
            parse_classifier_response("toy dog", &catalog),
            MatchOutcome::matched("Toy Dog")
        );
    }

    #[test]
    fn test_classifier_unexpected_is_distinct() {
        let outcome = parse_classifier_response("a ceramic cat", &Catalog::builtin());
        assert!(matches!(outcome, MatchOutcome::Unexpected { .. }));
    }

    #[test]
    fn test_coerce_label_passes_catalog_names_through() {
        let catalog = Catalog::builtin();
        for name in catalog.names() {
            assert_eq!(coerce_classifier_label(name, &catalog), name);
            let lower = name.to_lowercase();
            assert_eq!(coerce_classifier_label(&lower, &catalog), lower);
            let upper = name.to_uppercase();
            assert_eq!(coerce_classifier_label(&upper, &catalog), upper);
        }
    }

    #[test]
    fn test_coerce_label_everything_else_is_wall() {
        let catalog = Catalog::builtin();
        for raw in ["", "cat", "Mona", "Mona Lisa!", "nothing found", "Starry Night, probably"] {
            assert_eq!(coerce_classifier_label(raw, &catalog), "wall", "raw = {:?}", raw);
        }
    }

    // =============================================
    // parse_tags_response テスト
    // =============================================

    #[test]
    fn test_tags_json_block() {
        let raw = "```json\n[\"moon\", \" blue-sky \", \"\"]\n```";
        assert_eq!(parse_tags_response(raw).unwrap(), vec!["moon", "blue-sky"]);
    }

    #[test]
    fn test_tags_bare_array() {
        let raw = r#"Here you go: ["sfumato", "smile"]"#;
        assert_eq!(parse_tags_response(raw).unwrap(), vec!["sfumato", "smile"]);
    }

    #[test]
    fn test_tags_empty_array() {
        assert!(parse_tags_response("[]").unwrap().is_empty());
    }

    #[test]
    fn test_tags_comma_fallback() {
        let raw = "moon, \"yellow-stars\"\n- cypress-tree";
        assert_eq!(
            parse_tags_response(raw).unwrap(),
            vec!["moon", "yellow-stars", "cypress-tree"]
        );
    }

    #[test]
    fn test_tags_invalid_json_array() {
        assert!(parse_tags_response("[1, 2, 3]").is_err());
        assert!(parse_tags_response("   ").is_err());
    }

    #[test]
    fn test_tags_prose_with_bracketed_note() {
        let raw = "moon, blue-sky, yellow-stars [approximate]";
        assert_eq!(
            parse_tags_response(raw).unwrap(),
            vec!["moon", "blue-sky", "yellow-stars"]
        );

        let raw = "- moon [likely]\n- cypress-tree";
        assert_eq!(parse_tags_response(raw).unwrap(), vec!["moon", "cypress-tree"]);
    }

    #[test]
    fn test_tags_invalid_json_block_is_error() {
        assert!(parse_tags_response("```json\n[1, 2]\n```").is_err());
    }

    #[test]
    fn test_coerce_label_agrees_with_outcome() {
        let catalog = Catalog::builtin();
        for raw in ["\"Mona Lisa\".", "'the scream'", "Starry Night.", "  `Toy Dog`  "] {
            let outcome = parse_classifier_response(raw, &catalog);
            let label = coerce_classifier_label(raw, &catalog);
            let name = outcome.matched_name().unwrap();
            assert!(label.eq_ignore_ascii_case(name), "raw = {:?}", raw);
        }
        assert_eq!(coerce_classifier_label("\"Mona Lisa\".", &catalog), "Mona Lisa");
    }

    #[test]
    fn test_extract_json_block_preferred() {
        let response = "[ignored]\n```json\n[\"a\"]\n```";
        assert_eq!(extract_json(response).unwrap(), "[\"a\"]");
    }
}
