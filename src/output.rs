//! 結果の表示
//!
//! 人間向け表示と、`--json` 指定時の1行1件JSON表示

use crate::capture::CaptureReport;
use crate::error::ArtworkMatchError;
use crate::matcher::Identification;
use artwork_match_common::{Catalog, MatchOutcome, TagMatch};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdentificationLine<'a> {
    file: &'a str,
    matched_name: Option<String>,
    label: &'a str,
    #[serde(flatten)]
    identification: &'a Identification,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FailureLine<'a> {
    file: &'a str,
    error: String,
    service_failure: bool,
}

fn to_json_line<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
}

fn format_scores(tag_match: &TagMatch) -> Vec<String> {
    tag_match
        .scores
        .iter()
        .filter(|s| s.overlap > 0)
        .map(|s| format!("    {:>2} {} ({})", s.overlap, s.name, s.shared_tags.join(", ")))
        .collect()
}

/// 1枚分の判定結果
pub fn format_identification(file: &str, id: &Identification, json: bool, verbose: bool) -> String {
    if json {
        return to_json_line(&IdentificationLine {
            file,
            matched_name: id.result().matched_name,
            label: id.label(),
            identification: id,
        });
    }

    let mut lines = Vec::new();
    match &id.outcome {
        MatchOutcome::Matched { name } => lines.push(format!("✔ {}", name)),
        MatchOutcome::NoMatch => lines.push(format!("- {}", id.label())),
        MatchOutcome::Unexpected { raw } => {
            lines.push(format!("⚠ 候補外の応答: {:?}", raw));
            lines.push(format!("- {}", id.label()));
        }
    }

    if verbose {
        if let Some(description) = &id.description {
            lines.push(format!("  説明: {}", description));
        }
        if let Some(tag_match) = &id.tag_match {
            lines.push(format!(
                "  タグ一致: 最大{}件 (閾値 {})",
                tag_match.best_overlap, tag_match.threshold
            ));
            lines.extend(format_scores(tag_match));
        }
    }

    lines.join("\n")
}

/// 1枚分の失敗
///
/// サービス障害は「該当なし」と区別して表示する
pub fn format_failure(file: &str, error: &ArtworkMatchError, json: bool) -> String {
    if json {
        return to_json_line(&FailureLine {
            file,
            error: error.to_string(),
            service_failure: error.is_service_failure(),
        });
    }

    if error.is_service_failure() {
        format!("✖ サービス障害（該当なしではありません）: {}", error)
    } else {
        format!("✖ 判定失敗: {}", error)
    }
}

/// ローカルのタグ判定結果
pub fn format_tag_match(tag_match: &TagMatch, json: bool) -> String {
    if json {
        return to_json_line(tag_match);
    }

    let mut lines = vec![match &tag_match.matched_name {
        Some(name) => format!("✔ {} ({}タグ一致)", name, tag_match.best_overlap),
        None => format!(
            "- {} (最大{}タグ、閾値 {})",
            artwork_match_common::NOTHING_FOUND_SENTINEL,
            tag_match.best_overlap,
            tag_match.threshold
        ),
    }];
    lines.extend(format_scores(tag_match));
    lines.join("\n")
}

pub fn format_catalog(catalog: &Catalog, json: bool) -> String {
    if json {
        return catalog.to_json().unwrap_or_default();
    }

    catalog
        .entries()
        .iter()
        .enumerate()
        .map(|(i, e)| format!("{}. {} ({}タグ)\n   {}", i + 1, e.name, e.tags.len(), e.tags.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 取り込みループの通知
pub fn format_capture_report(report: &CaptureReport, json: bool, verbose: bool) -> String {
    match report {
        CaptureReport::Captured { sequence, path } => {
            if json {
                to_json_line(&serde_json::json!({
                    "capture": sequence,
                    "path": path.display().to_string(),
                }))
            } else {
                format!("📸 #{} 取り込み: {}", sequence, path.display())
            }
        }
        CaptureReport::Classified { sequence, result } => {
            let file = format!("capture#{}", sequence);
            match result {
                Ok(id) => format_identification(&file, id, json, verbose),
                Err(e) => format_failure(&file, e, json),
            }
        }
        CaptureReport::Cancelled { sequence } => {
            if json {
                to_json_line(&serde_json::json!({ "capture": sequence, "cancelled": true }))
            } else {
                format!("■ #{} 判定を中断しました", sequence)
            }
        }
    }
}
