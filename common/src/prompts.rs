//! プロンプト生成モジュール
//!
//! - DESCRIBE_PROMPT: 画像説明（説明文ベース判定の1段目）
//! - build_choice_prompt: 説明文から候補作品を選ばせる（2段目）
//! - build_classifier_prompt: タグ一覧付きのシステム指示（画像分類）
//! - build_tag_extraction_prompt: 画像からタグを抽出させる（タグ判定）

use crate::catalog::Catalog;
use crate::tag_match::DEFAULT_TAG_THRESHOLD;
use crate::types::{NO_MATCH_SENTINEL, WALL_SENTINEL};

/// 画像説明用プロンプト
pub const DESCRIBE_PROMPT: &str = "Describe this image in detail.";

/// 分類時にユーザーメッセージとして画像に添えるテキスト
pub const CLASSIFY_USER_PROMPT: &str = "Identify the artwork in this image frame.";

fn render_tags(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| format!("{:?}", tags))
}

/// 説明文から候補を1つ選ばせるプロンプト
pub fn build_choice_prompt(description: &str, catalog: &Catalog) -> String {
    let candidates = catalog
        .names()
        .enumerate()
        .map(|(i, name)| format!("{}. {}", i + 1, name))
        .collect::<Vec<_>>()
        .join("\n");

    let example = catalog.names().next().unwrap_or("Mona Lisa");

    format!(
        r#"You are given an image description:

"""{description}"""

Which of the following artworks does it best match?

{candidates}

Respond with only the matching artwork name (e.g., "{example}") or "{NO_MATCH_SENTINEL}" if it does not match any."#
    )
}

/// 画像分類用システム指示
///
/// カタログを「作品名: タグ配列」で埋め込み、該当なしは "wall" と答えさせる
pub fn build_classifier_prompt(catalog: &Catalog) -> String {
    let artworks = catalog
        .entries()
        .iter()
        .map(|e| format!("{}:\n{}", e.name, render_tags(&e.tags)))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are a visual tag-based identifier. Below is a list of artworks and objects along with their associated tags.

Your task:
- When I send you an image frame, use only the visual features (tags) from that image to compare against the tags below.
- Return ONLY the name of the artwork or object that best matches the tags from the image.
- You must only return a match if AT LEAST {DEFAULT_TAG_THRESHOLD} tags from the image are found in that artwork's tag list.
- If no artwork has at least {DEFAULT_TAG_THRESHOLD} matching tags, reply: "{WALL_SENTINEL}".

Artwork Tags:

{artworks}

From now on, you will be given a single image at a time.
Use ONLY visual tags from the image to find the closest matching artwork from the list above.

IMPORTANT: Only return a result if at least {DEFAULT_TAG_THRESHOLD} tags from the image are found in one of the artworks' tag sets. If not, reply:
"{WALL_SENTINEL}"."#
    )
}

/// タグ抽出用プロンプト
///
/// 照合はローカルで行うため、モデルには語彙から見えるタグだけを返させる
pub fn build_tag_extraction_prompt(catalog: &Catalog) -> String {
    let vocabulary = catalog
        .tag_vocabulary()
        .iter()
        .map(|t| format!("- {}", t))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a visual tagger. Look at the image and list the tags from the vocabulary below that clearly apply to what is visible.

## Vocabulary
{vocabulary}

## Rules
- Use the tags exactly as written in the vocabulary.
- Do not guess; only include tags for features you can see.
- Output ONLY a JSON array of strings, e.g. ["tag-a", "tag-b"]. Output [] if none apply."#
    )
}
