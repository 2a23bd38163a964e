//! 美術作品カタログ
//!
//! 作品名とタグ集合の対応表。起動時に一度だけ構築し、以降は読み取り専用。
//! - builtin(): 組み込みの7作品
//! - from_json(): 外部カタログ（JSON）

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// タグ比較用の正規化（前後空白除去 + 小文字化）
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// カタログの1作品
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkEntry {
    pub name: String,
    /// 宣言順を保持したタグ（正規化後に重複なし）
    pub tags: Vec<String>,
}

impl ArtworkEntry {
    pub fn new<I, S>(name: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let tags = tags
            .into_iter()
            .map(Into::into)
            .filter(|t: &String| !t.trim().is_empty())
            .filter(|t| seen.insert(normalize_tag(t)))
            .collect();

        Self {
            name: name.into(),
            tags,
        }
    }

    /// 正規化済みタグ集合
    pub fn tag_set(&self) -> HashSet<String> {
        self.tags.iter().map(|t| normalize_tag(t)).collect()
    }
}

/// カタログファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogFile {
    artworks: Vec<ArtworkEntry>,
}

/// 美術作品カタログ（宣言順を保持）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<ArtworkEntry>,
}

impl Catalog {
    /// 検証付きでカタログを構築
    ///
    /// 空のカタログ、空の作品名、重複した作品名（大文字小文字無視）、
    /// タグのない作品はエラー
    pub fn new(entries: Vec<ArtworkEntry>) -> Result<Self> {
        if entries.is_empty() {
            return Err(Error::Catalog("作品が1件もありません".into()));
        }

        let entries: Vec<ArtworkEntry> = entries
            .into_iter()
            .map(|e| ArtworkEntry::new(e.name.trim(), e.tags))
            .collect();

        let mut names = HashSet::new();
        for entry in &entries {
            if entry.name.is_empty() {
                return Err(Error::Catalog("作品名が空です".into()));
            }
            if !names.insert(entry.name.to_lowercase()) {
                return Err(Error::Catalog(format!("作品名が重複しています: {}", entry.name)));
            }
            // 空白だけのタグは取り除かれている
            if entry.tags.is_empty() {
                return Err(Error::Catalog(format!("タグがありません: {}", entry.name)));
            }
        }

        Ok(Self { entries })
    }

    /// JSONからカタログを読み込み
    ///
    /// 形式: `{"artworks": [{"name": "...", "tags": ["...", ...]}]}`
    pub fn from_json(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.artworks)
    }

    /// JSON文字列へ変換
    pub fn to_json(&self) -> Result<String> {
        let file = CatalogFile {
            artworks: self.entries.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// 組み込みカタログ
    pub fn builtin() -> Self {
        let entries = BUILTIN_ARTWORKS
            .iter()
            .map(|(name, tags)| ArtworkEntry::new(*name, tags.iter().copied()))
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ArtworkEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// 作品名で検索（大文字小文字無視、前後空白無視）
    pub fn find(&self, name: &str) -> Option<&ArtworkEntry> {
        let needle = name.trim().to_lowercase();
        self.entries
            .iter()
            .find(|e| e.name.to_lowercase() == needle)
    }

    /// 全作品のタグ語彙（宣言順、正規化後に重複なし）
    pub fn tag_vocabulary(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .flat_map(|e| e.tags.iter())
            .filter(|t| seen.insert(normalize_tag(t)))
            .map(String::as_str)
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_ARTWORKS: &[(&str, &[&str])] = &[
    (
        "Starry Night",
        &[
            "starry-night", "van-gogh", "swirling-sky", "yellow-stars", "blue-sky",
            "cypress-tree", "village-at-night", "expressionist-art", "moon",
            "blue-and-yellow-painting", "famous-artwork", "post-impressionism",
            "hillside-village", "painted-nightscape", "dark-cypress", "vibrant-colours",
            "whirling-clouds", "iconic-night-scene", "yellow-moon", "star-filled-sky",
        ],
    ),
    (
        "Egyptian Style Statue",
        &[
            "metal-figurine", "brass-statue", "decorative-figure", "ethnic-art",
            "tribal-sculpture", "african-style-decor", "standing-statue",
            "woman-holding-bowl", "red-and-black-dress", "golden-bowl", "ornamental-design",
            "engraved-base", "metallic-doll", "colorful-tribal-figure", "curled-hair-metal",
            "beaded-neck-ring", "painted-metal-statue", "folk-art-sculpture",
            "traditional-costume", "bronze-body-figure",
        ],
    ),
    (
        "Toy Dog",
        &[
            "plush_dog", "brown_dog", "toy_dog", "fabric_dog", "stuffed_animal",
            "dog_doorstop", "fuzzy_ears", "long_snout", "short_legs", "black_nose",
            "bead_eyes", "stitched_mouth", "bow_collar", "leather_texture", "soft_toy",
            "dog_figurine", "cute_dog", "floppy_ears", "round_body", "miniature_dog",
        ],
    ),
    (
        "Sunflowers (Van Gogh)",
        &[
            "sunflowers", "vase with flowers", "cut flowers", "drooping sunflowers",
            "tightly packed bouquet", "green stems", "brown flower centers", "yellow petals",
            "wilted petals", "green sepals", "asymmetric flower positions",
            "monochromatic yellow scheme", "warm ochre background", "earthy tones",
            "muted greens", "light cream vase", "blue outline around vase",
            "subtle orange highlights", "low contrast shadows", "post-impressionist style",
            "Van Gogh signature on vase", "textured impasto brushwork",
            "visible directional strokes", "thick paint application",
            "organic irregular shapes",
        ],
    ),
    (
        "Liberty Leading the People",
        &[
            "romanticism", "oil painting", "large canvas", "historical painting",
            "Eugène Delacroix", "revolutionary scene", "French flag", "red white blue",
            "Liberty figure", "bare-breasted woman", "battlefield", "smoke and chaos",
            "dramatic lighting", "dynamic composition", "foreground bodies", "tricolour flag",
            "weaponry", "dark background", "heroic symbolism", "crowded scene",
        ],
    ),
    (
        "Mona Lisa",
        &[
            "portrait", "woman", "smile", "Leonardo da Vinci", "Renaissance", "oil painting",
            "dark clothing", "natural background", "realism", "subtle lighting", "sfumato",
            "soft shading", "classical art", "famous painting", "mystery", "brown tones",
            "long hair", "folded hands", "calm expression", "detailed brushwork",
        ],
    ),
    (
        "The Scream",
        &[
            "the scream", "edvard munch", "screaming figure", "hands on face", "open mouth",
            "oval head", "bulging eyes", "flowing robe", "twisting body", "wavy lines",
            "swirling sky", "orange sky", "vivid colours", "expressionist style",
            "emotional intensity", "distorted proportions", "bold brushstrokes",
            "contrasting tones", "isolated figure", "psychological expression",
        ],
    ),
];
