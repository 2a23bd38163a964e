//! 作品判定
//!
//! 3方式:
//! - Tags: 画像からタグを抽出 → ローカルでタグ重複数判定（正式）
//! - Describe: 画像説明 → 説明文から候補を選ばせる
//! - Classify: タグ一覧付きシステム指示で画像を直接分類
//!
//! サービス応答は必ずカタログと照合する。通信失敗は Err、該当なしは MatchOutcome::NoMatch

mod types;

pub use types::Identification;

use crate::config::Config;
use crate::error::{ArtworkMatchError, Result};
use crate::normalizer::EncodedImage;
use crate::service::{ChatRequest, VisionService};
use crate::strategy::MatchStrategy;
use artwork_match_common::{
    build_choice_prompt, build_classifier_prompt, build_tag_extraction_prompt, coerce_classifier_label, match_tags,
    parse_choice_response, parse_classifier_response, parse_tags_response, Catalog, MatchOutcome,
    CLASSIFY_USER_PROMPT, DESCRIBE_PROMPT, DEFAULT_TAG_THRESHOLD,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatcherSettings {
    pub describe_max_tokens: u32,
    pub choice_max_tokens: u32,
    pub classify_max_tokens: u32,
    pub tags_max_tokens: u32,
    pub tag_threshold: usize,
}

impl Default for MatcherSettings {
    fn default() -> Self {
        Self {
            describe_max_tokens: 300,
            choice_max_tokens: 20,
            classify_max_tokens: 20,
            tags_max_tokens: 300,
            tag_threshold: DEFAULT_TAG_THRESHOLD,
        }
    }
}

impl From<&Config> for MatcherSettings {
    fn from(config: &Config) -> Self {
        Self {
            describe_max_tokens: config.describe_max_tokens,
            choice_max_tokens: config.choice_max_tokens,
            classify_max_tokens: config.classify_max_tokens,
            tags_max_tokens: config.tags_max_tokens,
            tag_threshold: config.tag_threshold,
        }
    }
}

pub struct Matcher<S> {
    service: S,
    catalog: Arc<Catalog>,
    settings: MatcherSettings,
}

impl<S: VisionService> Matcher<S> {
    pub fn new(service: S, catalog: Arc<Catalog>, settings: MatcherSettings) -> Self {
        Self {
            service,
            catalog,
            settings,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn identify(&self, image: EncodedImage, strategy: MatchStrategy) -> Result<Identification> {
        match strategy {
            MatchStrategy::Tags => self.match_by_tags(image).await,
            MatchStrategy::Describe => self.describe_and_choose(image).await,
            MatchStrategy::Classify => self.classify(image).await,
        }
    }

    /// 画像の説明文を取得
    pub async fn describe(&self, image: EncodedImage) -> Result<String> {
        let request = ChatRequest::with_image(DESCRIBE_PROMPT, image, self.settings.describe_max_tokens);
        self.service.complete(request).await
    }

    /// 説明文から候補を1つ選ばせる
    pub async fn choose(&self, description: &str) -> Result<(MatchOutcome, String)> {
        let prompt = build_choice_prompt(description, &self.catalog);
        let request = ChatRequest::text(prompt, self.settings.choice_max_tokens);
        let raw = self.service.complete(request).await?;
        let outcome = parse_choice_response(&raw, &self.catalog);
        if let MatchOutcome::Unexpected { raw } = &outcome {
            tracing::warn!(response = %raw, "候補外の応答");
        }
        Ok((outcome, raw.trim().to_string()))
    }

    pub async fn describe_and_choose(&self, image: EncodedImage) -> Result<Identification> {
        let description = self.describe(image).await?;
        tracing::debug!(chars = description.len(), "画像説明を取得");

        let (outcome, raw) = self.choose(&description).await?;
        let mut identification = Identification::new(MatchStrategy::Describe, outcome, raw);
        identification.description = Some(description);
        Ok(identification)
    }

    /// タグ一覧付きのシステム指示で画像を直接分類
    pub async fn classify(&self, image: EncodedImage) -> Result<Identification> {
        let request = ChatRequest::with_image(CLASSIFY_USER_PROMPT, image, self.settings.classify_max_tokens)
            .with_system(build_classifier_prompt(&self.catalog));
        let raw = self.service.complete(request).await?;
        let outcome = parse_classifier_response(&raw, &self.catalog);
        if let MatchOutcome::Unexpected { raw } = &outcome {
            tracing::warn!(response = %raw, "候補外の応答（wallとして扱う）");
        }
        let mut identification = Identification::new(MatchStrategy::Classify, outcome, raw.trim());
        identification.classifier_label = Some(coerce_classifier_label(&raw, &self.catalog));
        Ok(identification)
    }

    /// 画像からタグを抽出し、ローカルでタグ重複数判定
    pub async fn match_by_tags(&self, image: EncodedImage) -> Result<Identification> {
        let prompt = build_tag_extraction_prompt(&self.catalog);
        let request = ChatRequest::with_image(prompt, image, self.settings.tags_max_tokens);
        let raw = self.service.complete(request).await?;
        let tags = parse_tags_response(&raw)
            .map_err(|e| ArtworkMatchError::ServiceResponse(e.to_string()))?;
        tracing::debug!(?tags, "観測タグ");

        let tag_match = match_tags(&tags, &self.catalog, self.settings.tag_threshold);
        let outcome = match &tag_match.matched_name {
            Some(name) => MatchOutcome::matched(name.clone()),
            None => MatchOutcome::NoMatch,
        };

        let mut identification = Identification::new(MatchStrategy::Tags, outcome, raw.trim());
        identification.tag_match = Some(tag_match);
        Ok(identification)
    }
}
