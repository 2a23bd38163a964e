//! Artwork Match Common Library
//!
//! CLIとWebカメラ入力で共有される、I/Oを伴わない判定ロジック

pub mod catalog;
pub mod error;
pub mod parser;
pub mod prompts;
pub mod tag_match;
pub mod types;

pub use catalog::{normalize_tag, ArtworkEntry, Catalog};
pub use error::{Error, Result};
pub use parser::{
    coerce_classifier_label, extract_json, parse_choice_response, parse_classifier_response,
    parse_tags_response,
};
pub use prompts::{
    build_choice_prompt, build_classifier_prompt, build_tag_extraction_prompt,
    CLASSIFY_USER_PROMPT, DESCRIBE_PROMPT,
};
pub use tag_match::{match_tags, overlap, TagMatch, TagScore, DEFAULT_TAG_THRESHOLD};
pub use types::{
    MatchOutcome, MatchResult, NOTHING_FOUND_SENTINEL, NO_MATCH_SENTINEL, WALL_SENTINEL,
};
