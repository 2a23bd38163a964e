//! 外部ビジョンサービス連携
//!
//! 1回の判定につき1リクエスト。リクエストはテキストのみ、またはテキスト+画像（data URI）

mod openai;

pub use openai::OpenAiClient;

use crate::error::Result;
use crate::normalizer::EncodedImage;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// `data:image/jpeg;base64,...`
    ImageUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// テキストのみのリクエスト
    pub fn text(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            max_tokens,
            messages: vec![ChatMessage {
                role: Role::User,
                content: vec![ContentPart::Text(prompt.into())],
            }],
        }
    }

    /// テキスト+画像のリクエスト（画像はここで消費される）
    pub fn with_image(prompt: impl Into<String>, image: EncodedImage, max_tokens: u32) -> Self {
        Self {
            max_tokens,
            messages: vec![ChatMessage {
                role: Role::User,
                content: vec![
                    ContentPart::Text(prompt.into()),
                    ContentPart::ImageUrl(image.into_data_url()),
                ],
            }],
        }
    }

    /// 先頭にシステム指示を追加
    pub fn with_system(mut self, instruction: impl Into<String>) -> Self {
        self.messages.insert(
            0,
            ChatMessage {
                role: Role::System,
                content: vec![ContentPart::Text(instruction.into())],
            },
        );
        self
    }

    pub fn has_image(&self) -> bool {
        self.messages
            .iter()
            .flat_map(|m| m.content.iter())
            .any(|p| matches!(p, ContentPart::ImageUrl(_)))
    }
}

/// 自由文の応答を1つ返す推論サービス
pub trait VisionService: Send + Sync {
    fn complete(&self, request: ChatRequest) -> impl Future<Output = Result<String>> + Send;
}
