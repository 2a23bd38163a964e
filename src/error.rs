use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArtworkMatchError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。環境変数 OPENAI_API_KEY か `artwork-match config --set-api-key YOUR_KEY` で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    NotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("画像デコードエラー: {0}")]
    ImageDecode(String),

    #[error("画像エンコードエラー: {0}")]
    ImageEncode(String),

    #[error("API呼び出しエラー: {0}")]
    ServiceCall(String),

    #[error("APIレスポンスが不正: {0}")]
    ServiceResponse(String),

    #[error("カタログが不正: {0}")]
    Catalog(String),

    #[error("{failed}/{total}件の画像で判定に失敗しました")]
    PartialFailure { failed: usize, total: usize },

    #[error("カメラエラー: {0}")]
    Camera(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] artwork_match_common::Error),
}

impl ArtworkMatchError {
    /// サービス到達不能・応答不正など、判定結果ではなく通信側の失敗か
    pub fn is_service_failure(&self) -> bool {
        matches!(self, Self::ServiceCall(_) | Self::ServiceResponse(_))
    }
}

pub type Result<T> = std::result::Result<T, ArtworkMatchError>;
