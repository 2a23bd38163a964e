//! Webカメラ取り込みループ
//!
//! 状態は Idle（プレビュー中）と Captured（判定中）の2つ。
//! - Idle で取り込みキー → フレームを固定パスに上書き保存し、判定をバックグラウンドで開始
//! - 判定が終わると（成功・失敗とも）Idle に戻る
//! - 終了キーはどの状態でもループを抜け、実行中の判定は中断する

#[cfg(feature = "camera")]
mod opencv_camera;

#[cfg(feature = "camera")]
pub use opencv_camera::OpenCvCamera;

use crate::error::{ArtworkMatchError, Result};
use crate::matcher::{Identification, Matcher};
use crate::normalizer::{normalize_path, NormalizeOptions};
use crate::service::VisionService;
use crate::strategy::MatchStrategy;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const CAPTURE_FILE_NAME: &str = "artwork-match-capture.jpg";

pub fn default_capture_path() -> PathBuf {
    std::env::temp_dir().join(CAPTURE_FILE_NAME)
}

/// カメラから取得した1フレーム
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// JPEGとして書き出す（既存ファイルは上書き）。フレームはここで破棄される
    pub fn write_jpeg(self, path: &Path) -> Result<()> {
        DynamicImage::ImageRgb8(self.image)
            .save_with_format(path, ImageFormat::Jpeg)
            .map_err(|e| ArtworkMatchError::ImageEncode(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKey {
    Capture,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Captured,
}

/// カメラデバイス
///
/// デバイスは排他的に保持し、Drop で解放する
pub trait CaptureDevice {
    fn read_frame(&mut self) -> Result<Frame>;
    fn show_preview(&mut self, frame: &Frame, state: CaptureState) -> Result<()>;
    fn poll_key(&mut self) -> Result<Option<CaptureKey>>;
}

/// ループからの通知
#[derive(Debug)]
pub enum CaptureReport {
    Captured { sequence: u64, path: PathBuf },
    Classified { sequence: u64, result: Result<Identification> },
    Cancelled { sequence: u64 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureSummary {
    pub captures: u64,
    pub completed: u64,
    pub cancelled: u64,
}

type InFlight = Option<(u64, JoinHandle<Result<Identification>>)>;

pub struct CaptureLoop<D, S> {
    device: D,
    matcher: Arc<Matcher<S>>,
    strategy: MatchStrategy,
    capture_path: PathBuf,
    options: NormalizeOptions,
    tick: Duration,
}

impl<D, S> CaptureLoop<D, S>
where
    D: CaptureDevice,
    S: VisionService + 'static,
{
    pub fn new(device: D, matcher: Arc<Matcher<S>>, strategy: MatchStrategy) -> Self {
        Self {
            device,
            matcher,
            strategy,
            capture_path: default_capture_path(),
            options: NormalizeOptions::default(),
            tick: Duration::from_millis(30),
        }
    }

    pub fn capture_path(mut self, path: PathBuf) -> Self {
        self.capture_path = path;
        self
    }

    pub fn normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// 終了キーまたはデバイスエラーまでループ
    pub async fn run<F>(mut self, mut on_report: F) -> Result<CaptureSummary>
    where
        F: FnMut(CaptureReport),
    {
        let mut summary = CaptureSummary::default();
        let mut in_flight: InFlight = None;

        let result = self.poll_loop(&mut in_flight, &mut summary, &mut on_report).await;

        if let Some((sequence, handle)) = in_flight.take() {
            handle.abort();
            summary.cancelled += 1;
            tracing::info!(sequence, "判定を中断");
            on_report(CaptureReport::Cancelled { sequence });
        }

        result.map(|_| summary)
    }

    async fn poll_loop<F>(
        &mut self,
        in_flight: &mut InFlight,
        summary: &mut CaptureSummary,
        on_report: &mut F,
    ) -> Result<()>
    where
        F: FnMut(CaptureReport),
    {
        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut state = CaptureState::Idle;

        loop {
            interval.tick().await;

            if in_flight.as_ref().is_some_and(|(_, handle)| handle.is_finished()) {
                if let Some((sequence, handle)) = in_flight.take() {
                    let result = handle.await.unwrap_or_else(|e| {
                        Err(ArtworkMatchError::ServiceCall(format!("判定タスクが異常終了: {}", e)))
                    });
                    summary.completed += 1;
                    on_report(CaptureReport::Classified { sequence, result });
                }
                state = CaptureState::Idle;
            }

            let frame = self.device.read_frame()?;
            self.device.show_preview(&frame, state)?;

            match self.device.poll_key()? {
                Some(CaptureKey::Exit) => {
                    tracing::debug!("終了キー");
                    return Ok(());
                }
                Some(CaptureKey::Capture) if state == CaptureState::Idle => {
                    summary.captures += 1;
                    let sequence = summary.captures;

                    match self.start_classification(frame) {
                        Ok(handle) => {
                            on_report(CaptureReport::Captured {
                                sequence,
                                path: self.capture_path.clone(),
                            });
                            *in_flight = Some((sequence, handle));
                            state = CaptureState::Captured;
                        }
                        Err(e) => {
                            summary.completed += 1;
                            on_report(CaptureReport::Classified {
                                sequence,
                                result: Err(e),
                            });
                        }
                    }
                }
                Some(CaptureKey::Capture) => {
                    tracing::debug!("判定中のため取り込みを無視");
                }
                None => {}
            }
        }
    }

    /// フレームを固定パスに上書きし、そのファイルだけを正規化して判定タスクを起動
    fn start_classification(&self, frame: Frame) -> Result<JoinHandle<Result<Identification>>> {
        frame.write_jpeg(&self.capture_path)?;
        let image = normalize_path(&self.capture_path, self.options)?;

        let matcher = Arc::clone(&self.matcher);
        let strategy = self.strategy;
        Ok(tokio::spawn(async move { matcher.identify(image, strategy).await }))
    }
}
