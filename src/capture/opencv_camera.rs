//! OpenCVによるWebカメラ入力
//!
//! `c` またはスペースで取り込み、`q` または Esc で終了

use super::{CaptureDevice, CaptureKey, CaptureState, Frame};
use crate::error::{ArtworkMatchError, Result};
use image::RgbImage;
use opencv::core::{Mat, Point, Scalar};
use opencv::prelude::*;
use opencv::{highgui, imgproc, videoio};

const WINDOW_NAME: &str = "artwork-match";
const KEY_ESC: i32 = 27;

fn camera_error(e: opencv::Error) -> ArtworkMatchError {
    ArtworkMatchError::Camera(e.to_string())
}

pub struct OpenCvCamera {
    capture: videoio::VideoCapture,
    /// 最後に読み込んだBGRフレーム（プレビュー表示用）
    preview: Mat,
}

impl OpenCvCamera {
    /// カメラを開く（失敗時は起動エラー）
    pub fn open(index: i32) -> Result<Self> {
        let capture = videoio::VideoCapture::new(index, videoio::CAP_ANY).map_err(camera_error)?;
        if !capture.is_opened().map_err(camera_error)? {
            return Err(ArtworkMatchError::Camera(format!("カメラ {} を開けません", index)));
        }

        highgui::named_window(WINDOW_NAME, highgui::WINDOW_AUTOSIZE).map_err(camera_error)?;
        tracing::info!(index, "カメラを開きました");

        Ok(Self {
            capture,
            preview: Mat::default(),
        })
    }
}

impl CaptureDevice for OpenCvCamera {
    fn read_frame(&mut self) -> Result<Frame> {
        let ok = self.capture.read(&mut self.preview).map_err(camera_error)?;
        if !ok || self.preview.empty() {
            return Err(ArtworkMatchError::Camera("フレームを取得できません".into()));
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color(&self.preview, &mut rgb, imgproc::COLOR_BGR2RGB, 0).map_err(camera_error)?;

        let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
        let data = rgb.data_bytes().map_err(camera_error)?.to_vec();
        let image = RgbImage::from_raw(width, height, data)
            .ok_or_else(|| ArtworkMatchError::Camera("フレームサイズが不正です".into()))?;

        Ok(Frame::new(image))
    }

    fn show_preview(&mut self, _frame: &Frame, state: CaptureState) -> Result<()> {
        let label = match state {
            CaptureState::Idle => "[c] capture  [q] quit",
            CaptureState::Captured => "classifying...",
        };
        imgproc::put_text(
            &mut self.preview,
            label,
            Point::new(10, 30),
            imgproc::FONT_HERSHEY_SIMPLEX,
            0.8,
            Scalar::new(0.0, 255.0, 0.0, 0.0),
            2,
            imgproc::LINE_8,
            false,
        )
        .map_err(camera_error)?;

        highgui::imshow(WINDOW_NAME, &self.preview).map_err(camera_error)
    }

    fn poll_key(&mut self) -> Result<Option<CaptureKey>> {
        let key = highgui::wait_key(1).map_err(camera_error)?;
        Ok(match key {
            k if k == 'c' as i32 || k == ' ' as i32 => Some(CaptureKey::Capture),
            k if k == 'q' as i32 || k == KEY_ESC => Some(CaptureKey::Exit),
            _ => None,
        })
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        if let Err(e) = self.capture.release() {
            tracing::warn!("カメラ解放エラー: {}", e);
        }
        let _ = highgui::destroy_window(WINDOW_NAME);
    }
}
