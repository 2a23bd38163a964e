use crate::error::{ArtworkMatchError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub file_name: String,
}

impl ImageInfo {
    fn from_path(path: &Path) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path: path.to_path_buf(),
            file_name,
        }
    }
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "JPG", "JPEG", "PNG"];

fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext)
}

/// 入力パスを画像リストに展開
///
/// ファイルはそのまま1件（拡張子は問わない。デコード可否は正規化時に判定）、
/// フォルダは直下の画像を列挙する
pub fn collect_inputs(path: &Path) -> Result<Vec<ImageInfo>> {
    if path.is_file() {
        return Ok(vec![ImageInfo::from_path(path)]);
    }
    if !path.exists() {
        return Err(ArtworkMatchError::NotFound(path.display().to_string()));
    }

    let images = scan_folder(path)?;
    if images.is_empty() {
        return Err(ArtworkMatchError::NoImagesFound(path.display().to_string()));
    }
    Ok(images)
}

pub fn scan_folder(folder: &Path) -> Result<Vec<ImageInfo>> {
    if !folder.is_dir() {
        return Err(ArtworkMatchError::FolderNotFound(folder.display().to_string()));
    }

    let mut images = Vec::new();

    for entry in WalkDir::new(folder)
        .max_depth(1)  // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            if is_image_extension(&ext.to_string_lossy()) {
                images.push(ImageInfo::from_path(path));
            }
        }
    }

    // ファイル名でソート
    images.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    Ok(images)
}
