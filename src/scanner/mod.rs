use crate::error::{MatchAppError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct InquiryFile {
    pub path: PathBuf,
    pub file_name: String,
}

const INQUIRY_EXTENSIONS: &[&str] = &["txt", "TXT"];

fn is_inquiry_extension(ext: &str) -> bool {
    INQUIRY_EXTENSIONS.contains(&ext)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 問い合わせファイルを集める
///
/// 単一ファイルならそのまま返す（拡張子は問わない）。
/// フォルダなら `.txt` を集めてファイル名順に並べる。
pub fn scan_inquiries(input: &Path, recursive: bool) -> Result<Vec<InquiryFile>> {
    if input.is_file() {
        return Ok(vec![InquiryFile {
            path: input.to_path_buf(),
            file_name: file_name_of(input),
        }]);
    }

    if !input.exists() {
        return Err(MatchAppError::FolderNotFound(input.display().to_string()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files = Vec::new();

    for entry in WalkDir::new(input)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        if let Some(ext) = path.extension() {
            if is_inquiry_extension(&ext.to_string_lossy()) {
                files.push(InquiryFile {
                    path: path.to_path_buf(),
                    file_name: file_name_of(path),
                });
            }
        }
    }

    // ファイル名でソート（同名はパスで）
    files.sort_by(|a, b| a.file_name.cmp(&b.file_name).then_with(|| a.path.cmp(&b.path)));

    Ok(files)
}
