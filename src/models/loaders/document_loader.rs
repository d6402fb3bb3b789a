use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult, BackendError, FileError};

/// PDF 文件头
const PDF_MAGIC: &[u8] = b"%PDF";

/// 读取待导入文档的原始字节
pub async fn read_document_bytes(path: &Path) -> AppResult<Vec<u8>> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(FileError::NotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let bytes = fs::read(path)
        .await
        .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

    debug!("已读取文档 {} ({} 字节)", path.display(), bytes.len());
    Ok(bytes)
}

/// 从文档字节中提取纯文本
///
/// 以 `%PDF` 开头的按 PDF 解析，否则必须是 UTF-8 文本（课堂笔记等）。
/// 提取结果为空视为无法读取。
pub fn extract_text(bytes: &[u8]) -> Result<String, BackendError> {
    if bytes.is_empty() {
        return Err(BackendError::DocumentUnreadable {
            reason: "文件为空".to_string(),
        });
    }

    let text = if bytes.starts_with(PDF_MAGIC) {
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
            BackendError::DocumentUnreadable {
                reason: format!("PDF 解析失败: {}", e),
            }
        })?
    } else {
        String::from_utf8(bytes.to_vec()).map_err(|_| BackendError::DocumentUnreadable {
            reason: "既不是 PDF 也不是 UTF-8 文本".to_string(),
        })?
    };

    if text.trim().is_empty() {
        return Err(BackendError::DocumentUnreadable {
            reason: "文档中没有可提取的文字（可能是扫描件）".to_string(),
        });
    }

    Ok(text)
}

/// 文件名（不含目录），用于展示
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}
