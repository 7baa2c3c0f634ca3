use crate::domain::ports::Storage;
use crate::utils::error::{ExportError, Result};
use std::io::Write;
use std::path::Path;

/// Destination meaning "write to stdout".
pub const STDOUT_PATH: &str = "-";

/// Filesystem storage. File writes go through a temp file in the target
/// directory and are renamed into place, so readers never see a partial file.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn exists(&self, path: &str) -> bool {
        path != STDOUT_PATH && Path::new(path).exists()
    }

    async fn write_file(&self, path: &str, data: &[u8], overwrite: bool) -> Result<()> {
        if path == STDOUT_PATH {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
            return Ok(());
        }

        if !overwrite && self.exists(path) {
            return Err(ExportError::OutputExistsError {
                path: path.to_string(),
            });
        }

        let target = Path::new(path);
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let base = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "export".to_string());
        let mut tmp = tempfile::Builder::new()
            .prefix(&format!("{}.tmp-", base))
            .tempfile_in(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))?;
        }

        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;

        if overwrite {
            tmp.persist(target).map_err(|e| e.error)?;
        } else {
            tmp.persist_noclobber(target).map_err(|e| {
                if e.error.kind() == std::io::ErrorKind::AlreadyExists {
                    ExportError::OutputExistsError {
                        path: path.to_string(),
                    }
                } else {
                    ExportError::IoError(e.error)
                }
            })?;
        }

        tracing::debug!("Wrote {} bytes to {}", data.len(), path);
        Ok(())
    }
}
