use anyhow::Context;

/// Ensures that `path` exists and is a regular file.
pub fn check_path<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        anyhow::bail!("Input file does not exist: {}", path.display());
    }
    if !path.is_file() {
        anyhow::bail!("Input path is not a file: {}", path.display());
    }
    anyhow::Ok(())
}

/// Creates the parent directory of `path` if it is missing.
pub fn ensure_parent_dir_exist<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
            println!("📁 Created output directory {}", parent.display());
        }
    }
    anyhow::Ok(())
}

/// Writes `data` to `path` through a temporary sibling file and a rename.
///
/// Either the complete file appears at `path` or nothing changes there; on
/// failure the temporary file is removed.
///
/// # Arguments
/// * `path` - Final location of the file.
/// * `data` - Complete file contents.
///
/// # Returns
/// * `anyhow::Result<()>` - Success or the I/O error, annotated with the path.
pub fn write_atomically<P: AsRef<std::path::Path>>(path: P, data: &[u8]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Output path has no file name: {}", path.display()))?;
    let mut tmp_name = std::ffi::OsString::from(".");
    tmp_name.push(file_name);
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let result = std::fs::write(&tmp_path, data)
        .and_then(|_| std::fs::rename(&tmp_path, path));
    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e).with_context(|| format!("Failed to write {}", path.display()));
    }
    anyhow::Ok(())
}
