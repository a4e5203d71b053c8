use idl_gen::GeneratedFile;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Where `file` should be written inside `dir`. An existing developer file
/// is preserved unless `overwrite` is set: the new skeleton goes next to it
/// as `*Copy.cc`.
pub fn target_path(dir: &Path, file: &GeneratedFile, overwrite: bool) -> PathBuf {
    let path = dir.join(&file.name);
    if !file.editable || overwrite || !path.exists() {
        return path;
    }
    let copy = match file.name.strip_suffix(".cc") {
        Some(stem) => format!("{}Copy.cc", stem),
        None => format!("{}Copy", file.name),
    };
    warn!(
        "{} already exists; writing the new skeleton to {}",
        path.display(),
        copy
    );
    dir.join(copy)
}

/// Write every file, creating `dir` if needed. Returns the paths written.
pub fn write_files(
    dir: &Path,
    files: &[GeneratedFile],
    overwrite: bool,
) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = target_path(dir, file, overwrite);
        std::fs::write(&path, &file.contents)?;
        info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
