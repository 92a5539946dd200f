use std::fs::{self, create_dir_all, File};
use std::io::{self, Error, ErrorKind, Result};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

fn invalid_archive(e: ZipError) -> Error {
    Error::new(ErrorKind::InvalidData, format!("not a supported archive: {}", e))
}

/// Extracts `archive_path` into `dest`. Entries that would escape `dest` are
/// skipped.
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file).map_err(invalid_archive)?;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(invalid_archive)?;
        let rel = match entry.enclosed_name() {
            Some(rel) => rel,
            None => continue,
        };
        let out_path = dest.join(rel);
        if entry.is_dir() {
            create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                create_dir_all(parent)?;
            }
            let mut out = File::create(&out_path)?;
            io::copy(&mut entry, &mut out)?;
        }
    }
    Ok(())
}

/// Compresses the contents of `src` (not the directory itself) into a zip at
/// `dest`, truncating any existing file there.
pub fn zip_dir(src: &Path, dest: &Path) -> Result<()> {
    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(file);
    zip_dir_inner(&mut zip, src, src)?;
    zip.finish()
        .map_err(|e| Error::new(ErrorKind::Other, format!("failed to finish zip: {}", e)))?;
    Ok(())
}

fn zip_dir_inner(zip: &mut ZipWriter<File>, dir: &Path, base: &Path) -> Result<()> {
    let options = SimpleFileOptions::default();
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .collect::<io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    paths.sort();

    for path in paths {
        let rel = path
            .strip_prefix(base)
            .map_err(|e| Error::new(ErrorKind::Other, e.to_string()))?;
        let name = rel.to_string_lossy().to_string();
        if path.is_dir() {
            zip.add_directory(name, options)
                .map_err(|e| Error::new(ErrorKind::Other, e.to_string()))?;
            zip_dir_inner(zip, &path, base)?;
        } else {
            zip.start_file(name, options)
                .map_err(|e| Error::new(ErrorKind::Other, e.to_string()))?;
            let mut f = File::open(&path)?;
            io::copy(&mut f, zip)?;
        }
    }
    Ok(())
}

pub fn copy_dir_all(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
    fs::create_dir_all(&dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        if ty.is_dir() {
            copy_dir_all(entry.path(), dst.as_ref().join(entry.file_name()))?;
        } else {
            fs::copy(entry.path(), dst.as_ref().join(entry.file_name()))?;
        }
    }
    Ok(())
}

/// A submission root staged for one run. When the root was extracted or
/// copied into scratch space, the backing `TempDir` deletes the whole tree as
/// the run ends; a directory used in place is left alone.
#[derive(Debug)]
pub struct StagedRoot {
    path: PathBuf,
    _scratch: Option<TempDir>,
}

impl StagedRoot {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Stages an input for read-only traversal: a zip is extracted into scratch
/// space, a plain directory is used where it stands.
pub fn stage_root(input: &Path) -> Result<StagedRoot> {
    if input.is_dir() {
        return Ok(StagedRoot {
            path: input.to_path_buf(),
            _scratch: None,
        });
    }
    if !input.is_file() {
        return Err(Error::new(
            ErrorKind::NotFound,
            format!("{:?} doesn't exist or couldn't be opened", input),
        ));
    }
    let scratch = TempDir::new()?;
    extract_zip(input, scratch.path())?;
    Ok(StagedRoot {
        path: scratch.path().to_path_buf(),
        _scratch: Some(scratch),
    })
}

/// Stages an input for a run that renames entries. The working tree is always
/// a scratch copy, so the original input is never mutated.
pub fn stage_mutable_root(input: &Path) -> Result<StagedRoot> {
    let scratch = TempDir::new()?;
    if input.is_dir() {
        copy_dir_all(input, scratch.path())?;
    } else if input.is_file() {
        extract_zip(input, scratch.path())?;
    } else {
        return Err(Error::new(
            ErrorKind::NotFound,
            format!("{:?} doesn't exist or couldn't be opened", input),
        ));
    }
    Ok(StagedRoot {
        path: scratch.path().to_path_buf(),
        _scratch: Some(scratch),
    })
}
