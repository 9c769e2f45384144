//! Move the engine's output to the requested destination

use std::fs::{File, Permissions};
use std::io;
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};

/// Copy `output` to `dest`, honoring the overwrite policy
///
/// The bytes are first copied into a temporary file next to `dest`, which
/// is then renamed over it. A failure at any point leaves an existing
/// destination untouched. With `overwrite` disabled an existing destination
/// is a [`Error::DestinationExists`] error, including one that appears
/// while the copy is in progress.
///
/// A replaced destination keeps its permissions; a new one gets the
/// process default for new files (`0o666` less the umask on Unix).
pub fn finalize(output: &Path, dest: &Path, overwrite: bool) -> Result<()> {
    let exists = dest
        .try_exists()
        .map_err(|e| Error::io("failed to check if destination PDF file exists", e))?;
    if exists && !overwrite {
        return Err(Error::DestinationExists(dest.to_path_buf()));
    }

    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let existing = if exists {
        let metadata = std::fs::metadata(dest)
            .map_err(|e| Error::io("failed to read destination PDF file permissions", e))?;
        Some(metadata.permissions())
    } else {
        None
    };

    let mut builder = tempfile::Builder::new();
    builder.prefix(".pdf-fill-").suffix(".pdf");
    if existing.is_none() {
        if let Some(permissions) = new_file_permissions() {
            builder.permissions(permissions);
        }
    }
    let mut staged = builder
        .tempfile_in(parent)
        .map_err(|e| Error::io("failed to copy created output PDF to final destination", e))?;
    let mut source = File::open(output)
        .map_err(|e| Error::io("failed to copy created output PDF to final destination", e))?;
    let copied = io::copy(&mut source, staged.as_file_mut())
        .and_then(|n| staged.as_file().sync_all().map(|()| n))
        .map_err(|e| Error::io("failed to copy created output PDF to final destination", e))?;
    if let Some(permissions) = existing {
        staged
            .as_file()
            .set_permissions(permissions)
            .map_err(|e| Error::io("failed to copy destination PDF file permissions", e))?;
    }

    let persisted = if overwrite {
        staged.persist(dest)
    } else {
        staged.persist_noclobber(dest)
    };
    persisted.map_err(|e| {
        if e.error.kind() == io::ErrorKind::AlreadyExists {
            Error::DestinationExists(dest.to_path_buf())
        } else {
            Error::io("failed to move output PDF into place", e.error)
        }
    })?;

    debug!("Wrote {} bytes to {}", copied, dest.display());
    Ok(())
}

/// Mode requested for a new destination; the OS applies the umask
#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o666))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}
