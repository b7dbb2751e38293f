use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::buf::read_all_with;
use crate::cli::Mode;
use crate::codec::Lzw;
use crate::error::PsiError;
use crate::frame::{decode_with, encode_with, FrameConfig};

/// Read all of `source`, encode or decode it, and return the result.
pub fn process<R: Read>(
    mode: Mode,
    source: &mut R,
    config: &FrameConfig,
) -> Result<Vec<u8>, PsiError> {
    let data = read_all_with(source, config.read_capacity)?;
    debug!("read {} bytes", data.len());

    let out = match mode {
        Mode::Encode => encode_with(&Lzw, data.as_slice(), config)?.into_inner(),
        Mode::Decode => decode_with(&Lzw, data.as_slice(), config)?,
    };
    info!("{:?}: {} bytes in, {} bytes out", mode, data.len(), out.len());

    Ok(out)
}

/// Run one operation between files or stdin/stdout.
///
/// Nothing is written until the operation succeeded.
pub fn run(
    mode: Mode,
    input: Option<&Path>,
    output: Option<&Path>,
    config: &FrameConfig,
) -> Result<(), PsiError> {
    let out = match input {
        Some(path) => process(mode, &mut File::open(path)?, config)?,
        None => process(mode, &mut std::io::stdin().lock(), config)?,
    };

    match output {
        Some(path) => write_output(path, &out)?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&out)?;
            stdout.flush()?;
        }
    }

    Ok(())
}

// A new file gets the usual create mode, an existing regular file is replaced
// by a staged copy carrying its permissions, anything else (symlink, fifo,
// device) is written through in place.
fn write_output(path: &Path, data: &[u8]) -> Result<(), PsiError> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => Some(meta),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(e.into()),
    };

    match meta {
        None => {
            let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
            if let Err(e) = file.write_all(data).and_then(|()| file.flush()) {
                drop(file);
                let _ = fs::remove_file(path);
                return Err(e.into());
            }
            debug!("created {}", path.display());
        }
        Some(meta) if meta.file_type().is_file() => {
            let dir = match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir,
                _ => Path::new("."),
            };

            let mut staged = NamedTempFile::new_in(dir)?;
            staged.write_all(data)?;
            staged.flush()?;
            staged.as_file().set_permissions(meta.permissions())?;
            staged.persist(path).map_err(|e| e.error)?;
            debug!("replaced {}", path.display());
        }
        Some(_) => {
            let mut file = OpenOptions::new().write(true).truncate(true).open(path)?;
            file.write_all(data)?;
            file.flush()?;
            debug!("wrote through {}", path.display());
        }
    }

    Ok(())
}
