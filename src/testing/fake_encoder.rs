//! Shell scripts that accept an ffmpeg argument list

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use crate::errors::Result;

/// Copies stdin into its last argument, which every ffmpeg invocation built
/// by this crate uses as the output path
const COPYING_SCRIPT: &str = "#!/bin/sh\nfor last; do :; done\nexec cat > \"$last\"\n";

/// Writes a stand-in encoder into `dir` and returns its path
pub fn fake_encoder(dir: &Path) -> Result<PathBuf> {
    write_script(dir, "fake-ffmpeg", COPYING_SCRIPT)
}

/// Writes an encoder that exits immediately with `code` without reading
/// stdin, the way a crashed or misconfigured ffmpeg would
pub fn exiting_encoder(dir: &Path, code: i32) -> Result<PathBuf> {
    write_script(
        dir,
        &format!("exit-{}-ffmpeg", code),
        &format!("#!/bin/sh\nexit {}\n", code),
    )
}

fn write_script(dir: &Path, name: &str, body: &str) -> Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, body)?;
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
    Ok(path)
}
