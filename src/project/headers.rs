use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    NothingToCopy,
    Cancelled,
    Copied(usize),
}

fn is_native_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("cpp") | Some("h")
    )
}

/// `.cpp` and `.h` files directly inside `dir`, sorted by name.
pub fn native_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_native_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Copy the project's hand-written native files into the build tree.
///
/// The source directory is created when missing. Unless `assume_yes`, the
/// user is asked first and answering `n` cancels.
pub fn install_headers<R: BufRead, W: Write>(
    src_dir: &Path,
    dest_dir: &Path,
    assume_yes: bool,
    input: &mut R,
    output: &mut W,
) -> io::Result<InstallOutcome> {
    if !src_dir.exists() {
        fs::create_dir_all(src_dir)?;
        info!("Created {}", src_dir.display());
    }

    let files = native_files(src_dir)?;
    info!("Found {} file(s) to copy", files.len());
    if files.is_empty() {
        return Ok(InstallOutcome::NothingToCopy);
    }

    if !assume_yes {
        write!(output, "Do you really want to copy the files? [Y/n] ")?;
        output.flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if answer.trim() == "n" {
            info!("Copying canceled");
            return Ok(InstallOutcome::Cancelled);
        }
    }

    fs::create_dir_all(dest_dir)?;
    let total = files.len();
    for (i, src) in files.iter().enumerate() {
        let Some(name) = src.file_name() else {
            continue;
        };
        info!("Copying {} ({}/{})", name.to_string_lossy(), i + 1, total);
        fs::copy(src, dest_dir.join(name))?;
    }
    Ok(InstallOutcome::Copied(total))
}
