use crate::settings::{Credentials, PartialCredentials};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, ErrorKind, Write};
use std::path::{Path, PathBuf};

const SCRATCH_PREFIX: &str = ".tabripper-";
const MAX_SUFFIX: usize = 10_000;
/// Leaves room for ` (n)` and the extension under the usual 255-byte limit.
const MAX_STEM_BYTES: usize = 200;

/// Read a single trimmed line from `reader`.
pub fn input<R: BufRead>(reader: &mut R) -> io::Result<String> {
    let mut input = String::new();
    if reader.read_line(&mut input)? == 0 {
        return Err(io::Error::new(
            ErrorKind::UnexpectedEof,
            "input closed before a value was entered",
        ));
    }
    Ok(input.trim().to_string())
}

/// Fill in whatever the config file left out by asking on the console.
///
/// With `hidden` set the password is read from the terminal without echo,
/// otherwise it is read from `reader` like the username.
pub fn credentials<R: BufRead>(
    partial: &PartialCredentials,
    mut reader: R,
    hidden: bool,
) -> io::Result<Credentials> {
    let username = match &partial.username {
        Some(username) => username.clone(),
        None => {
            print!("Enter your username: ");
            io::stdout().flush()?;
            input(&mut reader)?
        }
    };

    let password = match &partial.password {
        Some(password) => password.clone(),
        None if hidden => rpassword::prompt_password("Enter your password: ")?,
        None => {
            print!("Enter your password: ");
            io::stdout().flush()?;
            input(&mut reader)?
        }
    };

    Ok(Credentials { username, password })
}

/// Expand a leading `~` and make `path` absolute against the current directory.
pub fn expand_path(path: &str) -> io::Result<PathBuf> {
    let path = match path.strip_prefix('~') {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "no home directory"))?;
            home.join(rest.trim_start_matches(['/', '\\']))
        }
        None => PathBuf::from(path),
    };

    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Create `dir` (and its parents) if absent, then prove it is writable by
/// creating a scratch file in it. The scratch file has a fresh name and is
/// removed again when dropped.
pub fn guarantee_dir_path(dir: PathBuf) -> io::Result<PathBuf> {
    fs::create_dir_all(&dir)?;
    tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempfile_in(&dir)?
        .close()?;
    Ok(dir)
}

/// Turn a tab title into something usable as a file stem on every platform.
pub fn sanitize(title: &str) -> String {
    let options = sanitize_filename::Options {
        truncate: true,
        windows: true,
        replacement: "_",
    };
    sanitize_filename::sanitize_with_options(title.trim(), options)
        .trim()
        .to_string()
}

/// Create `dir/stem.ext` without ever replacing an existing file. When the
/// name is taken, ` (2)`, ` (3)`, ... is appended to the stem.
pub fn create_unique(dir: &Path, stem: &str, ext: &str) -> io::Result<(File, PathBuf)> {
    let stem = truncate_stem(stem);
    for n in 1..=MAX_SUFFIX {
        let filename = if n == 1 {
            format!("{}.{}", stem, ext)
        } else {
            format!("{} ({}).{}", stem, n, ext)
        };
        let path = dir.join(filename);

        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }

    Err(io::Error::new(
        ErrorKind::AlreadyExists,
        format!("too many files named '{}' in {}", stem, dir.display()),
    ))
}

/// Cut `stem` to at most [`MAX_STEM_BYTES`], on a character boundary.
fn truncate_stem(stem: &str) -> &str {
    if stem.len() <= MAX_STEM_BYTES {
        return stem;
    }
    let mut end = MAX_STEM_BYTES;
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    stem[..end].trim_end()
}
