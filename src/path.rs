use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

/// Size of a path buffer, the terminator included.
pub const MAX_PATH_LEN: usize = 1024;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    #[error("path too long: {0} bytes (max {max})", max = MAX_PATH_LEN - 1)]
    TooLong(usize),
}

/// Absolute paths pass through, anything else gets a `./` prefix.
pub fn full_path(in_path: &str) -> Result<Cow<'_, str>, Error> {
    let out: Cow<'_, str> = if in_path.starts_with('/') {
        in_path.into()
    } else {
        format!("./{in_path}").into()
    };

    if out.len() >= MAX_PATH_LEN {
        return Err(Error::TooLong(out.len()));
    }
    Ok(out)
}

/// [`full_path`] anchored at the session working directory.
pub fn resolve(cwd: &Path, in_path: &str) -> Result<PathBuf, Error> {
    let full = full_path(in_path)?;
    Ok(cwd.join(full.as_ref()))
}

/// Last non-empty component of a path, used as the child's `argv[0]`.
pub fn program_name(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(path)
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn relative() {
        assert_eq!(full_path("foo").unwrap(), "./foo");
        assert_eq!(full_path("../bin/ls").unwrap(), "./../bin/ls");
        assert_eq!(full_path("./x").unwrap(), "././x");
    }

    #[test]
    fn absolute() {
        assert_eq!(full_path("/etc/passwd").unwrap(), "/etc/passwd");
        assert!(matches!(full_path("/etc/passwd"), Ok(Cow::Borrowed(_))));
    }

    #[test]
    fn too_long() {
        let name = "a".repeat(MAX_PATH_LEN - 3);
        assert_eq!(full_path(&name).map(|p| p.len()), Ok(MAX_PATH_LEN - 1));

        let name = "a".repeat(MAX_PATH_LEN - 2);
        assert_eq!(full_path(&name), Err(Error::TooLong(MAX_PATH_LEN)));

        let name = format!("/{}", "a".repeat(MAX_PATH_LEN));
        assert_eq!(full_path(&name), Err(Error::TooLong(MAX_PATH_LEN + 1)));
    }

    #[test]
    fn resolve_against_cwd() {
        let cwd = Path::new("/home/user");
        assert_eq!(
            resolve(cwd, "notes.txt").unwrap(),
            PathBuf::from("/home/user/./notes.txt")
        );
        assert_eq!(resolve(cwd, "/tmp/x").unwrap(), PathBuf::from("/tmp/x"));
    }

    #[test]
    fn names() {
        assert_eq!(program_name("./ls"), "ls");
        assert_eq!(program_name("/usr/bin/env"), "env");
        assert_eq!(program_name("/usr/bin/"), "bin");
        assert_eq!(program_name("/"), "/");
    }
}
