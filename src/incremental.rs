use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::Path;
use std::time::SystemTime;

/// Oldest and newest modification time of the files under a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub oldest: SystemTime,
    pub newest: SystemTime,
}

/// Walks `dir` and returns the range of file modification times, or `None`
/// when it holds no file. `skip` is left out of the range.
pub fn modification_time_range(dir: &Path, skip: Option<&Path>) -> Result<Option<TimeRange>> {
    let walker = WalkBuilder::new(dir)
        .hidden(false)
        .ignore(false)
        .parents(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build();

    let mut range: Option<TimeRange> = None;
    for entry in walker {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if skip.is_some_and(|s| entry.path() == s) {
            continue;
        }
        let mtime = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        range = Some(match range {
            None => TimeRange {
                oldest: mtime,
                newest: mtime,
            },
            Some(r) => TimeRange {
                oldest: r.oldest.min(mtime),
                newest: r.newest.max(mtime),
            },
        });
    }
    Ok(range)
}

/// True when `result` exists and is newer than every file under `binaries`.
pub fn is_up_to_date(binaries: &Path, result: &Path) -> Result<bool> {
    let Ok(result_mtime) = result.metadata().and_then(|m| m.modified()) else {
        return Ok(false);
    };
    let Some(range) = modification_time_range(binaries, Some(result))? else {
        return Ok(true);
    };
    Ok(range.newest < result_mtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    fn set_mtime(path: &Path, time: SystemTime) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(time).unwrap();
    }

    #[test]
    fn range_covers_every_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        fs::create_dir_all(dir.path().join("lib"))?;
        let a = dir.path().join("a.jar");
        let b = dir.path().join("lib/b.jar");
        fs::write(&a, b"x")?;
        fs::write(&b, b"y")?;
        set_mtime(&a, base);
        set_mtime(&b, base + Duration::from_secs(60));

        let range = modification_time_range(dir.path(), None)?.unwrap();
        assert_eq!(range.oldest, base);
        assert_eq!(range.newest, base + Duration::from_secs(60));

        let empty = tempfile::tempdir()?;
        assert!(modification_time_range(empty.path(), None)?.is_none());
        Ok(())
    }

    #[test]
    fn result_newer_than_binaries_is_up_to_date() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin)?;
        let jar = bin.join("a.jar");
        fs::write(&jar, b"x")?;
        let result = dir.path().join("mavenizer.xml");

        assert!(!is_up_to_date(&bin, &result)?);

        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(2_000_000);
        fs::write(&result, b"<artifacts/>")?;
        set_mtime(&jar, base);
        set_mtime(&result, base + Duration::from_secs(10));
        assert!(is_up_to_date(&bin, &result)?);

        set_mtime(&jar, base + Duration::from_secs(20));
        assert!(!is_up_to_date(&bin, &result)?);
        Ok(())
    }

    #[test]
    fn result_inside_binaries_is_ignored() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let jar = dir.path().join("a.jar");
        let result = dir.path().join("mavenizer.xml");
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(3_000_000);
        fs::write(&jar, b"x")?;
        fs::write(&result, b"<artifacts/>")?;
        set_mtime(&jar, base);
        set_mtime(&result, base + Duration::from_secs(5));
        assert!(is_up_to_date(dir.path(), &result)?);
        Ok(())
    }
}
