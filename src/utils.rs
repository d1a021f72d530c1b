use std::path::Path;

/// Avoids updating the last-modified date of the file.
pub fn write_if_changed(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> std::io::Result<()> {
    match std::fs::read(path.as_ref()) {
        Ok(data) if data == contents.as_ref() => Ok(()),
        Ok(_) | Err(_) => std::fs::write(path, contents),
    }
}

/// Creates the parent directories as needed.
pub fn write(path: impl AsRef<Path>, contents: impl AsRef<[u8]>) -> std::io::Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    write_if_changed(path, contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_files_are_not_rewritten() {
        let dir = std::env::temp_dir().join(format!("folio-utils-{}", std::process::id()));
        let path = dir.join("nested/page.html");

        write(&path, "<p>hi</p>").unwrap();
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();

        write(&path, "<p>hi</p>").unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), modified);

        write(&path, "<p>bye</p>").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<p>bye</p>");

        std::fs::remove_dir_all(dir).unwrap();
    }
}
