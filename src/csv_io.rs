//! Whole-file CSV helpers shared by the comment and label stores.
//!
//! Reads load the full file; writes build the new document in a temp file next
//! to the target and rename it into place, so a failed write leaves the
//! previous file untouched.

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use csv::StringRecord;

/// Open a CSV file for reading. `Ok(None)` means the file does not exist,
/// including when a parent component is not a directory.
pub(crate) fn open_reader(path: &Path) -> io::Result<Option<csv::Reader<File>>> {
    match File::open(path) {
        Ok(file) => Ok(Some(
            csv::ReaderBuilder::new().has_headers(true).from_reader(file),
        )),
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
            ) =>
        {
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Replace `path` with the rows emitted by `write`.
pub(crate) fn replace_atomically(
    path: &Path,
    write: impl FnOnce(&mut csv::Writer<&mut File>) -> csv::Result<()>,
) -> io::Result<()> {
    let dir = parent_dir(path);
    std::fs::create_dir_all(&dir)?;
    let mut temp = tempfile::Builder::new()
        .prefix(".comment_labeler")
        .suffix(".tmp")
        .tempfile_in(&dir)?;
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Column positions resolved from a header row.
#[derive(Debug, Clone)]
pub(crate) struct HeaderIndex {
    names: Vec<String>,
}

impl HeaderIndex {
    pub(crate) fn new(headers: &StringRecord) -> Self {
        Self {
            names: headers.iter().map(|name| name.trim().to_string()).collect(),
        }
    }

    pub(crate) fn find(&self, column: &str) -> Option<usize> {
        self.names.iter().position(|name| name == column)
    }
}

/// Read a cell, treating short rows as empty cells.
pub(crate) fn cell(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or("")
}
