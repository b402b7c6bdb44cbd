use std::path::{Path, PathBuf};

use comment_labeler::config::LabelerConfig;

/// Write a comments CSV with explicit ids.
pub fn write_comments(path: &Path, rows: &[(&str, &str)]) {
    let mut body = String::from("comment_id,comment_text\n");
    for (id, text) in rows {
        body.push_str(&format!("{id},\"{}\"\n", text.replace('"', "\"\"")));
    }
    std::fs::write(path, body).expect("write comments csv");
}

/// Config pointing every file at `dir`.
pub fn config_in(dir: &Path) -> LabelerConfig {
    LabelerConfig {
        comments_path: dir.join("comments.csv"),
        long_store_path: dir.join("labels.csv"),
        wide_store_path: dir.join("labels_wide.csv"),
        ..LabelerConfig::default()
    }
}

pub fn read(path: impl Into<PathBuf>) -> String {
    std::fs::read_to_string(path.into()).expect("read file")
}
