use std::path::{Path, PathBuf};

use uuid::Uuid;

use registry::NewDataset;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvSummary {
    pub rows: u64,
    pub columns: Vec<String>,
}

/// Header columns and data row count of delimited text. Blank lines are
/// ignored; the header may be split on comma, semicolon or tab.
pub fn summarize_csv(text: &str) -> CsvSummary {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let columns = match lines.next() {
        Some(header) => header
            .split([',', ';', '\t'])
            .map(|c| c.trim().to_string())
            .collect(),
        None => return CsvSummary { rows: 0, columns: vec![] },
    };

    CsvSummary { rows: lines.count() as u64, columns }
}

/// Where an upload is stored: `<dir>/<uuid><ext>`, keeping the original
/// extension or defaulting to `.csv`.
pub fn upload_path(dir: &Path, original_name: Option<&str>) -> PathBuf {
    let ext = original_name
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or("csv");
    dir.join(format!("{}.{ext}", Uuid::new_v4()))
}

/// Writes the uploaded bytes and describes them for the catalog.
pub async fn store_upload(dir: &Path, original_name: Option<String>, bytes: &[u8]) -> std::io::Result<NewDataset> {
    tokio::fs::create_dir_all(dir).await?;
    let path = upload_path(dir, original_name.as_deref());
    tokio::fs::write(&path, bytes).await?;
    let path = tokio::fs::canonicalize(&path).await?;

    let summary = summarize_csv(&String::from_utf8_lossy(bytes));
    let name = original_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "dataset.csv".to_string());

    Ok(NewDataset {
        name,
        rows: summary.rows,
        columns: summary.columns,
        file_path: Some(path.to_string_lossy().into_owned()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_data_rows() {
        let s = summarize_csv("date,sales, promo\r\n2025-01-01,10,0\r\n\r\n2025-01-02,12,1\n");
        assert_eq!(s.columns, vec!["date", "sales", "promo"]);
        assert_eq!(s.rows, 2);
    }

    #[test]
    fn test_summary_mixed_delimiters() {
        let s = summarize_csv("a;b\tc\n1;2\t3");
        assert_eq!(s.columns, vec!["a", "b", "c"]);
        assert_eq!(s.rows, 1);
    }

    #[test]
    fn test_summary_empty_input() {
        assert_eq!(summarize_csv(""), CsvSummary { rows: 0, columns: vec![] });
        assert_eq!(summarize_csv("\n  \n"), CsvSummary { rows: 0, columns: vec![] });
        assert_eq!(summarize_csv("only,header").rows, 0);
    }

    #[test]
    fn test_upload_path_extension() {
        let dir = Path::new("/tmp/up");
        assert_eq!(upload_path(dir, Some("sales.tsv")).extension().unwrap(), "tsv");
        assert_eq!(upload_path(dir, Some("noext")).extension().unwrap(), "csv");
        assert_eq!(upload_path(dir, None).extension().unwrap(), "csv");
    }

    #[tokio::test]
    async fn test_store_upload_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let meta = store_upload(dir.path(), Some("s.csv".into()), b"x,y\n1,2\n3,4\n").await.unwrap();

        assert_eq!(meta.name, "s.csv");
        assert_eq!(meta.rows, 2);
        let path = PathBuf::from(meta.file_path.unwrap());
        assert!(path.is_absolute());
        assert_eq!(std::fs::read(path).unwrap(), b"x,y\n1,2\n3,4\n");
    }

    #[tokio::test]
    async fn test_store_upload_default_name() {
        let dir = tempfile::tempdir().unwrap();
        let meta = store_upload(dir.path(), None, b"a\n").await.unwrap();
        assert_eq!(meta.name, "dataset.csv");
    }
}
