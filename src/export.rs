//! CSV export of paper metadata and JSON save/load of fetched papers.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::paper::Paper;

const COLUMNS: [&str; 5] = ["id", "title", "authors", "abstract", "url"];
const MATCH_COLUMN: &str = "match";

/// Write papers as CSV. When `flags` is given, a `match` column holds the
/// 0/1 keyword flag of each paper.
pub fn write_csv(path: &Path, papers: &[Paper], flags: Option<&[u8]>) -> Result<()> {
    if let Some(flags) = flags {
        if flags.len() != papers.len() {
            return Err(Error::FlagCountMismatch {
                papers: papers.len(),
                flags: flags.len(),
            });
        }
    }
    let mut writer = csv::Writer::from_path(path)?;
    write_records(&mut writer, papers, flags)?;
    writer.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn write_records<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    papers: &[Paper],
    flags: Option<&[u8]>,
) -> Result<()> {
    let mut header = COLUMNS.to_vec();
    if flags.is_some() {
        header.push(MATCH_COLUMN);
    }
    writer.write_record(&header)?;

    for (i, paper) in papers.iter().enumerate() {
        let mut record = vec![
            paper.number.map(|n| n.to_string()).unwrap_or_default(),
            paper.title.clone(),
            paper.authors.join(", "),
            paper.abstract_text.clone(),
            paper.url.clone(),
        ];
        if let Some(flags) = flags {
            record.push(flags[i].to_string());
        }
        writer.write_record(&record)?;
    }
    Ok(())
}

/// Save papers to a JSON file.
pub fn save_papers(papers: &[Paper], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(papers)?;
    fs::write(path, json).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Load papers previously written by [`save_papers`].
pub fn load_papers(path: &Path) -> Result<Vec<Paper>> {
    let json = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&json)?)
}
