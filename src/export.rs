use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::grid::ScoreMatrix;

/// Receives the final score matrix when a session stops.
pub trait ExportSink {
    fn export(&mut self, scores: &ScoreMatrix) -> io::Result<()>;
}

/// Writes one semicolon-delimited file per stopped session into a target
/// directory, named `score_<timestamp>.csv`.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    dir: PathBuf,
    last_path: Option<PathBuf>,
}

impl CsvExporter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            last_path: None,
        }
    }

    /// Path of the most recently written file, shown in the results panel.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

impl ExportSink for CsvExporter {
    fn export(&mut self, scores: &ScoreMatrix) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let name = format!("score_{}.csv", Local::now().format("%Y-%m-%d %H%M%S"));
        let path = self.dir.join(name);
        write_scores(File::create(&path)?, scores)?;
        log::info!("scores written to {}", path.display());
        self.last_path = Some(path);
        Ok(())
    }
}

/// One row per grid row (top to bottom), one column per grid column (left
/// to right), unset cells left empty.
pub fn write_scores<W: io::Write>(writer: W, scores: &ScoreMatrix) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    for row in scores.rows() {
        let record: Vec<String> = row
            .iter()
            .map(|cell| cell.map_or_else(String::new, |s| s.to_string()))
            .collect();
        wtr.write_record(&record).map_err(io::Error::other)?;
    }
    wtr.flush()
}
