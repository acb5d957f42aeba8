use bio::alphabets::dna;
use bio::io::fasta::{self, Record};
use log::{debug, info, warn};
use rayon::prelude::*;
use tempfile::NamedTempFile;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{DslSeqError, Result};

pub fn read_fasta<P: AsRef<Path>>(path: P) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| DslSeqError::file_io(path, e))?;
    fasta::Reader::new(file)
        .records()
        .collect::<io::Result<Vec<_>>>()
        .map_err(|e| DslSeqError::file_io(path, e))
}

/// Write records to `path`, creating its parent directory when missing.
///
/// The file is staged next to the target and moved into place once complete.
pub fn write_records_to_path(path: &Path, records: &[Record]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if !dir.is_dir() {
        debug!("creating directory {}", dir.display());
        fs::create_dir_all(dir).map_err(|e| DslSeqError::file_io(dir, e))?;
    }

    let mut staged = NamedTempFile::new_in(dir).map_err(|e| DslSeqError::file_io(dir, e))?;
    {
        let mut writer = fasta::Writer::new(staged.as_file_mut());
        for record in records {
            writer.write_record(record).map_err(|e| DslSeqError::file_io(path, e))?;
        }
        writer.flush().map_err(|e| DslSeqError::file_io(path, e))?;
    }
    staged
        .persist(path)
        .map_err(|e| DslSeqError::file_io(path, e.error))?;

    Ok(())
}

/// The header defaults to the file name of `output_fasta`.
pub fn write_fasta(sequence: &str, output_fasta: &Path, output_header: Option<&str>) -> Result<()> {
    let header = match output_header {
        Some(header) => header.to_string(),
        None => output_fasta
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    info!("writing {} ({} bases) to {}", header, sequence.len(), output_fasta.display());
    let record = Record::with_attrs(&header, None, sequence.as_bytes());
    write_records_to_path(output_fasta, &[record])
}

pub fn reverse_complement(record: &Record) -> Record {
    Record::with_attrs(record.id(), record.desc(), &dna::revcomp(record.seq()))
}

/// Reverse-complement every record of every file matching `file_glob`.
///
/// Each input is written to `output_dir` under its own file name. Returns
/// the written paths in glob order.
pub fn reverse_complement_files(file_glob: &str, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let files = glob::glob(file_glob)?
        .collect::<std::result::Result<Vec<PathBuf>, _>>()?
        .into_iter()
        .filter(|path| path.is_file())
        .collect::<Vec<_>>();

    if files.is_empty() {
        warn!("no files match '{}'", file_glob);
    }

    files
        .par_iter()
        .map(|path| -> Result<PathBuf> {
            info!("{} processing...", path.display());
            let records = read_fasta(path)?
                .iter()
                .map(reverse_complement)
                .collect::<Vec<_>>();

            let name = path.file_name().ok_or_else(|| {
                DslSeqError::file_io(path, io::Error::new(io::ErrorKind::InvalidInput, "no file name"))
            })?;
            let target = output_dir.join(name);
            write_records_to_path(&target, &records)?;
            debug!("{} records written to {}", records.len(), target.display());
            Ok(target)
        })
        .collect()
}
