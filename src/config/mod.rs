//! Reference generation from an allele config file.
//!
//! ```text
//! [DEFAULT]
//! seq_fwd = ...
//! seq_rev = ...
//! loci_name = ...
//!
//! [1] # Allele 1
//! seq_repeat = ...
//!
//! [N] # Allele N
//! seq_repeat = ...
//! ```
//!
//! Every section is an allele: its `seq_repeat` is expanded between the
//! shared flanks and written to `REF_<loci_name>_<allele>.fasta`.

mod ini;

pub use ini::{IniConfig, DEFAULT_SECTION};

use log::{debug, info};
use rayon::prelude::*;

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::seq::write_fasta;
use crate::spec::CompositeSpec;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Allele {
    pub name: String,
    pub seq_repeat: String,
}

/// One locus with its shared flanks and every allele to generate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlleleBatch {
    pub loci_name: String,
    pub seq_fwd: String,
    pub seq_rev: String,
    pub alleles: Vec<Allele>,
}

impl AlleleBatch {
    pub fn from_config(config: &IniConfig) -> Result<Self> {
        let seq_fwd = config.get(DEFAULT_SECTION, "seq_fwd")?;
        let seq_rev = config.get(DEFAULT_SECTION, "seq_rev")?;
        let loci_name = config.get(DEFAULT_SECTION, "loci_name")?;

        let alleles = config
            .sections()
            .map(|name| -> Result<Allele> {
                Ok(Allele {
                    name: name.to_string(),
                    seq_repeat: config.get(name, "seq_repeat")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(AlleleBatch {
            loci_name,
            seq_fwd,
            seq_rev,
            alleles,
        })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_config(&IniConfig::from_path(path)?)
    }

    /// FASTA header and file stem: `REF_<loci_name>_<allele>`.
    pub fn header(&self, allele: &Allele) -> String {
        format!("REF_{}_{}", self.loci_name, allele.name)
    }

    pub fn composite(&self, allele: &Allele) -> CompositeSpec {
        CompositeSpec::new(self.seq_fwd.as_str(), allele.seq_repeat.as_str(), self.seq_rev.as_str())
    }
}

/// Expand every allele and write one FASTA file each into `output_dir`.
///
/// Returns the written paths in section order.
pub fn write_references(batch: &AlleleBatch, output_dir: &Path) -> Result<Vec<PathBuf>> {
    info!("{}: {} alleles", batch.loci_name, batch.alleles.len());

    batch
        .alleles
        .par_iter()
        .map(|allele| -> Result<PathBuf> {
            let header = batch.header(allele);
            let sequence = batch.composite(allele).expand();
            debug!("{}: {}", header, sequence);

            let path = output_dir.join(format!("{}.fasta", header));
            write_fasta(&sequence, &path, Some(&header))?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DslSeqError;
    use crate::seq::read_fasta;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    const CONFIG: &str = "\
[DEFAULT]
seq_fwd = [ATA]2A
seq_rev = AGTATA
loci_name = TEST

[11] # Allele 11
seq_repeat = (GGC)11

[2]
seq_repeat = GC [AT]2
";

    fn batch() -> AlleleBatch {
        AlleleBatch::from_config(&IniConfig::parse(Cursor::new(CONFIG), "<test>").unwrap()).unwrap()
    }

    #[test]
    fn test_batch_from_config() {
        let batch = batch();
        assert_eq!(batch.loci_name, "TEST");
        assert_eq!(batch.seq_fwd, "[ATA]2A");
        assert_eq!(
            batch.alleles,
            vec![
                Allele { name: "11".to_string(), seq_repeat: "(GGC)11".to_string() },
                Allele { name: "2".to_string(), seq_repeat: "GC [AT]2".to_string() },
            ]
        );
    }

    #[test]
    fn test_header_and_composite() {
        let batch = batch();
        let allele = &batch.alleles[0];
        assert_eq!(batch.header(allele), "REF_TEST_11");
        assert_eq!(
            batch.composite(allele).expand(),
            "ATAATAAGGCGGCGGCGGCGGCGGCGGCGGCGGCGGCGGCAGTATA"
        );
    }

    #[test]
    fn test_missing_shared_option() {
        let config = IniConfig::parse(Cursor::new("[DEFAULT]\nseq_fwd = A\nseq_rev = T\n[1]\nseq_repeat = G\n"), "<test>").unwrap();
        let err = AlleleBatch::from_config(&config).unwrap_err();
        assert!(matches!(err, DslSeqError::NoOption { ref option, .. } if option == "loci_name"));
    }

    #[test]
    fn test_seq_repeat_inherited_from_default() {
        let text = "[DEFAULT]\nseq_fwd = A\nseq_rev = T\nloci_name = L\nseq_repeat = [G]3\n[1]\n[2]\nseq_repeat = C\n";
        let config = IniConfig::parse(Cursor::new(text), "<test>").unwrap();
        let batch = AlleleBatch::from_config(&config).unwrap();
        assert_eq!(batch.alleles[0].seq_repeat, "[G]3");
        assert_eq!(batch.alleles[1].seq_repeat, "C");
    }

    #[test]
    fn test_write_references() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("test.cfg");
        fs::write(&config_path, CONFIG).unwrap();
        let output_dir = dir.path().join("ref");

        let batch = AlleleBatch::from_path(&config_path).unwrap();
        let written = write_references(&batch, &output_dir).unwrap();
        assert_eq!(
            written,
            vec![output_dir.join("REF_TEST_11.fasta"), output_dir.join("REF_TEST_2.fasta")]
        );

        let records = read_fasta(&written[1]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id(), "REF_TEST_2");
        assert_eq!(records[0].seq(), b"ATAATAAGCATATAGTATA");
    }
}
