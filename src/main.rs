use std::path::PathBuf;

use dslseq::{config, logger, seq, spec};

use anyhow::{Context, Result};
use log::{debug, info};
use structopt::StructOpt;

const SPEC_HELP: &str = "\
A sequence specification is a condensed way of representing a sequence, e.g.
  [AGAT]5 --> AGAT AGAT AGAT AGAT AGAT (CODIS loci CSF1PO)
  TCTA TCTG TCTA [TCTG]4 [TCTA]3 --> TCTA TCTG TCTA TCTG TCTG TCTG TCTG TCTA TCTA TCTA (CODIS loci VWA, allele 10)

Spaces are ignored, (...) and [...] are interchangeable, bases are ATCGX in any case.";

const CFG_HELP: &str = "\
Config format:
  [DEFAULT]
  seq_fwd = ...
  seq_rev = ...
  loci_name = ...

  [1] # Allele 1
  seq_repeat = ...

  [N] # Allele N
  seq_repeat = ...";

#[derive(Debug, StructOpt)]
#[structopt(name = "dslseq", about = "Expand repeat sequence specifications into FASTA references")]
struct Opt {
    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[structopt(short, long, parse(from_occurrences), global = true)]
    verbose: u8,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
enum Command {
    /// Generate a fasta file from a sequence specification
    #[structopt(after_help = SPEC_HELP)]
    Expand(ExpandOpt),
    /// Generate one reference per allele from a config file
    #[structopt(after_help = CFG_HELP)]
    Cfg(CfgOpt),
    /// Reverse complement fasta files
    Revcomp(RevcompOpt),
}

#[derive(Debug, StructOpt)]
#[structopt(name = "expand", after_help = SPEC_HELP)]
struct ExpandOpt {
    /// Sequence specification of the forward flanking region
    #[structopt(long, alias = "seq_fwd", default_value = "", hide_default_value = true)]
    seq_fwd: String,

    /// Sequence specification of the repeat
    #[structopt(long, alias = "seq_repeat", default_value = "", hide_default_value = true)]
    seq_repeat: String,

    /// Sequence specification of the reverse flanking region
    #[structopt(long, alias = "seq_rev", default_value = "", hide_default_value = true)]
    seq_rev: String,

    /// Output fasta filename; the sequence is printed to stdout when omitted
    #[structopt(long, alias = "output_fasta", parse(from_os_str))]
    output_fasta: Option<PathBuf>,

    /// Header of the output fasta record [default: file name of --output-fasta]
    #[structopt(long, alias = "output_header")]
    output_header: Option<String>,
}

#[derive(Debug, StructOpt)]
#[structopt(name = "cfg")]
struct CfgOpt {
    /// Config file
    #[structopt(parse(from_os_str))]
    config_file: PathBuf,

    /// Output folder
    #[structopt(long, alias = "output_dir", default_value = "ref", parse(from_os_str))]
    output_dir: PathBuf,
}

#[derive(Debug, StructOpt)]
#[structopt(name = "revcomp")]
struct RevcompOpt {
    /// Input fasta glob, e.g. '*.fa'
    file_glob: String,

    /// Output directory
    #[structopt(long, alias = "output_dir", default_value = ".", parse(from_os_str))]
    output_dir: PathBuf,
}

fn run_expand(opt: ExpandOpt) -> Result<()> {
    let composite = spec::CompositeSpec::new(opt.seq_fwd, opt.seq_repeat, opt.seq_rev);
    if composite.is_empty() {
        ExpandOpt::clap().print_help()?;
        println!();
        return Ok(());
    }

    for (label, part) in composite.parts().iter() {
        debug!("{}: {}", label, spec::Specification::parse(part));
    }
    let sequence = composite.expand();

    match opt.output_fasta {
        Some(path) => seq::write_fasta(&sequence, &path, opt.output_header.as_deref())
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", sequence),
    }
    Ok(())
}

fn run_cfg(opt: CfgOpt) -> Result<()> {
    let batch = config::AlleleBatch::from_path(&opt.config_file)
        .with_context(|| format!("failed to load {}", opt.config_file.display()))?;
    let written = config::write_references(&batch, &opt.output_dir)?;
    info!("{} references written to {}", written.len(), opt.output_dir.display());
    Ok(())
}

fn run_revcomp(opt: RevcompOpt) -> Result<()> {
    let written = seq::reverse_complement_files(&opt.file_glob, &opt.output_dir)
        .with_context(|| format!("failed to reverse complement '{}'", opt.file_glob))?;
    info!("{} files written to {}", written.len(), opt.output_dir.display());
    Ok(())
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    logger::init_logger(logger::level_from_verbosity(opt.verbose))
        .map_err(|e| anyhow::anyhow!("cannot install logger: {}", e))?;

    match opt.cmd {
        Command::Expand(cmd) => run_expand(cmd),
        Command::Cfg(cmd) => run_cfg(cmd),
        Command::Revcomp(cmd) => run_revcomp(cmd),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn parse(args: &[&str]) -> Opt {
        Opt::from_iter_safe(args).unwrap()
    }

    #[test]
    fn test_parse_expand_with_underscore_aliases() {
        let opt = parse(&["dslseq", "expand", "--seq_fwd", "[ATA]2A", "--seq-repeat", "(GGC)11", "--seq_rev", "AGTATA"]);
        match opt.cmd {
            Command::Expand(cmd) => {
                assert_eq!(cmd.seq_fwd, "[ATA]2A");
                assert_eq!(cmd.seq_repeat, "(GGC)11");
                assert_eq!(cmd.seq_rev, "AGTATA");
                assert!(cmd.output_fasta.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_defaults() {
        let opt = parse(&["dslseq", "-vv", "cfg", "alleles.cfg"]);
        assert_eq!(opt.verbose, 2);
        match opt.cmd {
            Command::Cfg(cmd) => assert_eq!(cmd.output_dir, PathBuf::from("ref")),
            other => panic!("unexpected command: {:?}", other),
        }

        let opt = parse(&["dslseq", "revcomp", "*.fa"]);
        match opt.cmd {
            Command::Revcomp(cmd) => {
                assert_eq!(cmd.file_glob, "*.fa");
                assert_eq!(cmd.output_dir, PathBuf::from("."));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_expand_writes_fasta() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out/ref.fasta");
        let opt = parse(&[
            "dslseq", "expand", "--seq-repeat", "[AGAT]2", "--output-fasta", path.to_str().unwrap(), "--output-header", "CSF1PO",
        ]);
        match opt.cmd {
            Command::Expand(cmd) => run_expand(cmd).unwrap(),
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), ">CSF1PO\nAGATAGAT\n");
    }

    #[test]
    fn test_run_cfg_missing_file() {
        let opt = parse(&["dslseq", "cfg", "/nonexistent/alleles.cfg"]);
        match opt.cmd {
            Command::Cfg(cmd) => assert!(run_cfg(cmd).is_err()),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
