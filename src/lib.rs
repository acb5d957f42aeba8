//! Expand compact repeat-sequence specifications such as `[AGAT]5` into
//! literal base sequences and write them as FASTA references.
//!
//! ```
//! use dslseq::expand_composite;
//! let reference = expand_composite(Some("[ATA]2A"), Some("(GGC)2"), Some("AGTATA"));
//! assert_eq!(reference, "ATAATAAGGCGGCAGTATA");
//! ```

pub mod config;
pub mod error;
pub mod logger;
pub mod seq;
pub mod spec;

pub use error::{DslSeqError, Result};
pub use spec::{expand, expand_composite, CompositeSpec, Segment, Specification};
