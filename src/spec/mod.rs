//! Literal runs of `ATCGX` mixed with `[unit]count` repeat groups. Fragments
//! that are neither are dropped, never reported.
//!
//! ```
//! use dslseq::spec::expand;
//! assert_eq!(expand("AT [AGAT]5 GC"), "ATAGATAGATAGATAGATAGATGC");
//! assert_eq!(expand("AT[CAG5"), "AT");
//! ```

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

const ALPHABET: [char; 5] = ['A', 'T', 'C', 'G', 'X'];

fn is_base(c: char) -> bool {
    ALPHABET.contains(&c.to_ascii_uppercase())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Repeat { unit: String, count: usize },
}

impl Segment {
    pub fn expanded_len(&self) -> usize {
        match self {
            Segment::Literal(bases) => bases.len(),
            Segment::Repeat { unit, count } => unit.len().saturating_mul(*count),
        }
    }

    fn append_to(&self, out: &mut String) {
        match self {
            Segment::Literal(bases) => out.push_str(bases),
            Segment::Repeat { unit, count } => {
                for _ in 0..*count {
                    out.push_str(unit);
                }
            }
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Literal(bases) => write!(f, "{}", bases),
            Segment::Repeat { unit, count } => write!(f, "[{}]{}", unit, count),
        }
    }
}

/// A parsed specification: the ordered segments of one input string.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Specification {
    segments: Vec<Segment>,
}

impl Specification {
    /// Clean `text` and decompose it. Never fails; see the module docs.
    pub fn parse(text: &str) -> Self {
        Specification {
            segments: decompose(&clean(text)),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Length of the expanded sequence, computed without building it.
    pub fn expanded_len(&self) -> usize {
        self.segments
            .iter()
            .fold(0usize, |acc, s| acc.saturating_add(s.expanded_len()))
    }

    /// Concatenate every segment in order.
    pub fn expand(&self) -> String {
        let mut out = String::new();
        // totals past the allocator's limit grow on demand instead
        let _ = out.try_reserve(self.expanded_len());
        for segment in &self.segments {
            segment.append_to(&mut out);
        }
        out
    }
}

impl FromStr for Specification {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Specification::parse(s))
    }
}

// Readable rendering, segments separated by spaces. Adjacent literals
// come back as one segment when the output is parsed again.
impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Strip all whitespace and rewrite `(`/`)` as `[`/`]`.
///
/// No balancing is checked; `)A(` becomes `]A[`.
pub fn clean(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c {
            '(' => '[',
            ')' => ']',
            other => other,
        })
        .collect()
}

// End (exclusive) of the run of bases starting at `start`.
fn base_run(chars: &[char], start: usize) -> usize {
    let mut end = start;
    while end < chars.len() && is_base(chars[end]) {
        end += 1;
    }
    end
}

// Match `[unit]digits` with `chars[start] == '['`.
fn repeat_group(chars: &[char], start: usize) -> Option<(Segment, usize)> {
    let unit_start = start + 1;
    let unit_end = base_run(chars, unit_start);
    if unit_end == unit_start || chars.get(unit_end) != Some(&']') {
        return None;
    }

    let count_start = unit_end + 1;
    let mut count_end = count_start;
    while count_end < chars.len() && chars[count_end].is_ascii_digit() {
        count_end += 1;
    }
    if count_end == count_start {
        return None;
    }

    let digits: String = chars[count_start..count_end].iter().collect();
    let count = digits.parse::<usize>().ok()?;
    // bases are ASCII, so the unit's char count is its byte length
    (unit_end - unit_start).checked_mul(count)?;
    let unit = chars[unit_start..unit_end].iter().collect();
    Some((Segment::Repeat { unit, count }, count_end))
}

/// Split already cleaned text (see [`clean`]) into segments.
///
/// Scans left to right. A run of bases becomes a literal segment; a `[`
/// starting a complete `[unit]digits` group becomes a repeat segment. A `[`
/// that does not open a complete group is dropped along with the bases that
/// directly follow it. Any other character is dropped on its own.
pub fn decompose(cleaned: &str) -> Vec<Segment> {
    let chars: Vec<char> = cleaned.chars().collect();
    let mut segments = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        if is_base(chars[pos]) {
            let end = base_run(&chars, pos);
            segments.push(Segment::Literal(chars[pos..end].iter().collect()));
            pos = end;
        } else if chars[pos] == '[' {
            match repeat_group(&chars, pos) {
                Some((segment, end)) => {
                    segments.push(segment);
                    pos = end;
                }
                None => pos = base_run(&chars, pos + 1),
            }
        } else {
            pos += 1;
        }
    }

    segments
}

/// Expand a specification into its base sequence.
pub fn expand(text: &str) -> String {
    Specification::parse(text).expand()
}

/// Forward flank, repeat and reverse flank specifications of one reference.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompositeSpec {
    pub seq_fwd: String,
    pub seq_repeat: String,
    pub seq_rev: String,
}

impl CompositeSpec {
    pub fn new(
        seq_fwd: impl Into<String>,
        seq_repeat: impl Into<String>,
        seq_rev: impl Into<String>,
    ) -> Self {
        CompositeSpec {
            seq_fwd: seq_fwd.into(),
            seq_repeat: seq_repeat.into(),
            seq_rev: seq_rev.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.seq_fwd.is_empty() && self.seq_repeat.is_empty() && self.seq_rev.is_empty()
    }

    pub fn parts(&self) -> [(&'static str, &str); 3] {
        [
            ("seq_fwd", self.seq_fwd.as_str()),
            ("seq_repeat", self.seq_repeat.as_str()),
            ("seq_rev", self.seq_rev.as_str()),
        ]
    }

    /// Expand each part on its own and join them: fwd, repeat, rev.
    pub fn expand(&self) -> String {
        self.parts()
            .iter()
            .map(|(_, part)| expand(part))
            .collect()
    }
}

/// [`CompositeSpec::expand`] over optional parts; `None` counts as empty.
pub fn expand_composite(seq_fwd: Option<&str>, seq_repeat: Option<&str>, seq_rev: Option<&str>) -> String {
    CompositeSpec::new(
        seq_fwd.unwrap_or_default(),
        seq_repeat.unwrap_or_default(),
        seq_rev.unwrap_or_default(),
    )
    .expand()
}
