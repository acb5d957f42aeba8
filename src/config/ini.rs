//! INI reader with `DEFAULT` fallbacks and `%(key)s` interpolation.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{DslSeqError, Result};

pub const DEFAULT_SECTION: &str = "DEFAULT";

const MAX_INTERPOLATION_DEPTH: usize = 10;

type Options = HashMap<String, String>;

#[derive(Clone, Copy)]
enum Cursor {
    Defaults,
    Section(usize),
}

#[derive(Clone, Debug, Default)]
pub struct IniConfig {
    defaults: Options,
    sections: Vec<(String, Options)>,
}

impl IniConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(DslSeqError::MissingFile(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|e| DslSeqError::file_io(path, e))?;
        Self::parse(BufReader::new(file), &path.display().to_string())
    }

    /// Parse config text; `source` names the input in error messages.
    pub fn parse<R: BufRead>(reader: R, source: &str) -> Result<Self> {
        let mut config = IniConfig::default();
        let mut cursor: Option<Cursor> = None;
        let mut last_key: Option<String> = None;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let syntax_error = |message: &str| DslSeqError::ConfigSyntax {
                path: source.to_string(),
                line: index + 1,
                message: message.to_string(),
            };

            let trimmed = line.trim();
            if trimmed.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            if line.starts_with(char::is_whitespace) {
                if let (Some(at), Some(key)) = (cursor, last_key.as_ref()) {
                    if let Some(value) = config.options_mut(at).get_mut(key) {
                        value.push('\n');
                        value.push_str(trimmed);
                    }
                    continue;
                }
                return Err(syntax_error("unexpected indentation"));
            }

            if let Some(name) = section_header(&line) {
                cursor = Some(config.open_section(name));
                last_key = None;
                continue;
            }

            let at = cursor.ok_or_else(|| syntax_error("option before any section header"))?;
            let (key, value) = option_line(&line).ok_or_else(|| syntax_error("expected 'key = value'"))?;
            config.options_mut(at).insert(key.clone(), value);
            last_key = Some(key);
        }

        Ok(config)
    }

    fn open_section(&mut self, name: &str) -> Cursor {
        if name == DEFAULT_SECTION {
            return Cursor::Defaults;
        }
        match self.sections.iter().position(|(existing, _)| existing == name) {
            Some(index) => Cursor::Section(index),
            None => {
                self.sections.push((name.to_string(), Options::new()));
                Cursor::Section(self.sections.len() - 1)
            }
        }
    }

    fn options_mut(&mut self, at: Cursor) -> &mut Options {
        match at {
            Cursor::Defaults => &mut self.defaults,
            Cursor::Section(index) => &mut self.sections[index].1,
        }
    }

    /// Section names in file order, `DEFAULT` excluded.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.iter().any(|(name, _)| name == section)
    }

    fn section_options(&self, section: &str) -> Result<Option<&Options>> {
        if section == DEFAULT_SECTION {
            return Ok(None);
        }
        self.sections
            .iter()
            .find(|(name, _)| name == section)
            .map(|(_, options)| Some(options))
            .ok_or_else(|| DslSeqError::NoSection(section.to_string()))
    }

    fn lookup<'a>(&'a self, options: Option<&'a Options>, key: &str) -> Option<&'a str> {
        options
            .and_then(|options| options.get(key))
            .or_else(|| self.defaults.get(key))
            .map(String::as_str)
    }

    /// Interpolated value of `option` in `section`, falling back to `DEFAULT`.
    pub fn get(&self, section: &str, option: &str) -> Result<String> {
        let options = self.section_options(section)?;
        let key = option.to_lowercase();
        let raw = self.lookup(options, &key).ok_or_else(|| DslSeqError::NoOption {
            section: section.to_string(),
            option: key.clone(),
        })?;

        let fail = |reason: String| DslSeqError::Interpolation {
            section: section.to_string(),
            option: key.clone(),
            reason,
        };

        let mut value = raw.to_string();
        for _ in 0..MAX_INTERPOLATION_DEPTH {
            if !value.contains("%(") {
                return Ok(value);
            }
            value = self.substitute(options, &value).map_err(fail)?;
        }
        if value.contains("%(") {
            return Err(fail(format!("recursion deeper than {}", MAX_INTERPOLATION_DEPTH)));
        }
        Ok(value)
    }

    // One pass of `%(key)s` / `%%` replacement.
    fn substitute(&self, options: Option<&Options>, value: &str) -> std::result::Result<String, String> {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos + 1..];
            if let Some(after) = tail.strip_prefix('%') {
                out.push('%');
                rest = after;
            } else if let Some(reference) = tail.strip_prefix('(') {
                let end = reference
                    .find(")s")
                    .ok_or_else(|| format!("unterminated reference in '{}'", value))?;
                let name = reference[..end].to_lowercase();
                let replacement = self
                    .lookup(options, &name)
                    .ok_or_else(|| format!("references missing option '{}'", name))?;
                out.push_str(replacement);
                rest = &reference[end + 2..];
            } else {
                return Err(format!("'%' must be followed by '%' or '(' in '{}'", value));
            }
        }
        out.push_str(rest);

        Ok(out)
    }
}

fn section_header(line: &str) -> Option<&str> {
    let inner = line.strip_prefix('[')?;
    match inner.find(']') {
        Some(end) if end > 0 => Some(&inner[..end]),
        _ => None,
    }
}

fn option_line(line: &str) -> Option<(String, String)> {
    let split = line.find([':', '='])?;
    let key = line[..split].trim_end();
    if key.is_empty() {
        return None;
    }

    let mut value = &line[split + 1..];
    if let Some(pos) = value.find(';') {
        if pos > 0 && value[..pos].ends_with(char::is_whitespace) {
            value = &value[..pos];
        }
    }
    let value = match value.trim() {
        "\"\"" => "",
        other => other,
    };

    Some((key.to_lowercase(), value.to_string()))
}
