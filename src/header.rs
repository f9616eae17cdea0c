use std::sync::Arc;

use log::{debug, info};
use rustc_hash::FxHashMap;

use crate::config::Settings;
use crate::record::FIXED_COLUMNS;

const META_MARKER: &str = "##";
const INFO_SECTION_START: &str = "##GATKCommandLine";
const INFO_SECTION_END: &str = "##MutectVersion";
const INFO_DECLARATION: &str = "##INFO=<ID=";
const INFO_DESCRIPTION: &str = ",Description=\"";
const ANNOTATION_DECLARATION: &str = "##INFO=<ID=ANN";
const ANNOTATION_DESCRIPTION: &str = "Description=\"Functional annotations:";
const DESCRIPTION_END: &str = "\">";
const ANNOTATION_SEPARATOR: &str = " | ";

/// Map from an INFO key (e.g. `MBQ`) to its prefixed display name.
pub type InfoKeyToName = FxHashMap<String, Arc<str>>;

/// The `##` meta lines of a VCF in file order, line terminators included.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeaderText(String);

impl HeaderText {
    pub fn new() -> Self {
        HeaderText(String::new())
    }

    /// True for lines that belong in the header text.
    pub fn is_meta_line(line: &str) -> bool {
        line.starts_with(META_MARKER)
    }

    pub fn push_line(&mut self, line: &str) {
        self.0.push_str(line);
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn lines(&self) -> std::str::Lines<'_> {
        self.0.lines()
    }
}

impl From<String> for HeaderText {
    fn from(text: String) -> Self {
        HeaderText(text)
    }
}

impl From<&str> for HeaderText {
    fn from(text: &str) -> Self {
        HeaderText(text.to_string())
    }
}

/// Where the scan is relative to the variant caller's block of INFO declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Outside,
    Inside,
    Done,
}

impl Section {
    fn next(self, line: &str) -> Section {
        match self {
            Section::Done => Section::Done,
            _ if line.starts_with(INFO_SECTION_END) => Section::Done,
            _ if line.starts_with(INFO_SECTION_START) => Section::Inside,
            state => state,
        }
    }
}

/// Lines strictly between the first `##GATKCommandLine` line and the first `##MutectVersion` line.
/// Further `##GATKCommandLine` lines inside the section are skipped, not collected.
fn info_section(header: &HeaderText) -> Vec<&str> {
    let mut section = Section::Outside;
    let mut lines = Vec::new();
    for line in header.lines() {
        let previous = section;
        section = section.next(line);
        match (previous, section) {
            (_, Section::Done) => break,
            (Section::Inside, Section::Inside) if !line.starts_with(INFO_SECTION_START) => {
                lines.push(line)
            }
            _ => {}
        }
    }
    if section == Section::Outside {
        debug!("no {} line in header; info schema is empty", INFO_SECTION_START);
    }
    lines
}

/// `##INFO=<ID=MBQ,Number=R,Type=Integer,Description="median base quality by allele">`
/// gives `("MBQ", "median base quality by allele")`.
fn parse_info_declaration(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix(INFO_DECLARATION)?;
    let key = rest.split(',').next().unwrap_or_default();
    if key.is_empty() {
        return None;
    }
    let (_, description) = rest.split_once(INFO_DESCRIPTION)?;
    Some((key, until_description_end(description)))
}

fn until_description_end(text: &str) -> &str {
    text.split_once(DESCRIPTION_END)
        .map_or(text, |(description, _)| description)
}

/// Recover the INFO key to display-name mapping from the variant caller's section of the header.
/// Declarations outside that section, and lines that are not INFO declarations, are ignored.
pub fn info_key_to_name(header: &HeaderText, settings: &Settings) -> InfoKeyToName {
    let mut names = InfoKeyToName::default();
    for line in info_section(header) {
        match parse_info_declaration(line) {
            Some((key, description)) => {
                names.insert(key.to_string(), Arc::from(settings.info_name(description)));
            }
            None => debug!("skipping non-INFO line in info section: {}", line),
        }
    }
    names
}

fn is_quote(c: char) -> bool {
    c == '\'' || c == '"'
}

/// Sub-field names from one `##INFO=<ID=ANN` line, e.g.
/// `Description="Functional annotations: 'Allele | Annotation | Distance' ">`.
fn annotation_fields(line: &str) -> Option<Vec<&str>> {
    let (_, rest) = line.split_once(ANNOTATION_DESCRIPTION)?;
    let list = until_description_end(rest).trim();
    let list = list.strip_prefix(is_quote).unwrap_or(list);
    let list = list.strip_suffix(is_quote).unwrap_or(list);
    if list.is_empty() {
        return Some(Vec::new());
    }
    Some(list.split(ANNOTATION_SEPARATOR).collect())
}

/// Recover the ordered annotation sub-field names. When the header declares `ANN` more than once,
/// the names of every declaration are appended in header order.
pub fn annotation_keys(header: &HeaderText, settings: &Settings) -> Vec<Arc<str>> {
    let mut keys: Vec<Arc<str>> = Vec::new();
    let mut declarations = 0;
    for line in header
        .lines()
        .filter(|line| line.starts_with(ANNOTATION_DECLARATION))
    {
        declarations += 1;
        match annotation_fields(line) {
            Some(fields) => keys.extend(
                fields
                    .into_iter()
                    .map(|field| Arc::from(settings.annotation_name(field))),
            ),
            None => debug!("ANN declaration without functional annotation list: {}", line),
        }
    }
    match declarations {
        0 => debug!("no {} line in header; annotation schema is empty", ANNOTATION_DECLARATION),
        1 => {}
        n => debug!("{} ANN declarations in header; their keys were appended", n),
    }
    keys
}

/// Both schemas of one file plus the fixed column names. Built once before any data line is
/// decoded and only read afterwards, so it can be shared by every decoding thread.
#[derive(Debug, Clone)]
pub struct Schema {
    pub fixed: Vec<Arc<str>>,
    pub info: InfoKeyToName,
    pub annotation: Vec<Arc<str>>,
}

impl Schema {
    pub fn new(info: InfoKeyToName, annotation: Vec<Arc<str>>) -> Self {
        Schema {
            fixed: FIXED_COLUMNS.iter().map(|&c| Arc::from(c)).collect(),
            info,
            annotation,
        }
    }

    pub fn from_header(header: &HeaderText, settings: &Settings) -> Self {
        let schema = Schema::new(
            info_key_to_name(header, settings),
            annotation_keys(header, settings),
        );
        info!(
            "schema: {} info keys, {} annotation keys",
            schema.info.len(),
            schema.annotation.len()
        );
        schema
    }
}
