/// Label prepended to column names recovered from the variant caller's INFO declarations.
pub const DEFAULT_INFO_PREFIX: &str = "Mutect2";
/// Label prepended to the sub-field names of the functional annotation.
pub const DEFAULT_ANNOTATION_PREFIX: &str = "SnpEff";
/// File name used when only an output directory is given.
pub const DEFAULT_OUTPUT_NAME: &str = "variants.csv";

/// Per-run settings shared by the schema extractors, the decoder and the table writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub info_prefix: String,
    pub annotation_prefix: String,
    /// Number of threads used to decode data lines. 0 and 1 both mean sequential.
    pub threads: usize,
    /// Column delimiter of the written table.
    pub delimiter: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            info_prefix: DEFAULT_INFO_PREFIX.to_string(),
            annotation_prefix: DEFAULT_ANNOTATION_PREFIX.to_string(),
            threads: 1,
            delimiter: b',',
        }
    }
}

impl Settings {
    /// Display name for an INFO description, e.g. "Mutect2 median base quality by allele".
    pub fn info_name(&self, description: &str) -> String {
        format!("{} {}", self.info_prefix, description)
    }

    /// Display name for one annotation sub-field, e.g. "SnpEff Gene_Name".
    pub fn annotation_name(&self, field: &str) -> String {
        format!("{} {}", self.annotation_prefix, field)
    }
}
