use std::sync::Arc;

use crate::error::{Error, Result};
use crate::header::Schema;

/// Columns every record carries, in output order. They come from the first seven VCF fields.
pub const FIXED_COLUMNS: [&str; 7] = [
    "Chromosome",
    "Position",
    "ID",
    "Ref Allele",
    "Alt Allele",
    "Quality",
    "Filter",
];

// CHROM POS ID REF ALT QUAL FILTER INFO
const FIXED_FIELDS: usize = 8;
const ANNOTATION_KEY: &str = "ANN";

/// One decoded data line: column name to value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(Arc<str>, String)>,
}

impl Record {
    pub fn with_capacity(capacity: usize) -> Self {
        Record {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set `column` to `value`. A column that is already present keeps its position.
    pub fn set(&mut self, column: Arc<str>, value: &str) {
        match self.fields.iter_mut().find(|(c, _)| *c == column) {
            Some((_, v)) => {
                v.clear();
                v.push_str(value);
            }
            None => self.fields.push((column, value.to_string())),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| &**c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(c, _)| &**c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(c, v)| (&**c, v.as_str()))
    }
}

/// Decodes data lines against a finished [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct RecordDecoder<'a> {
    schema: &'a Schema,
}

impl<'a> RecordDecoder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        RecordDecoder { schema }
    }

    /// Decode one data line. `line_number` is only used to report a malformed line.
    ///
    /// INFO tokens without `=` are flags and feed no column. Keys missing from the schema are
    /// dropped. The `ANN` value is split on `|` and paired with the annotation keys by position;
    /// pairing stops at the shorter of the two. Annotation columns are set before info columns.
    pub fn decode(&self, line: &str, line_number: usize) -> Result<Record> {
        let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        let fields: Vec<&str> = line.splitn(FIXED_FIELDS + 1, '\t').collect();
        if fields.len() < FIXED_FIELDS {
            return Err(Error::MalformedFixedFields {
                line_number,
                found: fields.len(),
                line: line.to_string(),
            });
        }

        let mut record = Record::with_capacity(
            self.schema.fixed.len() + self.schema.info.len() + self.schema.annotation.len(),
        );
        for (column, value) in self.schema.fixed.iter().zip(&fields[..FIXED_COLUMNS.len()]) {
            record.set(column.clone(), value);
        }

        let mut info = Vec::new();
        let mut annotation = None;
        for token in fields[FIXED_FIELDS - 1].split(';') {
            let Some((key, value)) = token.split_once('=') else {
                continue;
            };
            if let Some(name) = self.schema.info.get(key) {
                info.push((name, value));
            }
            if key == ANNOTATION_KEY {
                annotation = Some(value);
            }
        }

        // annotation columns precede info columns
        if let Some(annotation) = annotation {
            for (column, value) in self.schema.annotation.iter().zip(annotation.split('|')) {
                record.set(column.clone(), value);
            }
        }
        for (name, value) in info {
            record.set(name.clone(), value);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::InfoKeyToName;

    fn schema() -> Schema {
        let mut info = InfoKeyToName::default();
        info.insert("MBQ".to_string(), Arc::from("Mutect2 median base quality"));
        info.insert("DP".to_string(), Arc::from("Mutect2 depth"));
        Schema::new(
            info,
            vec![
                Arc::from("SnpEff Allele"),
                Arc::from("SnpEff Annotation"),
                Arc::from("SnpEff Distance"),
            ],
        )
    }

    fn line(info: &str) -> String {
        format!("chr9\t5073770\trs77375493\tG\tT\t.\tPASS\t{}\tGT:AD\t0/1:10,12\n", info)
    }

    #[test]
    fn test_decode_info_and_annotation() {
        let s = schema();
        let record = RecordDecoder::new(&s)
            .decode(&line("MBQ=30;ANN=A|B|C"), 1)
            .unwrap();
        assert_eq!(record.get("Mutect2 median base quality"), Some("30"));
        assert_eq!(record.get("SnpEff Allele"), Some("A"));
        assert_eq!(record.get("SnpEff Annotation"), Some("B"));
        assert_eq!(record.get("SnpEff Distance"), Some("C"));
        assert_eq!(record.len(), 11);
    }

    #[test]
    fn test_fixed_columns() {
        let s = schema();
        let record = RecordDecoder::new(&s).decode(&line("XX=1;FLAG"), 1).unwrap();
        let got: Vec<(&str, &str)> = record.iter().collect();
        assert_eq!(
            got,
            vec![
                ("Chromosome", "chr9"),
                ("Position", "5073770"),
                ("ID", "rs77375493"),
                ("Ref Allele", "G"),
                ("Alt Allele", "T"),
                ("Quality", "."),
                ("Filter", "PASS"),
            ]
        );
    }

    #[test]
    fn test_column_order() {
        let s = schema();
        let record = RecordDecoder::new(&s)
            .decode(&line("ANN=A|B;DP=12;MBQ=30"), 1)
            .unwrap();
        let columns: Vec<&str> = record.columns().skip(7).collect();
        assert_eq!(
            columns,
            vec![
                "SnpEff Allele",
                "SnpEff Annotation",
                "Mutect2 depth",
                "Mutect2 median base quality",
            ]
        );
    }

    #[test]
    fn test_annotation_columns_come_first_whatever_token_order() {
        let s = schema();
        let record = RecordDecoder::new(&s)
            .decode(&line("DP=1;ANN=C|missense"), 1)
            .unwrap();
        let columns: Vec<&str> = record.columns().skip(7).collect();
        assert_eq!(
            columns,
            vec!["SnpEff Allele", "SnpEff Annotation", "Mutect2 depth"]
        );
    }

    #[test]
    fn test_short_annotation_leaves_columns_absent() {
        let s = schema();
        let record = RecordDecoder::new(&s).decode(&line("ANN=A"), 1).unwrap();
        assert_eq!(record.get("SnpEff Allele"), Some("A"));
        assert_eq!(record.get("SnpEff Annotation"), None);
        assert_eq!(record.get("SnpEff Distance"), None);
    }

    #[test]
    fn test_extra_annotation_values_are_dropped() {
        let s = schema();
        let record = RecordDecoder::new(&s)
            .decode(&line("ANN=A|B|C|D|E"), 1)
            .unwrap();
        assert_eq!(record.len(), 10);
        assert_eq!(record.get("SnpEff Distance"), Some("C"));
    }

    #[test]
    fn test_empty_annotation_values_are_kept() {
        let s = schema();
        let record = RecordDecoder::new(&s).decode(&line("ANN=A||"), 1).unwrap();
        assert_eq!(record.get("SnpEff Annotation"), Some(""));
        assert_eq!(record.get("SnpEff Distance"), Some(""));
    }

    #[test]
    fn test_last_annotation_token_wins() {
        let s = schema();
        let record = RecordDecoder::new(&s)
            .decode(&line("ANN=A|B|C;ANN=X|Y|Z"), 1)
            .unwrap();
        assert_eq!(record.get("SnpEff Allele"), Some("X"));
        assert_eq!(record.len(), 10);
    }

    #[test]
    fn test_annotation_requires_exact_key() {
        let s = schema();
        let record = RecordDecoder::new(&s)
            .decode(&line("ANNX=A|B|C;XANN=A"), 1)
            .unwrap();
        assert_eq!(record.len(), 7);
    }

    #[test]
    fn test_repeated_info_key_later_value_wins() {
        let s = schema();
        let record = RecordDecoder::new(&s)
            .decode(&line("DP=1;MBQ=30;DP=2"), 1)
            .unwrap();
        assert_eq!(record.get("Mutect2 depth"), Some("2"));
        assert_eq!(record.columns().nth(7), Some("Mutect2 depth"));
        assert_eq!(record.len(), 9);
    }

    #[test]
    fn test_value_may_contain_equals() {
        let s = schema();
        let record = RecordDecoder::new(&s).decode(&line("DP=a=b"), 1).unwrap();
        assert_eq!(record.get("Mutect2 depth"), Some("a=b"));
    }

    #[test]
    fn test_eight_fields_without_samples() {
        let s = schema();
        let record = RecordDecoder::new(&s)
            .decode("chr1\t10\t.\tA\tC\t50\tPASS\tDP=7\r\n", 1)
            .unwrap();
        assert_eq!(record.get("Filter"), Some("PASS"));
        assert_eq!(record.get("Mutect2 depth"), Some("7"));
    }

    #[test]
    fn test_malformed_fixed_fields() {
        let s = schema();
        let err = RecordDecoder::new(&s)
            .decode("chr1\t10\t.\tA\tC\t50\tPASS\n", 42)
            .unwrap_err();
        match err {
            Error::MalformedFixedFields {
                line_number,
                found,
                line,
            } => {
                assert_eq!(line_number, 42);
                assert_eq!(found, 7);
                assert_eq!(line, "chr1\t10\t.\tA\tC\t50\tPASS");
            }
            e => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn test_record_set_replaces_in_place() {
        let mut record = Record::default();
        assert!(record.is_empty());
        record.set(Arc::from("a"), "1");
        record.set(Arc::from("b"), "2");
        record.set(Arc::from("a"), "3");
        assert_eq!(record.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
    }
}
