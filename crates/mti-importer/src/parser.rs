//! Delimited record parser
//!
//! Turns one raw line into a [`Document`] using the fixed column layout of
//! the selected [`DocType`].
//!
//! # File Formats
//!
//! SNOMED CT RF2 descriptions are tab separated:
//! ```text
//! id  effectiveTime  active  moduleId  conceptId  languageCode  typeId  term  caseSignificanceId
//! ```
//!
//! ICD-10-GM code lists are `;` separated with 28 columns, starting with
//! `level;isTerminal;codeType;chapterNumber;groupFrom;code;normalizedCode;codeNoDot;title;...`
//!
//! Fields are split raw: no quoting or escaping is recognised.

use mti_common::{Context, DocType, Document};
use std::collections::BTreeMap;

/// Field name to column position
pub type ColumnMap = &'static [(&'static str, usize)];

const SNOMED_CT_DESCRIPTION_COLUMNS: ColumnMap = &[
    ("id", 0),
    ("effectiveTime", 1),
    ("active", 2),
    ("moduleId", 3),
    ("conceptId", 4),
    ("languageCode", 5),
    ("typeId", 6),
    ("term", 7),
    ("caseSignificanceId", 8),
];

const ICD_10_GM_CODE_COLUMNS: ColumnMap = &[
    ("level", 0),
    ("isTerminal", 1),
    ("codeType", 2),
    ("chapterNumber", 3),
    ("groupFrom", 4),
    ("code", 5),
    ("normalizedCode", 6),
    ("codeNoDot", 7),
    ("title", 8),
    ("threeDigitTitle", 9),
    ("fourDigitTitle", 10),
    ("fiveDigitTitle", 11),
    ("use295", 12),
    ("use301", 13),
    ("mortalityList1", 14),
    ("mortalityList2", 15),
    // one key per column; the upstream layout names column 17 mortalityList3 too
    ("mortalityList3", 16),
    ("mortalityList4", 17),
    ("morbidityList", 18),
    ("sexCode", 19),
    ("sexErrorType", 20),
    ("ageFrom", 21),
    ("ageTo", 22),
    ("ageErrorType", 23),
    ("exotic", 24),
    ("occupied", 25),
    ("ifsgMeldung", 26),
    ("ifsgLabor", 27),
];

/// How `id`, `code` and `display` are derived from the extracted columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// `<doc_type>-<id>-<effectiveTime>`, code from `conceptId`, display from `term`
    Description,
    /// `<doc_type>-<codeNoDot>`, code from `code`, display from `title`
    Code,
}

impl Rule {
    fn id_fields(self) -> &'static [&'static str] {
        match self {
            Rule::Description => &["id", "effectiveTime"],
            Rule::Code => &["codeNoDot"],
        }
    }

    fn code_field(self) -> &'static str {
        match self {
            Rule::Description => "conceptId",
            Rule::Code => "code",
        }
    }

    fn display_field(self) -> &'static str {
        match self {
            Rule::Description => "term",
            Rule::Code => "title",
        }
    }
}

/// Column layout and id rule for one document type.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    columns: ColumnMap,
    rule: Rule,
}

impl Layout {
    /// Layout for a document type, `None` if the type has no column map.
    pub fn for_doc_type(doc_type: DocType) -> Option<Self> {
        match doc_type {
            DocType::SnomedCtDescription => Some(Self {
                columns: SNOMED_CT_DESCRIPTION_COLUMNS,
                rule: Rule::Description,
            }),
            DocType::Icd10GmCode => Some(Self {
                columns: ICD_10_GM_CODE_COLUMNS,
                rule: Rule::Code,
            }),
        }
    }
}

/// Stateless line parser, built once per run and shared read-only.
#[derive(Debug, Clone)]
pub struct RecordParser {
    context: Context,
    doc_type: DocType,
    delimiter: String,
    layout: Option<Layout>,
}

impl RecordParser {
    pub fn new(context: Context, doc_type: DocType, delimiter: impl Into<String>) -> Self {
        Self::with_layout(context, doc_type, delimiter, Layout::for_doc_type(doc_type))
    }

    /// Build a parser with an explicit layout; `None` makes every line a skip.
    pub fn with_layout(
        context: Context,
        doc_type: DocType,
        delimiter: impl Into<String>,
        layout: Option<Layout>,
    ) -> Self {
        Self {
            context,
            doc_type,
            delimiter: delimiter.into(),
            layout,
        }
    }

    /// Parse one line.
    ///
    /// Columns beyond the end of the line are left out of `metadata`, and an
    /// id part whose column is missing becomes an empty segment. Returns
    /// `None` (skip, not an error) only when there is no layout.
    pub fn parse(&self, line: &str) -> Option<Document> {
        let layout = self.layout?;
        let fields: Vec<&str> = line.split(self.delimiter.as_str()).collect();

        let metadata: BTreeMap<String, String> = layout
            .columns
            .iter()
            .filter_map(|&(name, idx)| {
                fields
                    .get(idx)
                    .map(|value| (name.to_string(), (*value).to_string()))
            })
            .collect();

        let mut id = self.doc_type.as_str().to_string();
        for field in layout.rule.id_fields() {
            id.push('-');
            id.push_str(metadata.get(*field).map(String::as_str).unwrap_or_default());
        }

        let code = field_or_empty(&metadata, layout.rule.code_field());
        let display = field_or_empty(&metadata, layout.rule.display_field());

        Some(Document::new(id, code, display, self.context, metadata))
    }
}

fn field_or_empty(metadata: &BTreeMap<String, String>, name: &str) -> String {
    metadata.get(name).cloned().unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const ICD_LINE: &str = "3;T;X;01;A00;A00.-;A00;A00;Cholera;Cholera;;;P;P;001;001;001;001;001;9;9;9999;9999;9;J;J;J;J";
    const SNOMED_LINE: &str =
        "101013\t20020131\t1\t900000000000207008\t126813005\ten\t900000000000013009\tNeoplasm of anterior aspect of epiglottis\t900000000000020002";

    #[test]
    fn test_icd_code_line() {
        let parser = RecordParser::new(Context::Icd10Gm, DocType::Icd10GmCode, ";");
        let doc = parser.parse(ICD_LINE).unwrap();

        assert_eq!(doc.id, "icd-10-gm-code-A00");
        assert_eq!(doc.code, "A00.-");
        assert_eq!(doc.display, "Cholera");
        assert_eq!(doc.context, "icd-10-gm");
        assert_eq!(doc.metadata.len(), 28);
        assert_eq!(doc.metadata["mortalityList4"], "001");
        assert_eq!(doc.metadata["ifsgLabor"], "J");
    }

    #[test]
    fn test_pipe_delimited_icd_line() {
        let parser = RecordParser::new(Context::Icd10Gm, DocType::Icd10GmCode, "|");
        let doc = parser
            .parse("1|0|A|1|1|A00|A00|A00|Cholera|Cholera")
            .unwrap();

        assert_eq!(doc.code, "A00");
        assert_eq!(doc.display, "Cholera");
        assert_eq!(doc.id, "icd-10-gm-code-A00");
    }

    #[test]
    fn test_snomed_description_line() {
        let parser = RecordParser::new(Context::SnomedCt, DocType::SnomedCtDescription, "\t");
        let doc = parser.parse(SNOMED_LINE).unwrap();

        assert_eq!(doc.id, "snomed-ct-description-101013-20020131");
        assert_eq!(doc.code, "126813005");
        assert_eq!(doc.display, "Neoplasm of anterior aspect of epiglottis");
        assert_eq!(doc.context, "snomed-ct");
        assert_eq!(doc.metadata.len(), 9);
        assert_eq!(doc.metadata["languageCode"], "en");
    }

    #[test]
    fn test_short_line_yields_partial_metadata() {
        let parser = RecordParser::new(Context::SnomedCt, DocType::SnomedCtDescription, "\t");
        let doc = parser.parse("101013\t20020131\t1\t900000000000207008\t126813005").unwrap();

        assert_eq!(doc.metadata.len(), 5);
        assert!(!doc.metadata.contains_key("term"));
        assert_eq!(doc.code, "126813005");
        assert_eq!(doc.display, "");
    }

    #[test]
    fn test_line_without_id_columns_still_parses() {
        let parser = RecordParser::new(Context::Icd10Gm, DocType::Icd10GmCode, "|");
        let doc = parser.parse("1|0|A|1|1|A00").unwrap();

        assert_eq!(doc.id, "icd-10-gm-code-");
        assert_eq!(doc.code, "A00");
        assert_eq!(doc.display, "");
        assert_eq!(doc.metadata.len(), 6);
        assert!(!doc.metadata.contains_key("codeNoDot"));
    }

    #[test]
    fn test_single_field_snomed_line() {
        let parser = RecordParser::new(Context::SnomedCt, DocType::SnomedCtDescription, "\t");
        let doc = parser.parse("101013").unwrap();

        assert_eq!(doc.id, "snomed-ct-description-101013-");
        assert_eq!(doc.code, "");
        assert_eq!(doc.metadata.len(), 1);
        assert_eq!(doc.metadata["id"], "101013");
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let parser = RecordParser::new(Context::SnomedCt, DocType::SnomedCtDescription, "\t");
        let line = format!("{}\textra\tcolumns", SNOMED_LINE);
        let doc = parser.parse(&line).unwrap();
        assert_eq!(doc.metadata.len(), 9);
    }

    #[test]
    fn test_no_layout_skips_every_line() {
        let parser = RecordParser::with_layout(Context::Icd10Gm, DocType::Icd10GmCode, ";", None);
        assert!(parser.parse(ICD_LINE).is_none());
        assert!(parser.parse("").is_none());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let parser = RecordParser::new(Context::Icd10Gm, DocType::Icd10GmCode, ";");
        assert_eq!(parser.parse(ICD_LINE), parser.parse(ICD_LINE));
    }

    #[test]
    fn test_multi_character_delimiter() {
        let parser = RecordParser::new(Context::Icd10Gm, DocType::Icd10GmCode, "\t|\t");
        let doc = parser
            .parse("3\t|\tT\t|\tX\t|\t01\t|\tA00\t|\tA00.-\t|\tA00\t|\tA00\t|\tCholera")
            .unwrap();
        assert_eq!(doc.display, "Cholera");
        assert_eq!(doc.metadata.len(), 9);
    }
}
