//! Header metadata extraction
//!
//! Bakta writes its run parameters as `#` comment lines ahead of the feature
//! table:
//!
//! ```text
//! # Annotated with Bakta
//! # Software: v1.9.4
//! # Database: v5.1, full
//! # DOI: 10.1099/mgen.0.000685
//! # URL: github.com/oschwengers/bakta
//! ```
//!
//! Each recognised prefix maps to one or more [`GenomeMetadata`] fields.
//! Anything else is ignored.

use crate::models::GenomeMetadata;

/// How the value after a recognised prefix is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderField {
    Software,
    /// `<version>, <type>`
    Database,
    Doi,
    Url,
}

/// Recognised header lines, matched by prefix
const HEADER_PATTERNS: &[(&str, HeaderField)] = &[
    ("# Software:", HeaderField::Software),
    ("# Database:", HeaderField::Database),
    ("# DOI:", HeaderField::Doi),
    ("# URL:", HeaderField::Url),
];

impl HeaderField {
    fn apply(self, value: &str, metadata: &mut GenomeMetadata) {
        match self {
            HeaderField::Software => metadata.software_version = value.to_string(),
            HeaderField::Database => {
                let mut parts = value.split(',');
                if let Some(version) = parts.next() {
                    metadata.database_version = version.trim().to_string();
                }
                if let Some(db_type) = parts.next() {
                    metadata.database_type = db_type.trim().to_string();
                }
            },
            HeaderField::Doi => metadata.doi = value.to_string(),
            HeaderField::Url => metadata.url = value.to_string(),
        }
    }
}

/// Extract run metadata from comment lines
///
/// Only the metadata fields are filled in; `sample_id` and `file_path` are
/// left for the caller.
pub fn parse_metadata<'a, I>(lines: I) -> GenomeMetadata
where
    I: IntoIterator<Item = &'a str>,
{
    let mut metadata = GenomeMetadata::default();

    for line in lines {
        let matched = HEADER_PATTERNS
            .iter()
            .find_map(|(prefix, field)| line.strip_prefix(prefix).map(|rest| (*field, rest)));

        if let Some((field, rest)) = matched {
            field.apply(rest.trim(), &mut metadata);
        }
    }

    metadata
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_header() {
        let lines = [
            "# Annotated with Bakta",
            "# Software: v1.9.4",
            "# Database: v5.1, full",
            "# DOI: 10.1099/mgen.0.000685",
            "# URL: github.com/oschwengers/bakta",
            "#Sequence Id\tType\tStart\tStop\tStrand\tLocus Tag\tGene\tProduct\tDbXrefs",
        ];

        let metadata = parse_metadata(lines);

        assert_eq!(metadata.software_version, "v1.9.4");
        assert_eq!(metadata.database_version, "v5.1");
        assert_eq!(metadata.database_type, "full");
        assert_eq!(metadata.doi, "10.1099/mgen.0.000685");
        assert_eq!(metadata.url, "github.com/oschwengers/bakta");
    }

    #[test]
    fn test_database_without_type() {
        let metadata = parse_metadata(["# Database: 3.2"]);
        assert_eq!(metadata.database_version, "3.2");
        assert_eq!(metadata.database_type, "");
    }

    #[test]
    fn test_database_extra_segments_ignored() {
        let metadata = parse_metadata(["# Database: 3.2, refseq, extra"]);
        assert_eq!(metadata.database_version, "3.2");
        assert_eq!(metadata.database_type, "refseq");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let metadata = parse_metadata(["# Software: v1.0", "# something else entirely"]);
        assert_eq!(metadata.software_version, "v1.0");
        assert_eq!(metadata.database_version, "");
        assert_eq!(metadata.database_type, "");
        assert_eq!(metadata.doi, "");
        assert_eq!(metadata.url, "");
    }

    #[test]
    fn test_order_independent() {
        let forward = parse_metadata(["# Software: v1.0", "# Database: 3.2, refseq", "# DOI: x"]);
        let reverse = parse_metadata(["# DOI: x", "# Database: 3.2, refseq", "# Software: v1.0"]);
        assert_eq!(forward, reverse);
    }

    #[test]
    fn test_prefix_is_case_and_spacing_sensitive() {
        let metadata = parse_metadata(["#Software: v1.0", "# software: v2.0"]);
        assert_eq!(metadata.software_version, "");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_metadata(Vec::<&str>::new()), GenomeMetadata::default());
    }
}
