//! Asset tag format: `{COMPANY}-{OFFICE}-{CATEGORY}-{YEAR}-{SEQ}`
//!
//! The sequence is scoped to (office, year) and shared by every category,
//! so the category segment only affects the printed code.

use std::fmt;

use crate::error::{AppError, AppResult};

/// Minimum width of the zero-padded sequence segment
pub const SEQ_WIDTH: usize = 4;

/// Separator between tag segments; codes may not contain it
pub const SEGMENT_SEPARATOR: char = '-';

/// Trim and upper-case a location/category/company code.
/// Returns `None` when nothing is left.
pub fn normalize_code(raw: Option<&str>) -> Option<String> {
    let code = raw?.trim().to_uppercase();
    if code.is_empty() {
        None
    } else {
        Some(code)
    }
}

/// Normalize a code that ends up inside asset tags.
/// `kind` names the code in the error ("Location", "Category").
pub fn checked_code(kind: &str, raw: Option<&str>) -> AppResult<Option<String>> {
    match normalize_code(raw) {
        Some(code) if code.contains(SEGMENT_SEPARATOR) => Err(AppError::Validation(format!(
            "{} code '{}' must not contain '{}'",
            kind, code, SEGMENT_SEPARATOR
        ))),
        other => Ok(other),
    }
}

/// The counter a tag draws its sequence number from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagScope {
    pub office_code: String,
    pub year: i32,
}

/// A parsed or freshly minted asset tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetTag {
    pub company: String,
    pub office: String,
    pub category: String,
    pub year: i32,
    pub seq: i32,
}

impl AssetTag {
    /// Build a tag from raw codes; fails when either code is blank
    pub fn new(
        company: &str,
        office_code: Option<&str>,
        category_code: Option<&str>,
        year: i32,
        seq: i32,
    ) -> AppResult<Self> {
        let office = checked_code("Location", office_code)?.ok_or_else(|| {
            AppError::Validation("Location code is missing; it is required to generate an asset tag".to_string())
        })?;
        let category = checked_code("Category", category_code)?.ok_or_else(|| {
            AppError::Validation("Category code is missing; it is required to generate an asset tag".to_string())
        })?;

        Ok(Self {
            company: company.trim().to_uppercase(),
            office,
            category,
            year,
            seq,
        })
    }

    /// Parse a tag string. Segments never contain a dash, so a well-formed
    /// tag has exactly five of them.
    pub fn parse(raw: &str) -> Option<Self> {
        let parts: Vec<&str> = raw.trim().split(SEGMENT_SEPARATOR).collect();
        let [company, office, category, year_part, seq_part] = parts[..] else {
            return None;
        };

        if seq_part.is_empty() || !seq_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if year_part.len() != 4 || !year_part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if company.is_empty() || category.is_empty() || office.is_empty() {
            return None;
        }

        Some(Self {
            company: company.to_uppercase(),
            office: office.to_uppercase(),
            category: category.to_uppercase(),
            year: year_part.parse().ok()?,
            seq: seq_part.parse().ok()?,
        })
    }

    pub fn scope(&self) -> TagScope {
        TagScope {
            office_code: self.office.clone(),
            year: self.year,
        }
    }

    /// Whether this tag draws from the given company/office/year counter
    pub fn belongs_to(&self, company: &str, scope: &TagScope) -> bool {
        self.company.eq_ignore_ascii_case(company)
            && self.office.eq_ignore_ascii_case(&scope.office_code)
            && self.year == scope.year
    }
}

impl fmt::Display for AssetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{:0width$}",
            self.company,
            self.office,
            self.category,
            self.year,
            self.seq,
            width = SEQ_WIDTH
        )
    }
}

/// SQL `ILIKE` pattern selecting candidate tags of one counter
pub fn scope_like_pattern(company: &str, scope: &TagScope) -> String {
    let escape = |s: &str| s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!(
        "{}-{}-%-{}-%",
        escape(company),
        escape(&scope.office_code),
        scope.year
    )
}

/// Highest sequence number among `tags` that belong to the counter.
/// Malformed tags and tags of other offices/years are ignored.
pub fn max_seq_in<'a, I>(tags: I, company: &str, scope: &TagScope) -> i32
where
    I: IntoIterator<Item = &'a str>,
{
    tags.into_iter()
        .filter_map(AssetTag::parse)
        .filter(|tag| tag.belongs_to(company, scope))
        .map(|tag| tag.seq)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(office: &str, year: i32) -> TagScope {
        TagScope {
            office_code: office.to_string(),
            year,
        }
    }

    #[test]
    fn test_format_pads_sequence() {
        let tag = AssetTag::new("ESS", Some(" m "), Some("comp"), 2025, 1).unwrap();
        assert_eq!(tag.to_string(), "ESS-M-COMP-2025-0001");

        let tag = AssetTag::new("ESS", Some("M"), Some("COMP"), 2025, 12345).unwrap();
        assert_eq!(tag.to_string(), "ESS-M-COMP-2025-12345");
    }

    #[test]
    fn test_missing_codes_are_rejected() {
        let err = AssetTag::new("ESS", Some("  "), Some("COMP"), 2025, 1).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("Location")));

        let err = AssetTag::new("ESS", Some("M"), None, 2025, 1).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("Category")));
    }

    #[test]
    fn test_parse_simple_tag() {
        let tag = AssetTag::parse("ESS-M-COMP-2025-0042").unwrap();
        assert_eq!(tag.company, "ESS");
        assert_eq!(tag.office, "M");
        assert_eq!(tag.category, "COMP");
        assert_eq!(tag.year, 2025);
        assert_eq!(tag.seq, 42);
    }

    #[test]
    fn test_dashed_codes_cannot_mint_tags() {
        let err = AssetTag::new("ESS", Some("M"), Some("it-eq"), 2025, 40).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("IT-EQ")));

        let err = AssetTag::new("ESS", Some("MD-OFFICE"), Some("COMP"), 2025, 1).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.starts_with("Location")));
    }

    #[test]
    fn test_parse_rejects_extra_segments() {
        // Would be ambiguous between office M-IT and category IT-EQ
        assert!(AssetTag::parse("ESS-M-IT-EQ-2025-0040").is_none());
        assert!(AssetTag::parse("ESS-MD-OFFICE-LAPTOP-2024-0007").is_none());

        let tags = ["ESS-M-IT-EQ-2025-0040", "ESS-M-COMP-2025-0002"];
        assert_eq!(max_seq_in(tags.iter().copied(), "ESS", &scope("M", 2025)), 2);
    }

    #[test]
    fn test_checked_code() {
        assert_eq!(checked_code("Category", Some(" comp ")).unwrap(), Some("COMP".to_string()));
        assert_eq!(checked_code("Category", Some("  ")).unwrap(), None);
        assert!(checked_code("Category", Some("it-eq")).is_err());
    }

    #[test]
    fn test_every_minted_tag_parses_back() {
        for (office, category) in [("M", "COMP"), ("PARIS", "MONI"), ("A_B", "X1")] {
            let minted = AssetTag::new("ESS", Some(office), Some(category), 2025, 7).unwrap();
            let parsed = AssetTag::parse(&minted.to_string()).unwrap();
            assert_eq!(parsed, minted);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(AssetTag::parse("").is_none());
        assert!(AssetTag::parse("ESS-M-2025-0001").is_none());
        assert!(AssetTag::parse("ESS-M-COMP-2025-00A1").is_none());
        assert!(AssetTag::parse("ESS-M-COMP-25-0001").is_none());
        assert!(AssetTag::parse("ESS-M-COMP-2025-").is_none());
    }

    #[test]
    fn test_max_seq_ignores_other_scopes() {
        let tags = [
            "ESS-M-COMP-2025-0003",
            "ESS-M-MONI-2025-0009",
            "ESS-M-COMP-2024-0050",
            "ESS-P-COMP-2025-0077",
            "XYZ-M-COMP-2025-0099",
            "ESS-M-COMP-2025-garbage",
        ];
        assert_eq!(max_seq_in(tags.iter().copied(), "ESS", &scope("M", 2025)), 9);
        assert_eq!(max_seq_in(tags.iter().copied(), "ESS", &scope("Q", 2025)), 0);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(scope_like_pattern("ESS", &scope("M", 2025)), "ESS-M-%-2025-%");
        assert_eq!(scope_like_pattern("ESS", &scope("A_B", 2025)), "ESS-A\\_B-%-2025-%");
    }
}
