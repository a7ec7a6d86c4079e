use crate::database::record::Record;

/// Filter for the list operation, built from the optional `search` parameter.
///
/// The search term is always matched literally: it is never handed to a
/// pattern engine unescaped, so `%`, `_`, `.*` or `\` in user input only
/// match themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter {
    /// No search term: every record matches
    All,
    /// Case-insensitive substring match on title, body or any tag
    Contains(String),
}

impl SearchFilter {
    /// Absent, empty and whitespace-only terms all mean "no filter"
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some(term) if !term.is_empty() => SearchFilter::Contains(term.to_string()),
            _ => SearchFilter::All,
        }
    }

    pub fn term(&self) -> Option<&str> {
        match self {
            SearchFilter::All => None,
            SearchFilter::Contains(term) => Some(term),
        }
    }

    /// In-memory evaluation, equivalent to the SQL produced by [`Self::to_sql`]
    pub fn matches(&self, record: &Record) -> bool {
        let needle = match self {
            SearchFilter::All => return true,
            SearchFilter::Contains(term) => term.to_lowercase(),
        };

        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

        contains(&record.title)
            || contains(&record.body)
            || record.tags.iter().any(|tag| contains(tag))
    }

    /// SQL WHERE predicate plus its bound parameters. Placeholders start at
    /// `$starting_param_index`.
    pub fn to_sql(&self, starting_param_index: usize) -> (String, Vec<String>) {
        match self {
            SearchFilter::All => ("TRUE".to_string(), vec![]),
            SearchFilter::Contains(term) => {
                let p = format!("${}", starting_param_index);
                let clause = format!(
                    r#"("title" ILIKE {p} ESCAPE '\' OR "body" ILIKE {p} ESCAPE '\' OR EXISTS (SELECT 1 FROM unnest("tags") AS tag WHERE tag ILIKE {p} ESCAPE '\'))"#,
                    p = p
                );
                (clause, vec![format!("%{}%", escape_like(term))])
            }
        }
    }
}

/// Escape LIKE wildcards and the escape character itself
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(title: &str, body: &str, tags: &[&str]) -> Record {
        Record {
            id: Uuid::new_v4(),
            title: title.to_string(),
            body: body.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn blank_params_match_everything() {
        assert_eq!(SearchFilter::from_param(None), SearchFilter::All);
        assert_eq!(SearchFilter::from_param(Some("")), SearchFilter::All);
        assert_eq!(SearchFilter::from_param(Some("   ")), SearchFilter::All);
        assert_eq!(
            SearchFilter::from_param(Some("  work ")),
            SearchFilter::Contains("work".to_string())
        );
    }

    #[test]
    fn matches_title_body_and_tags_case_insensitively() {
        let filter = SearchFilter::from_param(Some("WoRk"));
        assert!(filter.matches(&record("Homework", "", &[])));
        assert!(filter.matches(&record("a", "networking notes", &[])));
        assert!(filter.matches(&record("a", "b", &["WORK"])));
        assert!(filter.matches(&record("a", "b", &["coworkers"])));
        assert!(!filter.matches(&record("a", "b", &["play"])));
        assert!(SearchFilter::All.matches(&record("a", "b", &[])));
    }

    #[test]
    fn pattern_characters_match_literally() {
        let filter = SearchFilter::from_param(Some(".*"));
        assert!(!filter.matches(&record("anything", "at all", &[])));
        assert!(filter.matches(&record("regex .* here", "", &[])));

        let filter = SearchFilter::from_param(Some("50%"));
        assert!(filter.matches(&record("50% off", "", &[])));
        assert!(!filter.matches(&record("500 off", "", &[])));
    }

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
    }

    #[test]
    fn sql_for_all_has_no_params() {
        let (sql, params) = SearchFilter::All.to_sql(1);
        assert_eq!(sql, "TRUE");
        assert!(params.is_empty());
    }

    #[test]
    fn sql_for_term_reuses_one_param_across_fields() {
        let (sql, params) = SearchFilter::from_param(Some("a_b")).to_sql(3);
        assert_eq!(params, vec![r"%a\_b%".to_string()]);
        assert_eq!(sql.matches("$3").count(), 3);
        assert!(sql.contains(r#""title" ILIKE $3"#));
        assert!(sql.contains(r#""body" ILIKE $3"#));
        assert!(sql.contains(r#"unnest("tags")"#));
        assert!(!sql.contains("$4"));
    }
}
