//! Search query building and compilation

use crate::search::document::ProductFields;
use crate::search::error::SearchResult;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Bound;
use tantivy::query::{
    AllQuery, BooleanQuery, BoostQuery, ConstScoreQuery, DisjunctionMaxQuery, EmptyQuery,
    FuzzyTermQuery, Occur, Query, RangeQuery, TermQuery,
};
use tantivy::schema::{Field, IndexRecordOption};
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, Term};

/// Zero-based page request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    /// Page number, starting at 0
    pub page: usize,

    /// Results per page
    pub size: usize,
}

impl Pagination {
    pub fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    /// Resolve optional request parameters against configured limits.
    ///
    /// A missing size falls back to `default_size`; any size is clamped to
    /// `1..=max_size`.
    pub fn resolve(
        page: Option<usize>,
        size: Option<usize>,
        default_size: usize,
        max_size: usize,
    ) -> Self {
        let max_size = max_size.max(1);
        let size = size.unwrap_or(default_size).clamp(1, max_size);
        Self {
            page: page.unwrap_or(0),
            size,
        }
    }

    /// Number of hits to skip
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 0, size: 10 }
    }
}

/// Relative weights of the searched text fields
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FieldBoosts {
    pub name: f32,
    pub category_name: f32,
    pub description: f32,
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self {
            name: 3.0,
            category_name: 2.0,
            description: 1.0,
        }
    }
}

/// Approximate-match tolerance
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Fuzziness {
    /// Edit distance grows with term length: exact up to 2 characters,
    /// one edit up to 5, two edits beyond.
    #[default]
    Auto,
}

impl Fuzziness {
    /// Allowed edit distance for a term
    pub fn distance_for(&self, term: &str) -> u8 {
        match self {
            Fuzziness::Auto => match term.chars().count() {
                0..=2 => 0,
                3..=5 => 1,
                _ => 2,
            },
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Fuzziness::Auto => "AUTO",
        }
    }
}

/// Backend-neutral description of a product search.
///
/// Two shapes exist: a relevance-ranked multi-field keyword match, and the
/// same match (or match-all when there is no keyword) under a non-scoring
/// `price <= ceiling` filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchQuery {
    /// Free-text keyword, `None` when only a price filter applies
    pub keyword: Option<String>,

    /// Inclusive price ceiling
    pub ceiling: Option<Decimal>,

    /// Requested page
    pub page: Pagination,

    /// Field weights
    pub boosts: FieldBoosts,

    /// Fuzzy matching mode
    pub fuzziness: Fuzziness,
}

impl SearchQuery {
    /// Whether the query carries a price filter
    pub fn has_price_filter(&self) -> bool {
        self.ceiling.is_some()
    }

    /// Render the query as an Elasticsearch-style request body.
    ///
    /// Used for logging and diagnostics. The keyword is escaped so the output
    /// is always valid JSON.
    pub fn to_dsl(&self) -> String {
        let matcher = match &self.keyword {
            Some(keyword) => format!(
                r#"{{"multi_match":{{"query":"{}","fields":["name^{}","category_name^{}","description^{}"],"fuzziness":"{}"}}}}"#,
                escape_query_text(keyword),
                self.boosts.name,
                self.boosts.category_name,
                self.boosts.description,
                self.fuzziness.as_str(),
            ),
            None => r#"{"match_all":{}}"#.to_string(),
        };

        let body = match self.ceiling {
            Some(ceiling) => format!(
                r#"{{"bool":{{"must":[{}],"filter":[{{"range":{{"price":{{"lte":{}}}}}}}]}}}}"#,
                matcher, ceiling
            ),
            None => matcher,
        };

        format!(
            r#"{{"from":{},"size":{},"query":{}}}"#,
            self.page.offset(),
            self.page.size,
            body
        )
    }
}

/// Escape user text for embedding inside a JSON string literal
pub fn escape_query_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c if (c as u32) < 0x20 => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Builds [`SearchQuery`] values and compiles them into Tantivy queries
pub struct QueryBuilder {
    index: Index,
    fields: ProductFields,
}

impl QueryBuilder {
    /// Create a compiler bound to an index and its product fields
    pub fn new(index: Index, fields: ProductFields) -> Self {
        Self { index, fields }
    }

    /// Build a query with default boosts and fuzziness.
    ///
    /// A blank keyword is treated as absent. With neither keyword nor ceiling
    /// the query matches every product.
    pub fn build(keyword: Option<&str>, ceiling: Option<Decimal>, page: Pagination) -> SearchQuery {
        let keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        SearchQuery {
            keyword,
            ceiling,
            page,
            boosts: FieldBoosts::default(),
            fuzziness: Fuzziness::default(),
        }
    }

    /// Compile into a Tantivy query
    pub fn compile(&self, query: &SearchQuery) -> SearchResult<Box<dyn Query>> {
        let matcher: Box<dyn Query> = match &query.keyword {
            Some(keyword) => self.keyword_query(keyword, &query.boosts, query.fuzziness)?,
            None => Box::new(AllQuery),
        };

        let Some(ceiling) = query.ceiling else {
            return Ok(matcher);
        };

        Ok(Box::new(BooleanQuery::new(vec![
            (Occur::Must, matcher),
            (Occur::Must, Self::price_filter(ceiling)),
        ])))
    }

    /// Non-scoring inclusive upper bound on price.
    ///
    /// Compared as `f64`, which keeps distinct prices apart up to 15
    /// significant digits; beyond that two decimals can share a value.
    fn price_filter(ceiling: Decimal) -> Box<dyn Query> {
        let upper = ceiling.to_f64().unwrap_or(f64::MAX);
        let range = RangeQuery::new_f64_bounds(
            "price".to_string(),
            Bound::Unbounded,
            Bound::Included(upper),
        );
        Box::new(ConstScoreQuery::new(Box::new(range), 0.0))
    }

    /// Best-field match across name, category and description.
    ///
    /// Each field ORs its analyzed terms; the best-scoring field wins.
    fn keyword_query(
        &self,
        keyword: &str,
        boosts: &FieldBoosts,
        fuzziness: Fuzziness,
    ) -> SearchResult<Box<dyn Query>> {
        let weighted = [
            (self.fields.name, boosts.name),
            (self.fields.category_name, boosts.category_name),
            (self.fields.description, boosts.description),
        ];

        let mut per_field: Vec<Box<dyn Query>> = Vec::new();
        for (field, boost) in weighted {
            let terms = self.analyze(field, keyword)?;
            if terms.is_empty() {
                continue;
            }

            let clauses: Vec<(Occur, Box<dyn Query>)> = terms
                .iter()
                .map(|text| (Occur::Should, Self::term_query(field, text, fuzziness)))
                .collect();

            per_field.push(Box::new(BoostQuery::new(
                Box::new(BooleanQuery::new(clauses)),
                boost,
            )));
        }

        if per_field.is_empty() {
            // Keyword analyzed to nothing (punctuation only)
            return Ok(Box::new(EmptyQuery));
        }

        Ok(Box::new(DisjunctionMaxQuery::new(per_field)))
    }

    /// Exact term scored by BM25, widened with a fuzzy variant when allowed
    fn term_query(field: Field, text: &str, fuzziness: Fuzziness) -> Box<dyn Query> {
        let term = Term::from_field_text(field, text);
        let exact: Box<dyn Query> =
            Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqs));

        match fuzziness.distance_for(text) {
            0 => exact,
            distance => Box::new(BooleanQuery::new(vec![
                (Occur::Should, exact),
                (
                    Occur::Should,
                    Box::new(FuzzyTermQuery::new(term, distance, true)),
                ),
            ])),
        }
    }

    /// Run text through the field's analyzer
    fn analyze(&self, field: Field, text: &str) -> SearchResult<Vec<String>> {
        let mut analyzer = self.index.tokenizer_for_field(field)?;
        let mut stream = analyzer.token_stream(text);

        let mut terms = Vec::new();
        while stream.advance() {
            let token = stream.token().text.clone();
            if !terms.contains(&token) {
                terms.push(token);
            }
        }
        Ok(terms)
    }
}
