//! Filter criteria and their canonical query-string form.
//!
//! The same encoding is used for the shareable address, for the `/articles`
//! request and as the in-flight de-duplication key, so a copied address
//! reproduces exactly the request that produced the view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;

use crate::error::{DateField, ValidationError};
use crate::types::SentimentLabel;

pub const PARAM_QUERY: &str = "q";
pub const PARAM_SENTIMENT: &str = "sentiment";
pub const PARAM_SOURCE: &str = "source";
pub const PARAM_FROM: &str = "from";
pub const PARAM_TO: &str = "to";
pub const PARAM_SORT: &str = "sort";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Sentiment constraint. `Any` means unconstrained and is never encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
    #[default]
    Any,
}

impl Sentiment {
    pub const ALL: [Sentiment; 4] = [
        Sentiment::Any,
        Sentiment::Positive,
        Sentiment::Neutral,
        Sentiment::Negative,
    ];

    pub fn as_param(&self) -> Option<&'static str> {
        match self {
            Sentiment::Any => None,
            Sentiment::Positive => Some(SentimentLabel::Positive.as_str()),
            Sentiment::Neutral => Some(SentimentLabel::Neutral.as_str()),
            Sentiment::Negative => Some(SentimentLabel::Negative.as_str()),
        }
    }

    /// Unknown values fall back to `Any`.
    pub fn from_param(raw: &str) -> Self {
        match SentimentLabel::parse(raw) {
            Some(SentimentLabel::Positive) => Sentiment::Positive,
            Some(SentimentLabel::Neutral) => Sentiment::Neutral,
            Some(SentimentLabel::Negative) => Sentiment::Negative,
            None => Sentiment::Any,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sentiment::Any => "any",
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    PublishedDesc,
    ScoreDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 2] = [SortOrder::PublishedDesc, SortOrder::ScoreDesc];

    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::PublishedDesc => "published_desc",
            SortOrder::ScoreDesc => "score_desc",
        }
    }

    /// Unknown values fall back to `PublishedDesc`.
    pub fn from_param(raw: &str) -> Self {
        match raw {
            "score_desc" => SortOrder::ScoreDesc,
            _ => SortOrder::PublishedDesc,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::PublishedDesc => "newest first",
            SortOrder::ScoreDesc => "sentiment score",
        }
    }
}

/// Canonical encoded criteria. Two criteria are the same fetch exactly when
/// their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CriteriaKey(String);

impl CriteriaKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CriteriaKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub query: String,
    pub sentiment: Sentiment,
    pub source: String,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort: SortOrder,
}

impl FilterCriteria {
    /// Reads criteria from an address query string. Never fails: unknown
    /// keys are ignored and malformed values fall back to their defaults.
    pub fn decode(address: &str) -> Self {
        let address = address.trim_start_matches('?');
        let mut criteria = FilterCriteria::default();
        let mut seen: Vec<String> = Vec::new();

        for (key, value) in form_urlencoded::parse(address.as_bytes()) {
            // First occurrence wins, like URLSearchParams.get
            if seen.iter().any(|k| k == key.as_ref()) {
                continue;
            }
            seen.push(key.to_string());

            match key.as_ref() {
                PARAM_QUERY => criteria.query = value.into_owned(),
                PARAM_SENTIMENT => criteria.sentiment = Sentiment::from_param(&value),
                PARAM_SOURCE => criteria.source = value.into_owned(),
                PARAM_FROM => criteria.date_from = parse_date(&value),
                PARAM_TO => criteria.date_to = parse_date(&value),
                PARAM_SORT => criteria.sort = SortOrder::from_param(&value),
                _ => {}
            }
        }

        criteria
    }

    /// Canonical encoding: fixed key order, empty and unconstrained fields
    /// omitted, `sort` always present.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.params() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }

    /// The parameters that make up the encoding, in canonical order.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(6);
        if !self.query.is_empty() {
            params.push((PARAM_QUERY, self.query.clone()));
        }
        if let Some(sentiment) = self.sentiment.as_param() {
            params.push((PARAM_SENTIMENT, sentiment.to_string()));
        }
        if !self.source.is_empty() {
            params.push((PARAM_SOURCE, self.source.clone()));
        }
        if let Some(from) = self.date_from {
            params.push((PARAM_FROM, format_date(from)));
        }
        if let Some(to) = self.date_to {
            params.push((PARAM_TO, format_date(to)));
        }
        params.push((PARAM_SORT, self.sort.as_param().to_string()));
        params
    }

    pub fn key(&self) -> CriteriaKey {
        CriteriaKey(self.encode())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match (self.date_from, self.date_to) {
            (Some(from), Some(to)) if from > to => Err(ValidationError::DateRangeReversed { from, to }),
            _ => Ok(()),
        }
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Strict variant used by the form, where an unreadable date is reported
/// instead of silently dropped. Empty input means "no bound".
pub fn parse_date_field(field: DateField, raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    parse_date(trimmed).map(Some).ok_or_else(|| ValidationError::InvalidDate {
        field,
        value: trimmed.to_string(),
    })
}
