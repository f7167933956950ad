use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Identifier of an article on the news service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(pub u64);

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ArticleId {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ArticleId)
            .map_err(|_| Error::InvalidArticleId(s.to_string()))
    }
}

/// Sentiment assigned to an article by the analysis model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(SentimentLabel::Positive),
            "neutral" => Some(SentimentLabel::Neutral),
            "negative" => Some(SentimentLabel::Negative),
            _ => None,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    #[serde(default)]
    pub source_id: Option<u64>,
    pub title: String,
    pub link: String,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "deserialize_label")]
    pub sentiment_label: Option<SentimentLabel>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: u64,
    pub article_id: ArticleId,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "deserialize_label")]
    pub sentiment_label: Option<SentimentLabel>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub keywords: Option<Vec<String>>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// Free-form model metadata, displayed as-is.
    #[serde(default, rename = "json_meta")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleListResponse {
    pub items: Vec<Article>,
}

/// Accepts RFC 3339, the naive `YYYY-MM-DDTHH:MM:SS[.f]` form the service
/// emits for timestamps stored without an offset, and a bare `YYYY-MM-DD`
/// (midnight). Naive forms are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}

// An unreadable timestamp only loses that field, never the whole response.
fn deserialize_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| {
        let ts = parse_timestamp(&raw);
        if ts.is_none() {
            tracing::warn!("Ignoring unreadable timestamp: {}", raw);
        }
        ts
    }))
}

// Labels outside the known set are dropped rather than failing the whole list.
fn deserialize_label<'de, D>(deserializer: D) -> std::result::Result<Option<SentimentLabel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| {
        let label = SentimentLabel::parse(&raw);
        if label.is_none() {
            tracing::warn!("Ignoring unknown sentiment label: {}", raw);
        }
        label
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_minimal_article_keeps_optional_fields_absent() {
        let json = r#"{"id":1,"title":"A","link":"http://x","sentiment_label":"positive"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.id, ArticleId(1));
        assert_eq!(article.sentiment_label, Some(SentimentLabel::Positive));
        assert!(article.published_at.is_none());
        assert!(article.sentiment_score.is_none());
        assert!(article.summary.is_none());
        assert!(article.keywords.is_none());
    }

    #[test]
    fn test_naive_and_offset_timestamps() {
        let naive = parse_timestamp("2024-03-05T10:20:30").unwrap();
        assert_eq!((naive.year(), naive.month(), naive.day()), (2024, 3, 5));
        assert_eq!(naive.hour(), 10);

        let offset = parse_timestamp("2024-03-05T10:20:30+09:00").unwrap();
        assert_eq!(offset.hour(), 1);

        let date_only = parse_timestamp("2024-03-05").unwrap();
        assert_eq!((date_only.day(), date_only.hour(), date_only.minute()), (5, 0, 0));

        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_bad_timestamp_does_not_drop_the_list() {
        let json = r#"{"items":[
            {"id":1,"title":"A","link":"http://a","published_at":"2024-03-05T10:00:00Z"},
            {"id":2,"title":"B","link":"http://b","published_at":"last tuesday"},
            {"id":3,"title":"C","link":"http://c","published_at":"2024-03-05"}
        ]}"#;
        let response: ArticleListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.items.len(), 3);
        assert!(response.items[0].published_at.is_some());
        assert!(response.items[1].published_at.is_none());
        assert_eq!(response.items[1].title, "B");
        assert_eq!(response.items[2].published_at.map(|ts| ts.day()), Some(5));
    }

    #[test]
    fn test_bad_analysis_timestamp_keeps_the_analysis() {
        let json = r#"{"id":1,"article_id":2,"created_at":"n/a","model_name":"m"}"#;
        let analysis: AnalysisResult = serde_json::from_str(json).unwrap();
        assert!(analysis.created_at.is_none());
        assert_eq!(analysis.model_name.as_deref(), Some("m"));
    }

    #[test]
    fn test_null_timestamp_is_absent() {
        let json = r#"{"id":2,"title":"B","link":"http://y","published_at":null}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert!(article.published_at.is_none());
    }

    #[test]
    fn test_unknown_label_is_dropped() {
        let json = r#"{"id":3,"title":"C","link":"http://z","sentiment_label":"mixed"}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert!(article.sentiment_label.is_none());
    }

    #[test]
    fn test_keywords_keep_order_and_duplicates() {
        let json = r#"{"id":4,"title":"D","link":"http://w","keywords":["b","a","b"]}"#;
        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.keywords.unwrap(), vec!["b", "a", "b"]);
    }

    #[test]
    fn test_analysis_metadata_is_opaque() {
        let json = r#"{
            "id": 9, "article_id": 4, "summary": "s", "sentiment_label": "negative",
            "sentiment_score": -0.4, "model_name": "gemini", "created_at": "2024-01-02T03:04:05",
            "json_meta": {"reason": "tone", "safety_flag": false}
        }"#;
        let analysis: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.article_id, ArticleId(4));
        assert_eq!(analysis.sentiment_label, Some(SentimentLabel::Negative));
        let meta = analysis.metadata.unwrap();
        assert_eq!(meta.get("reason").unwrap(), "tone");
    }

    #[test]
    fn test_article_id_parsing() {
        assert_eq!("42".parse::<ArticleId>().unwrap(), ArticleId(42));
        assert!("abc".parse::<ArticleId>().is_err());
        assert!("../etc".parse::<ArticleId>().is_err());
    }
}
