use chrono::{DateTime, Utc};

use nt_core::{AnalysisResult, Article, ArticleId, SentimentLabel};

pub const UNKNOWN_PUBLISH_DATE: &str = "unknown publish date";
pub const NO_RESULTS: &str = "No articles match these filters.";

/// What the list page shows for its current state.
#[derive(Debug, Clone, PartialEq)]
pub enum ListRender {
    Skeletons(usize),
    Error { message: String, status: Option<u16> },
    NoResults,
    Cards(Vec<ArticleCard>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentimentBadge {
    pub label: SentimentLabel,
    pub score: Option<f64>,
}

impl SentimentBadge {
    pub fn text(&self) -> &'static str {
        match self.label {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self.label {
            SentimentLabel::Positive => "+",
            SentimentLabel::Neutral => "=",
            SentimentLabel::Negative => "-",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleCard {
    pub id: ArticleId,
    pub title: String,
    pub link: String,
    pub published: String,
    pub summary: Option<String>,
    pub keywords: Vec<String>,
    pub badge: Option<SentimentBadge>,
}

impl ArticleCard {
    pub fn from_article(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            link: article.link.clone(),
            published: format_published(article.published_at),
            summary: article.summary.clone(),
            keywords: article.keywords.clone().unwrap_or_default(),
            badge: article.sentiment_label.map(|label| SentimentBadge {
                label,
                score: article.sentiment_score,
            }),
        }
    }
}

/// What the detail page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailRender {
    Empty,
    Loading,
    Error { message: String, status: Option<u16> },
    Article {
        card: ArticleCard,
        analysis: AnalysisRender,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRender {
    NotRequested,
    Loading,
    Unavailable(String),
    Ready(AnalysisPanel),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPanel {
    pub summary: Option<String>,
    pub badge: Option<SentimentBadge>,
    pub keywords: Vec<String>,
    pub model_name: Option<String>,
    pub created: Option<String>,
    /// Metadata entries as `key: value`, sorted by key.
    pub metadata: Vec<(String, String)>,
}

impl AnalysisPanel {
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        let mut metadata: Vec<(String, String)> = analysis
            .metadata
            .iter()
            .flatten()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), value)
            })
            .collect();
        metadata.sort();

        Self {
            summary: analysis.summary.clone(),
            badge: analysis.sentiment_label.map(|label| SentimentBadge {
                label,
                score: analysis.sentiment_score,
            }),
            keywords: analysis.keywords.clone().unwrap_or_default(),
            model_name: analysis.model_name.clone(),
            created: analysis.created_at.map(format_timestamp),
            metadata,
        }
    }
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

pub fn format_published(published_at: Option<DateTime<Utc>>) -> String {
    published_at
        .map(format_timestamp)
        .unwrap_or_else(|| UNKNOWN_PUBLISH_DATE.to_string())
}

impl ListRender {
    /// Plain-text rendering used by the one-shot `list` command.
    pub fn to_text(&self) -> String {
        match self {
            ListRender::Skeletons(count) => (0..*count).map(|_| "░░░░░░░░░░░░░░░░\n").collect(),
            ListRender::Error { message, .. } => format!("Failed to load articles: {}\n", message),
            ListRender::NoResults => format!("{}\n", NO_RESULTS),
            ListRender::Cards(cards) => cards.iter().map(card_text).collect::<Vec<_>>().join("\n"),
        }
    }
}

fn card_text(card: &ArticleCard) -> String {
    let mut out = String::new();
    let badge = card
        .badge
        .as_ref()
        .map(|b| format!(" [{} {}]", b.symbol(), b.text()))
        .unwrap_or_default();
    out.push_str(&format!("#{} {}{}\n", card.id, card.title, badge));
    out.push_str(&format!("    {}\n", card.published));
    if let Some(summary) = &card.summary {
        out.push_str(&format!("    {}\n", summary));
    }
    if !card.keywords.is_empty() {
        out.push_str(&format!("    tags: {}\n", card.keywords.join(", ")));
    }
    out.push_str(&format!("    {}\n", card.link));
    out
}

impl DetailRender {
    pub fn to_text(&self) -> String {
        match self {
            DetailRender::Empty => String::new(),
            DetailRender::Loading => "Loading...\n".to_string(),
            DetailRender::Error { message, .. } => format!("Failed to load article: {}\n", message),
            DetailRender::Article { card, analysis } => {
                let mut out = card_text(card);
                match analysis {
                    AnalysisRender::NotRequested => {}
                    AnalysisRender::Loading => out.push_str("\nAnalysis: loading...\n"),
                    AnalysisRender::Unavailable(message) => {
                        out.push_str(&format!("\nAnalysis unavailable: {}\n", message))
                    }
                    AnalysisRender::Ready(panel) => {
                        out.push_str("\nAnalysis\n");
                        if let Some(badge) = &panel.badge {
                            let score = badge.score.map(|s| format!(" ({:.2})", s)).unwrap_or_default();
                            out.push_str(&format!("    sentiment: {}{}\n", badge.text(), score));
                        }
                        if let Some(summary) = &panel.summary {
                            out.push_str(&format!("    {}\n", summary));
                        }
                        if !panel.keywords.is_empty() {
                            out.push_str(&format!("    tags: {}\n", panel.keywords.join(", ")));
                        }
                        if let Some(model) = &panel.model_name {
                            out.push_str(&format!("    model: {}\n", model));
                        }
                        if let Some(created) = &panel.created {
                            out.push_str(&format!("    analyzed: {}\n", created));
                        }
                        for (key, value) in &panel.metadata {
                            out.push_str(&format!("    {}: {}\n", key, value));
                        }
                    }
                }
                out
            }
        }
    }
}
