pub mod config;
pub mod error;
pub mod filter;
pub mod source;
pub mod types;

pub use config::ClientConfig;
pub use error::{DateField, Error, Result, RemoteError, ValidationError};
pub use filter::{CriteriaKey, FilterCriteria, Sentiment, SortOrder};
pub use source::ArticleSource;
pub use types::{AnalysisResult, Article, ArticleId, ArticleListResponse, SentimentLabel};
