use thiserror::Error;

pub type TaxoResult<T> = Result<T, TaxoError>;

#[derive(Debug, Error)]
pub enum TaxoError {
    #[error("GraphError: {0}")]
    Graph(String),
    #[error("SearchError: {0}")]
    Search(String),
    #[error("QueryError: {0}")]
    Query(String),
    #[error("TaxonomyError: {0}")]
    Taxonomy(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Bincode(#[from] bincode::Error),
}
