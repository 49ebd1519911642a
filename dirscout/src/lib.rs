pub mod config;
pub mod errors;
pub mod filters;
pub mod metrics;
pub mod results;
pub mod search;

pub use config::{ErrorPolicy, SearchConfig};
pub use errors::{SearchError, SearchResult};
pub use filters::Filters;
pub use results::{FileResult, LineMatch, SearchOutput, SearchSummary};
pub use search::{run_search, scan, search, SearchHandle};
