pub mod fetch;
pub mod search;

pub use fetch::FetchService;
pub use search::SearchService;
