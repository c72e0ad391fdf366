pub mod types;
pub mod filter;
pub mod fetcher;
pub mod scorer;
pub mod ranker;
pub mod scanner;

pub use types::*;
pub use fetcher::{ChainFetcher, MAX_CONCURRENT_CHAIN_REQUESTS};
pub use filter::{check_contract, Rejection};
pub use ranker::{rank, top_picks};
pub use scanner::Scanner;
pub use scorer::{score_all, score_candidate};
