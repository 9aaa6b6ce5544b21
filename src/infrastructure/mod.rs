//! Infrastructure - collaborator implementations for paper trading and live quotes

pub mod http_quote_client;
pub mod paper_wallet;
pub mod simulated_router;
pub mod static_quotes;

pub use http_quote_client::HttpQuoteClient;
pub use paper_wallet::PaperWallet;
pub use simulated_router::SimulatedSwapRouter;
pub use static_quotes::StaticQuoteService;
