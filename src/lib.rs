pub mod config;
pub mod error;
pub mod http;
pub mod provider;
pub mod rate_limit;
pub mod retry;

pub use config::ExaConfig;
pub use error::{ErrorKind, ProviderError};
pub use provider::{
    ExaContentsProvider, ExaSimilarProvider, ExtractDepth, ProcessingProvider, ProcessingResult,
    ProviderInput, RawContent, ResultMetadata,
};
