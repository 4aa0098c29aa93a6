pub mod analysis_client;
pub mod input_selector;
pub mod payload_extractor;
pub mod quota;
pub mod result_normalizer;

pub use analysis_client::{ReasoningBackend, RemoteAnalysisClient};
pub use input_selector::InputSelector;
pub use payload_extractor::extract_payload;
pub use quota::{AccountQuota, QuotaGate, QuotaLedger, RunAllowance};
pub use result_normalizer::ResultNormalizer;
