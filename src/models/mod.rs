pub mod assessment;
pub mod input;
pub mod response;

pub use assessment::{humanize_signal, AssessmentResult, AssessmentVariant, ReadinessCategory};
pub use input::{AnalysisInput, InputChannel, RoleDocument};
pub use response::{
    AnalysisContent, ContentSegment, ModelOutput, RawModelResponse, RemoteFileHandle,
    ResponseRequest,
};
