mod gemini;

pub use gemini::{
    Candidate, CandidateContent, Content, ErrorBody, ErrorEnvelope, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, ModelEntry, ModelList, Part, ResponsePart,
    UsageMetadata,
};
