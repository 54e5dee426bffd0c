// Public modules
pub mod done_reason;
pub mod generate_options;
pub mod generate_request;
pub mod generate_response;
pub mod model;
pub mod model_info;
pub mod model_list_response;

// Re-exports
pub use done_reason::DoneReason;
pub use generate_options::GenerateOptions;
pub use generate_request::GenerateRequest;
pub use generate_response::GenerateResponse;
pub use model::{KnownModel, Model};
pub use model_info::{ModelDetails, ModelInfo};
pub use model_list_response::ModelListResponse;
