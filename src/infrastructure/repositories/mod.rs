pub mod gcs_storage_repository;
pub mod google_tts_repository;
pub mod script_repository;
pub mod storage_repository;
pub mod tts_repository;

pub use gcs_storage_repository::GcsStorageRepository;
pub use google_tts_repository::GoogleTtsRepository;
pub use script_repository::{ScriptRepository, ScriptRepositoryError};
pub use storage_repository::ObjectStorageRepository;
pub use tts_repository::{BackendError, OperationStatus, SynthesisRequest, TtsRepository};
