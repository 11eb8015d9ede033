//! In-memory backends for exercising strategies under a paused clock.

use crate::infrastructure::repositories::{
    BackendError, ObjectStorageRepository, OperationStatus, SynthesisRequest, TtsRepository,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted responses are consumed in order; once exhausted, calls succeed with
/// placeholder audio, a fixed operation name, and a pending status.
#[derive(Default)]
pub struct MockTtsRepository {
    synthesize_results: Mutex<VecDeque<Result<Vec<u8>, BackendError>>>,
    start_results: Mutex<VecDeque<Result<String, BackendError>>>,
    operation_results: Mutex<VecDeque<Result<OperationStatus, BackendError>>>,
    synthesize_requests: Mutex<Vec<SynthesisRequest>>,
    start_requests: Mutex<Vec<(SynthesisRequest, String)>>,
    operation_polls: Mutex<u32>,
}

impl MockTtsRepository {
    pub fn push_synthesize(&self, result: Result<Vec<u8>, BackendError>) {
        self.synthesize_results.lock().unwrap().push_back(result);
    }

    pub fn push_start(&self, result: Result<String, BackendError>) {
        self.start_results.lock().unwrap().push_back(result);
    }

    pub fn push_operation(&self, result: Result<OperationStatus, BackendError>) {
        self.operation_results.lock().unwrap().push_back(result);
    }

    pub fn synthesize_requests(&self) -> Vec<SynthesisRequest> {
        self.synthesize_requests.lock().unwrap().clone()
    }

    pub fn start_requests(&self) -> Vec<(SynthesisRequest, String)> {
        self.start_requests.lock().unwrap().clone()
    }

    pub fn operation_polls(&self) -> u32 {
        *self.operation_polls.lock().unwrap()
    }
}

#[async_trait]
impl TtsRepository for MockTtsRepository {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, BackendError> {
        self.synthesize_requests.lock().unwrap().push(request.clone());
        self.synthesize_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(b"mp3".to_vec()))
    }

    async fn start_long_audio(
        &self,
        request: &SynthesisRequest,
        output_uri: &str,
    ) -> Result<String, BackendError> {
        self.start_requests
            .lock()
            .unwrap()
            .push((request.clone(), output_uri.to_string()));
        self.start_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("operations/op-1".to_string()))
    }

    async fn get_operation(&self, _name: &str) -> Result<OperationStatus, BackendError> {
        *self.operation_polls.lock().unwrap() += 1;
        self.operation_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(OperationStatus::default()))
    }
}

#[derive(Default)]
pub struct MockStorageRepository {
    download_results: Mutex<VecDeque<Result<Vec<u8>, BackendError>>>,
    delete_results: Mutex<VecDeque<Result<(), BackendError>>>,
    downloads: Mutex<Vec<String>>,
    deletes: Mutex<Vec<String>>,
}

impl MockStorageRepository {
    pub fn push_download(&self, result: Result<Vec<u8>, BackendError>) {
        self.download_results.lock().unwrap().push_back(result);
    }

    pub fn push_delete(&self, result: Result<(), BackendError>) {
        self.delete_results.lock().unwrap().push_back(result);
    }

    pub fn downloads(&self) -> Vec<String> {
        self.downloads.lock().unwrap().clone()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorageRepository for MockStorageRepository {
    fn object_uri(&self, object: &str) -> String {
        format!("gs://test-bucket/{}", object)
    }

    async fn download(&self, object: &str) -> Result<Vec<u8>, BackendError> {
        self.downloads.lock().unwrap().push(object.to_string());
        self.download_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(b"RIFFwav".to_vec()))
    }

    async fn delete(&self, object: &str) -> Result<(), BackendError> {
        self.deletes.lock().unwrap().push(object.to_string());
        self.delete_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}
