use async_trait::async_trait;
use parking_lot::Mutex;
use pest_gallery_core::{GalleryError, PestApi};
use pest_gallery_protocol::{CreatePestRequest, Record, RecordId, UpdatePestRequest};
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-operation call counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApiCalls {
    pub list: usize,
    pub get: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

impl ApiCalls {
    pub fn writes(&self) -> usize {
        self.create + self.update + self.delete
    }
}

/// Backend double holding records in memory and recording every request.
#[derive(Debug, Default)]
pub struct InMemoryPestApi {
    records: Mutex<Vec<Record>>,
    calls: Mutex<ApiCalls>,
    created: Mutex<Vec<CreatePestRequest>>,
    updated: Mutex<Vec<(RecordId, UpdatePestRequest)>>,
    next_id: Mutex<u64>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemoryPestApi {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> ApiCalls {
        *self.calls.lock()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    pub fn created(&self) -> Vec<CreatePestRequest> {
        self.created.lock().clone()
    }

    pub fn updated(&self) -> Vec<(RecordId, UpdatePestRequest)> {
        self.updated.lock().clone()
    }

    fn check(&self, flag: &AtomicBool, method: &str, path: &str) -> Result<(), GalleryError> {
        if flag.load(Ordering::SeqCst) {
            return Err(GalleryError::Status {
                method: method.to_string(),
                url: format!("memory://api/v1/pest{path}"),
                status: 500,
            });
        }
        Ok(())
    }

    fn not_found(method: &str, id: &RecordId) -> GalleryError {
        GalleryError::Status {
            method: method.to_string(),
            url: format!("memory://api/v1/pest/{id}"),
            status: 404,
        }
    }
}

#[async_trait]
impl PestApi for InMemoryPestApi {
    async fn list(&self) -> Result<Vec<Record>, GalleryError> {
        self.calls.lock().list += 1;
        self.check(&self.fail_reads, "GET", "")?;
        Ok(self.records())
    }

    async fn get(&self, id: &RecordId) -> Result<Record, GalleryError> {
        self.calls.lock().get += 1;
        self.check(&self.fail_reads, "GET", &format!("/{id}"))?;
        self.records
            .lock()
            .iter()
            .find(|record| &record.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found("GET", id))
    }

    async fn create(&self, request: &CreatePestRequest) -> Result<Option<Record>, GalleryError> {
        self.calls.lock().create += 1;
        self.check(&self.fail_writes, "POST", "")?;
        self.created.lock().push(request.clone());
        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            RecordId::new(format!("mem-{next}"))
        };
        let record = Record {
            id,
            name: request.name.clone(),
            description: request.description.clone(),
            text: request.text.clone().unwrap_or_default(),
            image_url: request.image_url.clone(),
            category: request.category,
        };
        self.records.lock().push(record.clone());
        Ok(Some(record))
    }

    async fn update(
        &self,
        id: &RecordId,
        request: &UpdatePestRequest,
    ) -> Result<Option<Record>, GalleryError> {
        self.calls.lock().update += 1;
        self.check(&self.fail_writes, "PUT", &format!("/{id}"))?;
        self.updated.lock().push((id.clone(), request.clone()));
        let mut records = self.records.lock();
        let record = records
            .iter_mut()
            .find(|record| &record.id == id)
            .ok_or_else(|| Self::not_found("PUT", id))?;
        request.apply_to(record);
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: &RecordId) -> Result<(), GalleryError> {
        self.calls.lock().delete += 1;
        self.check(&self.fail_writes, "DELETE", &format!("/{id}"))?;
        let mut records = self.records.lock();
        let before = records.len();
        records.retain(|record| &record.id != id);
        if records.len() == before {
            return Err(Self::not_found("DELETE", id));
        }
        Ok(())
    }
}
