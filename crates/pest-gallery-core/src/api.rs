//! REST client for the pest backend.

use crate::error::GalleryError;
use async_trait::async_trait;
use log::{debug, info, warn};
use pest_gallery_config::BackendConfig;
use pest_gallery_protocol::{CreatePestRequest, Record, RecordId, UpdatePestRequest};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Backend operations consumed by the gallery.
///
/// Create and update return `None` when the backend acknowledges the write
/// with a body that is not a record; callers revalidate the collection anyway.
#[async_trait]
pub trait PestApi: Send + Sync {
    /// `GET /pest`
    async fn list(&self) -> Result<Vec<Record>, GalleryError>;
    /// `GET /pest/{id}`
    async fn get(&self, id: &RecordId) -> Result<Record, GalleryError>;
    /// `POST /pest`
    async fn create(&self, request: &CreatePestRequest) -> Result<Option<Record>, GalleryError>;
    /// `PUT /pest/{id}`
    async fn update(
        &self,
        id: &RecordId,
        request: &UpdatePestRequest,
    ) -> Result<Option<Record>, GalleryError>;
    /// `DELETE /pest/{id}`
    async fn delete(&self, id: &RecordId) -> Result<(), GalleryError>;
}

/// `reqwest`-backed implementation of [`PestApi`].
#[derive(Debug, Clone)]
pub struct HttpPestApi {
    client: Client,
    collection: Url,
}

impl HttpPestApi {
    /// Build a client for the configured backend.
    pub fn new(config: &BackendConfig) -> Result<Self, GalleryError> {
        let collection_url = config.collection_url();
        let collection = Url::parse(&collection_url).map_err(|err| GalleryError::Transport {
            url: collection_url.clone(),
            message: err.to_string(),
        })?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| GalleryError::Transport {
                url: collection_url,
                message: err.to_string(),
            })?;
        info!("backend client ready (collection={})", collection);
        Ok(Self { client, collection })
    }

    /// Collection endpoint this client talks to.
    pub fn collection_url(&self) -> &Url {
        &self.collection
    }

    fn record_url(&self, id: &RecordId) -> Url {
        let mut url = self.collection.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(id.as_str());
        }
        url
    }

    /// Send a request and map transport failures and non-2xx statuses.
    async fn send(
        &self,
        builder: RequestBuilder,
        method: Method,
        url: &Url,
    ) -> Result<Response, GalleryError> {
        debug!("sending request (method={}, url={})", method, url);
        let response = builder.send().await.map_err(|err| GalleryError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        })?;
        let status = response.status();
        if !status.is_success() {
            warn!(
                "request rejected (method={}, url={}, status={})",
                method,
                url,
                status.as_u16()
            );
            return Err(GalleryError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

async fn decode<T: DeserializeOwned>(response: Response, url: &Url) -> Result<T, GalleryError> {
    response.json::<T>().await.map_err(|err| GalleryError::Decode {
        url: url.to_string(),
        message: err.to_string(),
    })
}

/// Decode a write acknowledgement, tolerating bodies that are not records.
async fn decode_ack(response: Response, url: &Url) -> Result<Option<Record>, GalleryError> {
    let body = response.bytes().await.map_err(|err| GalleryError::Transport {
        url: url.to_string(),
        message: err.to_string(),
    })?;
    match serde_json::from_slice::<Record>(&body) {
        Ok(record) => Ok(Some(record)),
        Err(err) => {
            debug!("write acknowledged without record body (url={url}, reason={err})");
            Ok(None)
        }
    }
}

#[async_trait]
impl PestApi for HttpPestApi {
    async fn list(&self) -> Result<Vec<Record>, GalleryError> {
        let url = &self.collection;
        let response = self
            .send(self.client.get(url.clone()), Method::GET, url)
            .await?;
        let records: Vec<Record> = decode(response, url).await?;
        debug!("listed records (count={})", records.len());
        Ok(records)
    }

    async fn get(&self, id: &RecordId) -> Result<Record, GalleryError> {
        let url = self.record_url(id);
        let response = self
            .send(self.client.get(url.clone()), Method::GET, &url)
            .await?;
        decode(response, &url).await
    }

    async fn create(&self, request: &CreatePestRequest) -> Result<Option<Record>, GalleryError> {
        let url = &self.collection;
        info!("creating record (name_len={})", request.name.len());
        let response = self
            .send(
                self.client.post(url.clone()).json(request),
                Method::POST,
                url,
            )
            .await?;
        decode_ack(response, url).await
    }

    async fn update(
        &self,
        id: &RecordId,
        request: &UpdatePestRequest,
    ) -> Result<Option<Record>, GalleryError> {
        let url = self.record_url(id);
        info!("updating record (id={})", id);
        let response = self
            .send(self.client.put(url.clone()).json(request), Method::PUT, &url)
            .await?;
        decode_ack(response, &url).await
    }

    async fn delete(&self, id: &RecordId) -> Result<(), GalleryError> {
        let url = self.record_url(id);
        info!("deleting record (id={})", id);
        self.send(self.client.delete(url.clone()), Method::DELETE, &url)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn record_url_appends_id_segment() {
        let api = HttpPestApi::new(&BackendConfig::default()).expect("client");
        assert_eq!(
            api.record_url(&RecordId::new("65f0")).as_str(),
            "http://localhost:8080/api/v1/pest/65f0"
        );
    }

    #[test]
    fn record_url_escapes_id() {
        let api = HttpPestApi::new(&BackendConfig::default()).expect("client");
        assert_eq!(
            api.record_url(&RecordId::new("a/b")).as_str(),
            "http://localhost:8080/api/v1/pest/a%2Fb"
        );
    }
}
