use std::sync::Arc;
use uuid::Uuid;

use crate::modules::inventory::schema::{
    CreateItemResponse, ItemCreate, ItemsPage, Laboratory, MessageResponse, NewLaboratory, ReportRow,
};
use crate::services::transport::{ApiRequest, Transport, TransportError};

/// Lab catalogue and global inventory calls
#[derive(Clone)]
pub struct InventoryCrud {
    transport: Arc<dyn Transport>,
}

impl InventoryCrud {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn list_labs(&self) -> Result<Vec<Laboratory>, TransportError> {
        self.transport.send(ApiRequest::get("/laboratories/")).await?.json()
    }

    pub async fn get_lab(&self, id: &str) -> Result<Laboratory, TransportError> {
        self.transport
            .send(ApiRequest::get(format!("/laboratories/{}", id)))
            .await?
            .json()
    }

    pub async fn create_lab(&self, lab: &NewLaboratory) -> Result<Laboratory, TransportError> {
        self.transport
            .send(ApiRequest::post("/laboratories/").json(lab)?)
            .await?
            .json()
    }

    pub async fn delete_lab(&self, id: &str) -> Result<MessageResponse, TransportError> {
        self.transport
            .send(ApiRequest::delete(format!("/laboratories/{}", id)))
            .await?
            .json()
    }

    /// Name and status travel in the query string
    pub async fn add_item_to_lab(
        &self,
        lab_id: &str,
        item_name: &str,
        item_status: &str,
    ) -> Result<MessageResponse, TransportError> {
        let request = ApiRequest::put(format!("/laboratories/{}/add-item", lab_id))
            .query("item_name", item_name)
            .query("item_status", item_status);
        self.transport.send(request).await?.json()
    }

    pub async fn list_items(&self) -> Result<ItemsPage, TransportError> {
        self.transport
            .send(ApiRequest::get("/laboratories/items"))
            .await?
            .json()
    }

    /// Create-item is not idempotent; transport retries may duplicate it.
    /// The key lets a backend that honours `Idempotency-Key` drop replays.
    pub async fn create_item(&self, item: &ItemCreate) -> Result<CreateItemResponse, TransportError> {
        let request = ApiRequest::post("/laboratories/items")
            .json(item)?
            .idempotency_key(Uuid::new_v4().to_string());
        self.transport.send(request).await?.json()
    }

    pub async fn report_rows(&self) -> Result<Vec<ReportRow>, TransportError> {
        self.transport
            .send(ApiRequest::get("/laboratories/reports/all-items"))
            .await?
            .json()
    }
}
