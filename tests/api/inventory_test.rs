use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::http_transport;
use sislab_client::modules::inventory::{DataSource, InventoryCrud, NewLaboratory};
use sislab_client::services::transport::{CredentialStore, Transport};

fn inventory(server: &MockServer) -> InventoryCrud {
    let transport: Arc<dyn Transport> = Arc::new(http_transport(&server.uri(), CredentialStore::new()));
    InventoryCrud::new(transport)
}

#[tokio::test]
async fn test_items_report_backup_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/laboratories/items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "source": "REDIS_BACKUP",
            "message": "MySQL no disponible",
            "data": [{"code": "PC-01", "type": "PC", "status": "Operativa", "area": "Sala 1"}]
        })))
        .mount(&server)
        .await;

    let page = inventory(&server).list_items().await.unwrap();

    assert_eq!(page.source, DataSource::RedisBackup);
    assert!(page.source.is_backup());
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].code, "PC-01");
}

#[tokio::test]
async fn test_add_item_sends_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/laboratories/lab-7/add-item"))
        .and(query_param("item_name", "Switch Cisco"))
        .and(query_param("item_status", "Operativa"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Item agregado"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = inventory(&server)
        .add_item_to_lab("lab-7", "Switch Cisco", "Operativa")
        .await
        .unwrap();

    assert_eq!(response.message.as_deref(), Some("Item agregado"));
}

#[tokio::test]
async fn test_lab_lifecycle() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/laboratories/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "_id": "lab-9", "name": "Lab IoT", "location": "Edificio C", "description": "Sensores", "items": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/laboratories/lab-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Laboratorio eliminado"
        })))
        .mount(&server)
        .await;

    let inventory = inventory(&server);
    let lab = inventory
        .create_lab(&NewLaboratory::new("Lab IoT", "Edificio C", "Sensores"))
        .await
        .unwrap();
    assert_eq!(lab.id.as_deref(), Some("lab-9"));

    let deleted = inventory.delete_lab("lab-9").await.unwrap();
    assert_eq!(deleted.message.as_deref(), Some("Laboratorio eliminado"));
}

#[tokio::test]
async fn test_report_rows_tolerate_missing_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/laboratories/reports/all-items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"code": "PC-01", "lab_name": "Lab de Redes", "type": "PC", "status": "Operativa"},
            {"code": "RT-02", "technician": null}
        ])))
        .mount(&server)
        .await;

    let rows = inventory(&server).report_rows().await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].item_type.as_deref(), Some("PC"));
    assert!(rows[1].lab_name.is_none());
}
