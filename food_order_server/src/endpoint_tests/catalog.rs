use actix_web::{http::StatusCode, test, test::TestRequest, web, App};
use food_order_engine::{
    traits::{CatalogKind, CatalogManagement, StorageError},
    CatalogApi,
};
use mockall::{mock, predicate::eq};
use serde_json::{json, Value};

use super::helpers::TestServer;
use crate::routes::{DeliveryZonesRoute, MenuItemsRoute};

mock! {
    pub Catalog {}
    impl CatalogManagement for Catalog {
        async fn fetch_catalog(&self, kind: CatalogKind) -> Result<Vec<Value>, StorageError>;
    }
}

#[actix_web::test]
async fn catalog_rows_are_served_as_stored() {
    let server = TestServer::new();
    let category = json!({ "id": "cat-1", "name_en": "Grills", "name_ar": "مشاوي", "sort_order": 2 });
    server.store.add_catalog_row(CatalogKind::Categories, category.clone()).await;
    server.store.add_catalog_row(CatalogKind::ModifierGroups, json!({ "id": "mg-1", "name_en": "Sauces" })).await;

    let (status, rows) = server.call_json(TestRequest::get().uri("/api/menu/categories")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows, json!([category]));
    let (_, rows) = server.call_json(TestRequest::get().uri("/api/menu/modifier-groups")).await;
    assert_eq!(rows[0]["name_en"], "Sauces");
    let (status, rows) = server.call_json(TestRequest::get().uri("/api/menu/items")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows, json!([]));
}

#[actix_web::test]
async fn catalog_failures_are_opaque() {
    let _ = env_logger::try_init();
    let mut catalog = MockCatalog::new();
    catalog
        .expect_fetch_catalog()
        .with(eq(CatalogKind::Items))
        .times(1)
        .returning(|_| Err(StorageError::DatabaseError("relation \"menu_items\" does not exist".into())));
    catalog
        .expect_fetch_catalog()
        .with(eq(CatalogKind::DeliveryZones))
        .returning(|_| Ok(vec![json!({ "id": "z-1", "area": "Hawalli", "fee": 0.75 })]));
    let app = App::new()
        .app_data(web::Data::new(CatalogApi::new(catalog)))
        .service(MenuItemsRoute::<MockCatalog>::new())
        .service(DeliveryZonesRoute::<MockCatalog>::new());
    let service = test::init_service(app).await;

    let res = test::call_service(&service, TestRequest::get().uri("/menu/items").to_request()).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = test::read_body(res).await;
    assert_eq!(body, r#"{"error":"An error occurred on the backend of the server."}"#);

    let res = test::call_service(&service, TestRequest::get().uri("/delivery-zones").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let zones: Value = test::read_body_json(res).await;
    assert_eq!(zones[0]["area"], "Hawalli");
}
