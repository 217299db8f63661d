use std::time::Duration;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    error::{JsonPayloadError, QueryPayloadError},
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpRequest,
    HttpServer,
};
use food_order_engine::{
    traits::{CatalogManagement, CouponManagement, OrderBackend, PaymentProvider},
    CatalogApi,
    CouponApi,
    LoyaltyApi,
    OrderFlowApi,
    RestStore,
    TapGateway,
};
use log::*;
use tap_tools::TapApi;

use crate::{
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    reconcile_worker::start_reconcile_worker,
    routes::{
        health,
        AdminOrdersRoute,
        CouponsRoute,
        CreateOrderRoute,
        DeliveryZonesRoute,
        LoyaltySettingsRoute,
        MenuCategoriesRoute,
        MenuItemsRoute,
        ModifierGroupsRoute,
        OrderByIdRoute,
        OrderByNumberRoute,
        PaymentStatusRoute,
        PaymentWebhookRoute,
        SaveLoyaltySettingsRoute,
        UpdateOrderStatusRoute,
        ValidateCouponRoute,
        VerifyPaymentRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = RestStore::new_with_config(config.store.clone(), config.tenant_id.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let api = TapApi::new(config.tap.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = TapGateway::new(api, config.gateway_config());
    let worker_api = OrderFlowApi::new(db.clone(), gateway.clone(), config.order_flow_config());
    let _worker = start_reconcile_worker(worker_api, config.provisional_recheck, config.provisional_timeout);
    let srv = create_server_instance(config, db, gateway)?;
    srv.await.map_err(|e| ServerError::InitializeError(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: RestStore, gateway: TapGateway) -> Result<Server, ServerError> {
    let bind_addr = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone(), gateway.clone(), config.order_flow_config());
        let coupon_api = CouponApi::new(db.clone());
        let loyalty_api = LoyaltyApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("fog::access_log"))
            .wrap(cors_policy(&config.cors_origins))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(coupon_api))
            .app_data(web::Data::new(loyalty_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(ServerOptions::from_config(&config)))
            .configure(configure_routes::<RestStore, TapGateway>)
            .service(health)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((bind_addr.0.as_str(), bind_addr.1))?
    .run();
    Ok(srv)
}

/// Registers the `/api` scope along with the request body and query extractors' error handlers.
///
/// The API objects (`OrderFlowApi<B, P>`, `CouponApi<B>`, `LoyaltyApi<B>`, `CatalogApi<B>`) and [`ServerOptions`]
/// must be added to the app as `web::Data` by the caller.
pub fn configure_routes<B, P>(cfg: &mut web::ServiceConfig)
where
    B: OrderBackend + CouponManagement + CatalogManagement + 'static,
    P: PaymentProvider + 'static,
{
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(
            web::scope("/api")
                .service(CreateOrderRoute::<B, P>::new())
                .service(OrderByNumberRoute::<B, P>::new())
                .service(OrderByIdRoute::<B, P>::new())
                .service(UpdateOrderStatusRoute::<B, P>::new())
                .service(AdminOrdersRoute::<B, P>::new())
                .service(PaymentWebhookRoute::<B, P>::new())
                .service(VerifyPaymentRoute::<B, P>::new())
                .service(PaymentStatusRoute::<B, P>::new())
                .service(CouponsRoute::<B>::new())
                .service(ValidateCouponRoute::<B>::new())
                .service(LoyaltySettingsRoute::<B>::new())
                .service(SaveLoyaltySettingsRoute::<B>::new())
                .service(MenuCategoriesRoute::<B>::new())
                .service(MenuItemsRoute::<B>::new())
                .service(ModifierGroupsRoute::<B>::new())
                .service(DeliveryZonesRoute::<B>::new()),
        );
}

fn cors_policy(origins: &[String]) -> Cors {
    let cors = Cors::default().allow_any_method().allow_any_header().supports_credentials().max_age(3600);
    if origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }
    origins.iter().fold(cors, |cors, origin| cors.allowed_origin(origin))
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("💻️ Rejecting request body. {err}");
    ServerError::InvalidRequestBody(err.to_string()).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!("💻️ Rejecting query string. {err}");
    ServerError::InvalidRequestPath(err.to_string()).into()
}
