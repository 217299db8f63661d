//! HTTP handlers for the storefront and admin console.
//!
//! Handlers only translate between HTTP and the engine APIs. Workflow logic belongs in `food_order_engine`, so keep
//! each handler to an extractor, one API call and a response.
//!
//! Every store and gateway call is awaited. A handler that blocks stalls its whole worker, since actix workers
//! process their requests sequentially.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use food_order_engine::{
    db_types::{LoyaltySettings, NewOrder, OrderId},
    traits::{CatalogKind, CatalogManagement, CouponManagement, LoyaltyManagement, OrderBackend, PaymentProvider},
    CatalogApi,
    CouponApi,
    LoyaltyApi,
    OrderFlowApi,
};
use log::*;
use serde_json::json;

use crate::{
    config::ServerOptions,
    data_objects::{AdminOrdersQuery, ChargeNotification, CouponValidationRequest, JsonResponse, StatusUpdateRequest},
    errors::ServerError,
    helpers::is_whitelisted_peer,
};

// actix's attribute macros don't support generic handlers, so `route!` builds the service factory by hand
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderBackend, PaymentProvider);
/// Places an order from the storefront.
///
/// Orders paid online come back with `requires_payment: true` and a `payment_url` the customer must be sent to. They
/// only become visible to the kitchen once the payment has been confirmed.
pub async fn create_order<B, P>(
    api: web::Data<OrderFlowApi<B, P>>,
    body: web::Json<NewOrder>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderBackend,
    P: PaymentProvider,
{
    trace!("💻️ Received new order request");
    let result = api.create_order(body.into_inner()).await?;
    if !result.failed_sub_writes.is_empty() {
        warn!("💻️ Order {} was stored with {} failed writes", result.order_number, result.failed_sub_writes.len());
    }
    Ok(HttpResponse::Ok().json(result))
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderBackend, PaymentProvider);
pub async fn order_by_id<B, P>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderBackend,
    P: PaymentProvider,
{
    let order_id = OrderId::from(path.into_inner());
    trace!("💻️ GET order {order_id}");
    let order = api.fetch_order(&order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(order_by_number => Get "/orders/number/{order_number}" impl OrderBackend, PaymentProvider);
pub async fn order_by_number<B, P>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderBackend,
    P: PaymentProvider,
{
    let order_number = path.into_inner();
    trace!("💻️ GET order number {order_number}");
    let order = api.fetch_order_by_number(&order_number).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_order_status => Patch "/orders/{order_id}/status" impl OrderBackend, PaymentProvider);
/// Moves an order to a new status. The status is given as a query parameter, e.g. `?status=accepted`.
pub async fn update_order_status<B, P>(
    path: web::Path<String>,
    query: web::Query<StatusUpdateRequest>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderBackend,
    P: PaymentProvider,
{
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ Status update for order {order_id} to {}", query.status);
    let order = api.update_status(&order_id, &query.status).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "status": order.status })))
}

route!(admin_orders => Get "/admin/orders" impl OrderBackend, PaymentProvider);
pub async fn admin_orders<B, P>(
    query: web::Query<AdminOrdersQuery>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderBackend,
    P: PaymentProvider,
{
    let AdminOrdersQuery { status, limit } = query.into_inner();
    trace!("💻️ Admin order list. status: {status:?}, limit: {limit:?}");
    let orders = api.list_for_admin(status.as_deref(), limit).await?;
    Ok(HttpResponse::Ok().json(orders))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(payment_webhook => Post "/payment/webhook" impl OrderBackend, PaymentProvider);
/// Charge updates pushed by the payment gateway.
///
/// Business outcomes (paid, failed, unknown charge) and backend failures are all answered with a 200 so that the
/// gateway does not redeliver; the order is reconciled again by the worker or by the customer's poll.
pub async fn payment_webhook<B, P>(
    req: HttpRequest,
    options: web::Data<ServerOptions>,
    api: web::Data<OrderFlowApi<B, P>>,
    body: web::Json<ChargeNotification>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderBackend,
    P: PaymentProvider,
{
    if !is_whitelisted_peer(&req, &options) {
        warn!("💻️ Payment webhook call from a peer that is not whitelisted. The request is rejected.");
        return Err(ServerError::ForbiddenPeer);
    }
    let charge_id = body.into_inner().id;
    info!("💻️ Payment webhook received for charge {charge_id}");
    match api.reconcile_charge(&charge_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(result)),
        Err(e) => {
            error!("💻️ Could not reconcile charge {charge_id} from the webhook. {e}");
            Ok(HttpResponse::Ok().json(JsonResponse::failure("The payment could not be processed yet.")))
        },
    }
}

route!(verify_payment => Get "/payment/verify/{charge_id}" impl OrderBackend, PaymentProvider);
/// Polled by the storefront's payment result page with the charge id the gateway redirected back with.
pub async fn verify_payment<B, P>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderBackend,
    P: PaymentProvider,
{
    let charge_id = path.into_inner();
    debug!("💻️ Payment verification requested for charge {charge_id}");
    let result = api.reconcile_charge(&charge_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

route!(payment_status => Get "/payment/status/{order_id}" impl OrderBackend, PaymentProvider);
pub async fn payment_status<B, P>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderBackend,
    P: PaymentProvider,
{
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ Payment status requested for order {order_id}");
    let result = api.reconcile_order(&order_id).await?;
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Coupons  ----------------------------------------------------
route!(coupons => Get "/coupons" impl CouponManagement);
pub async fn coupons<B: CouponManagement>(api: web::Data<CouponApi<B>>) -> Result<HttpResponse, ServerError> {
    let coupons = api.active_coupons().await?;
    Ok(HttpResponse::Ok().json(coupons))
}

route!(validate_coupon => Post "/coupons/validate" impl CouponManagement);
/// Validates `?code=...&subtotal=...`.
pub async fn validate_coupon<B: CouponManagement>(
    query: web::Query<CouponValidationRequest>,
    api: web::Data<CouponApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let CouponValidationRequest { code, subtotal } = query.into_inner();
    debug!("💻️ Validating coupon {code} for a subtotal of {subtotal}");
    let result = api.validate(&code, subtotal).await?;
    Ok(HttpResponse::Ok().json(result))
}

//----------------------------------------------   Loyalty  ----------------------------------------------------
route!(loyalty_settings => Get "/loyalty/settings" impl LoyaltyManagement);
pub async fn loyalty_settings<B: LoyaltyManagement>(
    api: web::Data<LoyaltyApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let settings = api.settings().await?;
    Ok(HttpResponse::Ok().json(settings))
}

route!(save_loyalty_settings => Put "/loyalty/settings" impl LoyaltyManagement);
pub async fn save_loyalty_settings<B: LoyaltyManagement>(
    api: web::Data<LoyaltyApi<B>>,
    body: web::Json<LoyaltySettings>,
) -> Result<HttpResponse, ServerError> {
    info!("💻️ Saving loyalty settings");
    let settings = api.save_settings(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(settings))
}

//----------------------------------------------   Catalog  ----------------------------------------------------
async fn catalog_rows<B: CatalogManagement>(
    api: &CatalogApi<B>,
    kind: CatalogKind,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Listing {kind}");
    let rows = api.list(kind).await?;
    Ok(HttpResponse::Ok().json(rows))
}

route!(menu_categories => Get "/menu/categories" impl CatalogManagement);
pub async fn menu_categories<B: CatalogManagement>(
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    catalog_rows(&api, CatalogKind::Categories).await
}

route!(menu_items => Get "/menu/items" impl CatalogManagement);
pub async fn menu_items<B: CatalogManagement>(api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError> {
    catalog_rows(&api, CatalogKind::Items).await
}

route!(modifier_groups => Get "/menu/modifier-groups" impl CatalogManagement);
pub async fn modifier_groups<B: CatalogManagement>(
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    catalog_rows(&api, CatalogKind::ModifierGroups).await
}

route!(delivery_zones => Get "/delivery-zones" impl CatalogManagement);
pub async fn delivery_zones<B: CatalogManagement>(
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError> {
    catalog_rows(&api, CatalogKind::DeliveryZones).await
}
