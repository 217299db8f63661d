use std::{collections::HashMap, fmt::Debug};

use chrono::{Duration, Utc};
use log::*;

use crate::{
    db_types::{
        NewItemModifierRecord,
        NewOrder,
        NewOrderItem,
        NewOrderItemRecord,
        NewOrderRecord,
        NewPaymentRecord,
        Order,
        OrderId,
        OrderStatus,
        OrderStatusUpdate,
        PaymentStatus,
    },
    fog_api::{
        errors::OrderFlowError,
        loyalty_api::apply_order_delta,
        order_objects::{
            AdminOrder,
            ItemWithModifiers,
            OrderCreationResult,
            OrderWithItems,
            ProvisionalSweep,
            ReconcileStatus,
            ReconciliationResult,
        },
    },
    helpers::new_order_number,
    traits::{
        ChargeOutcome,
        ChargeReport,
        ChargeRequest,
        OrderBackend,
        OrderQueryFilter,
        PaymentProvider,
        ProviderError,
        SubWriteFailure,
        SubWriteKind,
    },
};

pub const DEFAULT_ADMIN_LIST_LIMIT: u64 = 50;
pub const ORDER_CHANNEL: &str = "website";

/// Scoping values the workflow writes on every order it creates.
#[derive(Debug, Clone, Default)]
pub struct OrderFlowConfig {
    pub tenant_id: String,
    pub branch_id: String,
    /// The user that owns orders placed through the storefront.
    pub web_user_id: String,
    /// Recorded as the provider on payment records.
    pub provider_name: String,
}

/// `OrderFlowApi` creates orders, starts online payments for them and reconciles payment confirmations back onto
/// the orders.
///
/// Online orders are stored provisionally (`payment_status = payment_pending`) before the charge is created. They are
/// invisible to the admin list until a captured charge promotes them, and are deleted if the charge fails.
pub struct OrderFlowApi<B, P> {
    db: B,
    gateway: P,
    config: OrderFlowConfig,
}

impl<B, P> Debug for OrderFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi ({})", self.config.tenant_id)
    }
}

impl<B, P> OrderFlowApi<B, P> {
    pub fn new(db: B, gateway: P, config: OrderFlowConfig) -> Self {
        Self { db, gateway, config }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, P> OrderFlowApi<B, P>
where
    B: OrderBackend,
    P: PaymentProvider,
{
    /// Stores a new order.
    ///
    /// Orders that are not paid online are stored with their items and modifiers, loyalty points are applied, and the
    /// order is immediately visible to the kitchen.
    ///
    /// Online orders are stored provisionally and a charge is created with the payment provider. If the charge cannot
    /// be created, the provisional order is deleted again before the error is returned.
    ///
    /// Once the order row itself has been written, failures of the writes that hang off it (line items, modifiers,
    /// charge reference, loyalty) do not fail the call. They are listed in the result instead.
    pub async fn create_order(&self, order: NewOrder) -> Result<OrderCreationResult, OrderFlowError> {
        order.validate().map_err(OrderFlowError::Validation)?;
        let online = order.payment_method.is_online();
        let payment_status = if online { PaymentStatus::PaymentPending } else { PaymentStatus::Pending };
        let record = self.new_order_record(&order, payment_status);
        let stored = self.db.insert_order(&record).await?;
        info!(
            "🍔️ Order {} [{}] stored. {} items, total {}, paying by {}",
            stored.order_number,
            stored.id,
            order.items.len(),
            stored.total_amount,
            order.payment_method
        );
        let mut failures = self.write_line_items(&stored.id, &order.items).await;
        if !online {
            failures.extend(self.apply_loyalty(&stored).await);
            return Ok(OrderCreationResult::placed(&stored, failures));
        }
        let request = ChargeRequest::for_order(&stored);
        let session = match self.gateway.create_charge(&request).await {
            Ok(session) => session,
            Err(e) => {
                warn!("💳️ Could not create a charge for order {}. {e}. Discarding the order.", stored.order_number);
                self.discard_provisional(&stored).await;
                return Err(OrderFlowError::ChargeCreation(e.to_string()));
            },
        };
        info!("💳️ Charge {} created for order {}", session.charge_id, stored.order_number);
        if let Err(e) = self.db.set_payment_reference(&stored.id, &session.charge_id).await {
            warn!("💳️ Could not record charge {} on order {}. {e}", session.charge_id, stored.order_number);
            failures.push(SubWriteFailure::new(SubWriteKind::PaymentReference, &session.charge_id, e));
        }
        Ok(OrderCreationResult::awaiting_payment(&stored, session, failures))
    }

    fn new_order_record(&self, order: &NewOrder, payment_status: PaymentStatus) -> NewOrderRecord {
        NewOrderRecord {
            tenant_id: self.config.tenant_id.clone(),
            branch_id: self.config.branch_id.clone(),
            user_id: self.config.web_user_id.clone(),
            order_number: new_order_number(),
            order_type: order.order_type,
            channel: ORDER_CHANNEL,
            status: OrderStatus::Pending,
            payment_status,
            payment_method: order.payment_method,
            customer_id: order.customer_id.clone(),
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            customer_email: order.customer_email.clone(),
            delivery_address: order.delivery_address.clone(),
            delivery_instructions: order.delivery_instructions.clone(),
            subtotal: order.subtotal,
            discount_amount: order.discount_amount,
            delivery_fee: order.delivery_fee,
            tax_amount: order.tax_amount,
            service_charge: order.service_charge,
            total_amount: order.total_amount,
            coupon_code: order.coupon_code.as_ref().map(|c| c.trim().to_uppercase()),
            loyalty_points_redeemed: order.loyalty_points_redeemed,
            notes: order.notes.clone(),
        }
    }

    async fn write_line_items(&self, order_id: &OrderId, items: &[NewOrderItem]) -> Vec<SubWriteFailure> {
        let mut failures = Vec::new();
        for item in items {
            let record = NewOrderItemRecord::new(order_id, item);
            let stored = match self.db.insert_order_item(&record).await {
                Ok(stored) => stored,
                Err(e) => {
                    error!("🍔️ Line item {} of order {order_id} could not be stored. {e}", item.item_id);
                    failures.push(SubWriteFailure::new(SubWriteKind::LineItem, &item.item_id, e));
                    continue;
                },
            };
            if item.modifiers.is_empty() {
                continue;
            }
            let modifiers =
                item.modifiers.iter().map(|m| NewItemModifierRecord::new(&stored.id, m)).collect::<Vec<_>>();
            if let Err(e) = self.db.insert_item_modifiers(&modifiers).await {
                error!("🍔️ Modifiers for line item {} of order {order_id} could not be stored. {e}", stored.id);
                failures.push(SubWriteFailure::new(SubWriteKind::Modifiers, &item.item_id, e));
            }
        }
        failures
    }

    async fn apply_loyalty(&self, order: &Order) -> Option<SubWriteFailure> {
        match apply_order_delta(&self.db, order).await {
            Ok(_) => None,
            Err(e) => {
                warn!("⭐️ Loyalty points for order {} were not applied. {e}", order.order_number);
                let customer = order.customer_id.clone().unwrap_or_default();
                Some(SubWriteFailure::new(SubWriteKind::Loyalty, customer, e))
            },
        }
    }

    /// Deletes a provisional order, logging rather than returning any failure.
    async fn discard_provisional(&self, order: &Order) -> bool {
        match self.db.delete_provisional_order(&order.id).await {
            Ok(true) => {
                info!("🍔️ Provisional order {} discarded", order.order_number);
                true
            },
            Ok(false) => {
                warn!("🍔️ Order {} was not discarded. It is no longer awaiting payment.", order.order_number);
                false
            },
            Err(e) => {
                error!("🍔️ Provisional order {} could not be discarded. {e}", order.order_number);
                false
            },
        }
    }

    /// Reconciles the charge `charge_id` with its order.
    ///
    /// The charge status always comes from the payment provider and the order is the one recorded on the charge
    /// itself. Calling this any number of times for the same charge gives the same result, and writes at most one
    /// payment record.
    pub async fn reconcile_charge(&self, charge_id: &str) -> Result<ReconciliationResult, OrderFlowError> {
        let report = match self.gateway.fetch_charge(charge_id).await {
            Ok(report) => report,
            Err(ProviderError::ChargeNotFound(id)) => {
                debug!("💳️ Charge {id} is unknown to the payment provider");
                return Ok(ReconciliationResult::not_found("Payment not found"));
            },
            Err(e) => return Err(e.into()),
        };
        let Some(order_id) = report.order_id.clone() else {
            warn!("💳️ Charge {charge_id} does not reference an order");
            return Ok(ReconciliationResult::not_found("The payment does not reference an order"));
        };
        let Some(order) = self.db.fetch_order_by_id(&order_id).await? else {
            // A failed charge discards its order, so a missing order is the expected state on every later call
            if let ChargeOutcome::Failed(status) = &report.outcome {
                debug!("💳️ Charge {charge_id} ended with {status} and order {order_id} has already been discarded");
                let number = report.order_number.as_deref();
                return Ok(ReconciliationResult::discarded(&order_id, number, &failure_message(status)));
            }
            debug!("💳️ Charge {charge_id} references order {order_id}, which does not exist");
            return Ok(ReconciliationResult::not_found("Order not found"));
        };
        self.apply_charge_report(order, report).await
    }

    /// Reconciles an order by its id, using the charge recorded against it.
    pub async fn reconcile_order(&self, order_id: &OrderId) -> Result<ReconciliationResult, OrderFlowError> {
        let Some(order) = self.db.fetch_order_by_id(order_id).await? else {
            debug!("💳️ Reconciliation requested for unknown order {order_id}");
            return Ok(ReconciliationResult::not_found("Order not found"));
        };
        match (order.payment_status, order.payment_reference.as_deref()) {
            (PaymentStatus::Paid, _) => Ok(ReconciliationResult::paid(&order, "Payment already confirmed")),
            (PaymentStatus::Failed, _) => Ok(ReconciliationResult::failed(&order, "Payment failed")),
            (PaymentStatus::PaymentPending, Some(charge_id)) => self.reconcile_charge(charge_id).await,
            (PaymentStatus::PaymentPending, None) => {
                Ok(ReconciliationResult::pending(&order, "No payment has been started for this order yet"))
            },
            (PaymentStatus::Pending, _) => {
                Ok(ReconciliationResult::pending(&order, "This order is not paid online"))
            },
        }
    }

    async fn apply_charge_report(
        &self,
        order: Order,
        report: ChargeReport,
    ) -> Result<ReconciliationResult, OrderFlowError> {
        match &report.outcome {
            ChargeOutcome::Captured => self.promote(order, &report).await,
            _ if order.payment_status == PaymentStatus::Paid => {
                warn!(
                    "💳️ Order {} is paid, but charge {} now reports {}. Leaving the order alone.",
                    order.order_number, report.charge_id, report.status
                );
                Ok(ReconciliationResult::paid(&order, "Payment already confirmed"))
            },
            ChargeOutcome::Failed(status) => {
                info!("💳️ Charge {} for order {} ended with {status}", report.charge_id, order.order_number);
                match order.payment_status {
                    PaymentStatus::PaymentPending => self.discard_after_failure(order, status).await,
                    PaymentStatus::Failed => Ok(ReconciliationResult::failed(&order, &failure_message(status))),
                    _ => {
                        warn!(
                            "💳️ Charge {} failed, but order {} is not awaiting an online payment. Leaving it alone.",
                            report.charge_id, order.order_number
                        );
                        Ok(ReconciliationResult::pending(&order, "This order is not paid online"))
                    },
                }
            },
            ChargeOutcome::InProgress => {
                debug!("💳️ Charge {} for order {} is still in progress", report.charge_id, order.order_number);
                Ok(ReconciliationResult::pending(&order, "Payment is still being processed"))
            },
            ChargeOutcome::Unknown(status) => {
                warn!("💳️ Charge {} reports unrecognised status {status}. Treating as pending.", report.charge_id);
                Ok(ReconciliationResult::pending(&order, "Payment status is not yet known"))
            },
        }
    }

    /// Discards a provisional order whose charge failed. If the order changed in the meantime, its current state is
    /// reported instead.
    async fn discard_after_failure(&self, order: Order, status: &str) -> Result<ReconciliationResult, OrderFlowError> {
        if self.discard_provisional(&order).await {
            return Ok(ReconciliationResult::failed(&order, &failure_message(status)));
        }
        match self.db.fetch_order_by_id(&order.id).await? {
            None => Ok(ReconciliationResult::failed(&order, &failure_message(status))),
            Some(current) if current.payment_status == PaymentStatus::Paid => {
                Ok(ReconciliationResult::paid(&current, "Payment already confirmed"))
            },
            Some(current) => Ok(ReconciliationResult::pending(&current, "Payment is still being processed")),
        }
    }

    /// Marks the order paid. Only the caller whose conditional update wins writes the payment record and applies loyalty
    /// points; everyone else just reports the order as paid.
    async fn promote(&self, order: Order, report: &ChargeReport) -> Result<ReconciliationResult, OrderFlowError> {
        let Some(paid) = self.db.mark_order_paid(&order.id).await? else {
            return match self.db.fetch_order_by_id(&order.id).await? {
                Some(current) if current.payment_status == PaymentStatus::Paid => {
                    debug!("💳️ Order {} was already marked as paid", current.order_number);
                    Ok(ReconciliationResult::paid(&current, "Payment already confirmed"))
                },
                _ => {
                    warn!("💳️ Order {} disappeared while its payment was being confirmed", order.order_number);
                    Ok(ReconciliationResult::not_found("Order not found"))
                },
            };
        };
        info!("💳️ Order {} is paid (charge {})", paid.order_number, report.charge_id);
        let mut failures = Vec::new();
        let payment = NewPaymentRecord {
            order_id: paid.id.clone(),
            provider: self.config.provider_name.clone(),
            transaction_id: report.charge_id.clone(),
            amount: report.amount,
            currency: report.currency.clone(),
            status: report.status.clone(),
            raw_response: report.raw.clone(),
        };
        if let Err(e) = self.db.insert_payment_record(&payment).await {
            error!("💳️ Payment record for order {} could not be stored. {e}", paid.order_number);
            failures.push(SubWriteFailure::new(SubWriteKind::PaymentRecord, &report.charge_id, e));
        }
        failures.extend(self.apply_loyalty(&paid).await);
        Ok(ReconciliationResult::paid(&paid, "Payment confirmed").with_failures(failures))
    }

    /// Changes an order's status. `status` must be one of the [`OrderStatus`] strings.
    pub async fn update_status(&self, order_id: &OrderId, status: &str) -> Result<Order, OrderFlowError> {
        let status = status.parse::<OrderStatus>().map_err(|e| OrderFlowError::Validation(e.to_string()))?;
        let update = OrderStatusUpdate::new(status, Utc::now());
        let order = self
            .db
            .update_order_status(order_id, &update)
            .await?
            .ok_or_else(|| OrderFlowError::NotFound(format!("Order {order_id} not found")))?;
        info!("🍔️ Order {} is now {status}", order.order_number);
        Ok(order)
    }

    /// Orders for the admin panel, newest first, each with its payment record.
    ///
    /// Online orders still awaiting payment are never listed.
    pub async fn list_for_admin(
        &self,
        status: Option<&str>,
        limit: Option<u64>,
    ) -> Result<Vec<AdminOrder>, OrderFlowError> {
        let mut filter = OrderQueryFilter::default()
            .excluding_payment_status(PaymentStatus::PaymentPending)
            .with_limit(limit.unwrap_or(DEFAULT_ADMIN_LIST_LIMIT));
        if let Some(status) = status.filter(|s| !s.is_empty()) {
            let status = status.parse::<OrderStatus>().map_err(|e| OrderFlowError::Validation(e.to_string()))?;
            filter = filter.with_status(status);
        }
        let orders = self.db.list_orders(&filter).await?;
        let ids = orders.iter().map(|o| o.id.clone()).collect::<Vec<_>>();
        let mut payments = if ids.is_empty() {
            HashMap::new()
        } else {
            self.db.fetch_payments_for_orders(&ids).await?.into_iter().map(|p| (p.order_id.clone(), p)).collect()
        };
        let result = orders
            .into_iter()
            .map(|order| {
                let payment = payments.remove(&order.id);
                AdminOrder { order, payment }
            })
            .collect::<Vec<_>>();
        trace!("🍔️ {} orders listed for admin", result.len());
        Ok(result)
    }

    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<OrderWithItems, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::NotFound(format!("Order {order_id} not found")))?;
        self.with_items(order).await
    }

    pub async fn fetch_order_by_number(&self, order_number: &str) -> Result<OrderWithItems, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_number(order_number)
            .await?
            .ok_or_else(|| OrderFlowError::NotFound(format!("Order {order_number} not found")))?;
        self.with_items(order).await
    }

    async fn with_items(&self, order: Order) -> Result<OrderWithItems, OrderFlowError> {
        let items = self.db.fetch_order_items(&order.id).await?;
        let item_ids = items.iter().map(|i| i.id.clone()).collect::<Vec<_>>();
        let mut modifiers = HashMap::<String, Vec<_>>::new();
        if !item_ids.is_empty() {
            for m in self.db.fetch_item_modifiers(&item_ids).await? {
                modifiers.entry(m.order_item_id.clone()).or_default().push(m);
            }
        }
        let items = items
            .into_iter()
            .map(|item| {
                let modifiers = modifiers.remove(&item.id).unwrap_or_default();
                ItemWithModifiers { item, modifiers }
            })
            .collect();
        Ok(OrderWithItems { order, items })
    }

    /// One pass over provisional orders created more than `recheck_after` ago.
    ///
    /// Orders with a charge reference are reconciled against the provider. Orders without one can never be paid; they
    /// are discarded once they are older than `discard_after`.
    pub async fn sweep_provisional_orders(
        &self,
        recheck_after: Duration,
        discard_after: Duration,
    ) -> Result<ProvisionalSweep, OrderFlowError> {
        let now = Utc::now();
        let orders = self.db.fetch_provisional_orders(now - recheck_after).await?;
        let mut sweep = ProvisionalSweep { examined: orders.len(), ..Default::default() };
        for order in orders {
            let expired = order.created_at < now - discard_after;
            match order.payment_reference.as_deref() {
                Some(charge_id) => match self.reconcile_charge(charge_id).await {
                    Ok(r) => match r.status {
                        ReconcileStatus::Paid => sweep.paid += 1,
                        ReconcileStatus::Failed => sweep.discarded += 1,
                        // The provider has no record of the charge, so it can never be captured
                        ReconcileStatus::NotFound if expired => {
                            if self.discard_provisional(&order).await {
                                sweep.discarded += 1;
                            } else {
                                sweep.errors += 1;
                            }
                        },
                        ReconcileStatus::NotFound | ReconcileStatus::Pending => sweep.still_pending += 1,
                    },
                    Err(e) => {
                        warn!("🕰️ Could not reconcile order {} (charge {charge_id}). {e}", order.order_number);
                        sweep.errors += 1;
                    },
                },
                None if expired => {
                    if self.discard_provisional(&order).await {
                        sweep.discarded += 1;
                    } else {
                        sweep.errors += 1;
                    }
                },
                None => sweep.still_pending += 1,
            }
        }
        Ok(sweep)
    }
}

fn failure_message(status: &str) -> String {
    format!("Payment {}", status.to_lowercase())
}
