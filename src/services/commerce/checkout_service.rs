//! The inventory-checked purchase transaction.
//!
//! Converts a shopping cart into a durable order inside a single unit of
//! work: stock is validated and decremented under a row lock per product
//! item, each order line snapshots the pre-decrement unit price, resolved
//! discount and shipping price, and the cart is emptied. Any failure rolls
//! the whole attempt back with no observable side effect.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    db::{DbPool, UnitOfWork},
    entities::{cart_line, order, order_line, product, product_item, promotion, shipping_method},
    errors::ServiceError,
    events::{Event, EventSender},
    services::commerce::promotions::{best_discount, PromotionSet},
    services::commerce::track_number::TrackNumberGenerator,
};

/// Checkout parameters supplied by the caller.
///
/// The order total is computed by the caller from the cart at request time
/// and persisted as given; the transaction re-validates stock line by line
/// rather than trusting it for inventory purposes.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CheckoutRequest {
    pub user_id: Uuid,
    pub shipping_address_id: Uuid,
    pub payment_type_id: Uuid,
    pub cart_id: Uuid,
    pub shipping_method_id: Uuid,
    pub status_id: Uuid,
    #[validate(custom = "validate_order_total")]
    pub order_total: Decimal,
}

fn validate_order_total(total: &Decimal) -> Result<(), ValidationError> {
    if total.is_sign_negative() {
        return Err(ValidationError::new("order_total_negative"));
    }
    Ok(())
}

/// Identifiers the caller needs to confirm the purchase and fetch detail
/// through the read-only accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutOutcome {
    pub order_id: Uuid,
    pub track_number: String,
    pub updated_product_item_id: Uuid,
    pub last_order_line_id: Uuid,
}

/// Service executing the checkout transaction.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    uow: UnitOfWork,
    event_sender: Option<Arc<EventSender>>,
    track_numbers: TrackNumberGenerator,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        track_numbers: TrackNumberGenerator,
    ) -> Self {
        Self {
            uow: UnitOfWork::new(db),
            event_sender,
            track_numbers,
        }
    }

    /// Runs the full checkout for one cart.
    ///
    /// On success the cart is empty, stock is decremented for every line,
    /// and the order with its lines exists. On any error nothing persists.
    #[instrument(skip(self, request), fields(cart_id = %request.cart_id, user_id = %request.user_id))]
    pub async fn checkout(
        &self,
        request: CheckoutRequest,
    ) -> Result<CheckoutOutcome, ServiceError> {
        request
            .validate()
            .map_err(|e| ServiceError::ValidationError(e.to_string()))?;

        let cart_id = request.cart_id;
        let track_number = self.track_numbers.generate();
        let (outcome, events) = self
            .uow
            .run(move |txn| Box::pin(run_checkout(txn, request, track_number)))
            .await?;

        info!(
            order_id = %outcome.order_id,
            track_number = %outcome.track_number,
            cart_id = %cart_id,
            "Checkout completed"
        );

        if let Some(sender) = &self.event_sender {
            for event in events {
                if let Err(e) = sender.send(event).await {
                    warn!(error = %e, order_id = %outcome.order_id, "Failed to send checkout event");
                }
            }
            if let Err(e) = sender
                .send(Event::CheckoutCompleted {
                    cart_id,
                    order_id: outcome.order_id,
                })
                .await
            {
                warn!(error = %e, order_id = %outcome.order_id, "Failed to send checkout completed event");
            }
        }

        Ok(outcome)
    }
}

/// The transactional body of checkout. Only returns errors; commit and
/// rollback belong to the enclosing [`UnitOfWork`].
async fn run_checkout(
    txn: &DatabaseTransaction,
    request: CheckoutRequest,
    track_number: String,
) -> Result<(CheckoutOutcome, Vec<Event>), ServiceError> {
    let now = Utc::now();

    // Step 1: cart lines, in load order. Later steps must not reorder them.
    let cart_lines = cart_line::Entity::find()
        .filter(cart_line::Column::CartId.eq(request.cart_id))
        .order_by_asc(cart_line::Column::CreatedAt)
        .order_by_asc(cart_line::Column::Id)
        .all(txn)
        .await?;

    if cart_lines.is_empty() {
        return Err(ServiceError::InvalidOperation(format!(
            "Cart {} has no lines to check out",
            request.cart_id
        )));
    }

    // Steps 2-3: create the order in its initial status with the supplied total.
    let order_id = Uuid::new_v4();
    let order_model = order::ActiveModel {
        id: Set(order_id),
        track_number: Set(track_number.clone()),
        user_id: Set(request.user_id),
        shipping_address_id: Set(request.shipping_address_id),
        payment_type_id: Set(request.payment_type_id),
        shipping_method_id: Set(request.shipping_method_id),
        status_id: Set(request.status_id),
        order_total: Set(request.order_total),
        created_at: Set(now),
        updated_at: Set(None),
    };
    order_model.insert(txn).await?;

    // Step 4: shipping price snapshot, reused by every line of this order.
    let shipping_price = shipping_method::Entity::find_by_id(request.shipping_method_id)
        .one(txn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!(
                "Shipping method {} not found",
                request.shipping_method_id
            ))
        })?
        .price;

    let mut events = Vec::with_capacity(cart_lines.len() + 1);
    let mut updated_product_item_id = Uuid::nil();
    let mut last_order_line_id = Uuid::nil();

    // Step 5: per line, lock, validate, decrement, resolve discount, record.
    for line in &cart_lines {
        let item = product_item::Entity::find_by_id(line.product_item_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product item {} not found", line.product_item_id))
            })?;

        // Stock policy, in this exact order: an exhausted item reports
        // StockEmpty; buying all remaining stock is rejected as
        // InsufficientStock (the <= boundary is deliberate and pinned by a
        // regression test).
        if item.quantity_in_stock <= 0 {
            return Err(ServiceError::StockEmpty(item.id));
        }
        if item.quantity_in_stock <= line.quantity {
            return Err(ServiceError::InsufficientStock {
                product_item_id: item.id,
                available: item.quantity_in_stock,
                requested: line.quantity,
            });
        }

        let unit_price = item.price;
        let old_quantity = item.quantity_in_stock;
        let new_quantity = old_quantity - line.quantity;

        let mut item_update: product_item::ActiveModel = item.clone().into();
        item_update.quantity_in_stock = Set(new_quantity);
        item_update.updated_at = Set(Some(now));
        item_update.update(txn).await?;

        events.push(Event::InventoryDecremented {
            product_item_id: item.id,
            old_quantity,
            new_quantity,
        });

        let promotions = load_promotions(txn, line.product_item_id).await?;
        let discount = best_discount(&promotions, now);

        let order_line_id = Uuid::new_v4();
        let order_line_model = order_line::ActiveModel {
            id: Set(order_line_id),
            order_id: Set(order_id),
            product_item_id: Set(line.product_item_id),
            quantity: Set(line.quantity),
            unit_price: Set(unit_price),
            discount: Set(discount),
            shipping_price: Set(shipping_price),
            created_at: Set(now),
        };
        order_line_model.insert(txn).await?;

        updated_product_item_id = item.id;
        last_order_line_id = order_line_id;
    }

    // Step 6: empty the cart.
    cart_line::Entity::delete_many()
        .filter(cart_line::Column::CartId.eq(request.cart_id))
        .exec(txn)
        .await?;

    events.push(Event::OrderCreated(order_id));

    Ok((
        CheckoutOutcome {
            order_id,
            track_number,
            updated_product_item_id,
            last_order_line_id,
        },
        events,
    ))
}

/// Loads the product/category/brand promotion candidates for a product item.
async fn load_promotions(
    txn: &DatabaseTransaction,
    product_item_id: Uuid,
) -> Result<PromotionSet, ServiceError> {
    let item = product_item::Entity::find_by_id(product_item_id)
        .one(txn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Product item {} not found", product_item_id))
        })?;

    let parent = product::Entity::find_by_id(item.product_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", item.product_id)))?;

    // Every row per scope: the schema allows several promotions to share a
    // scope, and the resolver picks among all of them.
    let product_promos = promotion::Entity::find()
        .filter(promotion::Column::ProductId.eq(parent.id))
        .all(txn)
        .await?;
    let category_promos = promotion::Entity::find()
        .filter(promotion::Column::CategoryId.eq(parent.category_id))
        .all(txn)
        .await?;
    let brand_promos = promotion::Entity::find()
        .filter(promotion::Column::BrandId.eq(parent.brand_id))
        .all(txn)
        .await?;

    Ok(PromotionSet {
        product: product_promos,
        category: category_promos,
        brand: brand_promos,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_order_total_fails_validation() {
        let request = CheckoutRequest {
            user_id: Uuid::new_v4(),
            shipping_address_id: Uuid::new_v4(),
            payment_type_id: Uuid::new_v4(),
            cart_id: Uuid::new_v4(),
            shipping_method_id: Uuid::new_v4(),
            status_id: Uuid::new_v4(),
            order_total: dec!(-1.00),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn zero_order_total_is_allowed() {
        let request = CheckoutRequest {
            user_id: Uuid::new_v4(),
            shipping_address_id: Uuid::new_v4(),
            payment_type_id: Uuid::new_v4(),
            cart_id: Uuid::new_v4(),
            shipping_method_id: Uuid::new_v4(),
            status_id: Uuid::new_v4(),
            order_total: dec!(0.00),
        };
        assert!(request.validate().is_ok());
    }
}
