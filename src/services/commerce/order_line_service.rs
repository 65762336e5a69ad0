//! Order-line removal with order-total recomputation.
//!
//! A privileged operation: the admin-active check runs inside the same
//! transaction as the deletion, and the parent order's total is recomputed
//! from the removed line's snapshot so the two move together or not at all.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseTransaction, EntityTrait, Set};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::{DbPool, UnitOfWork},
    entities::{admin, order, order_line},
    errors::ServiceError,
    events::{Event, EventSender},
    money,
};

#[derive(Debug, Clone)]
pub struct OrderLineService {
    uow: UnitOfWork,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderLineService {
    pub fn new(db: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            uow: UnitOfWork::new(db),
            event_sender,
        }
    }

    /// Deletes one order line and subtracts its discount-adjusted amount
    /// from the parent order's total, atomically.
    #[instrument(skip(self), fields(admin_id = %admin_id, order_line_id = %order_line_id))]
    pub async fn remove_order_line(
        &self,
        admin_id: Uuid,
        order_line_id: Uuid,
    ) -> Result<(), ServiceError> {
        let order_id = self
            .uow
            .run(move |txn| Box::pin(run_removal(txn, admin_id, order_line_id)))
            .await?;

        info!(order_id = %order_id, order_line_id = %order_line_id, "Order line removed");

        if let Some(sender) = &self.event_sender {
            if let Err(e) = sender
                .send(Event::OrderLineRemoved {
                    order_id,
                    order_line_id,
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "Failed to send order line removed event");
            }
            if let Err(e) = sender.send(Event::OrderTotalRecomputed(order_id)).await {
                warn!(error = %e, order_id = %order_id, "Failed to send order total recomputed event");
            }
        }

        Ok(())
    }
}

/// Transactional body. Only returns errors; commit/rollback belong to the
/// enclosing [`UnitOfWork`].
async fn run_removal(
    txn: &DatabaseTransaction,
    admin_id: Uuid,
    order_line_id: Uuid,
) -> Result<Uuid, ServiceError> {
    // Re-check admin-active inside the transaction rather than trusting an
    // earlier session check.
    let principal = admin::Entity::find_by_id(admin_id).one(txn).await?;
    match principal {
        None => {
            return Err(ServiceError::Unauthorized(format!(
                "Admin {} not found",
                admin_id
            )))
        }
        Some(ref a) if !a.is_active => {
            return Err(ServiceError::Unauthorized(format!(
                "Admin {} is not active",
                admin_id
            )))
        }
        Some(_) => {}
    }

    // Keep the deleted values; the recomputation needs the snapshot.
    let line = order_line::Entity::find_by_id(order_line_id)
        .one(txn)
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Order line {} not found", order_line_id))
        })?;

    let deleted = order_line::Entity::delete_by_id(order_line_id)
        .exec(txn)
        .await?;
    if deleted.rows_affected == 0 {
        return Err(ServiceError::NotFound(format!(
            "Order line {} not found",
            order_line_id
        )));
    }

    let parent = order::Entity::find_by_id(line.order_id)
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", line.order_id)))?;

    let removed_amount = money::line_amount(line.unit_price, line.quantity, line.discount)?;
    let new_total = money::sub(parent.order_total, removed_amount)?;

    let mut order_update: order::ActiveModel = parent.into();
    order_update.order_total = Set(new_total);
    order_update.updated_at = Set(Some(Utc::now()));
    order_update.update(txn).await?;

    Ok(line.order_id)
}
