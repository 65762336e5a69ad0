//! Shared integration-test harness.
//!
//! Each test gets its own in-memory SQLite database, migrated with the
//! embedded migrator. The pool is pinned to a single connection so the
//! in-memory database survives across queries.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

use storefront_core::config::AppConfig;
use storefront_core::db::{self, DbPool};
use storefront_core::entities::{
    admin, cart_line, order, order_line, product, product_item, promotion, shipping_method,
};

pub struct TestApp {
    pub db: Arc<DbPool>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:".into(), "test".into());
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to connect to test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        Self { db: Arc::new(pool) }
    }

    pub async fn seed_product(&self, category_id: Uuid, brand_id: Uuid) -> product::Model {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Test product".into()),
            category_id: Set(category_id),
            brand_id: Set(brand_id),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to seed product")
    }

    pub async fn seed_product_item(
        &self,
        product_id: Uuid,
        price: Decimal,
        quantity_in_stock: i32,
    ) -> product_item::Model {
        product_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            sku: Set(format!("SKU-{}", Uuid::new_v4().simple())),
            price: Set(price),
            quantity_in_stock: Set(quantity_in_stock),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to seed product item")
    }

    pub async fn seed_cart_line(
        &self,
        cart_id: Uuid,
        product_item_id: Uuid,
        quantity: i32,
    ) -> cart_line::Model {
        cart_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart_id),
            product_item_id: Set(product_item_id),
            quantity: Set(quantity),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to seed cart line")
    }

    pub async fn seed_shipping_method(&self, price: Decimal) -> shipping_method::Model {
        shipping_method::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Standard".into()),
            price: Set(price),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to seed shipping method")
    }

    pub async fn seed_admin(&self, is_active: bool) -> admin::Model {
        admin::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(format!("admin-{}@example.com", Uuid::new_v4().simple())),
            is_active: Set(is_active),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to seed admin")
    }

    /// Seeds a promotion covering `[now - 1 day, now + 1 day)`.
    pub async fn seed_promotion(&self, scope: PromotionScope, discount_rate: i32) -> promotion::Model {
        let now = Utc::now();
        self.seed_promotion_with_window(
            scope,
            discount_rate,
            true,
            now - Duration::days(1),
            now + Duration::days(1),
        )
        .await
    }

    pub async fn seed_promotion_with_window(
        &self,
        scope: PromotionScope,
        discount_rate: i32,
        is_active: bool,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> promotion::Model {
        let (product_id, category_id, brand_id) = match scope {
            PromotionScope::Product(id) => (Some(id), None, None),
            PromotionScope::Category(id) => (None, Some(id), None),
            PromotionScope::Brand(id) => (None, None, Some(id)),
        };
        promotion::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(format!("{discount_rate}% off")),
            discount_rate: Set(discount_rate),
            is_active: Set(is_active),
            starts_at: Set(starts_at),
            ends_at: Set(ends_at),
            product_id: Set(product_id),
            category_id: Set(category_id),
            brand_id: Set(brand_id),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to seed promotion")
    }

    pub async fn seed_order(&self, order_total: Decimal) -> order::Model {
        order::ActiveModel {
            id: Set(Uuid::new_v4()),
            track_number: Set(format!("T{}", Uuid::new_v4().simple())[..10].to_string()),
            user_id: Set(Uuid::new_v4()),
            shipping_address_id: Set(Uuid::new_v4()),
            payment_type_id: Set(Uuid::new_v4()),
            shipping_method_id: Set(Uuid::new_v4()),
            status_id: Set(Uuid::new_v4()),
            order_total: Set(order_total),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to seed order")
    }

    pub async fn seed_order_line(
        &self,
        order_id: Uuid,
        product_item_id: Uuid,
        quantity: i32,
        unit_price: Decimal,
        discount: i32,
        shipping_price: Decimal,
    ) -> order_line::Model {
        order_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            product_item_id: Set(product_item_id),
            quantity: Set(quantity),
            unit_price: Set(unit_price),
            discount: Set(discount),
            shipping_price: Set(shipping_price),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.as_ref())
        .await
        .expect("failed to seed order line")
    }

    pub async fn product_item(&self, id: Uuid) -> product_item::Model {
        product_item::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .expect("query failed")
            .expect("product item not found")
    }

    pub async fn order(&self, id: Uuid) -> order::Model {
        order::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .expect("query failed")
            .expect("order not found")
    }

    pub async fn order_lines(&self, order_id: Uuid) -> Vec<order_line::Model> {
        order_line::Entity::find()
            .filter(order_line::Column::OrderId.eq(order_id))
            .all(self.db.as_ref())
            .await
            .expect("query failed")
    }

    pub async fn count_orders(&self) -> u64 {
        order::Entity::find()
            .count(self.db.as_ref())
            .await
            .expect("query failed")
    }

    pub async fn count_order_lines(&self) -> u64 {
        order_line::Entity::find()
            .count(self.db.as_ref())
            .await
            .expect("query failed")
    }

    pub async fn count_cart_lines(&self, cart_id: Uuid) -> u64 {
        cart_line::Entity::find()
            .filter(cart_line::Column::CartId.eq(cart_id))
            .count(self.db.as_ref())
            .await
            .expect("query failed")
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PromotionScope {
    Product(Uuid),
    Category(Uuid),
    Brand(Uuid),
}
