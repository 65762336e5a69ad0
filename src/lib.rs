//! storefront-core
//!
//! Checkout and order-fulfillment core of the storefront backend: the
//! inventory-checked purchase transaction, the promotion resolver, the
//! order-total recomputation on order-line removal, and the transactional
//! unit-of-work wrapper they are built on. The HTTP layer, catalog search,
//! and single-table CRUD live outside this crate and call in through
//! [`services::commerce`].
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod migrator;
pub mod money;
pub mod services;

pub mod prelude {
    pub use crate::config::{load_config, AppConfig};
    pub use crate::db::{
        establish_connection, establish_connection_from_app_config, run_migrations, DbPool,
        UnitOfWork,
    };
    pub use crate::errors::ServiceError;
    pub use crate::events::{channel, process_events, Event, EventSender};
    pub use crate::services::commerce::{
        best_discount, CheckoutOutcome, CheckoutRequest, CheckoutService, OrderLineService,
        PromotionSet, TrackNumberGenerator,
    };
}
