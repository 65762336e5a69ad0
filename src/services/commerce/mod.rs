//! Commerce services: the checkout transaction, order-line removal, and the
//! pure promotion resolver they share.

pub mod checkout_service;
pub mod order_line_service;
pub mod promotions;
pub mod track_number;

pub use checkout_service::{CheckoutOutcome, CheckoutRequest, CheckoutService};
pub use order_line_service::OrderLineService;
pub use promotions::{best_discount, PromotionSet};
pub use track_number::TrackNumberGenerator;
