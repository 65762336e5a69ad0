//! Promotion resolution.
//!
//! A product item can be annotated with candidate promotions at three
//! scopes: product level, category level, brand level. Nothing forbids
//! several promotions sharing a scope, so each scope carries every matching
//! row. Resolution picks the single best currently-applicable discount.

use chrono::{DateTime, Utc};

use crate::entities::promotion;

/// The candidate promotions loaded alongside a product item, per scope.
#[derive(Debug, Clone, Default)]
pub struct PromotionSet {
    pub product: Vec<promotion::Model>,
    pub category: Vec<promotion::Model>,
    pub brand: Vec<promotion::Model>,
}

impl PromotionSet {
    fn candidates(&self) -> impl Iterator<Item = &promotion::Model> {
        self.product
            .iter()
            .chain(self.category.iter())
            .chain(self.brand.iter())
    }
}

/// A promotion applies iff it is active and `now` lies in
/// `[starts_at, ends_at)`. The end bound is exclusive.
fn is_applicable(promotion: &promotion::Model, now: DateTime<Utc>) -> bool {
    promotion.is_active && promotion.starts_at <= now && now < promotion.ends_at
}

/// Returns the best applicable discount percent for the given candidates,
/// or 0 when none applies. Pure; callers supply `now`.
pub fn best_discount(set: &PromotionSet, now: DateTime<Utc>) -> i32 {
    set.candidates()
        .filter(|p| is_applicable(p, now))
        .map(|p| p.discount_rate)
        .max()
        .unwrap_or(0)
}
