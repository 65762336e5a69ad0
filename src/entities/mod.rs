/// Entities touched by the checkout core.
pub mod admin;
pub mod cart_line;
pub mod order;
pub mod order_line;
pub mod product;
pub mod product_item;
pub mod promotion;
pub mod shipping_method;

// Re-export entities
pub use admin::{Entity as Admin, Model as AdminModel};
pub use cart_line::{Entity as CartLine, Model as CartLineModel};
pub use order::{Entity as Order, Model as OrderModel};
pub use order_line::{Entity as OrderLine, Model as OrderLineModel};
pub use product::{Entity as Product, Model as ProductModel};
pub use product_item::{Entity as ProductItem, Model as ProductItemModel};
pub use promotion::{Entity as Promotion, Model as PromotionModel};
pub use shipping_method::{Entity as ShippingMethod, Model as ShippingMethodModel};
