//! Coupons: the record, its store contract, and the discount engine.

pub mod engine;
pub mod model;
pub mod store;

pub use engine::{
  compute_discount, final_amount, is_redeemable, rejection, CouponEngine, CouponRejection, DiscountPolicy,
  DEFAULT_FREE_SHIPPING_DISCOUNT, INVALID_CODE_MESSAGE,
};
pub use model::{normalize_code, Coupon, CouponChanges, CouponQuote, CouponSummary, CouponType, NewCoupon};
pub use store::CouponStore;
