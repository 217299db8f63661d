use crate::{db_types::Coupon, traits::StorageError};

#[allow(async_fn_in_trait)]
pub trait CouponManagement {
    /// Fetches the active coupon with exactly this `code`. Callers upper-case codes before looking them up.
    async fn fetch_active_coupon(&self, code: &str) -> Result<Option<Coupon>, StorageError>;

    async fn fetch_active_coupons(&self) -> Result<Vec<Coupon>, StorageError>;
}
