use chrono::{DateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use uuid::Uuid;

use crate::{
    model::entity::Coupon,
    payments::{PaymentError, PaymentResult},
};

/// Highest course price accepted, ₹10 crore.
pub const MAX_PRICE_PAISE: i64 = 10_000_000_000;

/// Amount taken off `price_paise` by the coupon. Percent discounts round down
/// and never exceed the price.
pub fn discount_paise(price_paise: i64, coupon: &Coupon) -> i64 {
    let price_paise = price_paise.max(0);
    match (coupon.percent_off(), coupon.amount_off_paise()) {
        (Some(pct), _) => {
            let pct = i128::from(pct.clamp(0, 100));
            let discount = i128::from(price_paise) * pct / 100;
            i64::try_from(discount).unwrap_or(price_paise)
        }
        (None, Some(amount)) => amount.clamp(0, price_paise),
        (None, None) => 0,
    }
}

pub fn payable_paise(price_paise: i64, coupon: Option<&Coupon>) -> i64 {
    let discount = coupon.map(|c| discount_paise(price_paise, c)).unwrap_or(0);
    (price_paise - discount).max(0)
}

/// Checks run in this order; the first failing one wins.
pub fn validate_coupon(coupon: &Coupon, course_id: Uuid, now: DateTime<Utc>) -> PaymentResult<()> {
    if !coupon.active() {
        return Err(PaymentError::CouponInactive);
    }

    if coupon.expires_at().is_some_and(|at| at < now) {
        return Err(PaymentError::CouponExpired);
    }

    if coupon.course_id().is_some_and(|id| id != course_id) {
        return Err(PaymentError::CouponWrongCourse);
    }

    if coupon
        .max_redemptions()
        .is_some_and(|max| coupon.redeemed_count() >= max)
    {
        return Err(PaymentError::CouponExhausted);
    }

    Ok(())
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return String::from("0");
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

/// Provider order id: `vp_<course prefix>_<base36 millis>_<random>`.
/// Cashfree accepts 3..=45 chars of `[A-Za-z0-9_-]`.
pub fn new_order_id(course_id: Uuid, now: DateTime<Utc>) -> String {
    let course = course_id.simple().to_string();
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();

    format!("vp_{}_{}_{}", &course[..8], to_base36(millis), suffix)
}

/// Rupees with two decimals, as Cashfree expects `order_amount`.
pub fn paise_to_inr(paise: i64) -> f64 {
    paise as f64 / 100.0
}
