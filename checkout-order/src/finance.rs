use checkout_shared::Item;
use rust_decimal::Decimal;

/// Flat shipping fee added to every order.
pub const SHIPPING_FEE: Decimal = Decimal::from_parts(499, 0, 0, false, 2);

/// Order total: sum of quantity × unit price over all lines, plus shipping.
///
/// `None` when the total does not fit in a `Decimal`.
pub fn calculate_total(items: &[Item]) -> Option<Decimal> {
    items
        .iter()
        .try_fold(SHIPPING_FEE, |total, item| total.checked_add(item.line_total()?))
}
