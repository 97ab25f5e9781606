//! Stock lookups and the sell operation.
//!
//! Everything here works on in-memory rows; reading and rewriting the CSV
//! files is left to `io` and `app::pipeline`.

use chrono::NaiveDateTime;

use crate::domain::{SaleEntry, StockItem};
use crate::error::AppError;

/// Timestamp layout of sales recorded by `apply_sale` (SQLite `CURRENT_TIMESTAMP`).
pub const SALE_TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Stock listing filters. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockFilter {
    /// Case-insensitive substring of the item name.
    pub name: Option<String>,
    /// Exact unit.
    pub unit: Option<String>,
    /// Inclusive bounds on the selling price.
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl StockFilter {
    pub fn matches(&self, item: &StockItem) -> bool {
        let name_ok = self.name.as_deref().is_none_or(|needle| {
            needle.is_empty() || item.name.to_lowercase().contains(&needle.to_lowercase())
        });
        let unit_ok = self.unit.as_deref().is_none_or(|unit| unit.is_empty() || item.unit == unit);
        let min_ok = self.min_price.is_none_or(|min| item.selling_price >= min);
        let max_ok = self.max_price.is_none_or(|max| item.selling_price <= max);

        name_ok && unit_ok && min_ok && max_ok
    }
}

/// Items matching `filter`, in file order.
pub fn filter_stock<'a>(stock: &'a [StockItem], filter: &StockFilter) -> Vec<&'a StockItem> {
    stock.iter().filter(|item| filter.matches(item)).collect()
}

/// Record a sale of `quantity` units of item `stock_id`.
///
/// On success the item's quantity is reduced and the new sale row is
/// returned, numbered after the highest id in `existing`. Rejects unknown
/// items, non-positive quantities, and quantities above what is in stock;
/// `stock` is untouched in every error case.
pub fn apply_sale(
    stock: &mut [StockItem],
    existing: &[SaleEntry],
    stock_id: i64,
    quantity: f64,
    sold_at: NaiveDateTime,
) -> Result<SaleEntry, AppError> {
    let item = stock
        .iter_mut()
        .find(|item| item.id == stock_id)
        .ok_or_else(|| AppError::input(format!("Item {stock_id} not found.")))?;

    if !quantity.is_finite() || quantity <= 0.0 {
        return Err(AppError::input("Quantity must be greater than zero."));
    }
    if quantity > item.quantity {
        return Err(AppError::input(format!(
            "Not enough stock available: {} {} of {} left.",
            item.quantity, item.unit, item.name
        )));
    }

    item.quantity -= quantity;

    let id = existing.iter().map(|s| s.id).max().unwrap_or(0) + 1;
    Ok(SaleEntry {
        id,
        stock_id,
        quantity_sold: quantity,
        sale_date: sold_at.format(SALE_TIMESTAMP_FMT).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item(id: i64, name: &str, unit: &str, quantity: f64, price: f64) -> StockItem {
        StockItem {
            id,
            name: name.to_string(),
            unit: unit.to_string(),
            quantity,
            cost_price: price / 2.0,
            selling_price: price,
            low_stock_threshold: None,
        }
    }

    fn stock() -> Vec<StockItem> {
        vec![
            item(1, "Basmati Rice", "kg", 40.0, 2.5),
            item(2, "Brown rice", "kg", 10.0, 3.0),
            item(3, "Rice crackers", "pack", 5.0, 1.2),
            item(4, "Soap", "pc", 3.0, 0.8),
        ]
    }

    fn ids(items: &[&StockItem]) -> Vec<i64> {
        items.iter().map(|i| i.id).collect()
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let stock = stock();
        let filter = StockFilter {
            name: Some("RICE".to_string()),
            ..StockFilter::default()
        };
        assert_eq!(ids(&filter_stock(&stock, &filter)), vec![1, 2, 3]);
    }

    #[test]
    fn filters_combine() {
        let stock = stock();
        let filter = StockFilter {
            name: Some("rice".to_string()),
            unit: Some("kg".to_string()),
            min_price: Some(2.5),
            max_price: Some(2.9),
        };
        assert_eq!(ids(&filter_stock(&stock, &filter)), vec![1]);
        assert_eq!(filter_stock(&stock, &StockFilter::default()).len(), 4);
    }

    #[test]
    fn sale_decrements_stock_and_numbers_the_row() {
        let mut stock = stock();
        let existing = vec![SaleEntry {
            id: 7,
            stock_id: 4,
            quantity_sold: 1.0,
            sale_date: "2024-04-30 10:00:00".to_string(),
        }];

        let sale = apply_sale(&mut stock, &existing, 2, 4.0, noon()).unwrap();
        assert_eq!(sale.id, 8);
        assert_eq!(sale.stock_id, 2);
        assert_eq!(sale.quantity_sold, 4.0);
        assert_eq!(sale.sale_date, "2024-05-01 12:00:00");
        assert_eq!(stock[1].quantity, 6.0);
    }

    #[test]
    fn selling_everything_is_allowed() {
        let mut stock = stock();
        apply_sale(&mut stock, &[], 4, 3.0, noon()).unwrap();
        assert_eq!(stock[3].quantity, 0.0);
    }

    #[test]
    fn rejects_bad_sales_without_touching_stock() {
        let mut stock = stock();
        for (id, qty) in [(99, 1.0), (1, 0.0), (1, -2.0), (1, f64::NAN), (4, 3.5)] {
            let err = apply_sale(&mut stock, &[], id, qty, noon()).unwrap_err();
            assert_eq!(err.exit_code(), 2);
        }
        assert_eq!(stock, self::stock());
    }
}
