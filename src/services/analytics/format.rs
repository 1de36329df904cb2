//! 日期标签与涨幅换算

use chrono::NaiveDate;

/// 图表日期标签，形如 `3 Mar 2025`（日不补零）
pub fn display_date(date: NaiveDate) -> String {
    date.format("%-d %b %Y").to_string()
}

/// 相对最低价的涨幅（百分比）
///
/// 最低价恒为正，非正值时返回 0
pub fn percent_from_low(close: f64, lowest_price: f64) -> f64 {
    if lowest_price <= 0.0 {
        return 0.0;
    }
    (close - lowest_price) / lowest_price * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_date_has_no_zero_padding() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        assert_eq!(display_date(date), "3 Mar 2025");
        let date = NaiveDate::from_ymd_opt(2024, 12, 23).unwrap();
        assert_eq!(display_date(date), "23 Dec 2024");
    }

    #[test]
    fn test_percent_from_low() {
        assert!((percent_from_low(120.0, 100.0) - 20.0).abs() < 1e-9);
        assert!((percent_from_low(90.0, 100.0) + 10.0).abs() < 1e-9);
        assert_eq!(percent_from_low(90.0, 0.0), 0.0);
    }
}
