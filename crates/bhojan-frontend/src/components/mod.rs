pub mod alert_banner;
pub mod count_badge;
