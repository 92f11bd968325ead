pub mod patterns;
pub mod receipts;
pub mod reconciler;
pub mod split;
pub mod totals;

pub use receipts::ReceiptService;
pub use reconciler::reconcile;
pub use split::split_items;
pub use totals::{receipt_total, round2};
