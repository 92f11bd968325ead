pub mod item;
pub mod receipt;
pub mod split;

pub use item::{ItemKind, RawExtractedItem, ReconciledItem};
pub use receipt::{NewReceipt, Receipt, ReceiptChanges, ReceiptUpdate, RECEIPT_TYPE, UNKNOWN_MERCHANT};
pub use split::{ItemAssignment, PayerShare, SplitRequest};
