pub mod interface;
pub mod deepl;

pub use interface::{TranslateError, TranslateInterface, TranslateRequest};
pub use deepl::DeepLClient;
