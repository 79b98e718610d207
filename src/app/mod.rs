pub mod ports;
pub mod reply_use_case;

pub use reply_use_case::ReplyService;
