pub mod gateway;
pub mod price_feed;
