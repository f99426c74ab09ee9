pub mod bearer_token;
pub mod identity;
pub mod request_id;
