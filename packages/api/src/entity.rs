pub mod owner;
pub mod prelude;
pub mod restaurant;
pub mod sent_email;
pub mod transaction;
