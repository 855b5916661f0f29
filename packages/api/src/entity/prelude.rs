pub use super::owner::Entity as Owner;
pub use super::restaurant::Entity as Restaurant;
pub use super::sent_email::Entity as SentEmail;
pub use super::transaction::Entity as Transaction;
