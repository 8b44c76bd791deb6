pub mod assistant;
pub mod compare;
pub mod documents;
pub mod health;
pub mod upload;
