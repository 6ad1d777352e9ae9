pub mod aggregate;
pub mod error;
pub mod locks;
pub mod pagination;
pub mod products;
pub mod repos;
pub mod reviews;
