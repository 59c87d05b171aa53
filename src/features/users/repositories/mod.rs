mod user_repository;

#[cfg(test)]
mod memory_user_repository;

pub use user_repository::{PgUserRepository, UserRepository};

#[cfg(test)]
pub use memory_user_repository::MemoryUserRepository;
