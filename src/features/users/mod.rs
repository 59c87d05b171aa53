//! User account management feature.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/users` | Paginated user list |
//! | POST | `/users` | Create a user |
//! | GET | `/users/email` | Look up a user id by email |
//! | PUT | `/users/{id}` | Update own account |
//! | DELETE | `/users/{id}` | Delete own account |
//! | GET | `/api/users/search` | Search by first name or surname |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use services::UserService;
