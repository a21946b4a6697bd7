pub mod token_service;
pub mod token_service_impl;
pub mod user_service;
pub mod user_service_impl;

pub use token_service::{AuthenticatedUser, TokenError, TokenService};
pub use token_service_impl::SeaOrmTokenService;
pub use user_service::{Registration, UserError, UserPage, UserService};
pub use user_service_impl::SeaOrmUserService;
