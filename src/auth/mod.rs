//! User accounts, password hashing and token based authentication.

mod log_in;
mod log_out;
mod middleware;
mod password;
mod rate_limit;
mod refresh;
mod register;
pub(crate) mod session;
pub(crate) mod token;
mod user;

pub use log_in::log_in;
pub use log_out::{get_current_user, log_out};
pub use middleware::auth_guard;
pub use password::{PasswordHash, ValidatedPassword};
pub use rate_limit::LogInRateLimiter;
pub use refresh::refresh_tokens;
pub use register::register_user;
pub use session::create_session_table;
pub use token::TokenKeys;
pub use user::{
    Email, User, UserID, create_user, create_user_table, get_user_by_email, get_user_by_id,
    set_initial_balance, update_password,
};
