pub mod user;
pub mod template;
pub mod registered_user;

pub use user::*;
pub use template::*;
pub use registered_user::*;
