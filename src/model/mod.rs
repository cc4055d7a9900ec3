pub mod common;
pub mod method;
pub mod parameter;
pub mod requests;
pub mod results;
pub mod user_context;

pub use common::*;
pub use method::*;
pub use parameter::*;
pub use requests::*;
pub use results::*;
pub use user_context::*;
