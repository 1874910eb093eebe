mod chat_result;
mod credentials;
mod error;
mod report;
mod reporter;
mod script;
mod session;
mod transport;

pub use chat_result::*;
pub use credentials::*;
pub use error::*;
pub use report::*;
pub use reporter::*;
pub use script::*;
pub use session::*;
pub use transport::*;
