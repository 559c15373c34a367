pub mod session_handlers;
pub mod system_handlers;
pub mod url_handlers;

pub use session_handlers::*;
pub use system_handlers::*;
pub use url_handlers::*;
