mod dev_server;

pub use dev_server::*;
