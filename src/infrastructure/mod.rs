pub mod launcher;
pub mod reporters;
pub mod transports;
