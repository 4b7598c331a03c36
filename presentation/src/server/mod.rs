//! HTTP trigger server for running single dialogues on request

mod routes;

pub use routes::{WELCOME_MESSAGE, router, serve};
