pub mod gateway_state;
pub mod io_struct;
pub mod ollama;
pub mod server;
