pub mod request_params;
pub mod snapshot;
