//! HTTP protocol layer module
//!
//! Response builders shared by every route. All of them attach the same
//! cross-origin headers so browsers can call the relay from any origin.

pub mod body;
pub mod response;

// Re-export commonly used types
pub use body::{read_body, BodyError};
pub use response::{
    build_400_response, build_404_response, build_413_response, build_500_response,
    build_json_response, build_options_response, build_pretty_json_response, HttpResponse,
};
