pub mod reader;
pub mod remote;
pub mod response;

pub use reader::{classify_decode_error, decode_json, read_bounded_body, read_json};
pub use remote::{push_json_to_remote, push_json_to_remote_with};
pub use response::{error_json, error_json_with_status, write_json, JsonResponse};
