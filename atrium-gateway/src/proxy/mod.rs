mod forward;

pub use forward::{forward_request, UpstreamProxy};
