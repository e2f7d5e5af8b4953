mod client;
mod template;

pub use client::{
    BlackboxClient,
    TimeoutConfig,
    UpstreamError,
    DEFAULT_BASE_URL,
    init_blackbox_client,
    get_blackbox_client,
};

pub use template::{BlackboxChatRequest, UpstreamMessage};
