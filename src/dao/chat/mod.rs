mod session;
mod message;

pub use session::{
    ChatSession,
    create_chat_session,
    get_chat_session_by_id,
    list_chat_sessions_by_user,
    rename_chat_session,
    delete_chat_session,
};

pub use message::{
    ChatMessage,
    save_chat_message,
    get_chat_history,
    count_chat_messages_by_session,
};
