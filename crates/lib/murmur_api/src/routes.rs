//! Route paths.

pub const GET_HEALTH: &str = "/health";

pub const POST_CONVERSATION: &str = "/conversation";
pub const GET_CONVERSATIONS_ID: &str = "/conversations/{conversation_id}";

pub const POST_MESSAGE: &str = "/message";
pub const GET_MESSAGES_CONVERSATION_ID: &str = "/messages/{conversation_id}";

pub const THOUGHT: &str = "/thought";
pub const THOUGHT_ID: &str = "/thought/{id}";
pub const GET_THOUGHT_USER_ID: &str = "/thought/user/{user_id}";
