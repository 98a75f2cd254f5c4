pub mod ai_chat_message;
pub mod client_task;
pub mod cliente;
pub mod pendiente;
pub mod support_note;
