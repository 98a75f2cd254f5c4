pub mod ai;
pub mod client_tasks;
pub mod clientes;
pub mod health;
pub mod notifications;
pub mod pendientes;
pub mod support_notes;
