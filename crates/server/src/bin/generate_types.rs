use std::path::PathBuf;

use ts_rs::TS;

fn generate_types_content() -> String {
    let decls = [
        db::types::PendienteEstado::decl(),
        db::types::ClienteEstado::decl(),
        db::types::ChatRole::decl(),
        db::models::pendiente::Pendiente::decl(),
        db::models::pendiente::PendienteInput::decl(),
        db::models::cliente::Cliente::decl(),
        db::models::cliente::ClienteInput::decl(),
        db::models::cliente::TaskCounts::decl(),
        db::models::cliente::ClienteSummary::decl(),
        db::models::client_task::ClientTask::decl(),
        db::models::support_note::SupportNote::decl(),
        db::models::support_note::CreateSupportNote::decl(),
        db::models::support_note::UpdateSupportNote::decl(),
        db::models::ai_chat_message::AiChatMessage::decl(),
        services::services::status::ClienteOverview::decl(),
        services::services::notification::CheckAllOutcome::decl(),
        services::services::task_aggregation::NewTask::decl(),
        services::services::task_aggregation::BulkTasks::decl(),
        services::services::task_aggregation::GlobalTask::decl(),
        services::services::task_aggregation::TaskStatusUpdate::decl(),
        services::services::task_aggregation::ConvertToPendiente::decl(),
        services::services::assistant::AskRequest::decl(),
        services::services::assistant::AskResponse::decl(),
        server::routes::client_tasks::TasksCreated::decl(),
        server::routes::client_tasks::GlobalTaskOutcome::decl(),
        server::routes::client_tasks::PendienteGenerated::decl(),
        utils::response::MessageResponse::decl(),
        utils::response::ErrorResponse::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|decl| format!("export {}", decl.trim_start()))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "// This file was generated by `cargo run --bin generate_types`. Do not edit it by hand.\n\n{body}\n"
    )
}

fn main() {
    let check_mode = std::env::args().any(|arg| arg == "--check");
    let output = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../shared/types.ts");
    let generated = generate_types_content();

    if check_mode {
        let current = std::fs::read_to_string(&output).unwrap_or_default();
        if current != generated {
            eprintln!("{} is out of date, run generate_types", output.display());
            std::process::exit(1);
        }
        println!("{} is up to date", output.display());
        return;
    }

    let written = output
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|()| std::fs::write(&output, generated));
    if let Err(err) = written {
        eprintln!("generate_types failed: {err}");
        std::process::exit(1);
    }
    println!("wrote {}", output.display());
}
