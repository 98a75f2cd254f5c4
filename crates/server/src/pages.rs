//! Standalone HTML pages served to someone who clicks the "mark all as
//! completed" link inside a reminder email.

use utils::html::escape;

const BASE_STYLE: &str = r#"
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            margin: 0;
            padding: 0;
            display: flex;
            justify-content: center;
            align-items: center;
            min-height: 100vh;
        }
        .container {
            background: white;
            border-radius: 16px;
            padding: 40px;
            max-width: 500px;
            text-align: center;
            box-shadow: 0 10px 40px rgba(0,0,0,0.2);
        }
        .icon { font-size: 64px; margin-bottom: 20px; }
        h1 { margin: 0 0 10px 0; font-size: 28px; }
        p { color: #64748b; font-size: 16px; line-height: 1.6; margin: 20px 0; }
"#;

fn page(title: &str, background: &str, extra_style: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{BASE_STYLE}
        body {{ background: {background}; }}
{extra_style}    </style>
</head>
<body>
    <div class="container">
{body}
    </div>
</body>
</html>"#
    )
}

pub fn completion_success(actividad: &str, cliente_updated: bool) -> String {
    let cliente_line = if cliente_updated {
        "<strong>✓ Cliente:</strong> Actualizado a completado<br>\n            <strong>✓ Tareas:</strong> Eliminadas del sistema"
    } else {
        "<strong>• Cliente:</strong> Sin cliente asociado"
    };
    let body = format!(
        r#"        <div class="icon">✅</div>
        <h1>¡Tareas Completadas!</h1>
        <p>Has marcado todas las tareas como completadas exitosamente.</p>
        <div class="activity">{actividad}</div>
        <div class="info">
            <strong>✓ Pendiente:</strong> Marcado como Finalizado<br>
            {cliente_line}
        </div>
        <p style="font-size: 14px; color: #94a3b8;">Puedes cerrar esta ventana.</p>"#,
        actividad = escape(actividad),
    );
    page(
        "Tareas Completadas",
        "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
        r#"        h1 { color: #16a34a; }
        .activity { background: #f1f5f9; padding: 15px; border-radius: 8px; margin: 20px 0; font-weight: 600; color: #334155; }
        .info { background: #dcfce7; border-left: 4px solid #16a34a; padding: 15px; border-radius: 4px; text-align: left; margin: 20px 0; font-size: 14px; color: #15803d; }
"#,
        &body,
    )
}

pub fn completion_error(message: &str) -> String {
    let body = format!(
        r#"        <div class="icon">❌</div>
        <h1>Error</h1>
        <p>{}</p>"#,
        escape(message)
    );
    page(
        "Error",
        "linear-gradient(135deg, #ef4444 0%, #dc2626 100%)",
        "        h1 { color: #dc2626; }\n",
        &body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_page_escapes_the_actividad() {
        let html = completion_success("<b>Backup</b> & co", true);
        assert!(html.contains("&lt;b&gt;Backup&lt;/b&gt; &amp; co"));
        assert!(html.contains("Marcado como Finalizado"));
        assert!(html.contains("Eliminadas del sistema"));
    }

    #[test]
    fn success_page_without_cliente_says_so() {
        let html = completion_success("Backup", false);
        assert!(html.contains("Sin cliente asociado"));
        assert!(!html.contains("Eliminadas del sistema"));
    }

    #[test]
    fn error_page_carries_the_message() {
        let html = completion_error("Pendiente no encontrado");
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<p>Pendiente no encontrado</p>"));
    }
}
