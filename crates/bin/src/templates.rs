//! HTML templates for web interface
//!
//! Simple inline HTML templates without a template engine.

/// Common CSS styles for all pages
const COMMON_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 1000px;
        margin: 40px auto;
        padding: 0 20px 80px;
        background: #f5f5f5;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    h1 {
        color: #333;
        border-bottom: 2px solid #0066cc;
        padding-bottom: 10px;
    }
    h2 {
        color: #555;
        margin-top: 30px;
    }
    nav a {
        margin-right: 16px;
        color: #0066cc;
        text-decoration: none;
        font-weight: bold;
    }
    nav a.active {
        border-bottom: 2px solid #0066cc;
    }
    .counter {
        float: right;
        color: #666;
        font-size: 0.6em;
        text-align: right;
    }
    .info-row {
        margin: 10px 0;
        padding: 8px;
        background: #f9f9f9;
        border-radius: 4px;
    }
    .label {
        font-weight: bold;
        color: #666;
        display: inline-block;
        width: 150px;
    }
    .value {
        color: #0066cc;
    }
    form {
        margin: 20px 0;
    }
    .form-group {
        margin: 15px 0;
    }
    label {
        display: block;
        font-weight: bold;
        margin-bottom: 5px;
        color: #333;
    }
    input[type="text"],
    input[type="password"],
    input[type="email"],
    input[type="file"] {
        width: 100%;
        padding: 10px;
        border: 1px solid #ddd;
        border-radius: 4px;
        font-size: 14px;
        box-sizing: border-box;
    }
    button {
        background: #0066cc;
        color: white;
        padding: 10px 20px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-size: 14px;
        font-weight: bold;
    }
    button:hover {
        background: #0052a3;
    }
    button:disabled {
        background: #999;
        cursor: wait;
    }
    .logout-btn {
        background: #999;
        float: right;
    }
    .logout-btn:hover {
        background: #777;
    }
    .receipt-image {
        max-width: 100%;
        border: 1px solid #ddd;
        border-radius: 4px;
        margin-top: 10px;
    }
    .notice {
        padding: 10px;
        border-radius: 4px;
        margin: 10px 0;
    }
    .success { color: #2b6e2b; background: #dff0d8; }
    .info { color: #31708f; background: #d9edf7; }
    .warning { color: #8a6d3b; background: #fcf8e3; }
    .error { color: #d9534f; background: #f2dede; }
    .footer {
        position: fixed;
        left: 0;
        bottom: 0;
        width: 100%;
        background: white;
        color: #333;
        text-align: center;
        padding: 10px;
        font-size: 0.9em;
    }
"#;

/// Disables the submit button and swaps in its `data-busy` label while the
/// request is in flight.
const BUSY_ON_SUBMIT: &str = r#"onsubmit="const b = this.querySelector('button[type=submit]'); b.disabled = true; b.textContent = b.dataset.busy;""#;

/// Shows the chosen photo in `#capture-preview` before it is saved.
const PREVIEW_ON_CHANGE: &str = r#"onchange="const p = document.getElementById('capture-preview'); const f = this.files[0]; if (!f) { p.hidden = true; return; } const r = new FileReader(); r.onload = e => { p.src = e.target.result; p.hidden = false; }; r.readAsDataURL(f);""#;

/// Inline message shown above a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Info(String),
    Warning(String),
    Error(String),
}

impl Notice {
    fn render(&self) -> String {
        let (class, text) = match self {
            Notice::Success(t) => ("success", t),
            Notice::Info(t) => ("info", t),
            Notice::Warning(t) => ("warning", t),
            Notice::Error(t) => ("error", t),
        };
        format!(r#"<div class="notice {class}">{}</div>"#, html_escape(text))
    }
}

/// Screens reachable from the navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Capture,
    Query,
    Send,
}

impl Screen {
    fn title(self) -> &'static str {
        match self {
            Screen::Capture => "Captura de Imagem",
            Screen::Query => "Consulta de Canhoto",
            Screen::Send => "Envio de E-mail",
        }
    }
}

/// Data shown in the header of every logged-in page.
#[derive(Debug, Clone)]
pub struct Header {
    pub username: String,
    /// `None` when the count could not be read.
    pub receipt_count: Option<u64>,
}

fn render_notice(notice: Option<&Notice>) -> String {
    notice.map(Notice::render).unwrap_or_default()
}

fn layout(screen: Screen, header: &Header, body: &str) -> String {
    let count = header
        .receipt_count
        .map_or_else(|| "?".to_string(), |c| c.to_string());

    let nav: String = [
        (Screen::Capture, "/capture", "Captura"),
        (Screen::Query, "/query", "Consulta"),
        (Screen::Send, "/send", "Envio"),
    ]
    .iter()
    .map(|(s, href, label)| {
        let class = if *s == screen { r#" class="active""# } else { "" };
        format!(r#"<a href="{href}"{class}>{label}</a>"#)
    })
    .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Canhoto - {title}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
        <h1>Captura e Consulta de Canhoto
            <span class="counter">Qtd. Canhotos: <strong id="receipt-count">{count}</strong></span>
        </h1>
        <nav>
            {nav}
            <form method="POST" action="/logout" style="display: inline; margin: 0;">
                <button type="submit" class="logout-btn">Sair ({username})</button>
            </form>
        </nav>
        <h2>{title}</h2>
        {body}
    </div>
    <div class="footer">Dinatec Peças e Serviços</div>
</body>
</html>"#,
        title = screen.title(),
        username = html_escape(&header.username),
    )
}

/// Render the login page
pub fn login_page(error: Option<&str>) -> String {
    let error_html = error.map_or(String::new(), |e| {
        format!(r#"<div class="notice error">{}</div>"#, html_escape(e))
    });

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Canhoto - Login</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
        <h1>Tela de Login</h1>
        {error_html}
        <form method="POST" action="/login" {BUSY_ON_SUBMIT}>
            <div class="form-group">
                <label for="username">Usuário:</label>
                <input type="text" id="username" name="username" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Senha:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <button type="submit" data-busy="Entrando...">Entrar</button>
        </form>
    </div>
</body>
</html>"#
    )
}

/// What the capture screen shows below the invoice field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureStage {
    /// No invoice number entered yet.
    Enter,
    /// The number is free; show the uploader.
    Upload { invoice: String },
}

/// Render the capture screen
pub fn capture_page(
    header: &Header,
    invoice_input: &str,
    stage: &CaptureStage,
    notice: Option<&Notice>,
) -> String {
    let notice_html = render_notice(notice);

    let uploader = match stage {
        CaptureStage::Enter => String::new(),
        CaptureStage::Upload { invoice } => format!(
            r#"<form method="POST" action="/capture" enctype="multipart/form-data" {BUSY_ON_SUBMIT}>
            <input type="hidden" name="invoice" value="{invoice}">
            <div class="form-group">
                <label for="image">Foto do canhoto da Nota Fiscal {invoice}:</label>
                <input type="file" id="image" name="image" accept="image/jpeg,image/png" capture="environment" required {PREVIEW_ON_CHANGE}>
            </div>
            <div class="form-group">
                <label for="capture-preview">Imagem Capturada:</label>
                <img id="capture-preview" class="receipt-image" alt="Imagem Capturada" hidden>
            </div>
            <button type="submit" data-busy="Salvando...">Salvar Imagem</button>
        </form>"#,
            invoice = html_escape(invoice),
        ),
    };

    let body = format!(
        r#"{notice_html}
        <form method="GET" action="/capture">
            <div class="form-group">
                <label for="invoice">Número da Nota Fiscal:</label>
                <input type="text" id="invoice" name="invoice" value="{invoice_input}"
                       inputmode="numeric" pattern="\s*[0-9]+\s*" maxlength="50"
                       placeholder="Digite o número da nota fiscal aqui" required autofocus>
            </div>
            <button type="submit">Verificar</button>
        </form>
        {uploader}"#,
        invoice_input = html_escape(invoice_input),
    );

    layout(Screen::Capture, header, &body)
}

/// A receipt found by the query screen.
#[derive(Debug, Clone)]
pub struct FoundReceipt {
    pub invoice: String,
    /// Capture time, already formatted for display.
    pub captured_at: String,
}

/// Render the query screen
pub fn query_page(
    header: &Header,
    invoice_input: &str,
    found: Option<&FoundReceipt>,
    notice: Option<&Notice>,
) -> String {
    let notice_html = render_notice(notice);

    let result_html = found.map_or(String::new(), |r| {
        let invoice = html_escape(&r.invoice);
        format!(
            r#"<div class="info-row">
            <span class="label">Nota Fiscal:</span>
            <span class="value">{invoice}</span>
        </div>
        <div class="info-row">
            <span class="label">Data Bipe:</span>
            <span class="value">{captured_at}</span>
        </div>
        <img class="receipt-image" src="/receipts/{invoice}/image" alt="Canhoto da Nota Fiscal {invoice}">"#,
            captured_at = html_escape(&r.captured_at),
        )
    });

    let body = format!(
        r#"{notice_html}
        <form method="GET" action="/query" {BUSY_ON_SUBMIT}>
            <div class="form-group">
                <label for="invoice">Número Nota Fiscal para consulta:</label>
                <input type="text" id="invoice" name="invoice" value="{invoice_input}"
                       inputmode="numeric" pattern="\s*[0-9]+\s*" maxlength="50"
                       placeholder="Digite número nota fiscal aqui" required autofocus>
            </div>
            <button type="submit" data-busy="Consultando...">Consultar Canhoto</button>
        </form>
        {result_html}"#,
        invoice_input = html_escape(invoice_input),
    );

    layout(Screen::Query, header, &body)
}

/// Values echoed back into the send form.
#[derive(Debug, Clone, Default)]
pub struct SendFormValues {
    pub recipient: String,
    pub subject: String,
    pub invoice: String,
}

/// Render the send screen
pub fn send_page(
    header: &Header,
    values: &SendFormValues,
    mail_configured: bool,
    notice: Option<&Notice>,
) -> String {
    let notice_html = render_notice(notice);

    let form_html = if mail_configured {
        format!(
            r#"<form method="POST" action="/send" {BUSY_ON_SUBMIT}>
            <div class="form-group">
                <label for="recipient">Destinatário:</label>
                <input type="email" id="recipient" name="recipient" value="{recipient}"
                       placeholder="Digite o e-mail do destinatário" required autofocus>
            </div>
            <div class="form-group">
                <label for="subject">Assunto do e-mail:</label>
                <input type="text" id="subject" name="subject" value="{subject}">
            </div>
            <div class="form-group">
                <label for="invoice">Número Nota Fiscal:</label>
                <input type="text" id="invoice" name="invoice" value="{invoice}"
                       inputmode="numeric" pattern="\s*[0-9]+\s*" maxlength="50"
                       placeholder="Digite o número da Nota Fiscal para envio" required>
            </div>
            <button type="submit" data-busy="Enviando e-mail...">Enviar por E-mail</button>
        </form>"#,
            recipient = html_escape(&values.recipient),
            subject = html_escape(&values.subject),
            invoice = html_escape(&values.invoice),
        )
    } else {
        Notice::Info(
            "Envio de e-mail não configurado: defina EMAIL_ORIGEM, EMAIL_SENHA e SMTP_SERVER."
                .to_string(),
        )
        .render()
    };

    layout(Screen::Send, header, &format!("{notice_html}\n        {form_html}"))
}

/// Escape HTML special characters
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
