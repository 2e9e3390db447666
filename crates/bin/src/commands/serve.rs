//! Serve command - runs the canhoto web server.

use std::{sync::Arc, time::Duration};

use axum::{
    Form, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tokio::signal::unix::{SignalKind, signal};
use tower_cookies::{Cookie, CookieManagerLayer, Cookies, cookie::SameSite};

use canhoto::{
    AuthService, InvoiceNumber, NotificationService, ReceiptService,
    notify::{DEFAULT_SUBJECT, Recipient, SendOutcome, SmtpConfig, SmtpMailer},
    receipt::ReceiptError,
};

use crate::cli::{MailArgs, ServeArgs};
use crate::session::SessionStore;
use crate::store::{backend_label, open_store};
use crate::templates::{self, CaptureStage, FoundReceipt, Header, Notice, SendFormValues};

const SESSION_COOKIE: &str = "canhoto_session";

/// Display format of capture timestamps.
const CAPTURED_AT_FORMAT: &str = "%d/%m/%Y %H:%M:%S UTC";

/// Shared application state
#[derive(Clone)]
struct AppState {
    auth: AuthService,
    receipts: ReceiptService,
    notifier: Option<NotificationService>,
    sessions: SessionStore,
    backend: &'static str,
}

/// Login form data
#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

/// `?invoice=` on the capture and query screens
#[derive(Deserialize)]
struct InvoiceQuery {
    invoice: Option<String>,
}

/// Send form data
#[derive(Deserialize)]
struct SendForm {
    recipient: String,
    #[serde(default)]
    subject: String,
    invoice: String,
}

/// Build the relay transport when all mail settings are present.
fn build_notifier(
    mail: &MailArgs,
) -> Result<Option<NotificationService>, Box<dyn std::error::Error>> {
    let (Some(sender), Some(password), Some(host)) = (&mail.sender, &mail.password, &mail.server)
    else {
        tracing::warn!("Mail relay not configured; the send screen is disabled");
        return Ok(None);
    };

    let config = SmtpConfig {
        host: host.clone(),
        port: mail.port,
        sender: sender.clone(),
        password: password.clone(),
        timeout: Some(Duration::from_secs(mail.timeout)),
    };
    let mailer = SmtpMailer::new(&config)?;
    tracing::info!(relay = %host, port = mail.port, sender = %sender, "Mail relay configured");

    Ok(Some(NotificationService::new(Arc::new(mailer))))
}

fn session_ttl(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(3600))
}

fn upload_limit_bytes(megabytes: u64) -> usize {
    usize::try_from(megabytes.saturating_mul(1024 * 1024)).unwrap_or(usize::MAX)
}

fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handle_root_request))
        .route("/health", get(handle_health_endpoint))
        .route("/login", get(handle_login_page).post(handle_login_submit))
        .route("/logout", post(handle_logout))
        .route("/capture", get(handle_capture_page).post(handle_capture_submit))
        .route("/query", get(handle_query_page))
        .route("/receipts/{invoice}/image", get(handle_receipt_image))
        .route("/send", get(handle_send_page).post(handle_send_submit))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}

/// Run the canhoto server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store(&args.store).await?;
    let notifier = build_notifier(&args.mail)?;

    let auth = AuthService::new(store.clone());
    if auth.user_count().await? == 0 {
        tracing::warn!("No users provisioned; create one with `canhoto user add <name>`");
    }

    let app_state = AppState {
        auth,
        receipts: ReceiptService::new(store.clone()),
        notifier,
        sessions: SessionStore::new(session_ttl(args.session_hours)),
        backend: backend_label(&args.store),
    };

    let app = router(app_state, upload_limit_bytes(args.max_upload_mb));

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!("Listening on {local_addr}");

    println!("Canhoto server started");
    println!();
    println!("Web Interface: http://localhost:{}", local_addr.port());
    println!();
    println!("Available endpoints:");
    println!("  GET  /                 - Redirect to login or capture");
    println!("  GET  /login            - Login page");
    println!("  GET  /capture          - Capture a receipt photo");
    println!("  GET  /query            - Look up a receipt");
    println!("  GET  /send             - E-mail a receipt");
    println!("  GET  /health           - Health check (JSON)");
    println!();
    println!("Press Ctrl+C to shutdown");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to set up SIGTERM handler");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("failed to set up SIGINT handler");

            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
                _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
            }
        })
        .await?;

    store.close().await;
    println!("Server shut down");
    Ok(())
}

// ============================================================================
// Session helpers
// ============================================================================

/// Username of the logged-in operator, if any
async fn current_user(state: &AppState, cookies: &Cookies) -> Option<String> {
    let cookie = cookies.get(SESSION_COOKIE)?;
    state.sessions.get_user(cookie.value()).await
}

async fn page_header(state: &AppState, username: String) -> Header {
    let receipt_count = match state.receipts.count().await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::error!("Failed to count receipts: {e}");
            None
        }
    };
    Header {
        username,
        receipt_count,
    }
}

// ============================================================================
// Authentication Handlers
// ============================================================================

/// Handler for GET / - Root redirect
async fn handle_root_request(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if current_user(&state, &cookies).await.is_some() {
        return Redirect::to("/capture");
    }
    Redirect::to("/login")
}

/// Handler for GET /login - Show login page
async fn handle_login_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    if current_user(&state, &cookies).await.is_some() {
        return Redirect::to("/capture").into_response();
    }

    Html(templates::login_page(None)).into_response()
}

/// Handler for POST /login - Process login
async fn handle_login_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Response {
    match state.auth.authenticate(&form.username, &form.password).await {
        Ok(true) => {
            let session_token = state.sessions.create_session(&form.username).await;
            let mut cookie = Cookie::new(SESSION_COOKIE, session_token);
            cookie.set_http_only(true);
            cookie.set_same_site(SameSite::Lax);
            cookie.set_path("/");
            cookies.add(cookie);
            Redirect::to("/capture").into_response()
        }
        Ok(false) => Html(templates::login_page(Some(
            "Usuário ou senha inválidos. Tente novamente.",
        )))
        .into_response(),
        Err(e) => {
            tracing::error!("Login check failed: {e}");
            Html(templates::login_page(Some(&format!(
                "Erro ao acessar o banco de dados: {e}"
            ))))
            .into_response()
        }
    }
}

/// Handler for POST /logout - Logout and destroy session
async fn handle_logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        state.sessions.destroy_session(cookie.value()).await;
        let mut removal = Cookie::from(SESSION_COOKIE);
        removal.set_path("/");
        cookies.remove(removal);
    }
    Redirect::to("/login")
}

// ============================================================================
// Capture Handlers
// ============================================================================

/// Handler for GET /capture - Capture form, optionally checking a number
async fn handle_capture_page(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<InvoiceQuery>,
) -> Response {
    let Some(username) = current_user(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };

    let input = query.invoice.unwrap_or_default();
    let (stage, notice) = if input.trim().is_empty() {
        (CaptureStage::Enter, None)
    } else {
        match InvoiceNumber::parse(&input) {
            Err(_) => (CaptureStage::Enter, Some(invalid_invoice_notice())),
            Ok(invoice) => match state.receipts.exists(&invoice).await {
                Ok(true) => (
                    CaptureStage::Enter,
                    Some(Notice::Warning(
                        "Nota fiscal já gravada no banco de dados.".to_string(),
                    )),
                ),
                Ok(false) => (
                    CaptureStage::Upload {
                        invoice: invoice.to_string(),
                    },
                    None,
                ),
                Err(e) => (CaptureStage::Enter, Some(store_error_notice(&e))),
            },
        }
    };

    let header = page_header(&state, username).await;
    Html(templates::capture_page(&header, &input, &stage, notice.as_ref())).into_response()
}

/// Fields of the capture upload
#[derive(Default)]
struct CaptureUpload {
    invoice: String,
    image: Vec<u8>,
}

async fn read_capture_upload(
    mut multipart: Multipart,
) -> Result<CaptureUpload, axum::extract::multipart::MultipartError> {
    let mut upload = CaptureUpload::default();
    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("invoice") => upload.invoice = field.text().await?,
            Some("image") => upload.image = field.bytes().await?.to_vec(),
            _ => {}
        }
    }
    Ok(upload)
}

/// Handler for POST /capture - Save an uploaded receipt photo
async fn handle_capture_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    multipart: Multipart,
) -> Response {
    let Some(username) = current_user(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };

    let upload = match read_capture_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            tracing::warn!("Rejected capture upload: {e}");
            let header = page_header(&state, username).await;
            let notice = Notice::Error(format!("Falha ao receber a imagem: {e}"));
            return (
                e.status(),
                Html(templates::capture_page(&header, "", &CaptureStage::Enter, Some(&notice))),
            )
                .into_response();
        }
    };

    let Ok(invoice) = InvoiceNumber::parse(&upload.invoice) else {
        let header = page_header(&state, username).await;
        let notice = invalid_invoice_notice();
        return Html(templates::capture_page(
            &header,
            &upload.invoice,
            &CaptureStage::Enter,
            Some(&notice),
        ))
        .into_response();
    };

    let (stage, notice) = match state.receipts.save(&invoice, upload.image).await {
        Ok(_) => (
            CaptureStage::Enter,
            Notice::Success("Imagem salva com sucesso no banco de dados.".to_string()),
        ),
        Err(e) => {
            let stage = if e.is_validation_error() {
                CaptureStage::Upload {
                    invoice: invoice.to_string(),
                }
            } else {
                CaptureStage::Enter
            };
            (stage, save_error_notice(&e))
        }
    };

    let header = page_header(&state, username).await;
    Html(templates::capture_page(
        &header,
        invoice.as_str(),
        &stage,
        Some(&notice),
    ))
    .into_response()
}

fn invalid_invoice_notice() -> Notice {
    Notice::Error("Por favor, insira apenas números para o número da nota fiscal.".to_string())
}

fn store_error_notice(err: &canhoto::Error) -> Notice {
    Notice::Error(format!("Erro ao acessar o banco de dados: {err}"))
}

/// Operator message for a failed save
fn save_error_notice(err: &canhoto::Error) -> Notice {
    match err {
        canhoto::Error::Receipt(ReceiptError::AlreadyStored { .. }) => {
            Notice::Warning("Nota fiscal já gravada no banco de dados.".to_string())
        }
        canhoto::Error::Receipt(ReceiptError::EmptyUpload) => {
            Notice::Error("Selecione uma imagem antes de salvar.".to_string())
        }
        e if e.is_validation_error() => {
            Notice::Error(format!("Imagem inválida, envie um arquivo JPEG ou PNG: {e}"))
        }
        e => Notice::Error(format!("Erro ao salvar imagem no banco de dados: {e}")),
    }
}

// ============================================================================
// Query Handlers
// ============================================================================

/// Handler for GET /query - Look up a receipt by invoice number
async fn handle_query_page(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<InvoiceQuery>,
) -> Response {
    let Some(username) = current_user(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };

    let input = query.invoice.unwrap_or_default();
    let (found, notice) = if input.trim().is_empty() {
        (None, None)
    } else {
        match InvoiceNumber::parse(&input) {
            Err(_) => (None, Some(invalid_invoice_notice())),
            Ok(invoice) => match state.receipts.find(&invoice).await {
                Ok(Some(receipt)) => (
                    Some(FoundReceipt {
                        invoice: receipt.invoice.to_string(),
                        captured_at: receipt.captured_at.format(CAPTURED_AT_FORMAT).to_string(),
                    }),
                    None,
                ),
                Ok(None) => (None, Some(not_found_notice())),
                Err(e) => (None, Some(store_error_notice(&e))),
            },
        }
    };

    let header = page_header(&state, username).await;
    Html(templates::query_page(&header, &input, found.as_ref(), notice.as_ref())).into_response()
}

fn not_found_notice() -> Notice {
    Notice::Info("Nenhum registro encontrado para número nota fiscal fornecido.".to_string())
}

/// Handler for GET /receipts/{invoice}/image - The stored JPEG
async fn handle_receipt_image(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(invoice): Path<String>,
) -> Response {
    if current_user(&state, &cookies).await.is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let Ok(invoice) = InvoiceNumber::parse(&invoice) else {
        return (StatusCode::BAD_REQUEST, "Invalid invoice number").into_response();
    };

    match state.receipts.find(&invoice).await {
        Ok(Some(receipt)) => (
            [
                (header::CONTENT_TYPE, "image/jpeg".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("inline; filename=\"{}\"", invoice.attachment_name()),
                ),
            ],
            receipt.image,
        )
            .into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Receipt not found").into_response(),
        Err(e) => {
            tracing::error!(invoice = %invoice, "Failed to load receipt image: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load receipt").into_response()
        }
    }
}

// ============================================================================
// Send Handlers
// ============================================================================

/// Handler for GET /send - Send form
async fn handle_send_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    let Some(username) = current_user(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };

    let values = SendFormValues {
        subject: DEFAULT_SUBJECT.to_string(),
        ..SendFormValues::default()
    };
    let header = page_header(&state, username).await;
    Html(templates::send_page(
        &header,
        &values,
        state.notifier.is_some(),
        None,
    ))
    .into_response()
}

/// Handler for POST /send - E-mail a stored receipt
async fn handle_send_submit(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<SendForm>,
) -> Response {
    let Some(username) = current_user(&state, &cookies).await else {
        return Redirect::to("/login").into_response();
    };

    let values = SendFormValues {
        recipient: form.recipient.clone(),
        subject: form.subject.clone(),
        invoice: form.invoice.clone(),
    };

    let notice = match &state.notifier {
        None => None,
        Some(notifier) => Some(send_receipt(&state.receipts, notifier, &form).await),
    };

    let header = page_header(&state, username).await;
    Html(templates::send_page(
        &header,
        &values,
        state.notifier.is_some(),
        notice.as_ref(),
    ))
    .into_response()
}

/// Validate the send form, then look up and e-mail the receipt.
async fn send_receipt(
    receipts: &ReceiptService,
    notifier: &NotificationService,
    form: &SendForm,
) -> Notice {
    let Ok(recipient) = Recipient::parse(&form.recipient) else {
        return Notice::Error(
            "O e-mail informado não é válido. Por favor, insira um e-mail correto.".to_string(),
        );
    };
    let Ok(invoice) = InvoiceNumber::parse(&form.invoice) else {
        return invalid_invoice_notice();
    };

    match notifier
        .send_receipt(receipts, &recipient, &invoice, &form.subject)
        .await
    {
        Ok(SendOutcome::Sent) => Notice::Success("E-mail enviado com sucesso!".to_string()),
        Ok(SendOutcome::NoReceipt) => not_found_notice(),
        Err(e) => send_error_notice(&e),
    }
}

/// Operator message for a failed send; relay failures read differently
fn send_error_notice(err: &canhoto::Error) -> Notice {
    if err.is_transport_error() {
        Notice::Error(format!("Erro ao enviar e-mail: {err}"))
    } else {
        Notice::Error(format!(
            "Ocorreu um erro inesperado ao enviar o e-mail: {err}"
        ))
    }
}

// ============================================================================
// Health Handler
// ============================================================================

/// Health check response
#[derive(serde::Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipts: Option<u64>,
}

/// Handler for GET /health - Health check endpoint
async fn handle_health_endpoint(State(state): State<AppState>) -> Response {
    match state.receipts.count().await {
        Ok(count) => axum::Json(HealthResponse {
            status: "healthy",
            backend: state.backend,
            receipts: Some(count),
        })
        .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {e}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                axum::Json(HealthResponse {
                    status: "unhealthy",
                    backend: state.backend,
                    receipts: None,
                }),
            )
                .into_response()
        }
    }
}
