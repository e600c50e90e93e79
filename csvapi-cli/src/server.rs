use actix_web::http::header::ContentType;
use actix_web::http::Method;
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer};
use csvapi::{DatasetStore, QueryError};

/// Shared application state. The store is fully loaded before the server
/// starts and is only read from here on.
pub struct AppState {
    pub store: DatasetStore,
}

/// Every path goes to the same handler, which works out the dataset and row
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/{tail:.*}", web::route().to(resolve));
}

pub async fn serve(store: DatasetStore, host: &str, port: u16) -> std::io::Result<()> {
    let state = web::Data::new(AppState { store });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((host, port))?;

    log::info!("Listening on {host}:{port}");
    server.run().await
}

// ── Helpers ─────────────────────────────────────────────────────────

fn error_json(mut builder: actix_web::HttpResponseBuilder, message: &str) -> HttpResponse {
    builder.json(serde_json::json!({ "error": message }))
}

fn err_response(e: QueryError) -> HttpResponse {
    log::debug!("{e}");
    match &e {
        QueryError::UnknownRoute { .. } | QueryError::IndexOutOfBounds { .. } => {
            error_json(HttpResponse::NotFound(), &e.to_string())
        }
    }
}

// ── Handlers ────────────────────────────────────────────────────────

async fn resolve(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    // HEAD is answered like GET; the HTTP layer drops the body.
    if !matches!(*req.method(), Method::GET | Method::HEAD) {
        return error_json(HttpResponse::MethodNotAllowed(), "Method not allowed");
    }

    let path = req.match_info().query("tail");
    match csvapi::resolve_path(&state.store, path) {
        Ok(body) => HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(body),
        Err(e) => err_response(e),
    }
}
