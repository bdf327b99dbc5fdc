use actix_files::NamedFile;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, Result};
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::export::{export_assignments, result_filename};
use crate::parser::{
    load_employees, load_prior_assignments, EMPLOYEE_LIST_PREFIX, GAME_RESULT_PREFIX,
};
use crate::santa::{assign, Employee, ForbiddenPairs, PriorAssignment, SantaError};

/// Largest accepted upload. Rosters are small; anything bigger is a mistake.
const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

// In-memory storage for the uploaded tables (in production, use a database)
pub struct AppState {
    pub roster: Mutex<Option<Vec<Employee>>>,
    pub prior: Mutex<Option<Vec<PriorAssignment>>>,
    pub last_result: Mutex<Option<String>>,
    pub upload_dir: PathBuf,
    pub output_dir: PathBuf,
}

#[derive(Serialize)]
pub struct StatusResponse {
    roster_loaded: bool,
    roster_count: usize,
    prior_loaded: bool,
    prior_count: usize,
    last_result: Option<String>,
}

fn error_response(err: &SantaError) -> HttpResponse {
    let body = serde_json::json!({
        "success": false,
        "error_kind": err.kind(),
        "error": err.to_string(),
    });
    match err {
        SantaError::InvalidRoster { .. }
        | SantaError::InvalidPriorPairs { .. }
        | SantaError::Csv(_) => HttpResponse::BadRequest().json(body),
        SantaError::AssignmentUnsatisfiable { .. } => HttpResponse::UnprocessableEntity().json(body),
        SantaError::Io(_) => HttpResponse::InternalServerError().json(body),
    }
}

// CSV upload endpoint; the filename prefix decides which table this is
async fn upload(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let file_name = req
        .headers()
        .get("X-File-Name")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .trim()
        .to_string();

    if file_name.is_empty() || file_name.contains('/') || file_name.contains('\\') {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Missing or invalid X-File-Name header"
        })));
    }
    if !file_name.to_lowercase().ends_with(".csv") {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Only CSV files are allowed"
        })));
    }
    if body.len() > MAX_UPLOAD_BYTES {
        return Ok(HttpResponse::PayloadTooLarge().json(serde_json::json!({
            "success": false,
            "error": "File exceeds the 2 MB upload limit"
        })));
    }

    // Persist the upload under a timestamped name, then parse from disk
    let stem = file_name.trim_end_matches(".csv");
    let stored_name = format!("{}-{}.csv", stem, Utc::now().format("%Y%m%d-%H%M%S%3f"));
    let stored_path = state.upload_dir.join(&stored_name);
    std::fs::write(&stored_path, &body)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to save file: {}", e)))?;

    if file_name.starts_with(EMPLOYEE_LIST_PREFIX) {
        match load_employees(&stored_path) {
            Ok(employees) => {
                log::info!("loaded roster with {} employees from {}", employees.len(), stored_name);
                let count = employees.len();
                *state.roster.lock().unwrap() = Some(employees);
                Ok(HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "file": "roster",
                    "stored_as": stored_name,
                    "records": count
                })))
            }
            Err(e) => Ok(error_response(&e)),
        }
    } else if file_name.starts_with(GAME_RESULT_PREFIX) {
        match load_prior_assignments(&stored_path) {
            Ok(prior) => {
                log::info!("loaded {} prior assignments from {}", prior.len(), stored_name);
                let count = prior.len();
                *state.prior.lock().unwrap() = Some(prior);
                Ok(HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "file": "prior_results",
                    "stored_as": stored_name,
                    "records": count
                })))
            }
            Err(e) => Ok(error_response(&e)),
        }
    } else {
        Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": format!(
                "Unrecognized file name; expected a name starting with {} or {}",
                EMPLOYEE_LIST_PREFIX, GAME_RESULT_PREFIX
            )
        })))
    }
}

// Runs the engine on the loaded tables and writes the downloadable result
async fn generate(state: web::Data<AppState>) -> Result<HttpResponse> {
    let roster = state.roster.lock().unwrap().clone();
    let Some(roster) = roster else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "No employee list uploaded yet"
        })));
    };
    let forbidden = state
        .prior
        .lock()
        .unwrap()
        .as_deref()
        .map(ForbiddenPairs::from_prior)
        .unwrap_or_default();
    if !forbidden.is_empty() {
        log::info!("excluding {} prior pairings", forbidden.len());
    }

    match assign(&roster, &forbidden) {
        Ok(assignments) => {
            let filename = result_filename();
            let path = state.output_dir.join(&filename);
            if let Err(e) = export_assignments(&assignments, &path) {
                return Ok(error_response(&e));
            }
            log::info!("generated {} assignments into {}", assignments.len(), filename);
            *state.last_result.lock().unwrap() = Some(filename.clone());
            Ok(HttpResponse::Ok().json(serde_json::json!({
                "success": true,
                "filename": filename,
                "assignments": assignments.len()
            })))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

// Status endpoint
async fn status(state: web::Data<AppState>) -> Result<HttpResponse> {
    let roster = state.roster.lock().unwrap();
    let prior = state.prior.lock().unwrap();
    let last_result = state.last_result.lock().unwrap();

    Ok(HttpResponse::Ok().json(StatusResponse {
        roster_loaded: roster.is_some(),
        roster_count: roster.as_ref().map(Vec::len).unwrap_or(0),
        prior_loaded: prior.is_some(),
        prior_count: prior.as_ref().map(Vec::len).unwrap_or(0),
        last_result: last_result.clone(),
    }))
}

// Serves a previously generated result file by name
async fn download(
    req: HttpRequest,
    filename: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let name = filename.into_inner();
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Invalid filename"
        })));
    }

    let path = state.output_dir.join(&name);
    if !path.is_file() {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "File not found"
        })));
    }

    let file = NamedFile::open(path)?.set_content_disposition(ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![DispositionParam::Filename(name)],
    });
    Ok(file.into_response(&req))
}

// HTML page handler
async fn index() -> Result<HttpResponse> {
    let html = include_str!("../templates/index.html");
    Ok(HttpResponse::Ok().content_type("text/html").body(html))
}

pub async fn start_server(
    port: u16,
    upload_dir: PathBuf,
    output_dir: PathBuf,
) -> std::io::Result<()> {
    std::fs::create_dir_all(&upload_dir)?;
    std::fs::create_dir_all(&output_dir)?;

    let app_state = web::Data::new(AppState {
        roster: Mutex::new(None),
        prior: Mutex::new(None),
        last_result: Mutex::new(None),
        upload_dir,
        output_dir,
    });

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .wrap(middleware::Logger::default())
            .route("/", web::get().to(index))
            .route("/api/upload", web::post().to(upload))
            .route("/api/generate", web::post().to(generate))
            .route("/api/status", web::get().to(status))
            .service(web::resource("/download/{filename}").route(web::get().to(download)))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
