use std::env;
use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, post, put, web, App, HttpResponse, HttpServer, Responder};
use log::{info, warn};
use serde::Deserialize;

use rs_seq_core::SeqError;
use rs_seq_core::config::{ColumnSelection, TrainConfig, DEFAULT_MODEL_DIR};
use rs_seq_core::io::normalize_folder;
use rs_seq_core::model::pipeline::{load_trained, train_sequential, TrainedModel};
use rs_seq_core::model::query::{parse_user_items, PrefixPolicy, RecommendQuery};
use rs_seq_core::model::recommender::recommend;
use rs_seq_core::model::sequence::RowSet;

/// Default listen address.
const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Struct representing query parameters for the `/v1/train` endpoint
#[derive(Deserialize)]
struct TrainParams {
	session_col: String,
	time_col: String,
	item_col: String,
	order: Option<usize>,
	min_support: Option<u64>,
}

/// Struct representing query parameters for the `/v1/recommend` endpoint
#[derive(Deserialize)]
struct RecommendParams {
	items: Option<String>,
	top_n: Option<usize>,
	policy: Option<String> // "last" (default) or "order"
}

/// Server settings read from the environment.
struct ServerConfig {
	bind: String,
	model_dir: PathBuf,
}

impl ServerConfig {
	/// Reads `SEQREC_BIND` and `SEQREC_MODEL_DIR`, falling back to defaults.
	fn from_env() -> Self {
		let bind = env::var("SEQREC_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_owned());
		let model_dir = env::var("SEQREC_MODEL_DIR").unwrap_or_else(|_| DEFAULT_MODEL_DIR.to_owned());
		Self { bind, model_dir: normalize_folder(&model_dir) }
	}
}

/// Model directory and the model currently served.
///
/// Training and loading replace `model` as a whole; it is never mutated in place.
struct SharedData {
	model_dir: PathBuf,
	model: Option<TrainedModel>,
}

impl RecommendParams {
	/// Builds the recommendation query, defaulting to 5 items and the last-item prefix.
	fn query(&self) -> Result<RecommendQuery, SeqError> {
		let policy = match &self.policy {
			None => PrefixPolicy::default(),
			Some(s) => s.parse()?,
		};
		Ok(RecommendQuery::new(self.top_n.unwrap_or(5))?.with_policy(policy))
	}
}

/// Maps core errors onto HTTP statuses.
fn error_response(e: &SeqError) -> HttpResponse {
	match e {
		SeqError::Schema(_) | SeqError::InvalidConfig(_) => HttpResponse::BadRequest().body(e.to_string()),
		SeqError::EmptyResult(_) => HttpResponse::UnprocessableEntity().body(e.to_string()),
		SeqError::NotFound { .. } => HttpResponse::NotFound().body(e.to_string()),
		_ => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP POST endpoint `/v1/train`
///
/// Trains a sequential pattern model from the JSON row set in the body,
/// saves it in the model directory and serves it from now on.
/// Returns the model metadata.
#[post("/v1/train")]
async fn post_train(data: web::Data<Mutex<SharedData>>, query: web::Query<TrainParams>, rows: web::Json<RowSet>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let columns = ColumnSelection::new(&query.session_col, &query.time_col, &query.item_col);
	let config = TrainConfig::new(
		query.order.unwrap_or(1),
		query.min_support.unwrap_or(1),
		shared_data.model_dir.clone(),
	);

	match train_sequential(&rows, &columns, &config) {
		Ok(model) => {
			let response = HttpResponse::Ok().json(&model.metadata);
			shared_data.model = Some(model);
			response
		}
		Err(e) => error_response(&e),
	}
}

/// HTTP PUT endpoint `/v1/load_model`
///
/// Replaces the served model with the one saved in the model directory.
#[put("/v1/load_model")]
async fn put_load_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match load_trained(&shared_data.model_dir) {
		Ok(model) => {
			let response = HttpResponse::Ok().json(&model.metadata);
			shared_data.model = Some(model);
			response
		}
		Err(e) => error_response(&e),
	}
}

#[get("/v1/model")]
async fn get_model(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	match &shared_data.model {
		Some(model) => HttpResponse::Ok().json(&model.metadata),
		None => HttpResponse::NotFound().body("No model loaded. Train or load a model first."),
	}
}

/// HTTP GET endpoint `/v1/recommend`
///
/// `items` is a comma separated list. Returns a JSON array holding either
/// the recommended items or a single diagnostic line.
#[get("/v1/recommend")]
async fn get_recommend(data: web::Data<Mutex<SharedData>>, query: web::Query<RecommendParams>) -> impl Responder {
	let recommend_query = match query.query() {
		Ok(q) => q,
		Err(e) => return error_response(&e),
	};
	let user_items = parse_user_items(query.items.as_deref().unwrap_or_default());

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	let Some(model) = &shared_data.model else {
		return HttpResponse::NotFound().body("No model loaded. Train or load a model first.");
	};

	let result = recommend(&user_items, &model.readable, &recommend_query);
	HttpResponse::Ok().json(result.to_lines())
}

/// Registers every endpoint.
fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(post_train)
		.service(put_load_model)
		.service(get_model)
		.service(get_recommend);
}

/// Main entry point for the server.
///
/// Loads the last saved model if there is one, wraps the state in a `Mutex`
/// and starts an Actix-web HTTP server.
///
/// # Notes
/// - `SEQREC_BIND` sets the address (default 127.0.0.1:5000).
/// - `SEQREC_MODEL_DIR` sets where models are saved and loaded (default `models`).
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = ServerConfig::from_env();
	let model = match load_trained(&config.model_dir) {
		Ok(model) => {
			info!("Serving model from {}", config.model_dir.display());
			Some(model)
		}
		Err(e) => {
			warn!("Starting without a model: {e}");
			None
		}
	};

	let shared_data = SharedData { model_dir: config.model_dir, model };
	let shared_model = web::Data::new(Mutex::new(shared_data));

	info!("Listening on {}", config.bind);
	HttpServer::new(move || {
		App::new()
			.wrap(Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.configure(routes)
	})
		.bind(config.bind)?
		.run()
		.await
}
