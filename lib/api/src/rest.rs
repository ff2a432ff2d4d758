use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use cobuy_core::{Error, ItemId, Query, Recommender};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

#[derive(Deserialize)]
struct RecommendRequest {
    item_id: serde_json::Value,
    top_n: Option<usize>,
    threshold: Option<f64>,
}

#[derive(Deserialize)]
struct ListItemsParams {
    limit: Option<usize>,
    offset: Option<usize>,
}

#[derive(Serialize)]
struct ItemInfo {
    id: ItemId,
    category: Option<String>,
    purchases: u64,
    in_matrix: bool,
}

#[derive(Serialize)]
struct HealthInfo {
    title: &'static str,
    version: &'static str,
    items: usize,
    categories: usize,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(recommender: Arc<Recommender>, host: &str, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .wrap(Logger::default())
                .configure(Self::configure(recommender.clone()))
        })
        .bind((host, port))?
        .run()
        .await
    }

    /// Routes and shared state, usable on any `App`
    pub fn configure(recommender: Arc<Recommender>) -> impl FnOnce(&mut web::ServiceConfig) {
        move |cfg| {
            cfg.app_data(web::Data::new(recommender))
                .route("/recommend", web::post().to(recommend))
                .route("/items", web::get().to(list_items))
                .route("/items/{id}", web::get().to(get_item))
                .route("/health", web::get().to(health));
        }
    }
}

fn error_response(e: &Error) -> HttpResponse {
    match e {
        Error::ItemNotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Item not found in model"
        })),
        Error::InvalidItemId(_) | Error::InvalidRequest(_) => {
            HttpResponse::BadRequest().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
        _ => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": e.to_string()
        })),
    }
}

async fn recommend(
    recommender: web::Data<Arc<Recommender>>,
    req: web::Json<RecommendRequest>,
) -> ActixResult<HttpResponse> {
    let item_id = match ItemId::from_json(&req.item_id) {
        Ok(id) => id,
        Err(e) => return Ok(error_response(&e)),
    };

    let query = Query {
        item_id,
        top_n: req.top_n,
        threshold: req.threshold,
    };

    match recommender.recommend(&query) {
        Ok(rec) => {
            debug!(
                item = %item_id,
                bought_together = rec.items_bought_together.len(),
                fallback = rec.similar_items_in_category.len(),
                "recommendation served"
            );
            Ok(HttpResponse::Ok().json(rec))
        }
        Err(e) => Ok(error_response(&e)),
    }
}

async fn list_items(
    recommender: web::Data<Arc<Recommender>>,
    params: web::Query<ListItemsParams>,
) -> ActixResult<HttpResponse> {
    let items = recommender.model().items();
    let offset = params.offset.unwrap_or(0).min(items.len());
    let limit = params.limit.unwrap_or(items.len());

    let page: Vec<ItemId> = items[offset..].iter().take(limit).copied().collect();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "result": page,
        "total": items.len(),
    })))
}

async fn get_item(
    recommender: web::Data<Arc<Recommender>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let id: ItemId = match path.into_inner().parse() {
        Ok(id) => id,
        Err(e) => return Ok(error_response(&e)),
    };

    let model = recommender.model();
    if !model.knows(id) {
        return Ok(error_response(&Error::ItemNotFound(id.to_string())));
    }

    let info = ItemInfo {
        id,
        category: model.catalog().category_of(id).map(|c| c.to_string()),
        purchases: model.purchases().get(id),
        in_matrix: model.contains(id),
    };
    Ok(HttpResponse::Ok().json(serde_json::json!({ "result": info })))
}

async fn health(recommender: web::Data<Arc<Recommender>>) -> ActixResult<HttpResponse> {
    let model = recommender.model();
    Ok(HttpResponse::Ok().json(HealthInfo {
        title: "cobuy",
        version: env!("CARGO_PKG_VERSION"),
        items: model.similarity().len(),
        categories: model.catalog().category_count(),
    }))
}
