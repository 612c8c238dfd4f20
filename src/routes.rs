use actix_web::{HttpResponse, Responder, get, web};
use serde_json::json;

use crate::{
    error::QueryError,
    handler::{AnalyzedRatesResponse, RatesHandler, RatesResponse},
};

pub fn configure(cfg: &mut web::ServiceConfig) {
    // `/rates/analyze` has to be registered ahead of `/rates/{token}`.
    cfg.service(ping)
        .service(analyzed_rates)
        .service(rates_without_date)
        .service(rates)
        .default_service(web::to(not_found));
}

#[get("/ping")]
async fn ping() -> impl Responder {
    HttpResponse::Ok().json(json!({ "ping": "pong" }))
}

#[get("/rates/analyze")]
async fn analyzed_rates(
    handler: web::Data<RatesHandler>,
) -> Result<web::Json<AnalyzedRatesResponse>, QueryError> {
    handler.get_analyzed_rates().await.map(web::Json)
}

#[get("/rates/")]
async fn rates_without_date(
    handler: web::Data<RatesHandler>,
) -> Result<web::Json<RatesResponse>, QueryError> {
    handler.get_currency_rates("").await.map(web::Json)
}

#[get("/rates/{token}")]
async fn rates(
    handler: web::Data<RatesHandler>,
    token: web::Path<String>,
) -> Result<web::Json<RatesResponse>, QueryError> {
    handler.get_currency_rates(&token).await.map(web::Json)
}

async fn not_found() -> Result<HttpResponse, QueryError> {
    Err(QueryError::NotFound)
}
