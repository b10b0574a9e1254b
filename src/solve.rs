use actix_web::{web, HttpResponse, Responder};

use crate::config::{parse_time_limit, Settings};
use crate::domain::knapsack::solve_knapsack_01;
use crate::domain::solve::solve_raw;
use crate::models::{KnapsackRequest, KnapsackResponse, MilpRequest};

fn bad_request(message: impl ToString) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": message.to_string() }))
}

fn worker_failure(err: actix_web::error::BlockingError) -> HttpResponse {
    log::error!("Solver worker failed: {}", err);
    HttpResponse::InternalServerError().json(serde_json::json!({ "error": "solver worker failed" }))
}

/// JSON extractor config; malformed bodies become 400 `{"error": ...}`.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _| {
            let err_string = err.to_string();
            actix_web::error::InternalError::from_response(
                err,
                HttpResponse::BadRequest().json(serde_json::json!({ "error": err_string })),
            )
            .into()
        })
}

/// Register the service routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/milp/solve", web::post().to(solve_milp_handler))
        .route("/knapsack/solve", web::post().to(solve_knapsack_handler))
        .route("/health", web::get().to(health_check));
}

/// POST /milp/solve
pub async fn solve_milp_handler(
    req: web::Json<MilpRequest>,
    settings: web::Data<Settings>,
) -> HttpResponse {
    let MilpRequest {
        problem,
        time_limit,
    } = req.into_inner();

    let mut options = settings.solve_options();
    if let Some(secs) = time_limit {
        match parse_time_limit(secs) {
            Some(limit) => options.time_limit = Some(limit),
            None => {
                return bad_request(format!(
                    "time_limit must be a positive, representable number of seconds, got {}",
                    secs
                ))
            }
        }
    }

    match web::block(move || solve_raw(problem, &options)).await {
        Ok(Ok(result)) => HttpResponse::Ok().json(result),
        Ok(Err(e)) => {
            log::debug!("Rejected problem: {}", e);
            bad_request(e)
        }
        Err(e) => worker_failure(e),
    }
}

/// POST /knapsack/solve
pub async fn solve_knapsack_handler(req: web::Json<KnapsackRequest>) -> HttpResponse {
    let KnapsackRequest {
        values,
        weights,
        capacity,
    } = req.into_inner();

    match web::block(move || solve_knapsack_01(&values, &weights, capacity)).await {
        Ok(Ok(solution)) => HttpResponse::Ok().json(KnapsackResponse {
            objective: solution.objective,
            selected: solution.selected,
        }),
        Ok(Err(e)) => bad_request(e),
        Err(e) => worker_failure(e),
    }
}

/// GET /health
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}
