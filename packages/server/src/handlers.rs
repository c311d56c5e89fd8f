//! HTTP handler functions for the state predictor.

use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, http::StatusCode, web};
use geo_state_geography_models::{Coordinate, NigerianState};
use geo_state_server_models::{
    ApiError, ApiHealth, ApiPredictionResponse, ApiState, PredictForm, PredictQueryParams,
};

use crate::AppState;
use crate::render::{self, Outcome, PageView};

/// `GET /`
///
/// Renders the empty form with the Abuja defaults.
pub async fn index(state: web::Data<AppState>) -> HttpResponse {
    html(
        StatusCode::OK,
        render::page(&PageView::initial(&state.model_name)),
    )
}

/// `POST /predict`
///
/// Validates the submitted coordinate, predicts, and re-renders the page
/// with the outcome. Bad input answers 400 and never reaches the predictor;
/// a failed prediction answers 500.
pub async fn predict_form(
    state: web::Data<AppState>,
    form: web::Form<PredictForm>,
) -> HttpResponse {
    let form = form.into_inner();

    let (status, outcome) = match parse_coordinate(&form) {
        Err(warning) => (StatusCode::BAD_REQUEST, Outcome::Warning(warning)),
        Ok(coordinate) => match state.predictor.predict(coordinate) {
            Ok(ranked) => (StatusCode::OK, Outcome::Prediction(ranked)),
            Err(e) => {
                log::error!("Prediction failed at {coordinate}: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Outcome::Error(format!("Prediction error: {e}")),
                )
            }
        },
    };

    let view = PageView {
        latitude: form.latitude,
        longitude: form.longitude,
        model_name: &state.model_name,
        outcome: Some(outcome),
    };

    html(status, render::page(&view))
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/states`
///
/// Returns the label set in classifier index order.
pub async fn states() -> HttpResponse {
    let states: Vec<ApiState> = NigerianState::all()
        .iter()
        .copied()
        .map(ApiState::from)
        .collect();

    HttpResponse::Ok().json(states)
}

/// `GET /api/predict?lat=..&lon=..`
///
/// Returns the top-ranked states as JSON.
pub async fn predict(
    state: web::Data<AppState>,
    params: web::Query<PredictQueryParams>,
) -> HttpResponse {
    let coordinate = match Coordinate::new(params.lat, params.lon) {
        Ok(coordinate) => coordinate,
        Err(e) => {
            log::warn!("Rejected coordinate ({}, {}): {e}", params.lat, params.lon);
            return HttpResponse::UnprocessableEntity().json(ApiError::new(e.to_string()));
        }
    };

    match state.predictor.predict(coordinate) {
        Ok(ranked) => match ApiPredictionResponse::new(coordinate, &ranked) {
            Some(response) => HttpResponse::Ok().json(response),
            None => {
                log::error!("Prediction at {coordinate} produced no ranking");
                HttpResponse::InternalServerError()
                    .json(ApiError::new("Prediction error: empty ranking"))
            }
        },
        Err(e) => {
            log::error!("Prediction failed at {coordinate}: {e}");
            HttpResponse::InternalServerError().json(ApiError::new(format!("Prediction error: {e}")))
        }
    }
}

/// Parses and bounds-checks the form fields, returning the warning to show
/// on failure.
fn parse_coordinate(form: &PredictForm) -> Result<Coordinate, String> {
    let latitude = parse_field("Latitude", &form.latitude)?;
    let longitude = parse_field("Longitude", &form.longitude)?;

    Coordinate::new(latitude, longitude).map_err(|e| {
        log::warn!("Rejected coordinate ({latitude}, {longitude}): {e}");
        e.to_string()
    })
}

fn parse_field(name: &str, value: &str) -> Result<f64, String> {
    value.trim().parse::<f64>().map_err(|_| {
        log::warn!("Rejected {name} input {value:?}");
        format!("{name} must be a number")
    })
}

fn html(status: StatusCode, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(ContentType::html())
        .body(body)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use actix_web::{App, test};
    use geo_state_geography_models::STATE_COUNT;
    use geo_state_inference::{Artifacts, Classifier, InferenceError, Predictor, Scaler};

    use super::*;

    /// Favors Abuja regardless of input and counts how often it is called.
    struct AbujaHeavy {
        calls: Arc<AtomicUsize>,
        poisoned: bool,
    }

    impl Classifier for AbujaHeavy {
        fn input_len(&self) -> usize {
            2
        }

        fn output_len(&self) -> usize {
            STATE_COUNT
        }

        fn scores(&self, _features: &[f64]) -> Result<Vec<f64>, InferenceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut scores = vec![0.0; STATE_COUNT];
            scores[NigerianState::Abuja.index()] = 9.0;
            scores[NigerianState::Niger.index()] = 3.0;
            scores[NigerianState::Kaduna.index()] = 2.0;
            if self.poisoned {
                scores[0] = f64::NAN;
            }
            Ok(scores)
        }
    }

    fn app_state(poisoned: bool) -> (web::Data<AppState>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let scaler = Scaler::Standard {
            mean: vec![9.0, 8.5],
            scale: vec![2.5, 3.25],
        };
        let classifier = AbujaHeavy {
            calls: Arc::clone(&calls),
            poisoned,
        };
        let artifacts = Artifacts::new(scaler, Box::new(classifier)).unwrap();

        let state = AppState::new(Predictor::new(Arc::new(artifacts)), "main_model.json");
        (web::Data::new(state), calls)
    }

    fn form_request(body: &'static str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/predict")
            .insert_header(ContentType::form_url_encoded())
            .set_payload(body)
    }

    async fn body_text(resp: actix_web::dev::ServiceResponse) -> String {
        String::from_utf8(test::read_body(resp).await.to_vec()).unwrap()
    }

    #[actix_web::test]
    async fn index_renders_form() {
        let (state, _) = app_state(false);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_text(resp).await;
        assert!(body.contains("Nigerian State Predictor"));
        assert!(body.contains("value=\"9.082000\""));
    }

    #[actix_web::test]
    async fn form_predicts_abuja() {
        let (state, calls) = app_state(false);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let resp = test::call_service(
            &app,
            form_request("latitude=9.0820&longitude=7.4913").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_text(resp).await;
        assert!(body.contains("<strong>Predicted State:</strong> Abuja ("));
        assert!(body.contains("🥉 Prediction"));
        assert!(body.contains("value=\"9.0820\""));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn form_accepts_box_edges() {
        let (state, calls) = app_state(false);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        for body in [
            "latitude=4.0&longitude=2.0",
            "latitude=14.0&longitude=15.0",
        ] {
            let resp = test::call_service(&app, form_request(body).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK, "{body}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[actix_web::test]
    async fn form_rejects_out_of_bounds_without_predicting() {
        let (state, calls) = app_state(false);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        for body in [
            "latitude=3.999999&longitude=7.0",
            "latitude=14.000001&longitude=7.0",
            "latitude=9.0&longitude=1.999999",
            "latitude=9.0&longitude=15.000001",
        ] {
            let resp = test::call_service(&app, form_request(body).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
            let text = body_text(resp).await;
            assert!(text.contains("Coordinates outside Nigeria&#39;s bounds"), "{body}");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn form_rejects_non_numbers() {
        let (state, calls) = app_state(false);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let resp = test::call_service(
            &app,
            form_request("latitude=north&longitude=7.0").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(resp).await.contains("Latitude must be a number"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn form_reports_inference_failure() {
        let (state, calls) = app_state(true);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let resp = test::call_service(
            &app,
            form_request("latitude=9.0820&longitude=7.4913").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(resp).await.contains("Prediction error: non-finite score at index 0"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The server keeps serving after a failed prediction.
        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn api_predict_returns_top_three() {
        let (state, _) = app_state(false);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/predict?lat=9.082&lon=7.4913")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["predictedState"], "Abuja");
        assert!(body["confidence"].as_f64().unwrap() > 50.0);
        assert_eq!(body["predictions"].as_array().unwrap().len(), 3);
        assert_eq!(body["predictions"][1]["state"], "Niger");
        assert_eq!(body["predictions"][2]["icon"], "🥉");
    }

    #[actix_web::test]
    async fn api_predict_rejects_out_of_bounds() {
        let (state, calls) = app_state(false);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/predict?lat=20.0&lon=7.0")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Coordinates outside Nigeria's bounds");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn api_predict_reports_inference_failure() {
        let (state, _) = app_state(true);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let req = test::TestRequest::get()
            .uri("/api/predict?lat=9.082&lon=7.4913")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn api_health_and_states() {
        let (state, _) = app_state(false);
        let app = test::init_service(App::new().app_data(state).configure(crate::routes)).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let health: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(health["healthy"], true);

        let req = test::TestRequest::get().uri("/api/states").to_request();
        let states: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let states = states.as_array().unwrap();
        assert_eq!(states.len(), STATE_COUNT);
        assert_eq!(states[1]["name"], "Abuja");
        assert_eq!(states[1]["index"], 1);
    }
}
