use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub use axum::http::StatusCode;

pub const DOGS_ROUTE: &str = "/api/v2/dogs";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dog {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub name: String,
    pub breed: String,
    pub about: String,
    pub birthday: String,
    pub created: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub breeder_rating: f64,
    pub cost: f64,
}

/// What `GET /api/v2/dogs` answers with.
#[derive(Clone, Debug)]
pub enum CannedResponse {
    /// 200 with the dogs as a JSON array.
    Dogs(Vec<Dog>),
    /// Arbitrary status and body, for failure scenarios.
    Raw { status: StatusCode, body: String },
}

/// Shared server state. Clones share the canned response and hit counter, so
/// a test can keep one and change the answer while the server runs.
#[derive(Clone, Debug)]
pub struct ApiState {
    response: Arc<RwLock<CannedResponse>>,
    hits: Arc<AtomicUsize>,
}

impl ApiState {
    pub fn new(response: CannedResponse) -> Self {
        Self {
            response: Arc::new(RwLock::new(response)),
            hits: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn set_response(&self, response: CannedResponse) {
        *self.response.write().await = response;
    }

    /// Number of requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Default for ApiState {
    fn default() -> Self {
        Self::new(CannedResponse::Dogs(sample_dogs()))
    }
}

pub fn sample_dogs() -> Vec<Dog> {
    let seller = Uuid::from_u128(0x3c4a8d5e_7f21_4b8e_9a6d_2f1e0c9b8a71);
    vec![
        Dog {
            id: Uuid::from_u128(0xa9f6a4d8_3d1c_4c5b_9a34_0c7d8f2e1b01),
            seller_id: seller,
            name: "Kody".to_string(),
            breed: "Mixed purebred".to_string(),
            about: "Kody is a lively, playful puppy who loves long walks.".to_string(),
            birthday: "2019-03-12".to_string(),
            created: "2019-04-02T10:15:00Z".to_string(),
            image_url: "https://example.com/images/kody.jpg".to_string(),
            breeder_rating: 4.5,
            cost: 1200.0,
        },
        Dog {
            id: Uuid::from_u128(0x5e2b7c19_8d4f_4a60_b3c2_7a9e1d0f6c42),
            seller_id: seller,
            name: "Sasha".to_string(),
            breed: "Husky".to_string(),
            about: "Sasha is calm around other dogs and great with kids.".to_string(),
            birthday: "2018-11-30".to_string(),
            created: "2019-04-05T08:00:00Z".to_string(),
            image_url: "https://example.com/images/sasha.jpg".to_string(),
            breeder_rating: 3.8,
            cost: 850.5,
        },
    ]
}

pub fn app() -> Router {
    app_with_state(ApiState::default())
}

pub fn app_with_state(state: ApiState) -> Router {
    Router::new()
        .route(DOGS_ROUTE, get(list_dogs))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, ApiState::default()).await
}

pub async fn serve(listener: TcpListener, state: ApiState) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(state)).await
}

async fn list_dogs(State(state): State<ApiState>) -> Response {
    let hit = state.hits.fetch_add(1, Ordering::SeqCst) + 1;
    match &*state.response.read().await {
        CannedResponse::Dogs(dogs) => {
            debug!(hit, count = dogs.len(), "serving dogs");
            Json(dogs.clone()).into_response()
        }
        CannedResponse::Raw { status, body } => {
            debug!(hit, %status, "serving canned response");
            (
                *status,
                [(header::CONTENT_TYPE, "application/json")],
                body.clone(),
            )
                .into_response()
        }
    }
}
