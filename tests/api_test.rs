//! End-to-end HTTP tests against a spawned server

mod helpers;

use std::sync::Arc;
use helpers::*;
use reqwest::StatusCode;
use serde_json::{json, Value};
use serial_test::serial;
use tokio::net::TcpListener;
use VoteDesk::app::{self, AppState};
use VoteDesk::config::{BallotBackend, Settings};
use VoteDesk::database::DatabaseService;
use VoteDesk::services::{HttpVoterVerifier, VoterVerifier};
use VoteDesk::state::{BallotStore, MemoryBallotStore};

struct TestApp {
    base_url: String,
    client: reqwest::Client,
}

impl TestApp {
    async fn spawn(test_db: &TestDatabase, gateway: &GatewayMockServer) -> Self {
        let mut settings = Settings::default();
        settings.ballot.backend = BallotBackend::Memory;
        settings.verification = gateway.config();

        let verifier: Arc<dyn VoterVerifier> = Arc::new(HttpVoterVerifier::new(&settings.verification).unwrap());
        let ballots: Arc<dyn BallotStore> = Arc::new(MemoryBallotStore::new());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let state = AppState::new(settings, test_db.pool.clone(), verifier, ballots);
        tokio::spawn(app::serve(listener, state));

        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client.get(self.url(path)).send().await.expect("request failed")
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client.post(self.url(path)).json(&body).send().await.expect("request failed")
    }

    async fn vote(&self, token: Option<&str>, body: Value) -> reqwest::Response {
        let mut request = self.client.post(self.url("/api/vote")).json(&body);
        if let Some(token) = token {
            request = request.header("X-Ballot-Token", token);
        }
        request.send().await.expect("request failed")
    }
}

#[tokio::test]
#[serial]
async fn test_health() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let gateway = GatewayMockServer::new().await;
    let app = TestApp::spawn(&test_db, &gateway).await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok", "database": "ok" }));
}

#[tokio::test]
#[serial]
async fn test_full_voting_flow() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());
    let election = seed_election(&db, 1).await;
    let voter = &election.voters[0];

    let gateway = GatewayMockServer::new().await;
    gateway.mock_match(voter.id).await;
    let app = TestApp::spawn(&test_db, &gateway).await;

    // Nothing counted yet
    let data: Value = app.get("/api/election-data").await.json().await.unwrap();
    assert_eq!(data["activeSession"]["id"], election.session.id);
    assert_eq!(data["statistics"]["total_votes"], 0);

    let verified: Value = app.post("/api/verify-voter", json!({ "image": TEST_IMAGE })).await.json().await.unwrap();
    assert_eq!(verified["status"], "success");
    assert_eq!(verified["voter_name"], voter.name.as_str());
    let token = verified["ballot_token"].as_str().expect("missing token").to_string();

    let response = app
        .vote(Some(&token), json!({ "candidate_id": election.alice.id, "position_id": election.president.id }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["remaining_positions"], json!([election.secretary.id]));

    // Same position again
    let response = app
        .vote(Some(&token), json!({ "candidate_id": election.bob.id, "position_id": election.president.id }))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");

    // Last open position completes the ballot and retires the token
    let response = app
        .vote(Some(&token), json!({ "candidate_id": election.carol.id, "position_id": election.secretary.id }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .vote(Some(&token), json!({ "candidate_id": election.alice.id, "position_id": election.president.id }))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let data: Value = app.get("/api/election-data").await.json().await.unwrap();
    let president = &data["positions"][0];
    assert_eq!(president["name"], "President");
    assert_eq!(president["candidates"][0]["name"], "Alice");
    assert_eq!(president["candidates"][0]["vote_count"], 1);
    assert_eq!(president["candidates"][0]["percentage"], 100.0);
    assert_eq!(data["statistics"]["turnout_percentage"], 100.0);

    let recent: Value = app.get("/api/recent-votes?limit=5").await.json().await.unwrap();
    assert_eq!(recent.as_array().unwrap().len(), 2);
    assert_eq!(recent[0]["voterName"], voter.name.as_str());

    let verified: Value = app.post("/api/verify-voter", json!({ "image": TEST_IMAGE })).await.json().await.unwrap();
    assert_eq!(verified["status"], "error");
    assert_eq!(verified["message"], "This voter has already voted");
}

#[tokio::test]
#[serial]
async fn test_vote_requires_ballot_token() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());
    let election = seed_election(&db, 1).await;
    let gateway = GatewayMockServer::new().await;
    let app = TestApp::spawn(&test_db, &gateway).await;

    let body = json!({ "candidate_id": election.alice.id, "position_id": election.president.id });

    let response = app.vote(None, body.clone()).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let error: Value = response.json().await.unwrap();
    assert_eq!(error, json!({ "status": "error", "message": "Voter not verified" }));

    let response = app.vote(Some("forged"), body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(test_db.count_records("votes").await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_bad_requests() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());
    seed_election(&db, 0).await;
    let gateway = GatewayMockServer::new().await;
    let app = TestApp::spawn(&test_db, &gateway).await;

    let response = app.get("/api/candidates").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/candidates?position_id=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.post("/api/verify-voter", json!({ "image": "" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.post("/api/verify-voter", json!({ "image": "hello" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[serial]
async fn test_no_active_session_responses() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let gateway = GatewayMockServer::new().await;
    let app = TestApp::spawn(&test_db, &gateway).await;

    let data: Value = app.get("/api/election-data").await.json().await.unwrap();
    assert_eq!(data, json!({ "activeSession": null, "positions": [], "statistics": {} }));

    let recent: Value = app.get("/api/recent-votes").await.json().await.unwrap();
    assert_eq!(recent, json!([]));

    let response = app.get("/api/positions").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
#[serial]
async fn test_admin_setup_through_api() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let gateway = GatewayMockServer::new().await;
    let app = TestApp::spawn(&test_db, &gateway).await;

    let created: Value = app
        .post("/api/sessions", json!({ "name": "Council", "academic_year": "2024/2025" }))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(created["status"], "success");
    let session_id = created["session"]["id"].as_i64().unwrap();

    let response = app
        .post("/api/positions", json!({ "session_id": session_id, "name": "President" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let position: Value = response.json().await.unwrap();
    let position_id = position["position"]["id"].as_i64().unwrap();

    let response = app
        .post("/api/positions", json!({ "session_id": session_id, "name": "President" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post("/api/candidates", json!({ "position_id": position_id, "name": "Alice" }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.post("/api/voters", json!({ "name": "Ada", "grade": "10B" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.post("/api/sessions/activate", json!({ "session_id": 999_999 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.post("/api/sessions/activate", json!({ "session_id": session_id })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let sessions: Value = app.get("/api/sessions").await.json().await.unwrap();
    assert_eq!(sessions[0]["is_active"], true);

    let positions: Value = app.get("/api/positions").await.json().await.unwrap();
    assert_eq!(positions.as_array().unwrap().len(), 1);

    let voters: Value = app.get("/api/voters").await.json().await.unwrap();
    assert_eq!(voters[0]["name"], "Ada");

    let audit: Value = app.get("/api/audit-log?limit=1").await.json().await.unwrap();
    assert_eq!(audit[0]["action"], "SESSION_ACTIVATED");
}
