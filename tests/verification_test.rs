//! Verification gateway and verify-voter flow tests

mod helpers;

use std::sync::Arc;
use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use VoteDesk::config::Settings;
use VoteDesk::database::DatabaseService;
use VoteDesk::models::VoteOutcome;
use VoteDesk::services::{
    Ballot, HttpVoterVerifier, VerificationOutcome, VerificationService, VerifiedIdentity, VoterVerifier,
    VerifyVoterResult, VotingService,
};
use VoteDesk::state::{BallotStore, MemoryBallotStore};
use VoteDesk::utils::errors::{ErrorKind, VoteDeskError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn service(test_db: &TestDatabase, gateway: &GatewayMockServer, ballots: Arc<MemoryBallotStore>) -> VerificationService {
    let verifier: Arc<dyn VoterVerifier> =
        Arc::new(HttpVoterVerifier::new(&gateway.config()).expect("Failed to build verifier"));
    VerificationService::new(
        DatabaseService::new(test_db.pool.clone()),
        verifier,
        ballots,
        &Settings::default().ballot,
    )
}

#[tokio::test]
async fn test_gateway_match_is_parsed() {
    let gateway = GatewayMockServer::new().await;
    gateway.mock_match(42).await;

    let verifier = HttpVoterVerifier::new(&gateway.config()).unwrap();
    let outcome = verifier.verify(TEST_IMAGE).await.unwrap();

    assert_eq!(
        outcome,
        VerificationOutcome::Matched(VerifiedIdentity {
            voter_id: 42,
            display_name: Some("Recognized Voter".to_string()),
        })
    );
}

#[tokio::test]
async fn test_gateway_rejection_carries_reason() {
    let gateway = GatewayMockServer::new().await;
    gateway.mock_no_match("No face detected").await;

    let verifier = HttpVoterVerifier::new(&gateway.config()).unwrap();
    let outcome = verifier.verify(TEST_IMAGE).await.unwrap();

    assert_eq!(outcome, VerificationOutcome::Rejected("No face detected".to_string()));
}

#[tokio::test]
async fn test_gateway_outage_is_transient() {
    let gateway = GatewayMockServer::new().await;
    gateway.mock_status(503).await;

    let verifier = HttpVoterVerifier::new(&gateway.config()).unwrap();
    let err = verifier.verify(TEST_IMAGE).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientUnavailability);

    gateway.reset().await;
    gateway.mock_status(400).await;
    let err = verifier.verify(TEST_IMAGE).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientUnavailability);

    gateway.reset().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&gateway.server)
        .await;
    let err = verifier.verify(TEST_IMAGE).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Internal);
}

#[tokio::test]
#[serial]
async fn test_verified_voter_receives_ballot_token() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());
    let election = seed_election(&db, 1).await;
    let voter = &election.voters[0];

    let gateway = GatewayMockServer::new().await;
    gateway.mock_match(voter.id).await;
    let ballots = Arc::new(MemoryBallotStore::new());
    let verification = service(&test_db, &gateway, ballots.clone());

    let result = verification
        .verify_voter(TEST_IMAGE, Some("10.0.0.7".to_string()))
        .await
        .expect("Verification failed");

    let verified = assert_matches!(result, VerifyVoterResult::Verified(v) => v);
    assert_eq!(verified.voter_id, voter.id);
    assert_eq!(verified.voter_name, voter.name);
    assert_eq!(verified.remaining_positions, vec![election.president.id, election.secretary.id]);

    let ballot = ballots.resolve(&verified.ballot_token).await.unwrap().expect("Token not stored");
    assert_eq!(ballot.voter_id, voter.id);
    assert_eq!(ballot.session_id, election.session.id);

    let latest = db.audit.recent(1).await.unwrap();
    assert_eq!(latest[0].action, "VOTER_VERIFIED");
    assert_eq!(latest[0].source_ip.as_deref(), Some("10.0.0.7"));
    // The gateway reports a different display name than the registry
    let details = latest[0].details.as_deref().unwrap();
    assert!(details.contains(&voter.name));
    assert!(details.contains("gateway name: Recognized Voter"));
}

#[tokio::test]
#[serial]
async fn test_gateway_failure_is_audited() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());
    seed_election(&db, 1).await;

    let gateway = GatewayMockServer::new().await;
    gateway.mock_status(503).await;
    let ballots = Arc::new(MemoryBallotStore::new());
    let verification = service(&test_db, &gateway, ballots);

    let err = verification
        .verify_voter(TEST_IMAGE, Some("10.0.0.9".to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TransientUnavailability);

    let latest = db.audit.recent(1).await.unwrap();
    assert_eq!(latest[0].action, "VERIFICATION_FAILED");
    assert_eq!(latest[0].actor, "anonymous");
    assert_eq!(latest[0].source_ip.as_deref(), Some("10.0.0.9"));
}

#[tokio::test]
#[serial]
async fn test_unrecognized_face_is_rejected_and_audited() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());
    seed_election(&db, 1).await;

    let gateway = GatewayMockServer::new().await;
    gateway.mock_no_match("Voter not recognized").await;
    let verification = service(&test_db, &gateway, Arc::new(MemoryBallotStore::new()));

    let result = verification.verify_voter(TEST_IMAGE, None).await.unwrap();
    assert_eq!(result, VerifyVoterResult::Rejected("Voter not recognized".to_string()));

    let actions = test_db.audit_actions().await.unwrap();
    assert_eq!(actions.last().map(String::as_str), Some("VERIFICATION_REJECTED"));
}

#[tokio::test]
#[serial]
async fn test_voter_with_complete_ballot_is_rejected() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());
    let election = seed_election(&db, 1).await;
    let voter = &election.voters[0];

    let voting = VotingService::new(test_db.pool.clone());
    for (position_id, candidate_id) in [
        (election.president.id, election.alice.id),
        (election.secretary.id, election.carol.id),
    ] {
        let outcome = voting
            .cast_vote(Ballot {
                session_id: election.session.id,
                position_id,
                voter_id: voter.id,
                candidate_id,
                source_ip: None,
            })
            .await
            .unwrap();
        assert_matches!(outcome, VoteOutcome::Accepted(_));
    }

    let gateway = GatewayMockServer::new().await;
    gateway.mock_match(voter.id).await;
    let verification = service(&test_db, &gateway, Arc::new(MemoryBallotStore::new()));

    let result = verification.verify_voter(TEST_IMAGE, None).await.unwrap();
    assert_eq!(result, VerifyVoterResult::Rejected("This voter has already voted".to_string()));
}

#[tokio::test]
#[serial]
async fn test_unregistered_match_is_rejected() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let db = DatabaseService::new(test_db.pool.clone());
    seed_election(&db, 1).await;

    let gateway = GatewayMockServer::new().await;
    gateway.mock_match(999_999).await;
    let verification = service(&test_db, &gateway, Arc::new(MemoryBallotStore::new()));

    let result = verification.verify_voter(TEST_IMAGE, None).await.unwrap();
    assert_eq!(result, VerifyVoterResult::Rejected("Voter is not registered".to_string()));
}

#[tokio::test]
#[serial]
async fn test_malformed_image_and_missing_session() {
    let Some(test_db) = TestDatabase::try_new().await else { return };
    let gateway = GatewayMockServer::new().await;
    gateway.mock_match(1).await;
    let verification = service(&test_db, &gateway, Arc::new(MemoryBallotStore::new()));

    assert_matches!(
        verification.verify_voter("not-an-image", None).await,
        Err(VoteDeskError::Validation(_))
    );
    assert_matches!(
        verification.verify_voter(TEST_IMAGE, None).await,
        Err(VoteDeskError::NoActiveSession)
    );
    assert_eq!(test_db.count_records("audit_log").await.unwrap(), 0);
}
