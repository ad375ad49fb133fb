//! Election fixtures
//!
//! Seeds go through the admin operations so the audit trail matches what a
//! real setup produces.

use VoteDesk::database::DatabaseService;
use VoteDesk::models::{
    Candidate, CreateCandidateRequest, CreatePositionRequest, CreateSessionRequest, Position,
    RegisterVoterRequest, Session, Voter,
};

/// An active session with two positions and a small voter roll
pub struct ElectionFixture {
    pub session: Session,
    pub president: Position,
    pub secretary: Position,
    pub alice: Candidate,
    pub bob: Candidate,
    pub carol: Candidate,
    pub voters: Vec<Voter>,
}

pub async fn create_session(db: &DatabaseService, name: &str) -> Session {
    db.create_session(
        CreateSessionRequest {
            name: name.to_string(),
            academic_year: "2024/2025".to_string(),
            description: None,
        },
        None,
    )
    .await
    .expect("Failed to create session")
}

pub async fn create_position(db: &DatabaseService, session_id: i64, name: &str, order: i32) -> Position {
    db.create_position(
        CreatePositionRequest {
            session_id,
            name: name.to_string(),
            description: None,
            display_order: Some(order),
        },
        None,
    )
    .await
    .expect("Failed to create position")
}

pub async fn create_candidate(db: &DatabaseService, position_id: i64, name: &str) -> Candidate {
    db.create_candidate(
        CreateCandidateRequest {
            position_id,
            name: name.to_string(),
            grade: Some("12A".to_string()),
            manifesto: None,
            photo_filename: None,
        },
        None,
    )
    .await
    .expect("Failed to create candidate")
}

pub async fn register_voter(db: &DatabaseService, name: &str) -> Voter {
    db.register_voter(
        RegisterVoterRequest {
            name: name.to_string(),
            grade: "10B".to_string(),
        },
        None,
    )
    .await
    .expect("Failed to register voter")
}

/// Seed and activate an election with `voter_count` registered voters
pub async fn seed_election(db: &DatabaseService, voter_count: usize) -> ElectionFixture {
    let session = create_session(db, "Student Council").await;
    let president = create_position(db, session.id, "President", 1).await;
    let secretary = create_position(db, session.id, "Secretary", 2).await;
    let alice = create_candidate(db, president.id, "Alice").await;
    let bob = create_candidate(db, president.id, "Bob").await;
    let carol = create_candidate(db, secretary.id, "Carol").await;

    let mut voters = Vec::with_capacity(voter_count);
    for i in 0..voter_count {
        voters.push(register_voter(db, &format!("Voter {}", i + 1)).await);
    }

    let session = db
        .activate_session(session.id, None)
        .await
        .expect("Failed to activate session");

    ElectionFixture {
        session,
        president,
        secretary,
        alice,
        bob,
        carol,
        voters,
    }
}
