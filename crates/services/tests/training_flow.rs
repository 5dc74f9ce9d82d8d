use services::{AppServices, AuthContext, Clock, LogTrainingRequest};
use track_core::model::{
    EventType, ProgressState, Section, SectionId, User, UserId, UserRole,
};
use track_core::time::fixed_now;
use storage::repository::{SectionRepository, Storage, UserRepository};

async fn seed(storage: &Storage) -> (User, User, User) {
    let chain = [
        (1, "Basic Safety", None),
        (2, "Laser Use", Some(1)),
        (3, "Advanced Laser", Some(2)),
    ];
    for (id, name, prereq) in chain {
        let section = Section::new(
            SectionId::new(id),
            name,
            prereq.map(SectionId::new),
            true,
        )
        .unwrap();
        storage.sections.upsert_section(&section).await.unwrap();
    }

    let admin = User::new(UserId::generate(), "Avery", "avery@lab.edu", UserRole::Admin).unwrap();
    let pi = User::new(UserId::generate(), "Parisa", "parisa@lab.edu", UserRole::FullPi).unwrap();
    let student = User::new(UserId::generate(), "Sam", "sam@lab.edu", UserRole::Student).unwrap();
    for user in [&admin, &pi, &student] {
        storage.users.upsert_user(user).await.unwrap();
    }

    (admin, pi, student)
}

fn log_request(section: u64, event_type: EventType) -> LogTrainingRequest {
    LogTrainingRequest {
        student_email: "sam@lab.edu".to_owned(),
        section_id: SectionId::new(section),
        event_type,
        timestamp: None,
        notes: None,
    }
}

#[tokio::test]
async fn logging_then_deleting_updates_resolved_status() {
    let storage = Storage::in_memory();
    let (_admin, pi, student) = seed(&storage).await;
    let services = AppServices::from_storage(&storage, Clock::fixed(fixed_now()));

    let pi_ctx = AuthContext::new(pi);

    // PI completes safety, then trains the student on the laser.
    services
        .training()
        .log_training(&pi_ctx, log_request(1, EventType::Completed))
        .await
        .unwrap();
    let mut clock = Clock::fixed(fixed_now());
    clock.advance(chrono::Duration::days(7));
    let laser_event = services
        .training()
        .log_training(
            &pi_ctx,
            LogTrainingRequest {
                timestamp: Some(clock.now()),
                ..log_request(2, EventType::Trained)
            },
        )
        .await
        .unwrap();

    let status = services
        .status()
        .status_for(&pi_ctx, student.id())
        .await
        .unwrap();
    assert_eq!(status.state_of(SectionId::new(1)), ProgressState::Completed);
    assert_eq!(status.state_of(SectionId::new(2)), ProgressState::Trained);
    assert_eq!(status.state_of(SectionId::new(3)), ProgressState::NotStarted);

    let chain = status.prerequisite_chain(SectionId::new(3));
    let names: Vec<_> = chain.iter().map(|link| link.section.name().to_owned()).collect();
    assert_eq!(names, vec!["Basic Safety", "Laser Use"]);
    assert_eq!(chain[0].state, ProgressState::Completed);
    assert_eq!(chain[1].state, ProgressState::Trained);

    // Removing the laser event and re-querying rolls the section back.
    services
        .training()
        .delete_training(&pi_ctx, laser_event.id)
        .await
        .unwrap();

    let status = services
        .status()
        .status_for(&pi_ctx, student.id())
        .await
        .unwrap();
    assert_eq!(status.state_of(SectionId::new(2)), ProgressState::NotStarted);
}

#[tokio::test]
async fn student_sees_own_status_and_pi_feed_stays_private() {
    let storage = Storage::in_memory();
    let (_admin, pi, student) = seed(&storage).await;
    let services = AppServices::from_storage(&storage, Clock::fixed(fixed_now()));

    let pi_ctx = AuthContext::new(pi);
    services
        .training()
        .log_training(&pi_ctx, log_request(1, EventType::Trained))
        .await
        .unwrap();

    let student_ctx = AuthContext::new(student);
    let status = services.status().own_status(&student_ctx).await.unwrap();
    assert_eq!(status.state_of(SectionId::new(1)), ProgressState::Trained);

    let own_feed = services
        .training()
        .recent_trainings(&student_ctx, 10)
        .await
        .unwrap();
    assert!(own_feed.is_empty());

    let pi_feed = services.training().recent_trainings(&pi_ctx, 10).await.unwrap();
    assert_eq!(pi_feed.len(), 1);
}

#[tokio::test]
async fn admin_promotes_a_student_to_pi() {
    let storage = Storage::in_memory();
    let (admin, _pi, student) = seed(&storage).await;
    let services = AppServices::from_storage(&storage, Clock::fixed(fixed_now()));

    let admin_ctx = AuthContext::new(admin);
    services
        .roles()
        .update_role(&admin_ctx, student.id(), UserRole::ProvisionalPi)
        .await
        .unwrap();

    let promoted = storage.users.get_user(student.id()).await.unwrap().unwrap();
    assert_eq!(promoted.role(), UserRole::ProvisionalPi);

    // The fresh role can now log trainings.
    let promoted_ctx = AuthContext::new(promoted);
    services
        .training()
        .log_training(
            &promoted_ctx,
            LogTrainingRequest {
                student_email: "sam@lab.edu".to_owned(),
                section_id: SectionId::new(1),
                event_type: EventType::Trained,
                timestamp: None,
                notes: Some("self-paced refresher".to_owned()),
            },
        )
        .await
        .unwrap();
}
