use chrono::Duration;
use track_core::model::{
    EventType, Section, SectionId, TrainingDraft, TrainingId, User, UserId, UserRole,
    ValidatedTraining,
};
use track_core::time::fixed_now;
use storage::repository::{
    SectionRepository, StorageError, TrainingRepository, UserRepository,
};
use storage::sqlite::SqliteRepository;

fn build_section(id: u64, prerequisite: Option<u64>, active: bool) -> Section {
    Section::new(
        SectionId::new(id),
        format!("Section {id}"),
        prerequisite.map(SectionId::new),
        active,
    )
    .unwrap()
}

fn build_user(name: &str, email: &str, role: UserRole) -> User {
    User::new(UserId::generate(), name, email, role).unwrap()
}

fn build_training(
    student: UserId,
    pi: UserId,
    section: u64,
    event_type: EventType,
    days: i64,
    notes: Option<&str>,
) -> ValidatedTraining {
    TrainingDraft {
        student_id: student,
        pi_id: pi,
        section_id: SectionId::new(section),
        event_type,
        timestamp: fixed_now() + Duration::days(days),
        notes: notes.map(str::to_owned),
    }
    .validate()
    .unwrap()
}

#[tokio::test]
async fn sqlite_roundtrips_sections_with_prereq_and_active() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_sections?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.upsert_section(&build_section(1, None, true)).await.unwrap();
    repo.upsert_section(&build_section(2, Some(1), true)).await.unwrap();
    repo.upsert_section(&build_section(3, Some(2), false)).await.unwrap();

    let fetched = repo.get_section(SectionId::new(2)).await.unwrap().unwrap();
    assert_eq!(fetched.prerequisite(), Some(SectionId::new(1)));
    assert!(fetched.is_active());

    let active = repo.list_sections(true).await.unwrap();
    let ids: Vec<_> = active.iter().map(|s| s.id().value()).collect();
    assert_eq!(ids, vec![1, 2]);

    let all = repo.list_sections(false).await.unwrap();
    assert_eq!(all.len(), 3);

    assert!(repo.get_section(SectionId::new(99)).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_enforces_unique_emails_and_updates_roles() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_users?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let user = build_user("Ada", "ada@lab.edu", UserRole::Student);
    repo.upsert_user(&user).await.unwrap();

    let err = repo
        .upsert_user(&build_user("Impostor", "ada@lab.edu", UserRole::Student))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let found = repo.find_user_by_email("ada@lab.edu").await.unwrap().unwrap();
    assert_eq!(found.id(), user.id());

    repo.update_role(user.id(), UserRole::ProvisionalPi).await.unwrap();
    let fetched = repo.get_user(user.id()).await.unwrap().unwrap();
    assert_eq!(fetched.role(), UserRole::ProvisionalPi);

    let err = repo
        .update_role(UserId::generate(), UserRole::Admin)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn sqlite_assigns_ids_and_lists_trainings_in_order() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_trainings?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.upsert_section(&build_section(1, None, true)).await.unwrap();
    repo.upsert_section(&build_section(2, Some(1), true)).await.unwrap();

    let student = build_user("Sam", "sam@lab.edu", UserRole::Student);
    let pi = build_user("Parisa", "parisa@lab.edu", UserRole::FullPi);
    repo.upsert_user(&student).await.unwrap();
    repo.upsert_user(&pi).await.unwrap();

    let first = repo
        .insert_training(&build_training(
            student.id(),
            pi.id(),
            1,
            EventType::Trained,
            0,
            Some("first pass"),
        ))
        .await
        .unwrap();
    let second = repo
        .insert_training(&build_training(
            student.id(),
            pi.id(),
            2,
            EventType::Trained,
            2,
            None,
        ))
        .await
        .unwrap();
    assert!(second > first);

    let events = repo.trainings_for_student(student.id()).await.unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, first);
    assert_eq!(events[0].notes.as_deref(), Some("first pass"));
    assert_eq!(events[1].id, second);
    assert!(events[0].timestamp < events[1].timestamp);

    let recent = repo.recent_trainings_for_pi(pi.id(), 1).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].id, second);
}

#[tokio::test]
async fn sqlite_updates_and_deletes_trainings() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_mutation?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.upsert_section(&build_section(1, None, true)).await.unwrap();
    let student = build_user("Sam", "sam@lab.edu", UserRole::Student);
    let pi = build_user("Parisa", "parisa@lab.edu", UserRole::FullPi);
    repo.upsert_user(&student).await.unwrap();
    repo.upsert_user(&pi).await.unwrap();

    let id = repo
        .insert_training(&build_training(
            student.id(),
            pi.id(),
            1,
            EventType::Trained,
            0,
            None,
        ))
        .await
        .unwrap();

    let mut event = repo.get_training(id).await.unwrap().unwrap();
    event.event_type = EventType::Completed;
    event.notes = Some("signed off".to_owned());
    repo.update_training(&event).await.unwrap();

    let fetched = repo.get_training(id).await.unwrap().unwrap();
    assert_eq!(fetched.event_type, EventType::Completed);
    assert_eq!(fetched.notes.as_deref(), Some("signed off"));

    repo.delete_training(id).await.unwrap();
    assert!(repo.get_training(id).await.unwrap().is_none());

    let err = repo.delete_training(TrainingId::new(424_242)).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}
