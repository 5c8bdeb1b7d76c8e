use jobboard_server::error::AppError;

mod common;

#[tokio::test]
async fn test_apply_to_job() {
    let backend = common::setup_test_database().await.unwrap();
    let fixture = common::seed(&backend).await;

    backend.apply_to_job("u2", fixture.job_ids[1]).await.unwrap();
    backend.apply_to_job("u2", fixture.job_ids[5]).await.unwrap();

    let u2 = backend.get_user("u2").await.unwrap();
    assert_eq!(u2.jobs, vec![fixture.job_ids[1], fixture.job_ids[5]]);
}

#[tokio::test]
async fn test_apply_twice_is_conflict() {
    let backend = common::setup_test_database().await.unwrap();
    let fixture = common::seed(&backend).await;

    let err = backend
        .apply_to_job("u1", fixture.job_ids[0])
        .await
        .unwrap_err();
    let expected = format!("u1 already applied to job {}", fixture.job_ids[0]);
    assert!(matches!(err, AppError::Conflict(ref m) if *m == expected));

    // Still exactly one application
    assert_eq!(backend.get_user("u1").await.unwrap().jobs.len(), 1);
}

#[tokio::test]
async fn test_apply_reports_user_before_job() {
    let backend = common::setup_test_database().await.unwrap();
    let fixture = common::seed(&backend).await;

    let err = backend.apply_to_job("nope", 999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m == "No user: nope"));

    let err = backend.apply_to_job("u2", 999).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m == "No job: 999"));

    let err = backend
        .apply_to_job("nope", fixture.job_ids[0])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(ref m) if m == "No user: nope"));
}

#[tokio::test]
async fn test_concurrent_duplicate_applications() {
    let backend = common::setup_test_database().await.unwrap();
    let fixture = common::seed(&backend).await;
    let job_id = fixture.job_ids[2];

    let first = backend.clone();
    let second = backend.clone();
    let (a, b) = tokio::join!(
        async move { first.apply_to_job("u2", job_id).await },
        async move { second.apply_to_job("u2", job_id).await },
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(AppError::Conflict(_)))));
    assert_eq!(backend.get_user("u2").await.unwrap().jobs, vec![job_id]);
}
