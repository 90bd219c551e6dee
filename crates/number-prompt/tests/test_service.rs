//cargo test --test test_service

mod common;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use common::{RecordingHost, init_tracing};
use number_prompt::{
    PromptError, PromptService,
    model::{PromptOptions, PromptState, PromptTarget, SessionId, UserId},
};
use serde_json::{Value, json};

fn set_count() -> PromptOptions {
    PromptOptions::new("How many crates?")
        .title("Set count")
        .default_value(5)
        .bounds(1, 3)
}

#[tokio::test]
async fn test_blocking_request_returns_submitted_entry() -> anyhow::Result<()> {
    init_tracing();
    let (host, service) = RecordingHost::new().into_service();
    let alice = UserId::from("alice");

    let request = service.request_number(None, Some(&alice), set_count());
    let client = async {
        let prompt = host.wait_for_prompt(&alice).await;
        // the empty entry is rejected, the prompt stays up for a retry
        let rejected = prompt.submit("");
        assert!(matches!(rejected, Err(PromptError::OutOfBounds { .. })));
        assert!(prompt.is_open());
        prompt.submit("12")
    };

    let (entry, submitted) = tokio::join!(request, client);
    submitted?;
    assert_eq!(entry?, Some(json!("12")));
    assert_eq!(host.open_count(), 0);
    assert_eq!(host.total_close_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_blocking_request_cancelled_returns_none() -> anyhow::Result<()> {
    let (host, service) = RecordingHost::new().into_service();
    let alice = UserId::from("alice");

    let (entry, cancelled) = tokio::join!(
        service.request_number(None, Some(&alice), set_count()),
        async { host.wait_for_prompt(&alice).await.cancel() }
    );
    cancelled?;
    assert_eq!(entry?, None);
    Ok(())
}

#[tokio::test]
async fn test_blocking_request_window_closed_returns_none() -> anyhow::Result<()> {
    let (host, service) = RecordingHost::new().into_service();
    let alice = UserId::from("alice");

    let (entry, was_open) = tokio::join!(
        service.request_number(None, Some(&alice), set_count()),
        async { host.wait_for_prompt(&alice).await.on_surface_closed() }
    );
    assert!(was_open);
    assert_eq!(entry?, None);
    Ok(())
}

#[tokio::test]
async fn test_blocking_request_destroyed_returns_none() -> anyhow::Result<()> {
    let (host, service) = RecordingHost::new().into_service();
    let alice = UserId::from("alice");

    let (entry, ()) = tokio::join!(
        service.request_number(None, Some(&alice), set_count()),
        async { host.wait_for_prompt(&alice).await.destroy() }
    );
    assert_eq!(entry?, None);
    assert_eq!(host.total_close_calls(), 1);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_dropping_request_destroys_prompt() {
    let (host, service) = RecordingHost::new().into_service();
    let alice = UserId::from("alice");

    let result = tokio::time::timeout(
        Duration::from_millis(50),
        service.request_number(None, Some(&alice), set_count()),
    )
    .await;

    assert!(result.is_err());
    assert_eq!(host.attached().len(), 1);
    assert_eq!(host.open_count(), 0);
    assert_eq!(host.total_close_calls(), 1);
}

#[tokio::test]
async fn test_session_target_resolves_to_user() -> anyhow::Result<()> {
    let (host, service) = RecordingHost::new()
        .with_session("client-7", "bob")
        .into_service();

    let prompt = service.open_prompt(
        Some(PromptTarget::Session(SessionId::from("client-7"))),
        Some(&UserId::from("alice")),
        set_count(),
    )?;

    assert_eq!(prompt.user(), &UserId::from("bob"));
    assert_eq!(host.attached()[0].user, UserId::from("bob"));
    Ok(())
}

#[tokio::test]
async fn test_unresolvable_targets() {
    let (host, service) = RecordingHost::new().with_banned("mallory").into_service();
    let alice = UserId::from("alice");

    // nobody at all
    let result = service.request_number(None, None, set_count()).await;
    assert!(matches!(result, Err(PromptError::UnresolvedTarget)));

    // unknown session does not fall back to the caller
    let result = service
        .request_number(
            Some(SessionId::from("gone").into()),
            Some(&alice),
            set_count(),
        )
        .await;
    assert!(matches!(result, Err(PromptError::UnresolvedTarget)));

    // user the host no longer accepts
    let result = service.request_number_with_callback(
        Some(UserId::from("mallory").into()),
        Some(&alice),
        set_count(),
        |_entry: Value| {},
    );
    assert!(matches!(result, Err(PromptError::UnresolvedTarget)));

    assert!(host.attached().is_empty());
}

#[tokio::test]
async fn test_invalid_options_are_rejected() {
    let (host, service) = RecordingHost::new().into_service();
    let options = PromptOptions {
        min_value: Some(3),
        max_value: Some(1),
        ..PromptOptions::new("bad")
    };
    let result = service
        .request_number(None, Some(&UserId::from("alice")), options)
        .await;
    assert!(matches!(result, Err(PromptError::InvalidBounds(_))));
    assert!(host.attached().is_empty());
}

#[tokio::test]
async fn test_callback_request_submit() -> anyhow::Result<()> {
    init_tracing();
    let (host, service) = RecordingHost::new().into_service();
    let alice = UserId::from("alice");
    let received = Arc::new(Mutex::new(Vec::new()));

    let prompt = service.request_number_with_callback(None, Some(&alice), set_count(), {
        let received = received.clone();
        let host = host.clone();
        move |entry: Value| {
            // teardown has not closed the surface yet
            let still_open = host.open_count();
            received.lock().unwrap().push((entry, still_open));
        }
    })?;

    assert!(prompt.is_callback_mode());
    let shown = host.prompt_for(&alice).expect("prompt attached");
    shown.submit("7")?;
    shown.destroy();

    assert_eq!(*received.lock().unwrap(), vec![(json!("7"), 1)]);
    assert_eq!(prompt.state(), PromptState::Resolved(json!("7")));
    assert_eq!(host.open_count(), 0);
    assert_eq!(host.close_calls(prompt.id()), 1);
    Ok(())
}

#[tokio::test]
async fn test_callback_request_cancel_never_invokes() -> anyhow::Result<()> {
    let (host, service) = RecordingHost::new().into_service();
    let alice = UserId::from("alice");
    let invoked = Arc::new(Mutex::new(0usize));

    let prompt = service.request_number_with_callback(None, Some(&alice), set_count(), {
        let invoked = invoked.clone();
        move |_entry: Value| *invoked.lock().unwrap() += 1
    })?;

    host.prompt_for(&alice).expect("prompt attached").cancel()?;
    prompt.destroy();

    assert_eq!(*invoked.lock().unwrap(), 0);
    assert_eq!(prompt.state(), PromptState::Cancelled);
    assert!(prompt.is_torn_down());
    assert_eq!(host.close_calls(prompt.id()), 1);
    Ok(())
}

#[tokio::test]
async fn test_service_over_shared_host() -> anyhow::Result<()> {
    let host = Arc::new(RecordingHost::new());
    let service = PromptService::new(host.clone());
    let alice = UserId::from("alice");

    let (entry, submitted) = tokio::join!(
        service.request_number(None, Some(&alice), set_count()),
        async { host.wait_for_prompt(&alice).await.submit(3) }
    );
    submitted?;
    assert_eq!(entry?, Some(json!(3)));
    Ok(())
}
