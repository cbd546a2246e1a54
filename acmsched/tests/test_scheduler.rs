use acmcore::{
    acl::AclChoice,
    entity::{
        EntityKind,
        EntityRow,
    },
    error::BackendError,
    transition::TransitionsFor,
};
use acmsched::{
    error::ScheduleError,
    platform::Builder,
    schedule::SaveTarget,
    Platform,
    Scheduler,
};
use http::StatusCode;

use test_acm::{
    core::MockBackend,
    fixture,
    is_send_sync,
};

async fn scheduler(
    mut backend: MockBackend,
    row: EntityRow,
    data: TransitionsFor,
) -> Scheduler {
    backend.expect_list_acls()
        .returning(|| Ok(fixture::acl_templates()));
    backend.expect_list_workflow_definitions()
        .returning(|| Ok(fixture::workflow_definitions()));
    backend.expect_transitions_for()
        .times(1)
        .returning(move |_| Ok(data.clone()));
    let platform = Builder::new().backend(backend).build();
    platform.preload().await;
    let data = platform.transitions_for(std::slice::from_ref(&row), false)
        .await
        .expect("transitions loaded");
    Scheduler::init(platform, row, &data).await
}

fn episode_data() -> TransitionsFor {
    let mut data = TransitionsFor::default();
    data.episodes.insert("EP-1".to_string(), fixture::entity_transitions(
        fixture::managed_active("tmpl-A", "Public", false),
        vec![
            fixture::transition("T-1", Some("tmpl-A"), fixture::utc(2024, 7, 1)),
        ],
    ));
    data.series.insert("S-1".to_string(), fixture::entity_transitions(
        fixture::managed_active("tmpl-B", "Private", false),
        vec![],
    ));
    data
}

fn series_data() -> TransitionsFor {
    let mut data = TransitionsFor::default();
    data.series.insert("S-1".to_string(), fixture::entity_transitions(
        fixture::managed_active("tmpl-B", "Private", false),
        vec![
            fixture::transition("T-1", Some("tmpl-A"), fixture::utc(2024, 7, 1)),
            fixture::transition("T-2", Some("tmpl-B"), fixture::utc(2024, 8, 1)),
        ],
    ));
    data
}

#[async_std::test]
async fn platform_is_send_sync() -> anyhow::Result<()> {
    let platform: Platform = Builder::new().backend(MockBackend::new()).build();
    is_send_sync(&platform);
    Ok(())
}

#[async_std::test]
async fn new_transition_is_persisted() -> anyhow::Result<()> {
    let mut backend = MockBackend::new();
    backend.expect_add_transition()
        .times(1)
        .withf(|kind, entity_id, form| {
            *kind == EntityKind::Episode
                && entity_id == "EP-1"
                && form.application_date == "2024-06-01T00:00:00Z"
                && form.managed_acl_id.as_deref() == Some("tmpl-A")
                && form.override_.is_none()
        })
        .returning(|_, _, _| Ok("T-100".to_string()));
    let mut scheduler = scheduler(
        backend,
        EntityRow::episode("EP-1", Some("S-1".to_string())),
        episode_data(),
    ).await;

    let key = scheduler.insert_schedule_at(None, fixture::utc(2024, 5, 20));
    scheduler.change_acl(key, AclChoice::template("tmpl-A"))?;
    scheduler.change_from_date(key, fixture::utc(2024, 6, 1))?;
    scheduler.save(key).await?;

    let entry = scheduler.schedule(key).expect("entry is kept");
    assert_eq!(entry.id(), Some("T-100"));
    assert!(!entry.is_new());
    assert!(entry.is_saved());
    assert_eq!(entry.saved_params().acl, AclChoice::template("tmpl-A"));
    assert_eq!(entry.saved_params(), entry.params());
    // sorted ahead of T-1
    assert_eq!(scheduler.schedules()[0].key(), key);
    Ok(())
}

#[async_std::test]
async fn existing_transition_is_updated() -> anyhow::Result<()> {
    let mut backend = MockBackend::new();
    backend.expect_update_transition()
        .times(1)
        .withf(|kind, transition_id, _| {
            *kind == EntityKind::Series && transition_id == "T-2"
        })
        .returning(|_, _, form| {
            assert_eq!(form.override_, Some(true));
            assert_eq!(form.managed_acl_id.as_deref(), Some("tmpl-A"));
            Ok(())
        });
    let mut scheduler = scheduler(backend, EntityRow::series("S-1"), series_data()).await;
    let key = scheduler.schedules()[1].key();
    scheduler.change_acl(key, AclChoice::template("tmpl-A"))?;
    scheduler.change_override(key, true)?;
    let request = scheduler.begin_save(key)?;
    assert_eq!(request.target, SaveTarget::Update { transition_id: "T-2".to_string() });
    let result = scheduler.send_save(&request).await;
    scheduler.complete_save(request, result)?;
    let entry = scheduler.schedule(key).expect("entry is kept");
    assert!(entry.is_saved());
    assert!(entry.saved_params().override_);
    Ok(())
}

#[async_std::test]
async fn cancel_restores_every_field() -> anyhow::Result<()> {
    let mut backend = MockBackend::new();
    backend.expect_workflow_configuration_panel()
        .times(1)
        .returning(|_| Ok(fixture::REPUBLISH_PANEL.to_string()));
    let mut scheduler = scheduler(backend, EntityRow::series("S-1"), series_data()).await;
    let key = scheduler.schedules()[0].key();
    let original = scheduler.schedule(key).expect("present").params().clone();

    scheduler.change_acl(key, AclChoice::template("tmpl-B"))?;
    scheduler.change_from_date(key, fixture::utc(2024, 9, 1))?;
    scheduler.change_override(key, true)?;
    scheduler.change_workflow(key, Some("republish".to_string())).await?;
    let entry = scheduler.schedule(key).expect("present");
    assert!(!entry.is_saved());
    assert_eq!(
        entry.params().workflow_params.as_ref().and_then(|p| p.get("comment")).map(String::as_str),
        Some("none"),
    );
    // moved behind T-2
    assert_eq!(scheduler.schedules()[1].key(), key);

    scheduler.cancel(key)?;
    let entry = scheduler.schedule(key).expect("present");
    assert!(entry.is_saved());
    assert_eq!(entry.params(), &original);
    assert_eq!(scheduler.schedules()[0].key(), key);
    Ok(())
}

#[async_std::test]
async fn returning_to_saved_values_clears_dirty() -> anyhow::Result<()> {
    let mut scheduler = scheduler(MockBackend::new(), EntityRow::series("S-1"), series_data()).await;
    let key = scheduler.schedules()[0].key();
    scheduler.change_acl(key, AclChoice::template("tmpl-B"))?;
    scheduler.change_override(key, true)?;
    assert!(scheduler.check_changed(key)?);
    scheduler.change_override(key, false)?;
    scheduler.change_acl(key, AclChoice::template("tmpl-A"))?;
    assert!(!scheduler.check_changed(key)?);
    assert!(scheduler.schedule(key).expect("present").is_saved());
    Ok(())
}

#[async_std::test]
async fn conflict_keeps_entry_dirty() -> anyhow::Result<()> {
    let mut backend = MockBackend::new();
    backend.expect_update_transition()
        .times(1)
        .returning(|_, _, _| Err(BackendError::Status(StatusCode::CONFLICT)));
    backend.expect_add_transition()
        .times(1)
        .returning(|_, _, _| Err(BackendError::Status(StatusCode::BAD_REQUEST)));
    let mut scheduler = scheduler(backend, EntityRow::series("S-1"), series_data()).await;

    let key = scheduler.schedules()[0].key();
    scheduler.change_from_date(key, fixture::utc(2024, 8, 1))?;
    assert_eq!(scheduler.save(key).await, Err(ScheduleError::Conflict));
    let entry = scheduler.schedule(key).expect("present");
    assert!(!entry.is_saved());
    assert!(!entry.is_loading());
    assert_eq!(
        entry.error().map(ToString::to_string).as_deref(),
        Some("There is already a transition with this start date!"),
    );
    assert_eq!(entry.saved_params().from_date, fixture::utc(2024, 7, 1));

    let key = scheduler.insert_schedule_at(None, fixture::utc(2024, 5, 1));
    assert_eq!(scheduler.save(key).await, Err(ScheduleError::BadRequest));
    let entry = scheduler.schedule(key).expect("present");
    assert!(entry.is_new());
    assert_eq!(
        entry.error().map(ToString::to_string).as_deref(),
        Some("Not able to save this transition, workflow definition or acl is incorrect!"),
    );
    Ok(())
}

#[async_std::test]
async fn missing_acl_is_rejected_locally() -> anyhow::Result<()> {
    let mut scheduler = scheduler(
        MockBackend::new(),
        EntityRow::episode("EP-2", None),
        TransitionsFor::default(),
    ).await;
    let key = scheduler.insert_schedule_at(None, fixture::utc(2024, 5, 1));
    scheduler.change_acl(key, AclChoice::Unset)?;
    assert_eq!(scheduler.save(key).await, Err(ScheduleError::MissingAcl));
    // no series to fall back to
    scheduler.change_acl(key, AclChoice::InheritSeries)?;
    assert_eq!(scheduler.save(key).await, Err(ScheduleError::MissingAcl));
    assert_eq!(
        scheduler.schedule(key).and_then(|e| e.error()).map(ToString::to_string).as_deref(),
        Some("Can not save a transition without ACL!"),
    );
    Ok(())
}

#[async_std::test]
async fn delete_requests() -> anyhow::Result<()> {
    let mut backend = MockBackend::new();
    backend.expect_delete_transition()
        .times(1)
        .withf(|kind, transition_id| {
            *kind == EntityKind::Series && transition_id == "T-1"
        })
        .returning(|_, _| Ok(()));
    let mut scheduler = scheduler(backend, EntityRow::series("S-1"), series_data()).await;

    // a new entry goes away without any request
    let key = scheduler.insert_schedule_at(None, fixture::utc(2024, 5, 1));
    assert_eq!(scheduler.schedules().len(), 3);
    scheduler.destroy(key).await?;
    assert!(scheduler.schedule(key).is_none());

    let key = scheduler.schedules()[0].key();
    scheduler.destroy(key).await?;
    assert!(scheduler.schedule(key).is_none());
    assert_eq!(scheduler.schedules().len(), 1);
    Ok(())
}

#[async_std::test]
async fn failed_delete_keeps_entry() -> anyhow::Result<()> {
    let mut backend = MockBackend::new();
    backend.expect_delete_transition()
        .times(1)
        .returning(|_, _| Err(BackendError::Status(StatusCode::INTERNAL_SERVER_ERROR)));
    let mut scheduler = scheduler(backend, EntityRow::series("S-1"), series_data()).await;
    let key = scheduler.schedules()[0].key();
    assert_eq!(scheduler.destroy(key).await, Err(ScheduleError::DestroyFailed));
    let entry = scheduler.schedule(key).expect("still present");
    assert_eq!(
        entry.error().map(ToString::to_string).as_deref(),
        Some("Not able to destroy the transition"),
    );
    Ok(())
}

#[async_std::test]
async fn cancel_of_new_entry() -> anyhow::Result<()> {
    let mut scheduler = scheduler(MockBackend::new(), EntityRow::series("S-1"), series_data()).await;
    let key = scheduler.insert_schedule_at(None, fixture::utc(2024, 5, 1));
    scheduler.cancel(key)?;
    assert!(scheduler.schedule(key).is_none());
    assert_eq!(scheduler.cancel(key), Err(ScheduleError::NoSuchEntry(key)));
    Ok(())
}

#[async_std::test]
async fn in_flight_save_blocks_changes() -> anyhow::Result<()> {
    let mut backend = MockBackend::new();
    backend.expect_update_transition()
        .times(1)
        .withf(|_, transition_id, form| {
            transition_id == "T-1" && form.managed_acl_id.as_deref() == Some("tmpl-B")
        })
        .returning(|_, _, _| Ok(()));
    backend.expect_add_transition()
        .times(1)
        .returning(|_, _, _| Ok("T-100".to_string()));
    let mut scheduler = scheduler(backend, EntityRow::series("S-1"), series_data()).await;

    let key = scheduler.schedules()[0].key();
    scheduler.change_acl(key, AclChoice::template("tmpl-B"))?;
    let request = scheduler.begin_save(key)?;
    assert_eq!(
        scheduler.change_acl(key, AclChoice::template("tmpl-A")),
        Err(ScheduleError::SaveInProgress),
    );
    assert_eq!(scheduler.begin_save(key), Err(ScheduleError::SaveInProgress));
    assert_eq!(scheduler.destroy(key).await, Err(ScheduleError::SaveInProgress));
    let result = scheduler.send_save(&request).await;
    // the outcome of the request is still unknown
    assert_eq!(scheduler.cancel(key), Err(ScheduleError::SaveInProgress));
    assert!(scheduler.schedule(key).expect("present").is_loading());
    scheduler.complete_save(request, result)?;
    let entry = scheduler.schedule(key).expect("present");
    assert!(entry.is_saved());
    assert!(!entry.is_loading());
    assert_eq!(entry.saved_params().acl, AclChoice::template("tmpl-B"));
    assert_eq!(entry.params().acl, AclChoice::template("tmpl-B"));

    // a new entry is kept until its creation completes
    let key = scheduler.insert_schedule_at(None, fixture::utc(2024, 5, 1));
    scheduler.change_acl(key, AclChoice::template("tmpl-A"))?;
    let request = scheduler.begin_save(key)?;
    let result = scheduler.send_save(&request).await;
    assert_eq!(scheduler.cancel(key), Err(ScheduleError::SaveInProgress));
    scheduler.complete_save(request, result)?;
    let entry = scheduler.schedule(key).expect("present");
    assert_eq!(entry.id(), Some("T-100"));
    assert!(!entry.is_new());
    Ok(())
}

#[async_std::test]
async fn completion_for_removed_entry_is_stale() -> anyhow::Result<()> {
    let mut backend = MockBackend::new();
    backend.expect_add_transition()
        .times(1)
        .returning(|_, _, _| Ok("T-100".to_string()));
    let mut scheduler = scheduler(backend, EntityRow::series("S-1"), series_data()).await;

    let key = scheduler.insert_schedule_at(None, fixture::utc(2024, 5, 1));
    scheduler.change_acl(key, AclChoice::template("tmpl-A"))?;
    let request = scheduler.begin_save(key)?;
    let result = scheduler.send_save(&request).await;
    assert!(scheduler.remove_schedule(key).is_some());
    assert_eq!(scheduler.complete_save(request, result), Err(ScheduleError::Stale));
    Ok(())
}

#[async_std::test]
async fn series_override_transitions_are_read_only() -> anyhow::Result<()> {
    let mut data = episode_data();
    let mut forced = fixture::transition("T-9", Some("tmpl-B"), fixture::utc(2024, 6, 15));
    forced.override_ = true;
    data.series.insert("S-1".to_string(), fixture::entity_transitions(
        fixture::managed_active("tmpl-B", "Private", false),
        vec![
            forced,
            fixture::transition("T-8", Some("tmpl-A"), fixture::utc(2024, 6, 20)),
        ],
    ));
    let mut scheduler = scheduler(
        MockBackend::new(),
        EntityRow::episode("EP-1", Some("S-1".to_string())),
        data,
    ).await;
    assert_eq!(scheduler.schedules().len(), 2);
    let key = scheduler.schedules()[0].key();
    assert!(scheduler.schedules()[0].is_read_only());
    assert_eq!(
        scheduler.change_acl(key, AclChoice::template("tmpl-A")),
        Err(ScheduleError::ReadOnly),
    );
    assert_eq!(scheduler.destroy(key).await, Err(ScheduleError::ReadOnly));
    let view = scheduler.draw_at(fixture::utc(2024, 6, 1));
    assert!(view.schedules[0].read_only);
    assert_eq!(view.schedules[0].override_, None);
    Ok(())
}

#[async_std::test]
async fn apply_inherit_sets_from_series() -> anyhow::Result<()> {
    let mut backend = MockBackend::new();
    backend.expect_apply_acl()
        .times(1)
        .withf(|kind, entity_id, form| {
            *kind == EntityKind::Episode
                && entity_id == "EP-1"
                && form.acl_id.is_none()
                && form.override_.is_none()
        })
        .returning(|_, _, _| Ok(()));
    let mut scheduler = scheduler(
        backend,
        EntityRow::episode("EP-1", Some("S-1".to_string())),
        episode_data(),
    ).await;
    assert!(!scheduler.current_acl().is_from_series());
    let view = scheduler.draw();
    assert_eq!(view.current.acl_options[0].value, "_series");

    scheduler.change_current_acl(AclChoice::InheritSeries)?;
    assert!(!scheduler.current_acl().is_saved());
    scheduler.apply().await?;
    let current = scheduler.current_acl();
    assert!(current.is_from_series());
    assert!(current.is_saved());
    assert_eq!(current.name(), "Private");
    let view = scheduler.draw();
    assert_ne!(view.current.acl_options[0].value, "_series");
    Ok(())
}

#[async_std::test]
async fn apply_errors() -> anyhow::Result<()> {
    let mut backend = MockBackend::new();
    backend.expect_apply_acl()
        .times(2)
        .returning({
            let mut calls = 0;
            move |_, _, _| {
                calls += 1;
                if calls == 1 {
                    Err(BackendError::Status(StatusCode::CONFLICT))
                } else {
                    Err(BackendError::Network("reset".to_string()))
                }
            }
        });
    let mut scheduler = scheduler(backend, EntityRow::series("S-1"), series_data()).await;
    scheduler.change_current_acl(AclChoice::template("tmpl-A"))?;
    scheduler.change_current_override(true)?;
    assert_eq!(scheduler.apply().await, Err(ScheduleError::Conflict));
    assert_eq!(scheduler.apply().await, Err(ScheduleError::ApplyFailed));
    assert_eq!(
        scheduler.current_acl().error().map(ToString::to_string).as_deref(),
        Some("Not able to apply the transition"),
    );
    scheduler.cancel_current()?;
    assert_eq!(scheduler.current_acl().acl(), &AclChoice::template("tmpl-B"));
    assert!(scheduler.current_acl().is_saved());

    scheduler.change_current_acl(AclChoice::Unset)?;
    assert_eq!(scheduler.apply().await, Err(ScheduleError::MissingApplyAcl));
    assert_eq!(
        scheduler.current_acl().error().map(ToString::to_string).as_deref(),
        Some("Can not apply a transition without ACL!"),
    );
    Ok(())
}

#[async_std::test]
async fn workflow_config_dialog() -> anyhow::Result<()> {
    let mut backend = MockBackend::new();
    backend.expect_workflow_configuration_panel()
        .times(1)
        .withf(|id| id == "republish")
        .returning(|_| Ok(fixture::REPUBLISH_PANEL.to_string()));
    let mut scheduler = scheduler(backend, EntityRow::series("S-1"), series_data()).await;
    let key = scheduler.schedules()[0].key();
    assert!(matches!(
        scheduler.open_workflow_config(key).await,
        Err(ScheduleError::NoWorkflow),
    ));

    scheduler.change_workflow(key, Some("republish".to_string())).await?;
    let mut dialog = scheduler.open_workflow_config(key).await?;
    assert_eq!(dialog.params().get("distribute").map(String::as_str), Some("true"));
    dialog.set("comment", "reviewed");
    scheduler.close_workflow_config(dialog.clone(), false)?;
    assert_eq!(
        scheduler.schedule(key)
            .and_then(|e| e.params().workflow_params.as_ref())
            .and_then(|p| p.get("comment"))
            .map(String::as_str),
        Some("none"),
    );
    scheduler.close_workflow_config(dialog, true)?;
    assert_eq!(
        scheduler.schedule(key)
            .and_then(|e| e.params().workflow_params.as_ref())
            .and_then(|p| p.get("comment"))
            .map(String::as_str),
        Some("reviewed"),
    );

    // the saved (empty) workflow comes back on reselection
    scheduler.change_workflow(key, None).await?;
    assert!(scheduler.schedule(key).expect("present").is_saved());
    Ok(())
}

#[async_std::test]
async fn workflow_panel_failure() -> anyhow::Result<()> {
    let mut backend = MockBackend::new();
    backend.expect_workflow_configuration_panel()
        .times(1)
        .returning(|_| Err(BackendError::Status(StatusCode::NOT_FOUND)));
    let mut scheduler = scheduler(backend, EntityRow::series("S-1"), series_data()).await;
    let key = scheduler.schedules()[0].key();
    assert_eq!(
        scheduler.change_workflow(key, Some("gone".to_string())).await,
        Err(ScheduleError::WorkflowConfig),
    );
    let entry = scheduler.schedule(key).expect("present");
    assert_eq!(entry.params().workflow_id, None);
    assert!(entry.is_saved());
    Ok(())
}
