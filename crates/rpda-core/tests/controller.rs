use std::time::Duration;

use rpda_core::{
    AccessStateController, CopyRole, Direction, GroupId, PollResult, PollTarget, SkipReason,
    TransitionPhase, TransitionSettings, TransitionStatus,
};
use rpda_test_support::appliance::{MutationKind, ReadFailure, ScriptedAppliance};
use rpda_test_support::fixtures::{REPLICA_CLUSTER, accessed_copy, copy, standard_copies};

const GROUP: GroupId = GroupId(11);

fn settings(max_attempts: u32) -> TransitionSettings {
    TransitionSettings {
        poll_delay: Duration::from_secs(3),
        max_attempts,
        dry_run: false,
    }
}

fn test_copy() -> rpda_core::Copy {
    copy(GROUP, REPLICA_CLUSTER, 2, "TC_Test1_CG", CopyRole::Replica)
}

#[tokio::test(start_paused = true)]
async fn active_copy_is_skipped_without_requests() -> anyhow::Result<()> {
    let active = accessed_copy(GROUP, 2, "TC_Test1_CG");
    let appliance = ScriptedAppliance::new().with_group(GROUP, "Test1_CG", vec![active.clone()]);

    for dry_run in [false, true] {
        let settings = TransitionSettings {
            dry_run,
            ..settings(5)
        };
        let report = AccessStateController::new(&appliance, &settings)
            .run("Test1_CG", &active, Direction::Enable)
            .await?;
        assert_eq!(
            report.status,
            TransitionStatus::Skipped {
                reason: SkipReason::AlreadyActive
            }
        );
        assert_eq!(
            report.phases,
            vec![TransitionPhase::Idle, TransitionPhase::Skipped]
        );
    }
    assert!(appliance.mutations().is_empty());
    assert_eq!(appliance.copy_reads(GROUP), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn check_mode_issues_nothing_and_reports_simulated_success() -> anyhow::Result<()> {
    let appliance =
        ScriptedAppliance::new().with_group(GROUP, "Test1_CG", standard_copies(GROUP, "Test1_CG"));
    let settings = TransitionSettings {
        dry_run: true,
        ..settings(5)
    };

    let report = AccessStateController::new(&appliance, &settings)
        .run("Test1_CG", &test_copy(), Direction::Enable)
        .await?;

    assert_eq!(report.status, TransitionStatus::Succeeded { simulated: true });
    assert_eq!(
        report.phases,
        vec![
            TransitionPhase::Idle,
            TransitionPhase::ImageAccessEnabling,
            TransitionPhase::ImageAccessPolling,
            TransitionPhase::DirectAccessEnabling,
            TransitionPhase::Done,
        ]
    );
    assert!(report.polls.is_empty());
    assert!(appliance.mutations().is_empty());
    assert_eq!(appliance.copy_reads(GROUP), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn enable_converges_after_the_appliance_settles() -> anyhow::Result<()> {
    let appliance = ScriptedAppliance::new()
        .with_group(GROUP, "Test1_CG", standard_copies(GROUP, "Test1_CG"))
        .settle_after(3);
    let settings = settings(5);

    let report = AccessStateController::new(&appliance, &settings)
        .run("Test1_CG", &test_copy(), Direction::Enable)
        .await?;

    assert_eq!(report.status, TransitionStatus::Succeeded { simulated: false });
    assert_eq!(
        report.polls,
        vec![
            PollResult {
                target: PollTarget::ImageAccess,
                attempts: 3,
                converged: true,
            },
            PollResult {
                target: PollTarget::LoggedAccess,
                attempts: 1,
                converged: true,
            },
        ]
    );
    assert_eq!(
        appliance.mutation_kinds(GROUP),
        vec![
            MutationKind::EnableImageAccess,
            MutationKind::EnableDirectAccess
        ]
    );
    assert_eq!(report.task.copy_name, "TC_Test1_CG");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn exhausted_polling_warns_and_proceeds() -> anyhow::Result<()> {
    let appliance = ScriptedAppliance::new()
        .with_group(GROUP, "Test1_CG", standard_copies(GROUP, "Test1_CG"))
        .settle_after(10);
    let settings = settings(4);
    let started = tokio::time::Instant::now();

    let report = AccessStateController::new(&appliance, &settings)
        .run("Test1_CG", &test_copy(), Direction::Enable)
        .await?;

    assert_eq!(report.status, TransitionStatus::Succeeded { simulated: false });
    assert!(report.polls.iter().all(|poll| !poll.converged));
    assert!(report.polls.iter().all(|poll| poll.attempts == 4));
    assert_eq!(appliance.copy_reads(GROUP), 8);
    assert_eq!(
        appliance.mutation_kinds(GROUP).last(),
        Some(&MutationKind::EnableDirectAccess)
    );
    // Three pauses per loop; none after the final read.
    let waited = started.elapsed();
    assert!(waited >= Duration::from_secs(18) && waited < Duration::from_secs(19));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn logged_access_mode_is_polled_separately_from_the_flag() -> anyhow::Result<()> {
    let appliance = ScriptedAppliance::new()
        .with_group(GROUP, "Test1_CG", standard_copies(GROUP, "Test1_CG"))
        .settle_mode_after(3);
    let settings = settings(5);

    let report = AccessStateController::new(&appliance, &settings)
        .run("Test1_CG", &test_copy(), Direction::Enable)
        .await?;

    assert_eq!(report.status, TransitionStatus::Succeeded { simulated: false });
    assert_eq!(
        report.polls,
        vec![
            PollResult {
                target: PollTarget::ImageAccess,
                attempts: 1,
                converged: true,
            },
            PollResult {
                target: PollTarget::LoggedAccess,
                attempts: 3,
                converged: true,
            },
        ]
    );
    assert_eq!(appliance.copy_reads(GROUP), 4);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn only_the_mode_loop_exhausts_its_budget() -> anyhow::Result<()> {
    let appliance = ScriptedAppliance::new()
        .with_group(GROUP, "Test1_CG", standard_copies(GROUP, "Test1_CG"))
        .settle_mode_after(10);
    let settings = settings(4);

    let report = AccessStateController::new(&appliance, &settings)
        .run("Test1_CG", &test_copy(), Direction::Enable)
        .await?;

    assert_eq!(report.status, TransitionStatus::Succeeded { simulated: false });
    assert_eq!(
        report.polls,
        vec![
            PollResult {
                target: PollTarget::ImageAccess,
                attempts: 1,
                converged: true,
            },
            PollResult {
                target: PollTarget::LoggedAccess,
                attempts: 4,
                converged: false,
            },
        ]
    );
    assert_eq!(appliance.copy_reads(GROUP), 5);
    assert_eq!(
        appliance.mutation_kinds(GROUP),
        vec![
            MutationKind::EnableImageAccess,
            MutationKind::EnableDirectAccess
        ]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn rejected_direct_access_retries_then_fails() -> anyhow::Result<()> {
    let appliance = ScriptedAppliance::new()
        .with_group(GROUP, "Test1_CG", standard_copies(GROUP, "Test1_CG"))
        .reject(MutationKind::EnableDirectAccess, 5, 400, "image access pending");
    let settings = settings(3);

    let report = AccessStateController::new(&appliance, &settings)
        .run("Test1_CG", &test_copy(), Direction::Enable)
        .await?;

    let TransitionStatus::Failed { error } = &report.status else {
        panic!("expected failure, got {:?}", report.status);
    };
    assert_eq!(error.phase, TransitionPhase::DirectAccessEnabling);
    assert_eq!(error.attempts, 3);
    assert_eq!(error.status, 400);
    assert_eq!(error.body, "image access pending");
    assert_eq!(report.phases.last(), Some(&TransitionPhase::Failed));
    assert_eq!(
        appliance.mutation_kinds(GROUP),
        vec![
            MutationKind::EnableImageAccess,
            MutationKind::EnableDirectAccess,
            MutationKind::EnableDirectAccess,
            MutationKind::EnableDirectAccess,
        ]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn direct_access_succeeds_within_retry_budget() -> anyhow::Result<()> {
    let appliance = ScriptedAppliance::new()
        .with_group(GROUP, "Test1_CG", standard_copies(GROUP, "Test1_CG"))
        .reject(MutationKind::EnableDirectAccess, 2, 400, "busy");
    let settings = settings(3);

    let report = AccessStateController::new(&appliance, &settings)
        .run("Test1_CG", &test_copy(), Direction::Enable)
        .await?;

    assert_eq!(report.status, TransitionStatus::Succeeded { simulated: false });
    assert_eq!(
        appliance
            .mutation_kinds(GROUP)
            .iter()
            .filter(|kind| **kind == MutationKind::EnableDirectAccess)
            .count(),
        3
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn rejected_image_access_is_not_retried() -> anyhow::Result<()> {
    let appliance = ScriptedAppliance::new()
        .with_group(GROUP, "Test1_CG", standard_copies(GROUP, "Test1_CG"))
        .reject(MutationKind::EnableImageAccess, 1, 409, "conflict");
    let settings = settings(5);

    let report = AccessStateController::new(&appliance, &settings)
        .run("Test1_CG", &test_copy(), Direction::Enable)
        .await?;

    let TransitionStatus::Failed { error } = &report.status else {
        panic!("expected failure, got {:?}", report.status);
    };
    assert_eq!(error.phase, TransitionPhase::ImageAccessEnabling);
    assert_eq!(error.attempts, 1);
    assert_eq!(
        appliance.mutation_kinds(GROUP),
        vec![MutationKind::EnableImageAccess]
    );
    assert_eq!(appliance.copy_reads(GROUP), 0);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn disable_polls_flag_only_and_resumes_transfer() -> anyhow::Result<()> {
    let accessed = accessed_copy(GROUP, 2, "TC_Test1_CG");
    let appliance = ScriptedAppliance::new()
        .with_group(GROUP, "Test1_CG", vec![accessed.clone()])
        .settle_after(2);
    let settings = settings(5);

    let report = AccessStateController::new(&appliance, &settings)
        .run("Test1_CG", &accessed, Direction::Disable)
        .await?;

    assert_eq!(report.status, TransitionStatus::Succeeded { simulated: false });
    assert_eq!(
        report.polls,
        vec![PollResult {
            target: PollTarget::ImageAccess,
            attempts: 2,
            converged: true,
        }]
    );
    assert_eq!(
        report.phases,
        vec![
            TransitionPhase::Idle,
            TransitionPhase::ImageAccessDisabling,
            TransitionPhase::ImageAccessPolling,
            TransitionPhase::TransferStarting,
            TransitionPhase::Done,
        ]
    );
    assert_eq!(
        appliance.mutation_kinds(GROUP),
        vec![MutationKind::DisableImageAccess, MutationKind::StartTransfer]
    );
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn transport_failure_while_polling_is_returned() {
    let appliance = ScriptedAppliance::new()
        .with_group(GROUP, "Test1_CG", standard_copies(GROUP, "Test1_CG"))
        .fail_reads(GROUP, ReadFailure::Transport);
    let settings = settings(5);

    let err = AccessStateController::new(&appliance, &settings)
        .run("Test1_CG", &test_copy(), Direction::Enable)
        .await
        .expect_err("unreachable appliance must surface");
    assert!(err.is_transport());
    assert_eq!(
        appliance.mutation_kinds(GROUP),
        vec![MutationKind::EnableImageAccess]
    );
}
