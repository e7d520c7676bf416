//! Property tests over randomized plans and decision sequences.

use foreman_core::{
    Backoff, ConversationStatus, Decision, EngineConfig, OutcomeStatus, TaskSpec, TaskStatus,
};
use foreman_engine::{ConversationManager, StaticPlanner};
use foreman_registry::CapabilityRegistry;
use foreman_test_utils::{AlwaysFailsCapability, PingCapability};
use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn manager_for(specs: Vec<TaskSpec>, max_attempts: u32) -> ConversationManager {
    let mut registry = CapabilityRegistry::new();
    registry
        .register("ping", Box::new(PingCapability))
        .expect("fresh registry");
    registry
        .register("always_fails", Box::new(AlwaysFailsCapability))
        .expect("fresh registry");

    let mut config = EngineConfig::default();
    config.retry.max_attempts = max_attempts;
    config.retry.backoff = Backoff::Fixed(Duration::ZERO);

    ConversationManager::new(
        Arc::new(registry),
        Arc::new(StaticPlanner::new(specs)),
        config,
    )
    .expect("valid config")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Whatever the plan shape and decisions, every conversation ends
    /// closed, every task terminal, and the outcome matches the task tally.
    /// The trace only ever grows.
    #[test]
    fn prop_lifecycle_always_terminates(
        goal in foreman_test_utils::strategies::arb_goal(),
        plan in prop::collection::vec(prop::bool::ANY, 1..6),
        max_attempts in 1u32..4,
    ) {
        let specs: Vec<TaskSpec> = plan
            .iter()
            .map(|&succeeds| {
                let capability = if succeeds { "ping" } else { "always_fails" };
                TaskSpec::new(capability, json!({}))
            })
            .collect();
        let expected_failures = plan.iter().filter(|&&s| !s).count();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .expect("runtime");
        runtime.block_on(async {
            let manager = manager_for(specs, max_attempts);
            let conversation_id = manager.start(&goal).await.unwrap();

            // Deny every escalation until the conversation settles
            let mut trace_len = 0usize;
            loop {
                let snapshot = manager.status(conversation_id).unwrap();
                prop_assert!(snapshot.messages.len() >= trace_len);
                trace_len = snapshot.messages.len();

                if snapshot.conversation.status == ConversationStatus::Closed {
                    break;
                }
                let escalated = snapshot
                    .tasks
                    .iter()
                    .find(|t| t.status == TaskStatus::Escalated)
                    .expect("non-closed conversation has an escalated task");
                manager
                    .decide(escalated.task_id, Decision::Deny)
                    .await
                    .unwrap();
            }

            let snapshot = manager.status(conversation_id).unwrap();
            prop_assert!(snapshot.tasks.iter().all(|t| t.is_terminal()));

            let failed = snapshot
                .tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Failed)
                .count();
            prop_assert_eq!(failed, expected_failures);

            let outcome = snapshot.conversation.outcome.clone().unwrap();
            let expected = if failed == 0 {
                OutcomeStatus::Success
            } else if failed == snapshot.tasks.len() {
                OutcomeStatus::Failure
            } else {
                OutcomeStatus::Partial
            };
            prop_assert_eq!(outcome.status, expected);
            Ok(())
        })?;
    }
}
