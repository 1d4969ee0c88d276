// tests/dispatcher_tests.rs
//
// Exercises the dispatcher contract end to end: gate order, fallthrough,
// cooldown arming and the three-way handler disposition.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Duration as Delta;

use murmelbot_common::models::permission::Permission;
use murmelbot_common::traits::repository_traits::ChannelStateRepository;
use murmelbot_core::dispatch::{
    CommandEvent, DispatchOutcome, Dispatcher, Disposition, Rule, RuleHandler,
};
use murmelbot_core::repositories::{
    MemoryChannelStateRepository, MemoryUserRepository, MemoryVoicemailRepository,
};
use murmelbot_core::settings::BotSettings;
use murmelbot_core::test_utils::{context_for, RecordingChat};
use murmelbot_core::Error;

/// Replies with a fixed string and reports `Handled`.
struct Reply(&'static str);

#[async_trait]
impl RuleHandler for Reply {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        event.say(self.0).await?;
        Ok(Disposition::Handled)
    }
}

/// Announces itself, then defers to later rules.
struct Defer(&'static str);

#[async_trait]
impl RuleHandler for Defer {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        event.say(self.0).await?;
        Ok(Disposition::Skip)
    }
}

struct Fail;

#[async_trait]
impl RuleHandler for Fail {
    async fn run(&self, _event: &mut CommandEvent) -> Result<Disposition, Error> {
        Err(Error::Handler("upstream exploded".into()))
    }
}

/// Replies with capture group 1.
struct EchoGroup;

#[async_trait]
impl RuleHandler for EchoGroup {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        let group = event.group(1).to_string();
        event.say(&group).await?;
        Ok(Disposition::Handled)
    }
}

/// Wakes the channel up through the state collaborator.
struct Wake;

#[async_trait]
impl RuleHandler for Wake {
    async fn run(&self, event: &mut CommandEvent) -> Result<Disposition, Error> {
        event.channels.set_sleeping(&event.ctx.channel, false).await?;
        event.say("rise and shine").await?;
        Ok(Disposition::Handled)
    }
}

struct Fixture {
    chat: Arc<RecordingChat>,
    channels: Arc<MemoryChannelStateRepository>,
    dispatcher: Dispatcher,
}

fn fixture(rules: Vec<Rule>) -> Fixture {
    let chat = RecordingChat::new();
    let channels = Arc::new(MemoryChannelStateRepository::new());
    let dispatcher = Dispatcher::new(
        rules,
        chat.clone(),
        channels.clone(),
        Arc::new(MemoryUserRepository::new()),
        Arc::new(MemoryVoicemailRepository::new()),
        Arc::new(BotSettings::for_tests()),
    )
    .expect("valid rule set");
    Fixture {
        chat,
        channels,
        dispatcher,
    }
}

fn handled_by(outcome: &DispatchOutcome) -> Option<&str> {
    match outcome {
        DispatchOutcome::Handled { rule } => Some(rule.as_str()),
        _ => None,
    }
}

#[tokio::test]
async fn ping_message_is_handled_once() {
    // Scenario: `~ping` from an awake channel gets exactly one reply.
    let f = fixture(vec![Rule::builder("ping")
        .pattern("^~ping")
        .build(Arc::new(Reply("pong")))
        .unwrap()]);

    let ctx = context_for("chan", "ada", "~ping");
    let outcome = f.dispatcher.evaluate(&ctx).await;

    assert_eq!(handled_by(&outcome), Some("ping"));
    assert_eq!(f.chat.sent_to("chan"), vec!["pong"]);
}

#[tokio::test]
async fn permission_gate_moves_on_silently() {
    // Scenario: a subscriber pokes a moderator-only rule. The sender gets
    // no feedback and evaluation continues to later rules.
    let f = fixture(vec![
        Rule::builder("modonly")
            .pattern("^~sleep")
            .permission(Permission::Moderator)
            .build(Arc::new(Reply("mods only")))
            .unwrap(),
        Rule::builder("fallback")
            .pattern("^~sleep")
            .build(Arc::new(Reply("caught by fallback")))
            .unwrap(),
    ]);

    let mut ctx = context_for("chan", "ada", "~sleep");
    ctx.permission = Permission::Subscriber;
    let outcome = f.dispatcher.evaluate(&ctx).await;

    assert_eq!(handled_by(&outcome), Some("fallback"));
    assert_eq!(f.chat.sent_to("chan"), vec!["caught by fallback"]);
}

#[tokio::test]
async fn rejected_rule_alone_leaves_message_unhandled() {
    let f = fixture(vec![Rule::builder("modonly")
        .pattern("^~sleep")
        .permission(Permission::Moderator)
        .build(Arc::new(Reply("mods only")))
        .unwrap()]);

    let mut ctx = context_for("chan", "ada", "~sleep");
    ctx.permission = Permission::Subscriber;
    let outcome = f.dispatcher.evaluate(&ctx).await;

    assert!(matches!(outcome, DispatchOutcome::Unhandled));
    assert!(f.chat.sent().is_empty());
}

#[tokio::test]
async fn user_cooldown_blocks_then_releases() {
    // Scenario: 30 s user cooldown. Fires at t=0, is rejected at t=10,
    // fires again at t=31.
    let f = fixture(vec![Rule::builder("slow")
        .pattern("^~slow")
        .user_cooldown(Duration::from_secs(30))
        .build(Arc::new(Reply("ok")))
        .unwrap()]);

    let ctx = context_for("chan", "ada", "~slow");
    assert!(f.dispatcher.evaluate(&ctx).await.is_handled());

    let mut again = ctx.clone();
    again.timestamp = ctx.timestamp + Delta::seconds(10);
    assert!(matches!(
        f.dispatcher.evaluate(&again).await,
        DispatchOutcome::Unhandled
    ));

    let mut later = ctx.clone();
    later.timestamp = ctx.timestamp + Delta::seconds(31);
    assert!(f.dispatcher.evaluate(&later).await.is_handled());

    assert_eq!(f.chat.sent_to("chan"), vec!["ok", "ok"]);
}

#[tokio::test]
async fn cooldowns_are_per_rule_not_shared() {
    let f = fixture(vec![
        Rule::builder("first")
            .pattern("^~first")
            .user_cooldown(Duration::from_secs(30))
            .build(Arc::new(Reply("one")))
            .unwrap(),
        Rule::builder("second")
            .pattern("^~second")
            .user_cooldown(Duration::from_secs(30))
            .build(Arc::new(Reply("two")))
            .unwrap(),
    ]);

    assert!(f
        .dispatcher
        .evaluate(&context_for("chan", "ada", "~first"))
        .await
        .is_handled());
    // firing the first rule must not throttle the second
    assert!(f
        .dispatcher
        .evaluate(&context_for("chan", "ada", "~second"))
        .await
        .is_handled());
}

#[tokio::test]
async fn global_cooldown_spans_channels_and_users() {
    let f = fixture(vec![Rule::builder("global")
        .pattern("^~global")
        .global_cooldown(Duration::from_secs(30))
        .build(Arc::new(Reply("ok")))
        .unwrap()]);

    assert!(f
        .dispatcher
        .evaluate(&context_for("chan", "ada", "~global"))
        .await
        .is_handled());

    let mut other = context_for("elsewhere", "grace", "~global");
    other.timestamp += Delta::seconds(5);
    assert!(matches!(
        f.dispatcher.evaluate(&other).await,
        DispatchOutcome::Unhandled
    ));
}

#[tokio::test]
async fn skip_falls_through_and_arms_no_cooldown() {
    // The deferring rule runs on both passes; a recorded cooldown would
    // gate it out of the second one.
    let f = fixture(vec![
        Rule::builder("generic")
            .pattern("^~go")
            .user_cooldown(Duration::from_secs(30))
            .build(Arc::new(Defer("deferring")))
            .unwrap(),
        Rule::builder("specific")
            .pattern("^~go")
            .build(Arc::new(Reply("handled")))
            .unwrap(),
    ]);

    let ctx = context_for("chan", "ada", "~go");
    let outcome = f.dispatcher.evaluate(&ctx).await;
    assert_eq!(handled_by(&outcome), Some("specific"));

    let mut again = ctx.clone();
    again.timestamp += Delta::seconds(5);
    let outcome = f.dispatcher.evaluate(&again).await;
    assert_eq!(handled_by(&outcome), Some("specific"));

    assert_eq!(
        f.chat.sent_to("chan"),
        vec!["deferring", "handled", "deferring", "handled"]
    );
}

#[tokio::test]
async fn handler_error_stops_the_loop_and_arms_no_cooldown() {
    let f = fixture(vec![
        Rule::builder("boom")
            .pattern("^~x")
            .user_cooldown(Duration::from_secs(30))
            .build(Arc::new(Fail))
            .unwrap(),
        Rule::builder("after")
            .pattern("^~x")
            .build(Arc::new(Reply("never")))
            .unwrap(),
    ]);

    let ctx = context_for("chan", "ada", "~x");
    match f.dispatcher.evaluate(&ctx).await {
        DispatchOutcome::Failed { rule, .. } => assert_eq!(rule, "boom"),
        other => panic!("expected Failed, got {other:?}"),
    }
    assert!(f.chat.sent().is_empty());

    // no cooldown was recorded, so the same rule fails again instead of
    // being gated out
    let mut again = ctx.clone();
    again.timestamp += Delta::seconds(5);
    assert!(matches!(
        f.dispatcher.evaluate(&again).await,
        DispatchOutcome::Failed { .. }
    ));
}

#[tokio::test]
async fn sleep_gate_and_override() {
    let f = fixture(vec![
        Rule::builder("wake")
            .pattern("^~wake up")
            .permission(Permission::Moderator)
            .sleep_override()
            .build(Arc::new(Wake))
            .unwrap(),
        Rule::builder("echo")
            .pattern(".*")
            .build(Arc::new(Reply("echo")))
            .unwrap(),
    ]);
    f.channels.set_sleeping("chan", true).await.unwrap();

    // non-override rule never fires while sleeping
    let mut ctx = context_for("chan", "ada", "hello there");
    ctx.sleeping = true;
    assert!(matches!(
        f.dispatcher.evaluate(&ctx).await,
        DispatchOutcome::Unhandled
    ));

    // the override rule fires regardless and flips the flag
    let mut wake_ctx = context_for("chan", "mia", "~wake up");
    wake_ctx.sleeping = true;
    wake_ctx.permission = Permission::Moderator;
    assert_eq!(handled_by(&f.dispatcher.evaluate(&wake_ctx).await), Some("wake"));
    assert!(!f.channels.is_sleeping("chan").await.unwrap());

    // a context built before the wake still carries the old snapshot;
    // only the next message sees the channel awake
    let mut stale = context_for("chan", "ada", "hello again");
    stale.sleeping = true;
    assert!(matches!(
        f.dispatcher.evaluate(&stale).await,
        DispatchOutcome::Unhandled
    ));

    let fresh = context_for("chan", "ada", "hello again");
    assert_eq!(handled_by(&f.dispatcher.evaluate(&fresh).await), Some("echo"));
}

#[tokio::test]
async fn permission_lattice_sweep() {
    let lattice = [
        Permission::Everyone,
        Permission::Subscriber,
        Permission::Regular,
        Permission::Moderator,
        Permission::Broadcaster,
        Permission::Owner,
    ];

    for required in lattice {
        for held in lattice {
            let f = fixture(vec![Rule::builder("gated")
                .pattern("^~go")
                .permission(required)
                .build(Arc::new(Reply("ran")))
                .unwrap()]);

            let mut ctx = context_for("chan", "ada", "~go");
            ctx.permission = held;
            let outcome = f.dispatcher.evaluate(&ctx).await;

            assert_eq!(
                outcome.is_handled(),
                held >= required,
                "required={required}, held={held}"
            );
        }
    }
}

#[tokio::test]
async fn first_matching_pattern_feeds_the_handler() {
    let f = fixture(vec![Rule::builder("echo")
        .pattern(r"^~say (\w+)$")
        .pattern(r"^please say (\w+)$")
        .build(Arc::new(EchoGroup))
        .unwrap()]);

    assert!(f
        .dispatcher
        .evaluate(&context_for("chan", "ada", "please say hello"))
        .await
        .is_handled());
    assert_eq!(f.chat.sent_to("chan"), vec!["hello"]);
}

#[tokio::test]
async fn unmatched_messages_are_left_unhandled() {
    let f = fixture(vec![Rule::builder("ping")
        .pattern("^~ping")
        .build(Arc::new(Reply("pong")))
        .unwrap()]);

    assert!(matches!(
        f.dispatcher.evaluate(&context_for("chan", "ada", "just chatting")).await,
        DispatchOutcome::Unhandled
    ));
    assert!(f.chat.sent().is_empty());
}

#[tokio::test]
async fn duplicate_rule_names_are_rejected_at_boot() {
    let rules = vec![
        Rule::builder("twin").pattern("^a").build(Arc::new(Reply("a"))).unwrap(),
        Rule::builder("twin").pattern("^b").build(Arc::new(Reply("b"))).unwrap(),
    ];
    let result = Dispatcher::new(
        rules,
        RecordingChat::new(),
        Arc::new(MemoryChannelStateRepository::new()),
        Arc::new(MemoryUserRepository::new()),
        Arc::new(MemoryVoicemailRepository::new()),
        Arc::new(BotSettings::for_tests()),
    );
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn directory_toggles_apply_to_the_next_evaluation() {
    let f = fixture(vec![Rule::builder("ping")
        .pattern("^~ping")
        .build(Arc::new(Reply("pong")))
        .unwrap()]);
    let directory = f.dispatcher.directory();

    assert!(f.dispatcher.evaluate(&context_for("chan", "ada", "~ping")).await.is_handled());

    assert!(directory.set_enabled("ping", false));
    assert!(matches!(
        f.dispatcher.evaluate(&context_for("chan", "ada", "~ping")).await,
        DispatchOutcome::Unhandled
    ));

    assert!(directory.set_enabled("ping", true));
    assert!(directory.set_disabled_in("ping", "chan", true));
    assert!(matches!(
        f.dispatcher.evaluate(&context_for("chan", "ada", "~ping")).await,
        DispatchOutcome::Unhandled
    ));
    assert!(f.dispatcher.evaluate(&context_for("elsewhere", "ada", "~ping")).await.is_handled());
}
