//! End-to-end chat flows against the hub and dispatcher.
//!
//! These drive real sessions' logic through in-memory mailboxes: joins,
//! collisions, broadcasts, silencing, banning, and the length cap. The SSH
//! layer stays out of the picture; the connection handler only ferries bytes
//! and executes the effects asserted on here.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use wardroom_core::{style::color_string, MemberProfile};
use wardroom_server::{
    session::{handle_line, SessionEffect},
    Hub,
};

fn profile(name: &str, color: &str) -> MemberProfile {
    MemberProfile {
        name: name.to_string(),
        color: color.to_string(),
        fingerprint: format!("SHA256:{name}"),
        client_version: format!("SSH-2.0-{name}_client"),
    }
}

fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Ok(line) = rx.try_recv() {
        lines.push(line);
    }
    lines
}

#[tokio::test]
async fn join_and_exit_are_announced_in_order() {
    let hub = Arc::new(Hub::new());
    let (_alice, _, mut rx_alice) = hub.join(profile("alice", "32"));
    let (bob, _, _rx_bob) = hub.join(profile("bob", "33"));

    let effects = handle_line(&hub, bob, "/exit");
    assert_eq!(effects, vec![SessionEffect::CloseChannel]);
    // The channel close tears the session down, which removes the member.
    hub.leave(bob);

    assert_eq!(
        drain(&mut rx_alice),
        vec!["* bob joined. (Total: 2)", "* bob left."]
    );
}

#[tokio::test]
async fn second_connection_with_taken_name_gets_a_suffix() {
    let hub = Arc::new(Hub::new());
    let (_first, name_first, _rx1) = hub.join(profile("alice", "32"));
    let (_second, name_second, _rx2) = hub.join(profile("alice", "33"));

    assert_eq!(name_first, "alice");
    assert_eq!(name_second, "alice1");
    assert_eq!(hub.list(None), vec!["alice", "alice1"]);
}

#[tokio::test]
async fn chat_reaches_everyone_but_the_sender() {
    let hub = Arc::new(Hub::new());
    let (alice, _, mut rx_alice) = hub.join(profile("alice", "32"));
    let (_bob, _, mut rx_bob) = hub.join(profile("bob", "33"));
    drain(&mut rx_alice);

    assert!(handle_line(&hub, alice, "hello").is_empty());

    assert_eq!(drain(&mut rx_bob), vec![format!("{}: hello", color_string("32", "alice"))]);
    assert_eq!(drain(&mut rx_alice), Vec::<String>::new());
}

#[tokio::test(start_paused = true)]
async fn silence_mutes_until_the_deadline_passes() {
    let hub = Arc::new(Hub::new());
    hub.seed_operators(["SHA256:carol".to_string()]);

    let (_alice, _, mut rx_alice) = hub.join(profile("alice", "32"));
    let (bob, _, mut rx_bob) = hub.join(profile("bob", "33"));
    let (carol, _, _rx_carol) = hub.join(profile("carol", "34"));
    drain(&mut rx_alice);
    drain(&mut rx_bob);

    assert!(handle_line(&hub, carol, "/silence bob 1m").is_empty());
    assert_eq!(
        drain(&mut rx_bob),
        vec![format!("-> Silenced for 1m0s by {}.", color_string("34", "carol"))]
    );

    // Muted: bob's message bounces back to bob only.
    handle_line(&hub, bob, "hi");
    assert_eq!(drain(&mut rx_bob), vec!["-> Message rejected."]);
    assert_eq!(drain(&mut rx_alice), Vec::<String>::new());

    // After the deadline the fence simply stops holding.
    tokio::time::advance(Duration::from_secs(61)).await;
    handle_line(&hub, bob, "hi");
    assert_eq!(drain(&mut rx_alice), vec![format!("{}: hi", color_string("33", "bob"))]);
    assert_eq!(drain(&mut rx_bob), Vec::<String>::new());
}

#[tokio::test]
async fn tab_completion_picks_the_last_matching_joiner() {
    let hub = Arc::new(Hub::new());
    let (_a, _, _rx_a) = hub.join(profile("alice", "32"));
    let (_b, _, _rx_b) = hub.join(profile("alan", "33"));
    let (_c, _, _rx_c) = hub.join(profile("bob", "34"));

    assert_eq!(hub.complete("al", 2), Some(("alan".to_string(), 4)));
}

#[tokio::test]
async fn ban_disconnects_and_blocks_reauthentication() {
    let hub = Arc::new(Hub::new());
    hub.seed_operators(["SHA256:carol".to_string()]);

    let (_alice, _, mut rx_alice) = hub.join(profile("alice", "32"));
    let (bob, _, mut rx_bob) = hub.join(profile("bob", "33"));
    let (carol, _, _rx_carol) = hub.join(profile("carol", "34"));
    drain(&mut rx_alice);
    drain(&mut rx_bob);

    let effects = handle_line(&hub, carol, "/ban bob");
    assert_eq!(effects, vec![SessionEffect::Disconnect { member_id: bob }]);
    // The disconnect tears bob's session down.
    hub.leave(bob);

    let carol_colored = color_string("34", "carol");
    assert_eq!(
        drain(&mut rx_bob),
        vec![
            format!("-> Banned by {carol_colored}."),
            format!("* bob was banned by {carol_colored}"),
        ]
    );
    let alice_saw = drain(&mut rx_alice);
    assert!(alice_saw.contains(&format!("* bob was banned by {carol_colored}")));
    assert!(alice_saw.contains(&"* bob left.".to_string()));

    // A reconnect with the same key is refused before any channel exists.
    assert!(hub.is_banned("SHA256:bob"));
}

#[tokio::test]
async fn overlong_message_bounces_to_sender_only() {
    let hub = Arc::new(Hub::new());
    let (alice, _, mut rx_alice) = hub.join(profile("alice", "32"));
    let (_bob, _, mut rx_bob) = hub.join(profile("bob", "33"));
    drain(&mut rx_alice);

    let long_line = "x".repeat(1001);
    handle_line(&hub, alice, &long_line);

    assert_eq!(drain(&mut rx_alice), vec!["-> Message rejected."]);
    assert_eq!(drain(&mut rx_bob), Vec::<String>::new());
}

#[tokio::test]
async fn messages_arrive_in_mailbox_order() {
    let hub = Arc::new(Hub::new());
    let (alice, _, _rx_alice) = hub.join(profile("alice", "32"));
    let (_bob, _, mut rx_bob) = hub.join(profile("bob", "33"));

    for i in 0..5 {
        handle_line(&hub, alice, &format!("msg {i}"));
    }

    let expected: Vec<String> =
        (0..5).map(|i| format!("{}: msg {i}", color_string("32", "alice"))).collect();
    assert_eq!(drain(&mut rx_bob), expected);
}
