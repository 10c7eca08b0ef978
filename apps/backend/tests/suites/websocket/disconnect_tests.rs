// Disconnect and teardown tests

use std::time::Duration;

use serde_json::json;

use crate::support::websocket::{offline_app_state, start_test_server, wait_for_connections};
use crate::support::websocket_client::WebSocketClient;

#[tokio::test]
async fn closing_a_socket_removes_the_player_from_the_roster(
) -> Result<(), Box<dyn std::error::Error>> {
    let (state, hub) = offline_app_state(2);
    let (server_handle, addr, server_join) = start_test_server(state).await?;
    let ws_url = format!("ws://{addr}/ws");

    let mut ada = WebSocketClient::connect_retry(&ws_url, Duration::from_secs(1)).await?;
    ada.send(&json!({"type": "create_room", "player_name": "Ada"}))
        .await?;
    let created = ada.recv_event("room_created").await?;
    let room_code = created["room_code"].as_str().unwrap().to_string();
    ada.recv_event("players_updated").await?;

    let mut grace = WebSocketClient::connect_retry(&ws_url, Duration::from_secs(1)).await?;
    grace
        .send(&json!({"type": "join_room", "room_code": room_code, "player_name": "Grace"}))
        .await?;
    grace.recv_event("room_joined").await?;
    grace.recv_event("players_updated").await?;
    ada.recv_event("players_updated").await?;

    grace.close().await?;

    let roster = ada.recv_event("players_updated").await?;
    let players = roster["players"].as_array().unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0]["name"], "Ada");

    wait_for_connections(&hub, &room_code, 1, Duration::from_secs(2)).await?;

    ada.close().await?;
    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}

/// A dropped connection must never hold a round open: when the only player
/// yet to submit disconnects, the remaining players get the next round.
#[tokio::test]
async fn disconnect_of_the_last_nonsubmitter_advances_the_round(
) -> Result<(), Box<dyn std::error::Error>> {
    let (state, hub) = offline_app_state(2);
    let (server_handle, addr, server_join) = start_test_server(state).await?;
    let ws_url = format!("ws://{addr}/ws");

    let mut ada = WebSocketClient::connect_retry(&ws_url, Duration::from_secs(1)).await?;
    ada.send(&json!({"type": "create_room", "player_name": "Ada"}))
        .await?;
    let created = ada.recv_event("room_created").await?;
    let room_code = created["room_code"].as_str().unwrap().to_string();
    ada.recv_event("players_updated").await?;

    let mut grace = WebSocketClient::connect_retry(&ws_url, Duration::from_secs(1)).await?;
    grace
        .send(&json!({"type": "join_room", "room_code": room_code, "player_name": "Grace"}))
        .await?;
    grace.recv_event("room_joined").await?;
    grace.recv_event("players_updated").await?;
    ada.recv_event("players_updated").await?;

    let mut lin = WebSocketClient::connect_retry(&ws_url, Duration::from_secs(1)).await?;
    lin.send(&json!({"type": "join_room", "room_code": room_code, "player_name": "Lin"}))
        .await?;
    lin.recv_event("room_joined").await?;
    lin.recv_event("players_updated").await?;
    ada.recv_event("players_updated").await?;
    grace.recv_event("players_updated").await?;

    ada.send(&json!({"type": "start_game"})).await?;
    for client in [&mut ada, &mut grace, &mut lin] {
        client.recv_event("game_started").await?;
    }

    ada.send(&json!({"type": "submit_sentence", "sentence": "One"}))
        .await?;
    for client in [&mut ada, &mut grace, &mut lin] {
        client.recv_event("submission_received").await?;
    }
    grace
        .send(&json!({"type": "submit_sentence", "sentence": "Two"}))
        .await?;
    for client in [&mut ada, &mut grace, &mut lin] {
        let received = client.recv_event("submission_received").await?;
        assert_eq!(received["submissions_count"], 2);
        assert_eq!(received["total_players"], 3);
    }

    lin.close().await?;

    for client in [&mut ada, &mut grace] {
        let roster = client.recv_event("players_updated").await?;
        assert_eq!(roster["players"].as_array().unwrap().len(), 2);

        let next = client.recv_event("next_round").await?;
        assert_eq!(next["round"], 2);
        let prompt = next["last_sentence"].as_str().unwrap();
        assert!(prompt == "One" || prompt == "Two");
    }

    wait_for_connections(&hub, &room_code, 2, Duration::from_secs(2)).await?;

    ada.close().await?;
    grace.close().await?;
    server_handle.stop(true).await;
    let _ = server_join.await;
    Ok(())
}
