#![cfg(test)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockall::mock;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{basic_auth, body_string_contains, method, path, query_param},
};

use linkbot::{
    base::{
        config::{BackendKind, BotDefinition, Credentials},
        logging::LogControl,
        types::Void,
    },
    bot::{BotRegistry, LinkBot},
    interaction::{link_event, slash_command::SlashCommand},
    service::chat::{ChatClient, GenericChatClient},
};

// Mocks.

// Mock chat client for testing.

mock! {
    pub Chat {}

    #[async_trait]
    impl GenericChatClient for Chat {
        fn bot_user_id(&self) -> &str;
        async fn start(&self) -> Void;
        async fn send_message(&self, channel_id: &str, text: &str) -> Void;
    }
}

/// A chat client that records every message it is asked to send.
fn recording_chat(sent: Arc<Mutex<Vec<(String, String)>>>) -> ChatClient {
    let mut mock = MockChat::new();

    mock.expect_bot_user_id().return_const("U12345".to_string());
    mock.expect_start().returning(|| Ok(()));
    mock.expect_send_message().returning(move |channel_id, text| {
        sent.lock().unwrap().push((channel_id.to_string(), text.to_string()));
        Ok(())
    });

    ChatClient::new(Arc::new(mock))
}

const IDP: &str = "https://idp.example.com/";

const LOGIN_PAGE: &str = r#"
    <html><body>
        <form action="/idp/sso" method="post">
            <input type="hidden" name="csrf_token" value="abc123">
            <input type="text" name="j_username">
            <input type="password" name="j_password">
        </form>
    </body></html>
"#;

fn quiet_bot(definition: &BotDefinition, idp_url: &str) -> LinkBot {
    let bot = LinkBot::new(definition, idp_url).expect("bot should build");
    bot.quips().set_enabled(false);

    bot
}

#[tokio::test]
async fn service_record_mention_gets_an_enriched_reply() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/now/table/incident"))
        .and(query_param("sysparm_query", "number=INC0010023"))
        .and(basic_auth("svc-linkbot", "hunter2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": [{
                "short_description": "disk full on db01",
                "number": "INC0010023",
                "parent": "",
                "state": "Open",
                "assigned_to": { "display_value": "Jane Doe", "link": "https://x" },
                "opened_by": "Sam",
                "sys_updated_on": "2024-03-01 13:37:42",
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let definition = BotDefinition {
        backend: BackendKind::ServiceNow,
        host: Some(server.uri()),
        auth: Some(Credentials {
            username: "svc-linkbot".to_string(),
            password: "hunter2".to_string(),
        }),
        ..Default::default()
    };
    let registry = BotRegistry::new(vec![quiet_bot(&definition, IDP)]).expect("registry should build");

    let sent = Arc::new(Mutex::new(Vec::new()));
    let chat = recording_chat(sent.clone());

    link_event::handle_message_internal("ugh, can someone look at INC0010023 please?", "C01TEST", &registry, &chat)
        .await
        .expect("handling should succeed");

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);

    let (channel, text) = &sent[0];
    assert_eq!(channel, "C01TEST");
    assert!(text.starts_with(&format!(
        "<{}/incident.do?sysparm_table=incident&sysparm_query=number%3DINC0010023|INC0010023>",
        server.uri()
    )));
    assert!(text.contains("\n> disk full on db01"));
    assert!(text.contains("*State* Open"));
    assert!(text.contains("*Assigned To* Jane Doe"));
    // The number is the link label, never a body line; the empty parent is dropped.
    assert!(!text.contains("*Number*"));
    assert!(!text.contains("*Parent*"));
}

#[tokio::test]
async fn issue_mention_gets_an_enriched_reply() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/latest/issue/ABC-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "fields": {
                "summary": "Fix the flaky test",
                "reporter": { "displayName": "Ada Lovelace" },
                "assignee": null,
                "status": { "name": "In Progress" },
                "updated": "2024-03-01T13:37:42.000+0000",
            }
        })))
        .mount(&server)
        .await;

    let definition = BotDefinition {
        backend: BackendKind::Jira,
        host: Some(server.uri()),
        ..Default::default()
    };
    let registry = BotRegistry::new(vec![quiet_bot(&definition, IDP)]).expect("registry should build");

    let sent = Arc::new(Mutex::new(Vec::new()));
    let chat = recording_chat(sent.clone());

    link_event::handle_message_internal("ABC-123 is failing again", "C01TEST", &registry, &chat)
        .await
        .expect("handling should succeed");

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].1,
        format!(
            "<{uri}/browse/ABC-123|ABC-123>\n> Fix the flaky test\n> *Reporter* Ada Lovelace\n> *Assignee* None\n> *Status* In Progress\n> *Last Update* 2024-03-01 13:37:42",
            uri = server.uri()
        )
    );
}

#[tokio::test]
async fn missing_records_are_skipped_without_suppressing_other_replies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/latest/issue/ABC-404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/latest/issue/ABC-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "fields": { "summary": "Still here" }
        })))
        .mount(&server)
        .await;

    let definition = BotDefinition {
        backend: BackendKind::Jira,
        host: Some(server.uri()),
        ..Default::default()
    };
    let registry = BotRegistry::new(vec![quiet_bot(&definition, IDP)]).expect("registry should build");

    let sent = Arc::new(Mutex::new(Vec::new()));
    let chat = recording_chat(sent.clone());

    link_event::handle_message_internal("ABC-404 relates to ABC-123", "C01TEST", &registry, &chat)
        .await
        .expect("handling should succeed");

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("ABC-123"));
}

#[tokio::test]
async fn lookup_signs_in_through_the_identity_provider_once() {
    let server = MockServer::start().await;
    let idp_url = format!("{}/idp", server.uri());

    // The first hit on the issue API bounces to the sign-in page.
    Mock::given(method("GET"))
        .and(path("/rest/api/latest/issue/SEC-111"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/idp/login"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/latest/issue/SEC-111"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "fields": { "summary": "Rotate the signing key" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/idp/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(&server)
        .await;
    // A completed sign-in sends the session back to where it was headed.
    Mock::given(method("POST"))
        .and(path("/idp/sso"))
        .and(body_string_contains("j_username=jdoe"))
        .and(body_string_contains("j_password=hunter2"))
        .and(body_string_contains("csrf_token=abc123"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/rest/api/latest/issue/SEC-111"))
        .expect(1)
        .mount(&server)
        .await;

    let definition = BotDefinition {
        backend: BackendKind::Jira,
        match_pattern: Some("SEC-[0-9]+".to_string()),
        host: Some(server.uri()),
        auth: Some(Credentials {
            username: "jdoe".to_string(),
            password: "hunter2".to_string(),
        }),
        ..Default::default()
    };
    let bot = quiet_bot(&definition, &idp_url);

    let reply = bot.message("SEC-111").await.expect("sign-in should succeed");

    assert!(reply.contains("Rotate the signing key"));
}

#[tokio::test]
async fn repeated_sign_in_bounces_become_an_error() {
    let server = MockServer::start().await;
    let idp_url = format!("{}/idp", server.uri());

    Mock::given(method("GET"))
        .and(path("/rest/api/latest/issue/SEC-222"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/idp/login"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/idp/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .mount(&server)
        .await;
    // The sign-in page keeps coming back, so the attempt bound trips.
    Mock::given(method("POST"))
        .and(path("/idp/sso"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOGIN_PAGE))
        .expect(2)
        .mount(&server)
        .await;

    let definition = BotDefinition {
        backend: BackendKind::Jira,
        match_pattern: Some("SEC-[0-9]+".to_string()),
        host: Some(server.uri()),
        auth: Some(Credentials {
            username: "jdoe".to_string(),
            password: "wrong".to_string(),
        }),
        ..Default::default()
    };
    let bot = quiet_bot(&definition, &idp_url);

    let err = bot.message("SEC-222").await.expect_err("sign-in should fail");

    assert!(!err.is_not_found());
    assert!(err.to_string().contains("identity provider"));
}

#[tokio::test]
async fn quips_off_command_strips_quips_from_replies() {
    let definition = BotDefinition {
        match_pattern: Some("KB[0-9]+".to_string()),
        link: Some("<https://wiki.example.com/{}|{}>".to_string()),
        ..Default::default()
    };
    let bot = LinkBot::new(&definition, IDP).expect("bot should build");
    let registry = BotRegistry::new(vec![bot]).expect("registry should build");
    let control = SlashCommand::new(registry.clone(), LogControl::noop(false));

    assert_eq!(control.dispatch("quips off"), "Linkbot turned off quips");

    let sent = Arc::new(Mutex::new(Vec::new()));
    let chat = recording_chat(sent.clone());

    link_event::handle_message_internal("see KB0012345", "C01TEST", &registry, &chat)
        .await
        .expect("handling should succeed");

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1, "<https://wiki.example.com/KB0012345|KB0012345>");
}
