use super::{
    system_prompt, ChatMessage, ChatTransport, CompletionsTransport, Conversation, RelayTransport,
    Role, EMPTY_REPLY, FALLBACK_REPLY, GREETING,
};
use crate::error::{Error, Result};
use std::cell::RefCell;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Records every payload and answers with a fixed outcome.
struct FakeTransport {
    reply: std::result::Result<String, u16>,
    seen: RefCell<Vec<Vec<ChatMessage>>>,
}

impl FakeTransport {
    fn answering(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl ChatTransport for FakeTransport {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        self.seen.borrow_mut().push(messages.to_vec());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(code) => Err(Error::Chat {
                status: Some(*code),
                reason: format!("HTTP {code}"),
            }),
        }
    }
}

#[test]
fn test_new_conversation_holds_greeting() {
    let convo = Conversation::default();
    assert_eq!(convo.messages, vec![ChatMessage::new(Role::Assistant, GREETING)]);
    assert!(!convo.is_loading);
    assert!(convo.is_fresh());
}

#[test]
fn test_begin_builds_system_then_history() {
    let mut convo = Conversation::new(10);
    let payload = convo
        .begin("¿Qué es el amparo?", Some("ARTÍCULO 43.- Toda persona"))
        .unwrap();

    assert!(convo.is_loading);
    assert_eq!(payload.len(), 3);
    assert_eq!(payload[0].role, Role::System);
    assert!(payload[0].content.ends_with("ARTÍCULO 4..."));
    assert_eq!(payload[1], ChatMessage::new(Role::Assistant, GREETING));
    assert_eq!(payload[2], ChatMessage::new(Role::User, "¿Qué es el amparo?"));
    assert_eq!(convo.messages.len(), 2);
}

#[test]
fn test_blank_input_is_ignored() {
    let mut convo = Conversation::default();
    assert!(convo.begin("   ", None).is_none());
    assert!(!convo.is_loading);
    assert_eq!(convo.messages.len(), 1);
}

#[test]
fn test_overlapping_request_is_refused() {
    let mut convo = Conversation::default();
    assert!(convo.begin("primera", None).is_some());
    assert!(convo.begin("segunda", None).is_none());
    assert_eq!(convo.messages.len(), 2);
}

#[test]
fn test_failure_appends_one_fallback_and_clears_loading() {
    let transport = FakeTransport::failing(429);
    let mut convo = Conversation::default();

    assert!(convo.submit("¿Puedo manifestarme?", Some("texto"), &transport));

    assert!(!convo.is_loading);
    assert_eq!(convo.messages.len(), 3);
    assert_eq!(
        convo.messages.last(),
        Some(&ChatMessage::new(Role::Assistant, FALLBACK_REPLY))
    );
    assert_eq!(transport.seen.borrow().len(), 1);
}

#[test]
fn test_successful_reply_is_recorded() {
    let transport = FakeTransport::answering("Sí, el artículo 14 lo garantiza.");
    let mut convo = Conversation::default();

    convo.submit("¿Puedo publicar mis ideas?", None, &transport);

    assert_eq!(
        convo.messages.last().map(|m| m.content.as_str()),
        Some("Sí, el artículo 14 lo garantiza.")
    );

    convo.submit("¿Y sin censura?", None, &transport);
    let seen = transport.seen.borrow();
    assert_eq!(seen[1].len(), 1 + 4, "system plus full prior history");
}

#[test]
fn test_empty_reply_uses_placeholder() {
    let transport = FakeTransport::answering("  ");
    let mut convo = Conversation::default();
    convo.submit("hola", None, &transport);
    assert_eq!(convo.messages.last().map(|m| m.content.as_str()), Some(EMPTY_REPLY));
}

#[test]
fn test_system_prompt_truncates_by_characters() {
    let prompt = system_prompt(Some("ñandú y más"), 5);
    assert!(prompt.ends_with("ñandú..."));
    assert!(system_prompt(None, 5).ends_with("\n..."));
}

#[test]
fn test_roles_serialize_lowercase() {
    let json = serde_json::to_string(&ChatMessage::new(Role::Assistant, "x")).unwrap();
    assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
}

/// Answer one HTTP request with `status` and `body`; the handle yields the raw request.
fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/api/chat", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request = String::new();
        let mut length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line.trim().is_empty() {
                break;
            }
            if let Some(value) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                length = value.trim().parse().unwrap();
            }
            request.push_str(&line);
        }
        let mut payload = vec![0; length];
        reader.read_exact(&mut payload).unwrap();
        stream.write_all(response.as_bytes()).unwrap();
        request.push_str(&String::from_utf8(payload).unwrap());
        request
    });
    (url, handle)
}

fn question() -> Vec<ChatMessage> {
    vec![ChatMessage::new(Role::User, "¿Qué es el amparo?")]
}

#[test]
fn test_relay_posts_messages_and_reads_content() {
    let (url, server) = serve_once("200 OK", r#"{"content":"hola"}"#);
    let transport = RelayTransport::new(url, TIMEOUT);

    assert_eq!(transport.complete(&question()).unwrap(), "hola");

    let request = server.join().unwrap();
    assert!(request.starts_with("POST /api/chat"));
    assert!(request.contains(r#"{"messages":[{"role":"user","content":"¿Qué es el amparo?"}]}"#));
    assert!(!request.contains("Authorization"));
}

#[test]
fn test_relay_error_status_is_a_chat_error() {
    let (url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#);
    let transport = RelayTransport::new(url, TIMEOUT);

    let result = transport.complete(&question());
    server.join().unwrap();
    assert!(matches!(result, Err(Error::Chat { status: Some(500), .. })));
}

#[test]
fn test_relay_malformed_body_is_an_error() {
    let (url, server) = serve_once("200 OK", "no es json");
    let transport = RelayTransport::new(url, TIMEOUT);

    let result = transport.complete(&question());
    server.join().unwrap();
    assert!(matches!(result, Err(Error::Json(_))));
}

#[test]
fn test_relay_missing_content_is_empty_reply() {
    let (url, server) = serve_once("200 OK", "{}");
    let transport = RelayTransport::new(url, TIMEOUT);

    let mut convo = Conversation::default();
    convo.submit("hola", None, &transport);
    server.join().unwrap();
    assert_eq!(convo.messages.last().map(|m| m.content.as_str()), Some(EMPTY_REPLY));
}

#[test]
fn test_completions_sends_model_and_key_and_reads_first_choice() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"respuesta"}},{"message":{"role":"assistant","content":"otra"}}]}"#,
    );
    let transport = CompletionsTransport::new(url, Some("clave".to_string()), "modelo", TIMEOUT)
        .with_sampling(0.5, 256);

    assert_eq!(transport.complete(&question()).unwrap(), "respuesta");

    let request = server.join().unwrap();
    assert!(request.contains("Authorization: Bearer clave"));
    assert!(request.contains(r#""model":"modelo""#));
    assert!(request.contains(r#""temperature":0.5"#));
    assert!(request.contains(r#""max_tokens":256"#));
}

#[test]
fn test_completions_without_choices_is_empty() {
    let (url, server) = serve_once("200 OK", r#"{"choices":[]}"#);
    let transport = CompletionsTransport::new(url, None, "modelo", TIMEOUT);

    assert_eq!(transport.complete(&question()).unwrap(), "");
    let request = server.join().unwrap();
    assert!(!request.contains("Authorization"));
}

#[test]
fn test_unreachable_endpoint_has_no_status() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/api/chat", listener.local_addr().unwrap());
    drop(listener);

    let result = RelayTransport::new(url, TIMEOUT).complete(&question());
    assert!(matches!(result, Err(Error::Chat { status: None, .. })));
}
