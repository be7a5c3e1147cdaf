//! Chat listing, history and management.

use super::{Auth, Client, decode, ensure_success};
use crate::error::{Error, Result};
use crate::transport::Method;
use crate::types::{Chat, CreateChatRequest, Message};

impl Client {
    /// List the chats of the logged-in user (`GET /chats`).
    pub fn chats(&self) -> Result<Vec<Chat>> {
        let response = self.send(Method::Get, "/chats", None, Auth::Bearer)?;
        decode(&ensure_success(response)?)
    }

    /// Fetch the stored messages of `chat_id` (`GET /chats/{id}/messages`).
    pub fn messages(&self, chat_id: i64) -> Result<Vec<Message>> {
        let path = format!("/chats/{chat_id}/messages");
        let response = self.send(Method::Get, &path, None, Auth::Bearer)?;
        decode(&ensure_success(response)?)
    }

    /// Create a private or group chat (`POST /chats`).
    pub fn create_chat(&self, request: &CreateChatRequest) -> Result<Chat> {
        if !matches!(request.kind.as_str(), "private" | "group") {
            return Err(Error::InvalidArgument(format!(
                "chat kind must be \"private\" or \"group\", got {:?}",
                request.kind
            )));
        }
        if request.user_ids.is_empty() {
            return Err(Error::InvalidArgument("chat needs at least one participant".into()));
        }
        let body = Self::encode(request)?;
        let response = self.send(Method::Post, "/chats", Some(body), Auth::Bearer)?;
        decode(&ensure_success(response)?)
    }

    /// Delete `chat_id` (`DELETE /chats/{id}`). `for_all` is forwarded as a query parameter
    /// when set; the backend default applies otherwise.
    pub fn delete_chat(&self, chat_id: i64, for_all: Option<bool>) -> Result<()> {
        let path = match for_all {
            Some(for_all) => format!("/chats/{chat_id}?for_all={for_all}"),
            None => format!("/chats/{chat_id}"),
        };
        let response = self.send(Method::Delete, &path, None, Auth::Bearer)?;
        ensure_success(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    const CHATS: &str = r#"[{"id":1,"kind":"private","title":null,
        "created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z",
        "is_archived":false,"peer_avatar":null,"peer_username":"bob"}]"#;

    fn logged_in() -> (Client, std::sync::Arc<ScriptedTransport>) {
        let (client, transport) = client();
        client.set_token("tok").unwrap();
        (client, transport)
    }

    #[test]
    fn chats_decode() {
        let (client, transport) = logged_in();
        transport.reply(200, CHATS);
        let chats = client.chats().unwrap();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].peer_username, "bob");
    }

    #[test]
    fn empty_chat_list() {
        let (client, transport) = logged_in();
        transport.reply(200, "[]");
        assert!(client.chats().unwrap().is_empty());
    }

    #[test]
    fn chats_require_session() {
        let (client, _) = client();
        assert!(matches!(client.chats(), Err(Error::NotAuthenticated)));
    }

    #[test]
    fn messages_path() {
        let (client, transport) = logged_in();
        transport.reply(
            200,
            r#"[{"id":5,"chat_id":3,"sender_id":42,"message":"c2VjcmV0","message_type":"text",
                "created_at":"2024-01-01T00:00:00Z","edited_at":null,"is_read":true,
                "has_files":false,"metadata":null,"envelopes":null,"status":null}]"#,
        );
        let messages = client.messages(3).unwrap();
        assert_eq!(messages[0].sender_id, 42);
        assert_eq!(transport.requests()[0].url, "http://backend.test/chats/3/messages");
    }

    #[test]
    fn create_chat_validates_kind() {
        let (client, transport) = logged_in();
        let err = client
            .create_chat(&CreateChatRequest {
                kind: "channel".into(),
                title: None,
                user_ids: vec![2],
            })
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn create_chat_posts() {
        let (client, transport) = logged_in();
        transport.reply(
            201,
            r#"{"id":9,"kind":"group","title":"team","created_at":"2024-01-01T00:00:00Z",
                "updated_at":"2024-01-01T00:00:00Z","peer_username":""}"#,
        );
        let chat = client
            .create_chat(&CreateChatRequest {
                kind: "group".into(),
                title: Some("team".into()),
                user_ids: vec![2, 3],
            })
            .unwrap();
        assert_eq!(chat.id, 9);
        assert_eq!(transport.requests()[0].method, Method::Post);
    }

    #[test]
    fn delete_chat_query() {
        let (client, transport) = logged_in();
        transport.reply(204, "");
        transport.reply(200, "");
        client.delete_chat(4, Some(true)).unwrap();
        client.delete_chat(4, None).unwrap();
        let seen = transport.requests();
        assert_eq!(seen[0].url, "http://backend.test/chats/4?for_all=true");
        assert_eq!(seen[1].url, "http://backend.test/chats/4");
        assert_eq!(seen[1].method, Method::Delete);
    }

    #[test]
    fn delete_missing_chat() {
        let (client, transport) = logged_in();
        transport.reply(404, "no such chat");
        let err = client.delete_chat(99, Some(false)).unwrap_err();
        assert_eq!(err.status(), Some(404));
    }
}
