//! JSON bodies exchanged between the client and the relay.

use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Body of `POST /`: the client's conversation so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub chats: Vec<Message>,
}

/// Successful relay reply carrying the model's message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub output: Message,
}

/// Error body returned by the relay for rejected or failed requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relay_request_decodes_browser_payload() {
        let body = json!({
            "chats": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hello"},
                {"role": "user", "content": "how are you?"}
            ]
        });
        let request: RelayRequest = serde_json::from_value(body).expect("deserialize");
        assert_eq!(request.chats.len(), 3);
        assert_eq!(request.chats[2].content(), "how are you?");
    }

    #[test]
    fn relay_request_requires_list_of_chats() {
        assert!(serde_json::from_value::<RelayRequest>(json!({})).is_err());
        assert!(serde_json::from_value::<RelayRequest>(json!({"chats": "hi"})).is_err());
    }

    #[test]
    fn relay_response_shape() {
        let response = RelayResponse {
            output: Message::assistant("hi"),
        };
        assert_eq!(
            serde_json::to_value(&response).expect("serialize"),
            json!({"output": {"role": "assistant", "content": "hi"}})
        );
    }
}
