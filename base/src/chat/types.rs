use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Commands a bot registers with the chat service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertisement {
    pub alias: String,
    pub advertisements: Vec<CommandAdvertisement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandAdvertisement {
    /// Audience of the commands, e.g. "public"
    #[serde(rename = "type")]
    pub typ: String,
    pub commands: Vec<BotCommand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotCommand {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_description: Option<ExtendedDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedDescription {
    pub title: String,
    pub desktop_body: String,
    pub mobile_body: String,
}

/// A text message received from the chat service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: u64,
    pub conversation_id: String,
    pub channel_name: String,
    pub sender: String,
    pub body: String,
}

/// Destination of an outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatTarget {
    Conversation(String),
    Channel {
        name: String,
        members_type: String,
        topic_name: Option<String>,
    },
}

impl ChatTarget {
    /// Interprets a configured destination.
    ///
    /// A 64 character hex string is a conversation id, `team#channel` names a
    /// team channel, anything else is an implicit team such as `alice,bob`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.len() == 64 && value.chars().all(|c| c.is_ascii_hexdigit()) {
            return ChatTarget::Conversation(value.to_string());
        }
        match value.split_once('#') {
            Some((team, channel)) => ChatTarget::Channel {
                name: team.to_string(),
                members_type: "team".to_string(),
                topic_name: Some(channel.to_string()),
            },
            None => ChatTarget::Channel {
                name: value.to_string(),
                members_type: "impteamnative".to_string(),
                topic_name: None,
            },
        }
    }

    /// Options fragment addressing this target in a chat API call
    pub fn to_options(&self) -> Value {
        match self {
            ChatTarget::Conversation(id) => json!({ "conversation_id": id }),
            ChatTarget::Channel {
                name,
                members_type,
                topic_name,
            } => {
                let mut channel = json!({ "name": name, "members_type": members_type });
                if let Some(topic) = topic_name {
                    channel["topic_name"] = json!(topic);
                }
                json!({ "channel": channel })
            }
        }
    }
}

impl std::fmt::Display for ChatTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatTarget::Conversation(id) => write!(f, "{}", id),
            ChatTarget::Channel {
                name,
                topic_name: Some(topic),
                ..
            } => write!(f, "{}#{}", name, topic),
            ChatTarget::Channel { name, .. } => write!(f, "{}", name),
        }
    }
}
