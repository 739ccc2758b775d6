//! Echo Bot Demo
//!
//! Wires a router to a toy JSON codec and feeds it a few sample payloads.
//! A real deployment would decode and render the platform's XML (and handle
//! encryption) inside the codec and renderer, and call `app.dispatch` from
//! its HTTP handler.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package echo-bot
//! ```

use std::sync::Arc;

use anyhow::Result;
use serde_json::{Value, json};
use tracing::info;
use weixin::prelude::*;

// ============================================================================
// Codec and renderer
// ============================================================================

/// Decodes JSON bodies shaped like the platform's XML fields.
fn json_codec(payload: &str) -> Result<Message, DecodeError> {
    serde_json::from_str(payload).map_err(|e| DecodeError::Malformed(e.to_string()))
}

/// Renders replies as JSON, addressed back to the sender.
struct JsonRenderer;

impl ReplyRenderer for JsonRenderer {
    fn render(
        &self,
        reply: Reply,
        message: &Message,
        _ctx: &Context,
    ) -> Result<String, RenderError> {
        let to = message
            .sender()
            .ok_or(RenderError::MissingField("FromUserName"))?;
        let from = message.recipient().unwrap_or_default();

        let mut body = json!({ "ToUserName": to, "FromUserName": from });
        match reply {
            Reply::Text(text) => {
                body["MsgType"] = "text".into();
                body["Content"] = text.into();
            }
            Reply::Payload(Value::Object(fields)) => {
                for (k, v) in fields {
                    body[k] = v;
                }
            }
            Reply::Payload(other) => {
                return Err(RenderError::Unsupported(format!("payload {other}")));
            }
        }

        serde_json::to_string(&body).map_err(|e| RenderError::Encode(e.to_string()))
    }
}

// ============================================================================
// Handler Functions
// ============================================================================

async fn welcome(ctx: Arc<Context>) -> Option<String> {
    ctx.get_str("welcome").map(str::to_string)
}

async fn today_music() -> Value {
    json!({
        "MsgType": "music",
        "Music": { "Title": "Today's pick", "MusicUrl": "http://example.com/today.mp3" }
    })
}

/// Counts sign-ins per user in storage.
async fn sign_in(Sender(user): Sender, storage: Arc<dyn Storage>) -> Result<String> {
    let key = format!("sign_in:{user}");
    let count = storage.get_as::<u32>(&key)?.unwrap_or(0) + 1;
    storage.set_as(&key, &count, None)?;
    Ok(format!("signed in, {count} time(s) so far"))
}

async fn help() -> &'static str {
    "send 签到 to sign in, anything else is echoed back"
}

async fn echo(Content(text): Content) -> String {
    text
}

async fn unsupported(msg: Message) -> String {
    format!("{} messages are not supported yet", msg.msg_type().unwrap_or("these"))
}

async fn audit(msg: Message) {
    info!(
        from = msg.sender().unwrap_or("unknown"),
        msg_type = msg.msg_type().unwrap_or_default(),
        "Handled message"
    );
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let router = Router::new()
        .subscribe(welcome)
        .click_key("V1001_TODAY_MUSIC", today_music)
        .filter(["签到", "sign"], sign_in)?
        .filter("^help", help)?
        .filter_default(echo)
        .fallback(unsupported)
        .on_finish(audit);

    let app = WeixinApp::builder()
        .set("app.token", "demo-token")
        .set("app.app_id", "wx_demo")
        .entry("welcome", "thanks for following!")
        .codec(json_codec)
        .renderer(JsonRenderer)
        .router(router)
        .build()?;

    let payloads = [
        r#"{"FromUserName":"o_alice","ToUserName":"gh_demo","MsgType":"event","Event":"subscribe"}"#,
        r#"{"FromUserName":"o_alice","ToUserName":"gh_demo","MsgType":"text","Content":"签到"}"#,
        r#"{"FromUserName":"o_alice","ToUserName":"gh_demo","MsgType":"text","Content":" sign "}"#,
        r#"{"FromUserName":"o_alice","ToUserName":"gh_demo","MsgType":"text","Content":"help me"}"#,
        r#"{"FromUserName":"o_alice","ToUserName":"gh_demo","MsgType":"text","Content":"hello"}"#,
        r#"{"FromUserName":"o_alice","ToUserName":"gh_demo","MsgType":"event","Event":"CLICK","EventKey":"V1001_TODAY_MUSIC"}"#,
        r#"{"FromUserName":"o_alice","ToUserName":"gh_demo","MsgType":"image","PicUrl":"http://example.com/a.jpg"}"#,
        r#"{"ToUserName":"gh_demo","Encrypt":"..."}"#,
    ];

    for payload in payloads {
        match app.dispatch(payload).await? {
            Some(reply) => info!(%reply, "Reply"),
            None => info!("No reply"),
        }
    }

    Ok(())
}
