//! Farming chatbot: a chat session plus the transcript shown to the user.

use std::sync::Arc;

use agri_services::prompts::CHAT_GREETING;
use agri_services::{ChatMessage, ChatSession, ChatTranscript, GeminiClient, MessageId, Role};
use parking_lot::Mutex;

use crate::error::{WorkflowError, CHAT_APOLOGY};

pub struct ChatModel {
    session: ChatSession,
    transcript: Arc<Mutex<ChatTranscript>>,
}

fn push_apology(transcript: &Mutex<ChatTranscript>) {
    transcript.lock().push(Role::Model, CHAT_APOLOGY);
}

impl ChatModel {
    pub fn new(gemini: &GeminiClient) -> Self {
        let mut transcript = ChatTranscript::new();
        transcript.push(Role::Model, CHAT_GREETING);
        Self {
            session: gemini.start_chat(),
            transcript: Arc::new(Mutex::new(transcript)),
        }
    }

    /// Shared handle for rendering while a reply streams in.
    pub fn transcript(&self) -> Arc<Mutex<ChatTranscript>> {
        Arc::clone(&self.transcript)
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.lock().messages().to_vec()
    }

    /// Send user input and stream the reply into its own message.
    ///
    /// Returns the reply's message id, or `None` for blank input. `on_chunk`
    /// sees each piece of text as it arrives.
    pub async fn send<F>(
        &mut self,
        input: &str,
        mut on_chunk: F,
    ) -> Result<Option<MessageId>, WorkflowError>
    where
        F: FnMut(MessageId, &str),
    {
        if input.trim().is_empty() {
            return Ok(None);
        }

        self.transcript.lock().push(Role::User, input);

        let mut stream = match self.session.send_message_stream(input).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::error!("Chat request failed: {}", e);
                push_apology(&self.transcript);
                return Err(WorkflowError::Chat(e));
            }
        };

        let reply_id = self.transcript.lock().push(Role::Model, "");

        while let Some(chunk) = stream.next_chunk().await {
            match chunk {
                Ok(text) => {
                    self.transcript.lock().append_chunk(reply_id, &text);
                    on_chunk(reply_id, &text);
                }
                Err(e) => {
                    tracing::error!("Chat stream failed: {}", e);
                    push_apology(&self.transcript);
                    return Err(WorkflowError::Chat(e));
                }
            }
        }

        Ok(Some(reply_id))
    }
}
