use log::{ info, warn, error };
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::attachments::{ Attachment, AttachmentError, AttachmentKind };
use crate::cli::Args;
use crate::config;
use crate::history::{ history_for_payload, initialize_history_store, HistoryStore };
use crate::models::catalog::ModelEntry;
use crate::models::chat::{ ChatMessage, Conversation, RequestPayload, Role, Routing };
use crate::normalize::{ debug_summary, extract_answer };
use crate::webhook::{ WebhookClient, WireFormat };

/// Drives the chat session: one webhook call per user turn, exactly one
/// user message and one assistant message appended per turn regardless of
/// outcome.
pub struct ChatAgent {
    client: WebhookClient,
    history: Arc<dyn HistoryStore>,
    conversation_id: String,
    project: String,
    master_plan: String,
    wire_format: WireFormat,
    history_limit: usize,
    catalog: Vec<ModelEntry>,
    selected: ModelEntry,
    staged_images: Vec<Attachment>,
    staged_pdfs: Vec<Attachment>,
}

impl ChatAgent {
    pub async fn new(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let client = WebhookClient::new(args)?;
        let history = initialize_history_store();
        let wire_format: WireFormat = args.wire_format.parse()?;

        let catalog = client.fetch_models().await;
        let selected = Self::pick_model(&catalog, args.model.as_deref())?;
        info!("Selected model: {} ({})", selected.display_label(), selected.provider);

        let master_plan = config::load_master_plan(args.master_plan_path.as_deref());
        let conversation_id = args.conversation_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        info!("Conversation id: {}", conversation_id);

        Ok(Self {
            client,
            history,
            conversation_id,
            project: args.project.clone(),
            master_plan,
            wire_format,
            history_limit: args.history_limit,
            catalog,
            selected,
            staged_images: Vec::new(),
            staged_pdfs: Vec::new(),
        })
    }

    fn pick_model(
        catalog: &[ModelEntry],
        requested: Option<&str>
    ) -> Result<ModelEntry, Box<dyn Error + Send + Sync>> {
        match requested {
            Some(id) => catalog
                .iter()
                .find(|m| m.id == id)
                .cloned()
                .ok_or_else(|| format!("Model '{}' is not in the catalog", id).into()),
            None => catalog
                .first()
                .cloned()
                .ok_or_else(|| "Model catalog is empty".into()),
        }
    }

    pub fn catalog(&self) -> &[ModelEntry] {
        &self.catalog
    }

    pub fn selected_model(&self) -> &ModelEntry {
        &self.selected
    }

    pub fn select_model(&mut self, id: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        let model = self.catalog
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| format!("Model '{}' is not in the catalog", id))?;
        info!("Switched model to: {}", model.display_label());
        self.selected = model;
        Ok(())
    }

    /// Stages an attachment for the next turn; it is consumed by that turn.
    pub fn stage_attachment(&mut self, path: &Path) -> Result<&Attachment, AttachmentError> {
        let attachment = Attachment::from_path(path)?;
        info!("Staged attachment: {} ({})", attachment.filename, attachment.mime);
        match attachment.kind() {
            AttachmentKind::Image => {
                self.staged_images.push(attachment);
                Ok(self.staged_images.last().unwrap())
            }
            AttachmentKind::Pdf => {
                self.staged_pdfs.push(attachment);
                Ok(self.staged_pdfs.last().unwrap())
            }
        }
    }

    pub fn staged_attachment_count(&self) -> usize {
        self.staged_images.len() + self.staged_pdfs.len()
    }

    pub async fn conversation(&self) -> Result<Conversation, Box<dyn Error + Send + Sync>> {
        self.history.get_conversation(&self.conversation_id, 0).await
    }

    pub async fn clear(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.history.clear(&self.conversation_id).await?;
        self.staged_images.clear();
        self.staged_pdfs.clear();
        info!("Conversation cleared");
        Ok(())
    }

    /// Runs one turn: append the user message, call the webhook once,
    /// append exactly one assistant message (answer or error string).
    pub async fn process_turn(
        &mut self,
        message: &str
    ) -> Result<ChatMessage, Box<dyn Error + Send + Sync>> {
        // History sent on the wire excludes the turn being composed.
        let conversation = self.history
            .get_conversation(&self.conversation_id, self.history_limit).await?;
        let history = history_for_payload(&conversation);

        self.history
            .add_message(&self.conversation_id, ChatMessage::new(Role::User, message)).await?;

        let payload = RequestPayload {
            request_id: Uuid::new_v4().to_string(),
            message: message.to_string(),
            project: self.project.clone(),
            routing: Routing {
                provider: self.selected.provider.clone(),
                model: self.selected.id.clone(),
                label: self.selected.label.clone(),
            },
            master_prompt: self.master_plan.clone(),
            history,
            images: std::mem::take(&mut self.staged_images),
            pdfs: std::mem::take(&mut self.staged_pdfs),
        };

        info!(
            "Sending turn {} ({} history entries, {} images, {} pdfs)",
            payload.request_id,
            payload.history.len(),
            payload.images.len(),
            payload.pdfs.len()
        );

        let result = match self.wire_format {
            WireFormat::Json => self.client.send_chat(&payload).await,
            WireFormat::Multipart => self.client.send_chat_multipart(&payload).await,
        };

        let reply = match result {
            Ok(envelope) => {
                let answer = extract_answer(&envelope);
                let summary = debug_summary(&envelope);
                ChatMessage::new(Role::Assistant, answer).with_meta(summary)
            }
            Err(e) => {
                error!("Webhook call failed: {}", e);
                ChatMessage::new(Role::Assistant, e.user_message())
            }
        };

        if let Err(e) = self.history.add_message(&self.conversation_id, reply.clone()).await {
            warn!("History write (assistant) failed: {}", e);
        }

        Ok(reply)
    }
}
