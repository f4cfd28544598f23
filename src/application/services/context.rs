//! Contexts and their receivers
//!
//! Contexts form one ordered sibling set persisted with batch reorders; each
//! context keeps an ordered list of receiver ids edited in memory and persisted
//! with the context.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::services::reorder::{swap_plain, SiblingReorderer};
use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::trigger::filter_unselected;
use crate::domain::{
    assign_order, next_order, Context, ContextDraft, ContextId, Direction, DomainError,
    MoveOutcome, Receiver, ReceiverId,
};
use crate::infrastructure::traits::{OrderScope, PersistenceService};

pub struct ContextService {
    store: Arc<dyn PersistenceService>,
    reorderer: SiblingReorderer,
    default_questionnaire: String,
    contexts: Vec<Context>,
    receivers: Vec<Receiver>,
}

impl ContextService {
    pub fn new(
        store: Arc<dyn PersistenceService>,
        default_questionnaire: impl Into<String>,
        contexts: Vec<Context>,
        receivers: Vec<Receiver>,
    ) -> Self {
        Self {
            reorderer: SiblingReorderer::new(store.clone()),
            store,
            default_questionnaire: default_questionnaire.into(),
            contexts,
            receivers,
        }
    }

    pub fn contexts(&self) -> &[Context] {
        &self.contexts
    }

    pub fn receivers(&self) -> &[Receiver] {
        &self.receivers
    }

    pub fn context(&self, id: &ContextId) -> ApplicationResult<&Context> {
        self.contexts
            .iter()
            .find(|c| &c.id == id)
            .ok_or_else(|| DomainError::ContextNotFound(id.to_string()).into())
    }

    fn context_mut(&mut self, id: &ContextId) -> ApplicationResult<&mut Context> {
        self.contexts
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| DomainError::ContextNotFound(id.to_string()).into())
    }

    /// Create a context on the default questionnaire, appended at the end.
    #[instrument(level = "debug", skip(self))]
    pub fn add_context(&mut self, name: &str) -> ApplicationResult<ContextId> {
        let draft = ContextDraft {
            context: Context {
                name: name.to_string(),
                presentation_order: next_order(&self.contexts),
                questionnaire_id: self.default_questionnaire.clone(),
                ..Context::default()
            },
        };
        let created = self
            .store
            .create_context(&draft)
            .with_node_context("create context", &name)?;
        let id = created.id.clone();
        self.contexts.push(created);
        info!("add_context: created {}", id);
        Ok(id)
    }

    /// Persist a context; a missing additional questionnaire is saved as empty.
    #[instrument(level = "debug", skip(self))]
    pub fn save_context(&mut self, id: &ContextId) -> ApplicationResult<()> {
        let context = self.context_mut(id)?;
        if context.additional_questionnaire_id.is_none() {
            context.additional_questionnaire_id = Some(String::new());
        }
        let context = self.context(id)?;
        self.store
            .update_context(context)
            .with_node_context("update context", id)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn delete_context(&mut self, id: &ContextId) -> ApplicationResult<()> {
        self.context(id)?;
        self.store
            .delete_context(id)
            .with_node_context("delete context", id)?;
        self.contexts.retain(|c| &c.id != id);
        assign_order(&mut self.contexts);
        Ok(())
    }

    pub fn move_up(&mut self, id: &ContextId) -> ApplicationResult<MoveOutcome> {
        self.reorderer
            .move_up(&mut self.contexts, id, OrderScope::Contexts)
    }

    pub fn move_down(&mut self, id: &ContextId) -> ApplicationResult<MoveOutcome> {
        self.reorderer
            .move_down(&mut self.contexts, id, OrderScope::Contexts)
    }

    /// Select the receiver if unselected, otherwise drop it.
    pub fn toggle_receiver(
        &mut self,
        context_id: &ContextId,
        receiver_id: &ReceiverId,
    ) -> ApplicationResult<bool> {
        self.known_receiver(receiver_id)?;
        let context = self.context_mut(context_id)?;
        match context.receivers.iter().position(|r| r == receiver_id) {
            Some(idx) => {
                context.receivers.remove(idx);
                debug!("toggle_receiver: removed {}", receiver_id);
                Ok(false)
            }
            None => {
                context.receivers.push(receiver_id.clone());
                debug!("toggle_receiver: added {}", receiver_id);
                Ok(true)
            }
        }
    }

    /// Append a receiver to the selection; already selected receivers are kept once.
    pub fn add_receiver(
        &mut self,
        context_id: &ContextId,
        receiver_id: &ReceiverId,
    ) -> ApplicationResult<()> {
        self.known_receiver(receiver_id)?;
        let context = self.context_mut(context_id)?;
        if !context.receivers.contains(receiver_id) {
            context.receivers.push(receiver_id.clone());
        }
        Ok(())
    }

    /// Swap a selected receiver with its neighbour, in memory only.
    pub fn move_receiver(
        &mut self,
        context_id: &ContextId,
        index: usize,
        direction: Direction,
    ) -> ApplicationResult<MoveOutcome> {
        let context = self.context_mut(context_id)?;
        Ok(swap_plain(&mut context.receivers, index, direction))
    }

    /// Receivers not yet selected for the context, in receiver list order.
    pub fn unselected_receivers(
        &self,
        context_id: &ContextId,
    ) -> ApplicationResult<Vec<&Receiver>> {
        let context = self.context(context_id)?;
        Ok(filter_unselected(&context.receivers, &self.receivers))
    }

    fn known_receiver(&self, id: &ReceiverId) -> ApplicationResult<()> {
        if self.receivers.iter().any(|r| &r.id == id) {
            Ok(())
        } else {
            Err(DomainError::ReceiverNotFound(id.to_string()).into())
        }
    }
}
