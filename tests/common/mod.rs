//! Shared fixtures: a recording persistence service and small tree builders

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use formtree::config::Settings;
use formtree::domain::{
    Context, ContextDraft, ContextId, Document, Field, FieldDraft, FieldId, FieldKind,
    FieldOption, Forest, Instance, OptionId, Questionnaire, Step, StepId,
};
use formtree::infrastructure::schema::ConfiguredAttributeSchema;
use formtree::infrastructure::traits::{AttributeSchema, OrderRequest, PersistenceService};

/// One request seen by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateField(FieldDraft),
    UpdateField(Field),
    DeleteField(FieldId),
    CreateContext(ContextDraft),
    UpdateContext(Context),
    DeleteContext(ContextId),
    Order(OrderRequest),
}

/// Mock persistence service: records every call, hands out sequential ids.
pub struct RecordingStore {
    document: Document,
    calls: Mutex<Vec<Call>>,
    next_id: Mutex<u32>,
    fail_all: bool,
}

impl RecordingStore {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            calls: Mutex::new(Vec::new()),
            next_id: Mutex::new(1),
            fail_all: false,
        }
    }

    pub fn failing(document: Document) -> Self {
        Self {
            fail_all: true,
            ..Self::new(document)
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn order_calls(&self) -> Vec<OrderRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Order(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> io::Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail_all {
            return Err(io::Error::new(io::ErrorKind::Other, "service unavailable"));
        }
        Ok(())
    }

    fn new_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock().unwrap();
        let id = format!("{}{}", prefix, *next);
        *next += 1;
        id
    }
}

impl PersistenceService for RecordingStore {
    fn load(&self) -> io::Result<Document> {
        Ok(self.document.clone())
    }

    fn create_field(&self, draft: &FieldDraft) -> io::Result<Field> {
        self.record(Call::CreateField(draft.clone()))?;
        let mut field = draft.field.clone();
        field.id = FieldId::new(self.new_id("new-"));
        for option in &mut field.options {
            option.id = OptionId::new(self.new_id("opt-"));
        }
        Ok(field)
    }

    fn update_field(&self, field: &Field) -> io::Result<()> {
        self.record(Call::UpdateField(field.clone()))
    }

    fn delete_field(&self, id: &FieldId) -> io::Result<()> {
        self.record(Call::DeleteField(id.clone()))
    }

    fn create_context(&self, draft: &ContextDraft) -> io::Result<Context> {
        self.record(Call::CreateContext(draft.clone()))?;
        let mut context = draft.context.clone();
        context.id = ContextId::new(self.new_id("ctx-"));
        Ok(context)
    }

    fn update_context(&self, context: &Context) -> io::Result<()> {
        self.record(Call::UpdateContext(context.clone()))
    }

    fn delete_context(&self, id: &ContextId) -> io::Result<()> {
        self.record(Call::DeleteContext(id.clone()))
    }

    fn order_elements(&self, request: &OrderRequest) -> io::Result<()> {
        self.record(Call::Order(request.clone()))
    }
}

pub fn schema() -> Arc<dyn AttributeSchema> {
    Arc::new(ConfiguredAttributeSchema::new(Arc::new(Settings::default())))
}

pub fn field(id: &str, kind: FieldKind, children: Vec<Field>) -> Field {
    let mut children = children;
    formtree::domain::assign_order(&mut children);
    Field {
        id: FieldId::new(id),
        label: id.to_uppercase(),
        kind,
        instance: Instance::Standalone,
        template_id: None,
        y: 0,
        multi_entry: false,
        attrs: Default::default(),
        options: Vec::new(),
        children,
    }
}

pub fn with_options(mut field: Field, labels: &[&str]) -> Field {
    field.options = labels
        .iter()
        .enumerate()
        .map(|(idx, label)| FieldOption {
            id: OptionId::new(format!("{}-o{}", field.id, idx)),
            label: label.to_string(),
            presentation_order: idx as u32,
            ..FieldOption::default()
        })
        .collect();
    field
}

/// Step `s1` holding `[A (fieldgroup) [B (checkbox)], C (selectbox)]`.
pub fn scenario_forest() -> Forest {
    let a = field(
        "a",
        FieldKind::Fieldgroup,
        vec![with_options(field("b", FieldKind::Checkbox, vec![]), &["x", "y"])],
    );
    let c = with_options(field("c", FieldKind::Selectbox, vec![]), &["one", "two", "three"]);
    let mut roots = vec![a, c];
    formtree::domain::assign_order(&mut roots);
    Forest::new(
        Questionnaire {
            id: "default".into(),
            name: "Default".into(),
            steps: vec![Step {
                id: StepId::new("s1"),
                label: "Step 1".into(),
                presentation_order: 0,
                children: roots,
            }],
        },
        Vec::new(),
    )
}
