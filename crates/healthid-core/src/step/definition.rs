use indexmap::IndexMap;

use crate::engine::StepContext;
use crate::errors::FlowError;

/// Hook invoked every time the cursor lands on the step. It receives a
/// fresh `StepContext` and may navigate away, which is how conditional
/// step-skipping is expressed (e.g. skip mobile linking when the number is
/// already linked).
pub type EnterHook<M> = Box<dyn Fn(&StepContext<M>) -> Result<(), FlowError> + Send + Sync>;

/// A named step of a flow. Ids must be unique within one registry.
pub struct StepDefinition<M> {
    id: String,
    on_enter: Option<EnterHook<M>>,
}

impl<M> StepDefinition<M> {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            on_enter: None,
        }
    }

    pub fn on_enter<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StepContext<M>) -> Result<(), FlowError> + Send + Sync + 'static,
    {
        self.on_enter = Some(Box::new(hook));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn enter_hook(&self) -> Option<&EnterHook<M>> {
        self.on_enter.as_ref()
    }
}

/// Ordered, id-addressable list of steps. Construction goes through the
/// builder so that the non-empty and unique-id invariants hold for every
/// registry the engine ever sees.
pub struct StepRegistry<M> {
    steps: IndexMap<String, StepDefinition<M>>,
}

impl<M> StepRegistry<M> {
    pub fn builder() -> StepRegistryBuilder<M> {
        StepRegistryBuilder { steps: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.steps.get_index_of(id)
    }

    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.steps.get_index(index).map(|(id, _)| id.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.steps.keys().map(String::as_str)
    }

    pub(crate) fn hook_at(&self, index: usize) -> Option<&EnterHook<M>> {
        self.steps
            .get_index(index)
            .and_then(|(_, def)| def.enter_hook())
    }
}

pub struct StepRegistryBuilder<M> {
    steps: Vec<StepDefinition<M>>,
}

impl<M> StepRegistryBuilder<M> {
    /// Añade un paso al final del registro.
    pub fn step(mut self, def: StepDefinition<M>) -> Self {
        self.steps.push(def);
        self
    }

    /// Construye el registro validando los invariantes: lista no vacía e
    /// ids únicos.
    pub fn build(self) -> Result<StepRegistry<M>, FlowError> {
        if self.steps.is_empty() {
            return Err(FlowError::EmptyFlow);
        }
        let mut steps = IndexMap::with_capacity(self.steps.len());
        for def in self.steps {
            let id = def.id().to_string();
            if steps.insert(id.clone(), def).is_some() {
                return Err(FlowError::DuplicateStepId(id));
            }
        }
        Ok(StepRegistry { steps })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Registry = StepRegistry<()>;

    #[test]
    fn preserves_registration_order() {
        let registry: Registry = StepRegistry::builder()
            .step(StepDefinition::new("enter-id"))
            .step(StepDefinition::new("verify-id"))
            .build()
            .unwrap();
        assert_eq!(registry.ids().collect::<Vec<_>>(), ["enter-id", "verify-id"]);
        assert_eq!(registry.index_of("verify-id"), Some(1));
        assert_eq!(registry.id_at(0), Some("enter-id"));
    }

    #[test]
    fn rejects_empty_registry() {
        let result: Result<Registry, _> = StepRegistry::builder().build();
        assert_eq!(result.err(), Some(FlowError::EmptyFlow));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result: Result<Registry, _> = StepRegistry::builder()
            .step(StepDefinition::new("enter-id"))
            .step(StepDefinition::new("enter-id"))
            .build();
        assert_eq!(
            result.err(),
            Some(FlowError::DuplicateStepId("enter-id".into()))
        );
    }
}
